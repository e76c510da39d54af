use crate::error::{ValidationError, required};

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn submit(&self) -> Result<String, ValidationError> {
        let first_name = required("first name", &self.first_name)?;
        required("last name", &self.last_name)?;
        required("email", &self.email)?;
        required("message", &self.message)?;

        Ok(format!(
            "Thank you, {first_name} Your outage report has been submitted."
        ))
    }
}
