use netpulse_core::UnknownVariant;
use thiserror::Error;

/// A form field that is missing or holds a value outside its vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a single line of text")]
    ControlCharacter(&'static str),

    #[error("invalid {field}: {source}")]
    Invalid {
        field: &'static str,
        #[source]
        source: UnknownVariant,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field) => field,
            ValidationError::ControlCharacter(field) => field,
            ValidationError::Invalid { field, .. } => field,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid admin credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Form(#[from] ValidationError),
}

/// Returns the trimmed value of a required field.
pub(crate) fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(value)
}

/// Like [`required`], but also rejects line breaks and other control
/// characters. Used for values that end up in exported CSV rows.
pub(crate) fn required_line<'a>(
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    let value = required(field, value)?;
    if value.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacter(field));
    }
    Ok(value)
}

/// Returns the trimmed value of an optional field, `None` when blank.
pub(crate) fn optional(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_are_rejected_in_single_line_fields() {
        assert_eq!(
            required_line("location", "Newark,\nNJ"),
            Err(ValidationError::ControlCharacter("location"))
        );
        assert_eq!(
            required_line("location", "Newark\t NJ"),
            Err(ValidationError::ControlCharacter("location"))
        );
        assert_eq!(required_line("location", " Newark, NJ\n"), Ok("Newark, NJ"));
    }

    #[test]
    fn blank_required_field_is_missing() {
        assert_eq!(required("location", "   "), Err(ValidationError::Missing("location")));
        assert_eq!(required("location", " NYC "), Ok("NYC"));
    }

    #[test]
    fn missing_field_display() {
        let err = ValidationError::Missing("provider");
        assert_eq!(err.to_string(), "provider is required");
        assert_eq!(err.field(), "provider");
    }
}
