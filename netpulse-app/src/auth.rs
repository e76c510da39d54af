use netpulse_core::Identity;
use tracing::{info, warn};

use crate::config::{AdminConfig, DemoUserConfig};
use crate::error::{AuthError, ValidationError, optional, required, required_line};

const ADMIN_DISPLAY_NAME: &str = "Admin";
const ADMIN_LOCATION: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    User,
    Admin,
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    admin: AdminConfig,
    demo_user: DemoUserConfig,
}

impl Authenticator {
    pub fn new(admin: AdminConfig, demo_user: DemoUserConfig) -> Self {
        Self { admin, demo_user }
    }

    pub fn login(&self, mode: LoginMode, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = required("email", email)?;
        let password = required("password", password)?;

        match mode {
            LoginMode::Admin => {
                if email != self.admin.email || password != self.admin.password {
                    warn!(email, "rejected admin login");
                    return Err(AuthError::InvalidCredentials);
                }
                info!(email, "admin login accepted");
                Ok(Identity {
                    display_name: ADMIN_DISPLAY_NAME.into(),
                    contact_email: email.into(),
                    home_location: ADMIN_LOCATION.into(),
                    is_privileged: true,
                })
            }
            LoginMode::User => Ok(Identity {
                display_name: self.demo_user.name.as_str().into(),
                contact_email: email.into(),
                home_location: self.demo_user.location.as_str().into(),
                is_privileged: false,
            }),
        }
    }

    pub fn sign_up(&self, form: &SignUpForm) -> Result<Identity, ValidationError> {
        let name = required_line("name", &form.name)?;
        let email = required("email", &form.email)?;
        required("password", &form.password)?;

        let location = optional(&form.location).unwrap_or(self.demo_user.location.as_str());

        Ok(Identity {
            display_name: name.into(),
            contact_email: email.into(),
            home_location: location.into(),
            is_privileged: false,
        })
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(AdminConfig::default(), DemoUserConfig::default())
    }
}
