//! Sign-up, sign-in and forgot-password forms.

use storefront_core::validation::{validate_display_name, validate_email, validate_password};
use storefront_core::ValidationError;

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Validated sign-up input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpInput {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<SignUpInput, ValidationError> {
        let display_name = validate_display_name(&self.display_name)?;
        let email = validate_email(&self.email)?;
        validate_password(&self.password)?;

        if self.password != self.confirm_password {
            return Err(ValidationError::Inconsistent {
                field: "Password".to_string(),
                reason: PASSWORDS_DO_NOT_MATCH.to_string(),
            });
        }

        Ok(SignUpInput {
            display_name,
            email,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// Only presence is checked; credentials are judged by the provider.
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::required("Email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::required("Password"));
        }
        Ok((self.email.trim().to_string(), self.password.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<String, ValidationError> {
        validate_email(&self.email)
    }
}
