//! Profile form: display name and phone.

use storefront_core::validation::{validate_display_name, validate_phone};
use storefront_core::{ProfileUpdate, User, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub display_name: String,
    pub phone: String,
}

impl ProfileForm {
    /// Prefills from the current profile.
    pub fn from_user(user: &User) -> Self {
        ProfileForm {
            display_name: user.display_name.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
        }
    }

    /// Blank fields are left unchanged.
    pub fn validate(&self) -> Result<ProfileUpdate, ValidationError> {
        let display_name = match self.display_name.trim() {
            "" => None,
            name => Some(validate_display_name(name)?),
        };
        let phone = match self.phone.trim() {
            "" => None,
            phone => Some(validate_phone(phone)?),
        };

        Ok(ProfileUpdate {
            display_name,
            phone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_skipped() {
        let form = ProfileForm {
            display_name: "  Asha ".to_string(),
            phone: String::new(),
        };
        let update = form.validate().unwrap();
        assert_eq!(update.display_name.as_deref(), Some("Asha"));
        assert!(update.phone.is_none());

        assert!(ProfileForm::default().validate().unwrap().is_empty());
    }

    #[test]
    fn test_bad_phone_rejected() {
        let form = ProfileForm {
            display_name: String::new(),
            phone: "12".to_string(),
        };
        assert!(form.validate().is_err());
    }
}
