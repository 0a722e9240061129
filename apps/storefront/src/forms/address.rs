//! Address form with PIN code autofill.

use std::fmt;

use tracing::warn;

use storefront_core::validation::{is_complete_pincode, validate_pincode};
use storefront_core::{AddressType, NewAddress};

use crate::remote::{PostalArea, PostalLookup};

pub const INVALID_PINCODE: &str = "Invalid PIN code";
pub const LOOKUP_FAILED: &str = "Error fetching address details";

/// Field-level messages, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|(_, m)| m.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// What happened when the PIN code changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PincodeLookup {
    /// Fewer than six digits; nothing looked up.
    Incomplete,
    Filled(PostalArea),
    Invalid,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub street: String,
    pub landmark: String,
    pub label: String,
    /// `home`, `work` or `other`.
    pub address_type: String,
    /// Message from the last PIN code lookup, shown under the field.
    pub pincode_error: Option<String>,
}

impl AddressForm {
    pub fn new() -> Self {
        AddressForm {
            address_type: AddressType::Home.to_string(),
            ..AddressForm::default()
        }
    }

    /// Updates the PIN code and, once it has six digits, fills city and
    /// state from the postal lookup.
    pub async fn set_pincode(&mut self, value: &str, postal: &dyn PostalLookup) -> PincodeLookup {
        self.pincode = value.trim().to_string();
        self.pincode_error = None;

        if !is_complete_pincode(&self.pincode) {
            return PincodeLookup::Incomplete;
        }

        match postal.lookup(&self.pincode).await {
            Ok(Some(area)) => {
                self.city = area.district.clone();
                self.state = area.state.clone();
                PincodeLookup::Filled(area)
            }
            Ok(None) => {
                self.pincode_error = Some(INVALID_PINCODE.to_string());
                PincodeLookup::Invalid
            }
            Err(e) => {
                warn!(pincode = %self.pincode, error = %e, "PIN code lookup failed");
                self.pincode_error = Some(LOOKUP_FAILED.to_string());
                PincodeLookup::Failed
            }
        }
    }

    /// Checks every field and reports all problems at once.
    pub fn validate(&self) -> Result<NewAddress, FieldErrors> {
        let mut errors = FieldErrors::default();

        if let Err(e) = validate_pincode(&self.pincode) {
            errors.push("pincode", e.to_string());
        }
        let required = [
            ("street", "Street address is required", &self.street),
            ("city", "City is required", &self.city),
            ("state", "State is required", &self.state),
        ];
        for (field, message, value) in required {
            if value.trim().is_empty() {
                errors.push(field, message);
            }
        }

        let address_type = match self.address_type.parse::<AddressType>() {
            Ok(t) => Some(t),
            Err(e) => {
                errors.push("type", e.to_string());
                None
            }
        };
        if self.label.trim().is_empty() {
            errors.push("label", "Address label is required");
        }

        match address_type {
            Some(address_type) if errors.is_empty() => Ok(NewAddress {
                pincode: self.pincode.trim().to_string(),
                city: self.city.trim().to_string(),
                state: self.state.trim().to_string(),
                street: self.street.trim().to_string(),
                landmark: Some(self.landmark.trim().to_string()).filter(|l| !l.is_empty()),
                label: self.label.trim().to_string(),
                address_type,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RemoteError, RemoteResult};
    use async_trait::async_trait;

    struct FixedLookup(RemoteResult<Option<PostalArea>>);

    #[async_trait]
    impl PostalLookup for FixedLookup {
        async fn lookup(&self, _pincode: &str) -> RemoteResult<Option<PostalArea>> {
            match &self.0 {
                Ok(area) => Ok(area.clone()),
                Err(_) => Err(RemoteError::Parse("down".to_string())),
            }
        }
    }

    fn bengaluru() -> PostalArea {
        PostalArea {
            district: "Bangalore".to_string(),
            state: "Karnataka".to_string(),
        }
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let form = AddressForm {
            address_type: String::new(),
            ..AddressForm::default()
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get("pincode"), Some("PIN code is required"));
        assert_eq!(errors.get("street"), Some("Street address is required"));
        assert_eq!(errors.get("city"), Some("City is required"));
        assert_eq!(errors.get("state"), Some("State is required"));
        assert_eq!(errors.get("type"), Some("Address type is required"));
        assert_eq!(errors.get("label"), Some("Address label is required"));
    }

    #[tokio::test]
    async fn test_six_digits_autofill() {
        let mut form = AddressForm::new();
        let lookup = FixedLookup(Ok(Some(bengaluru())));

        assert_eq!(
            form.set_pincode("56000", &lookup).await,
            PincodeLookup::Incomplete
        );
        assert!(form.city.is_empty());

        assert_eq!(
            form.set_pincode("560001", &lookup).await,
            PincodeLookup::Filled(bengaluru())
        );
        assert_eq!(form.city, "Bangalore");
        assert_eq!(form.state, "Karnataka");

        form.street = "12 MG Road".to_string();
        form.label = "Home".to_string();
        let address = form.validate().unwrap();
        assert_eq!(address.address_type, AddressType::Home);
        assert!(address.landmark.is_none());
    }

    #[tokio::test]
    async fn test_unknown_and_failed_lookups() {
        let mut form = AddressForm::new();

        form.set_pincode("999999", &FixedLookup(Ok(None))).await;
        assert_eq!(form.pincode_error.as_deref(), Some(INVALID_PINCODE));

        let down = FixedLookup(Err(RemoteError::Parse(String::new())));
        assert_eq!(
            form.set_pincode("560001", &down).await,
            PincodeLookup::Failed
        );
        assert_eq!(form.pincode_error.as_deref(), Some(LOOKUP_FAILED));
    }
}
