//! Current user slice.

use storefront_core::{Address, User};

/// The signed-in user's profile document, as last seen.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSlice {
    pub current: Option<User>,
    /// True until the first auth state has been resolved.
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for UserSlice {
    fn default() -> Self {
        UserSlice {
            current: None,
            loading: true,
            error: None,
        }
    }
}

impl UserSlice {
    pub fn set(&mut self, user: Option<User>) {
        self.current = user;
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }

    pub fn uid(&self) -> Option<&str> {
        self.current.as_ref().map(|u| u.uid.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.current.as_ref().is_some_and(User::is_admin)
    }

    pub fn add_address(&mut self, address: Address) {
        if let Some(user) = self.current.as_mut() {
            user.addresses.push(address);
        }
    }

    /// Drops the address from the local copy. No-op if absent.
    pub fn remove_address(&mut self, address_id: &str) {
        if let Some(user) = self.current.as_mut() {
            user.addresses.retain(|a| a.id != address_id);
        }
    }

    pub fn addresses(&self) -> &[Address] {
        self.current
            .as_ref()
            .map(|u| u.addresses.as_slice())
            .unwrap_or(&[])
    }
}
