//! The bundle every command runs against.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::forms::SubmitFlag;
use crate::notify::Notifier;
use crate::remote::{AuthProvider, ImageHost, PostalLookup, RemoteStore, Session};
use crate::state::{ConfigState, Store};

/// Configuration, state and the four remote seams.
///
/// Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct Storefront {
    pub config: Arc<ConfigState>,
    pub store: Store,
    pub remote: Arc<dyn RemoteStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub images: Arc<dyn ImageHost>,
    pub postal: Arc<dyn PostalLookup>,
    pub notifier: Notifier,
    /// Guards the admin product form against double submission.
    pub product_submit: SubmitFlag,
    /// Guards the address form.
    pub address_submit: SubmitFlag,
}

impl Storefront {
    pub fn new(
        config: ConfigState,
        remote: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        images: Arc<dyn ImageHost>,
        postal: Arc<dyn PostalLookup>,
    ) -> Self {
        let notifier = Notifier::new(config.notification_capacity);
        Storefront {
            config: Arc::new(config),
            store: Store::new(),
            remote,
            auth,
            images,
            postal,
            notifier,
            product_submit: SubmitFlag::default(),
            address_submit: SubmitFlag::default(),
        }
    }

    /// The current session, or `NOT_SIGNED_IN`.
    pub fn require_session(&self) -> AppResult<Session> {
        self.auth
            .current_session()
            .ok_or_else(|| crate::remote::RemoteError::NotSignedIn.into())
    }

    /// Logs and queues a failure, then hands it back.
    pub fn report(&self, prefix: &str, err: AppError) -> AppError {
        self.notifier.error(format!("{prefix}{}", err.message));
        err
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("store_name", &self.config.store_name)
            .finish_non_exhaustive()
    }
}
