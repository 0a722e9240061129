//! # Profile Commands
//!
//! ## Optimistic Address Removal
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  remove_address(id)                                                     │
//! │       │                                                                 │
//! │       ├── 1. dispatch AddressRemoved(id)      (UI updates immediately)  │
//! │       │                                                                 │
//! │       ├── 2. remote.remove_address(uid, id)                             │
//! │       │         │                                                       │
//! │       │         ├── Ok  ──► "Address removed successfully"              │
//! │       │         │                                                       │
//! │       │         └── Err ──► "Failed to delete address"                  │
//! │       │                     refetch user ──► SetUser(authoritative)     │
//! │       ▼                                                                 │
//! │  the store never keeps a list the remote store does not have           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use tracing::{debug, info, warn};

use storefront_core::{Address, User};

use crate::error::{AppError, AppResult};
use crate::forms::{AddressForm, ProfileForm};
use crate::state::Action;
use crate::Storefront;

/// Adds an address to the signed-in user.
///
/// The id and creation time come from the remote store, so the store is
/// updated once the write returns. A failed write re-syncs the user.
pub async fn add_address(app: &Storefront, form: &AddressForm) -> AppResult<Address> {
    let _ticket = app.address_submit.begin()?;
    let session = app.require_session()?;
    let new_address = form
        .validate()
        .map_err(|errors| AppError::validation(errors.to_string()))?;
    debug!(uid = %session.uid, "add_address command");

    match app.remote.add_address(&session.uid, new_address).await {
        Ok(address) => {
            app.store.dispatch(Action::AddressAdded(address.clone()));
            app.notifier.success("Address added successfully");
            Ok(address)
        }
        Err(e) => {
            let err = app.report("Error adding address: ", e.into());
            resync_user(app, &session.uid).await;
            Err(err)
        }
    }
}

/// Removes an address, updating the store before the remote call.
pub async fn remove_address(app: &Storefront, address_id: &str) -> AppResult<()> {
    let session = app.require_session()?;
    debug!(uid = %session.uid, address_id = %address_id, "remove_address command");

    app.store
        .dispatch(Action::AddressRemoved(address_id.to_string()));

    match app.remote.remove_address(&session.uid, address_id).await {
        Ok(()) => {
            app.notifier.success("Address removed successfully");
            Ok(())
        }
        Err(e) => {
            let err = AppError::from(e);
            warn!(address_id = %address_id, error = %err, "Address removal failed, reverting");
            app.notifier.error("Failed to delete address");
            resync_user(app, &session.uid).await;
            Err(err)
        }
    }
}

/// Writes display name and phone. A display name change is also pushed to
/// the auth provider.
pub async fn update_profile(app: &Storefront, form: &ProfileForm) -> AppResult<User> {
    let start = Instant::now();
    let session = app.require_session()?;
    let update = form.validate()?;
    debug!(uid = %session.uid, "update_profile command");

    let result: AppResult<User> = async {
        let user = app.remote.update_profile(&session.uid, &update).await?;
        if let Some(name) = &update.display_name {
            app.auth.update_display_name(&session.uid, name).await?;
        }
        Ok(user)
    }
    .await;

    let user = result.map_err(|e| app.report("", e))?;
    app.store.dispatch(Action::SetUser(Some(user.clone())));
    app.notifier.success("Profile updated successfully");
    info!(
        uid = %user.uid,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Profile updated"
    );
    Ok(user)
}

/// Replaces the store's user with the remote copy.
async fn resync_user(app: &Storefront, uid: &str) {
    match app.remote.fetch_user(uid).await {
        Ok(user) => app.store.dispatch(Action::SetUser(user)),
        Err(e) => {
            // Keep the optimistic copy but mark it stale
            warn!(uid = %uid, error = %e, "Failed to refetch user");
            app.store.dispatch(Action::UserFailed(AppError::from(e).message));
        }
    }
}
