//! # Forms
//!
//! Form state as typed, plain strings go in, validated payloads come out.
//! Nothing here touches the network except the address form's PIN code
//! autofill, which goes through [`crate::remote::PostalLookup`].
//!
//! ```text
//! raw input ──► XxxForm::set_*() ──► XxxForm::validate() ──► payload ──► commands
//!                  │                       │
//!                  └─ derived fields        └─ field errors block submission
//! ```

pub mod address;
pub mod auth;
pub mod product;
pub mod profile;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use address::{AddressForm, FieldErrors, PincodeLookup};
pub use auth::{ForgotPasswordForm, SignInForm, SignUpForm};
pub use product::{DiscountMode, ProductForm};
pub use profile::ProfileForm;

use crate::error::{AppError, AppResult};

/// Rejects a second submission while one is in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmitFlag {
    busy: Arc<AtomicBool>,
}

impl SubmitFlag {
    /// Marks the form as submitting until the ticket is dropped.
    pub fn begin(&self) -> AppResult<SubmitTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::busy())?;

        Ok(SubmitTicket {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_submitting(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one submission.
#[derive(Debug)]
pub struct SubmitTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
