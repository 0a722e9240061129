//! # Auth Commands
//!
//! ## Sign-in Outcomes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command            auth provider          user document                │
//! │  ───────            ─────────────          ─────────────                │
//! │  sign_up            new account            created (role = user)        │
//! │  sign_in            password checked       lastLogin merged             │
//! │  sign_in_federated  account on first use   created when missing         │
//! │  restore_session    token verified         re-read                      │
//! │  sign_out           session cleared        store: user + cart cleared   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use storefront_core::User;

use crate::error::{AppError, AppResult};
use crate::forms::{ForgotPasswordForm, SignInForm, SignUpForm};
use crate::remote::{FederatedIdentity, Session};
use crate::state::Action;
use crate::Storefront;

pub const RESET_MAIL_SENT: &str = "Check your inbox for the password reset link.";

/// Registers an account and its profile document.
pub async fn sign_up(app: &Storefront, form: &SignUpForm) -> AppResult<User> {
    let input = form.validate()?;
    debug!(email = %input.email, "sign_up command");

    let result: AppResult<User> = async {
        let session = app
            .auth
            .sign_up(&input.email, &input.password, Some(&input.display_name))
            .await?;
        let user = User::new(
            session.uid,
            session.email,
            Some(input.display_name.clone()),
            session.photo_url,
            Utc::now(),
        );
        app.remote.create_user(&user).await?;
        Ok(user)
    }
    .await;

    let user = result.map_err(|e| app.report("", e))?;
    app.store.dispatch(Action::SetUser(Some(user.clone())));
    app.store.dispatch(Action::CartLoaded(Vec::new()));
    app.notifier.success("Registered successfully");
    info!(uid = %user.uid, "User registered");
    Ok(user)
}

pub async fn sign_in(app: &Storefront, form: &SignInForm) -> AppResult<User> {
    let (email, password) = form.validate()?;
    debug!(email = %email, "sign_in command");

    let result: AppResult<User> = async {
        let session = app.auth.sign_in(&email, &password).await?;
        // Accounts created before profiles existed get one now
        app.remote.ensure_user(&user_from_session(&session)).await?;
        app.remote.touch_last_login(&session.uid).await?;
        load_user(app, &session.uid).await
    }
    .await;

    let user = result.map_err(|e| app.report("", e))?;
    app.notifier.success("Logged in successfully");
    Ok(user)
}

/// Signs in with an external identity, creating the profile on first use.
pub async fn sign_in_federated(app: &Storefront, identity: &FederatedIdentity) -> AppResult<User> {
    debug!(provider = %identity.provider, "sign_in_federated command");

    let result: AppResult<User> = async {
        let session = app.auth.sign_in_federated(identity).await?;
        let created = app.remote.ensure_user(&user_from_session(&session)).await?;
        if !created {
            app.remote.touch_last_login(&session.uid).await?;
        }
        load_user(app, &session.uid).await
    }
    .await;

    let user = result.map_err(|e| app.report("", e))?;
    app.notifier.success("Logged in successfully");
    Ok(user)
}

pub async fn sign_out(app: &Storefront) -> AppResult<()> {
    debug!("sign_out command");
    app.auth.sign_out().await.map_err(|e| app.report("", e.into()))?;
    app.store.dispatch(Action::SignedOut);
    Ok(())
}

pub async fn forgot_password(app: &Storefront, form: &ForgotPasswordForm) -> AppResult<()> {
    let email = form.validate()?;
    app.auth
        .send_password_reset(&email)
        .await
        .map_err(|e| app.report("", e.into()))?;

    app.notifier.success(RESET_MAIL_SENT);
    Ok(())
}

pub async fn reset_password(app: &Storefront, token: &str, new_password: &str) -> AppResult<()> {
    app.auth
        .confirm_password_reset(token, new_password)
        .await
        .map_err(|e| app.report("", e.into()))?;

    app.notifier.success("Password updated. You can sign in now.");
    Ok(())
}

/// Resumes a stored session. Resolves the auth state either way, so the
/// user slice stops loading.
pub async fn restore_session(app: &Storefront, token: Option<&str>) -> AppResult<Option<User>> {
    let session = match token {
        Some(token) => app.auth.restore(token).await?,
        None => None,
    };

    match session {
        Some(session) => load_user(app, &session.uid).await.map(Some),
        None => {
            app.store.dispatch(Action::SetUser(None));
            Ok(None)
        }
    }
}

/// Mirrors the signed-in user's document into the store until the
/// session ends or changes hands.
pub async fn mirror_user(app: &Storefront, uid: &str) -> AppResult<JoinHandle<()>> {
    let mut updates = app.remote.watch_user(uid).await?;
    let app = app.clone();
    let uid = uid.to_string();

    Ok(tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let still_signed_in = app
                .auth
                .current_session()
                .is_some_and(|session| session.uid == uid);
            if !still_signed_in {
                break;
            }
            let user = updates.borrow_and_update().clone();
            app.store.dispatch(Action::SetUser(user));
        }
        debug!(uid = %uid, "User mirror stopped");
    }))
}

/// Reads the profile and cart into the store.
async fn load_user(app: &Storefront, uid: &str) -> AppResult<User> {
    let user = app
        .remote
        .fetch_user(uid)
        .await?
        .ok_or_else(|| AppError::not_found("User", uid))?;
    let cart = app.remote.fetch_cart(uid).await?;

    app.store.dispatch(Action::SetUser(Some(user.clone())));
    app.store.dispatch(Action::CartLoaded(cart));
    Ok(user)
}

fn user_from_session(session: &Session) -> User {
    User::new(
        session.uid.clone(),
        session.email.clone(),
        session.display_name.clone(),
        session.photo_url.clone(),
        Utc::now(),
    )
}
