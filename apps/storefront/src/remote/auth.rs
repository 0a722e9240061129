//! # Local Auth Provider
//!
//! [`AuthProvider`] over the `accounts` table: argon2 password hashes and
//! HS256 session tokens.
//!
//! ## Session Lifecycle
//! ```text
//! sign_up / sign_in / sign_in_federated
//!      │
//!      ▼
//! issue token (sub = uid, exp = now + ttl) ──► current session ──► auth_state()
//!      │                                                              ▲
//!      ▼                                                              │
//! restore(token) on next start ── expired / bad signature → None      │
//!                                                                     │
//! sign_out ─────────────────────────────────────────► None ──────────┘
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use storefront_core::validation::{validate_display_name, validate_email, validate_password};
use storefront_db::{Account, Database, DbError, PASSWORD_PROVIDER};

use super::{AuthProvider, FederatedIdentity, RemoteError, RemoteResult, Session};

/// Collection that outgoing mail is queued in.
pub const MAIL_COLLECTION: &str = "mail";

/// How long a password reset link stays valid.
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

const SESSION_TOKEN_TYPE: &str = "session";

// =============================================================================
// Session Tokens
// =============================================================================

/// JWT claims of a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (uid)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Unique identifier for this token
    pub jti: String,

    pub token_type: String,
}

/// Issues and verifies session tokens.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    secret: String,
    lifetime_secs: i64,
}

impl SessionTokens {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        SessionTokens {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Returns the token and its expiry.
    pub fn issue(&self, uid: &str) -> RemoteResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: uid.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: SESSION_TOKEN_TYPE.to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| RemoteError::Session(format!("Failed to generate token: {}", e)))?;

        Ok((token, exp))
    }

    /// Decodes a token, checking signature, expiry and type.
    pub fn verify(&self, token: &str) -> RemoteResult<Claims> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| RemoteError::Session(format!("Invalid token: {}", e)))?
        .claims;

        if claims.token_type != SESSION_TOKEN_TYPE {
            return Err(RemoteError::Session("Expected session token".to_string()));
        }
        Ok(claims)
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

fn hash_password(password: &str) -> RemoteResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| RemoteError::Session(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// LocalAuth
// =============================================================================

#[derive(Debug)]
pub struct LocalAuth {
    db: Database,
    tokens: SessionTokens,
    /// Base URL that reset links point at.
    reset_link_base: String,
    current: watch::Sender<Option<Session>>,
}

impl LocalAuth {
    pub fn new(db: Database, tokens: SessionTokens, reset_link_base: impl Into<String>) -> Self {
        let (current, _) = watch::channel(None);
        LocalAuth {
            db,
            tokens,
            reset_link_base: reset_link_base.into(),
            current,
        }
    }

    fn start_session(&self, account: &Account) -> RemoteResult<Session> {
        let (token, expires_at) = self.tokens.issue(&account.uid)?;
        let session = Session {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            token,
            expires_at,
        };

        self.current.send_replace(Some(session.clone()));
        info!(uid = %session.uid, "Session started");
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> RemoteResult<Session> {
        let email = validate_email(email)?;
        validate_password(password)?;
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .map(validate_display_name)
            .transpose()?;

        let now = Utc::now();
        let account = Account {
            uid: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash: Some(hash_password(password)?),
            provider: PASSWORD_PROVIDER.to_string(),
            display_name,
            photo_url: None,
            created_at: now,
            last_login_at: Some(now),
        };

        match self.db.accounts().insert(&account).await {
            Ok(()) => {}
            Err(DbError::UniqueViolation { .. }) => return Err(RemoteError::EmailInUse(email)),
            Err(e) => return Err(e.into()),
        }

        self.start_session(&account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<Session> {
        let accounts = self.db.accounts();
        let account = accounts
            .get_by_email(email.trim())
            .await?
            .ok_or(RemoteError::InvalidCredentials)?;

        let hash = account
            .password_hash
            .as_deref()
            .ok_or(RemoteError::InvalidCredentials)?;
        if !verify_password(password, hash) {
            debug!(uid = %account.uid, "Password mismatch");
            return Err(RemoteError::InvalidCredentials);
        }

        accounts.touch_last_login(&account.uid, Utc::now()).await?;
        self.start_session(&account)
    }

    async fn sign_in_federated(&self, identity: &FederatedIdentity) -> RemoteResult<Session> {
        let email = validate_email(&identity.email)?;
        let accounts = self.db.accounts();
        let now = Utc::now();

        let account = match accounts.get_by_email(&email).await? {
            Some(existing) => {
                accounts.touch_last_login(&existing.uid, now).await?;
                existing
            }
            None => {
                let account = Account {
                    uid: Uuid::new_v4().to_string(),
                    email,
                    password_hash: None,
                    provider: identity.provider.clone(),
                    display_name: identity.display_name.clone(),
                    photo_url: identity.photo_url.clone(),
                    created_at: now,
                    last_login_at: Some(now),
                };
                accounts.insert(&account).await?;
                info!(uid = %account.uid, provider = %account.provider, "Federated account created");
                account
            }
        };

        self.start_session(&account)
    }

    async fn sign_out(&self) -> RemoteResult<()> {
        if let Some(session) = self.current.send_replace(None) {
            info!(uid = %session.uid, "Signed out");
        }
        Ok(())
    }

    async fn restore(&self, token: &str) -> RemoteResult<Option<Session>> {
        let claims = match self.tokens.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Stored session rejected");
                return Ok(None);
            }
        };

        let Some(account) = self.db.accounts().get_by_uid(&claims.sub).await? else {
            warn!(uid = %claims.sub, "Session for a deleted account");
            return Ok(None);
        };

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| RemoteError::Session("Invalid expiry".to_string()))?;

        let session = Session {
            uid: account.uid,
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
            token: token.to_string(),
            expires_at,
        };
        self.current.send_replace(Some(session.clone()));
        debug!(uid = %session.uid, "Session restored");
        Ok(Some(session))
    }

    fn current_session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    fn auth_state(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    async fn update_display_name(&self, uid: &str, display_name: &str) -> RemoteResult<()> {
        self.db
            .accounts()
            .update_display_name(uid, display_name)
            .await?;

        self.current.send_if_modified(|current| match current {
            Some(session) if session.uid == uid => {
                session.display_name = Some(display_name.to_string());
                true
            }
            _ => false,
        });
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> RemoteResult<()> {
        let email = validate_email(email)?;
        let Some(account) = self.db.accounts().get_by_email(&email).await? else {
            debug!("Password reset requested for an unknown email");
            return Ok(());
        };

        let now = Utc::now();
        let token = Uuid::new_v4().simple().to_string();
        let expires_at = now + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.db
            .accounts()
            .create_reset(&token, &account.uid, expires_at)
            .await?;

        let link = format!("{}?token={}", self.reset_link_base, token);
        let mail = json!({
            "to": account.email,
            "message": {
                "subject": "Reset your password",
                "text": format!("Follow this link to reset your password: {link}"),
            },
            "createdAt": now,
        });
        self.db
            .documents(MAIL_COLLECTION)
            .insert(&Uuid::new_v4().to_string(), &mail)
            .await?;

        info!(uid = %account.uid, "Password reset mail queued");
        Ok(())
    }

    async fn confirm_password_reset(&self, token: &str, new_password: &str) -> RemoteResult<()> {
        validate_password(new_password)?;

        let uid = self
            .db
            .accounts()
            .consume_reset(token, Utc::now())
            .await?
            .ok_or(RemoteError::InvalidResetToken)?;

        let hash = hash_password(new_password)?;
        self.db.accounts().set_password_hash(&uid, &hash).await?;

        info!(uid = %uid, "Password reset");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
