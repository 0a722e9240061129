//! # Storefront Library
//!
//! Core library for the storefront application. The binary in `main.rs`
//! is a thin clap front end over this crate.
//!
//! ## Module Organization
//! ```text
//! storefront_lib/
//! ├── lib.rs          ◄─── You are here (startup wiring)
//! ├── cli.rs          ◄─── clap subcommands
//! ├── context.rs      ◄─── Storefront: config + store + remote seams
//! ├── state/
//! │   ├── store.rs    ◄─── AppState, Action, Store (global state)
//! │   ├── user.rs     ◄─── User slice
//! │   ├── catalog.rs  ◄─── Catalog slice (sequence-numbered loads)
//! │   ├── cart.rs     ◄─── Cart slice and totals
//! │   └── config.rs   ◄─── Configuration state
//! ├── remote/         ◄─── RemoteStore, AuthProvider, ImageHost, PostalLookup
//! ├── forms/          ◄─── Sign-in/up, address, profile, product forms
//! ├── commands/       ◄─── Operations the front end invokes
//! ├── views/          ◄─── Routes and plain-text pages
//! ├── notify.rs       ◄─── Transient success/error notifications
//! └── error.rs        ◄─── AppError for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()           EnvFilter, RUST_LOG overrides              │
//! │  2. ConfigState::load()      defaults → storefront.toml → STOREFRONT_*  │
//! │  3. open_database()          SQLite (WAL), migrations                   │
//! │  4. build_storefront()       LocalStore, LocalAuth, Cloudinary, India  │
//! │                              Post behind their traits                   │
//! │  5. restore_session()        token file in the data dir, if any        │
//! │  6. load_catalog()           then the subcommand runs                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod forms;
pub mod notify;
pub mod remote;
pub mod state;
pub mod views;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use storefront_db::{Database, DbConfig};

pub use context::Storefront;
pub use error::{AppError, AppResult, ErrorCode};

use remote::{CloudinaryHost, IndiaPostClient, LocalAuth, LocalStore, SessionTokens};
use state::ConfigState;

const DATABASE_FILE: &str = "storefront.db";
const SESSION_FILE: &str = "session.token";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront=trace` - Trace for the app only
/// - Default: INFO, DEBUG for the app, WARN for sqlx
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,storefront_lib=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Platform data directory, created on first use.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.storefront.app/`
/// - **Windows**: `%APPDATA%\storefront\app\data\`
/// - **Linux**: `~/.local/share/app/`
///
/// ## Development Override
/// Set `STOREFRONT_DATA_DIR` to use a custom directory.
pub fn get_data_dir() -> AppResult<PathBuf> {
    let dir = match std::env::var("STOREFRONT_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => ProjectDirs::from("com", "storefront", "app")
            .ok_or_else(|| AppError::internal("Could not determine app data directory"))?
            .data_dir()
            .to_path_buf(),
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| AppError::internal(format!("Could not create {}: {}", dir.display(), e)))?;
    Ok(dir)
}

/// Connects to the configured database, or `storefront.db` in the data
/// dir, and applies migrations.
pub async fn open_database(config: &ConfigState, data_dir: &Path) -> AppResult<Database> {
    let path = config
        .database_path
        .clone()
        .unwrap_or_else(|| data_dir.join(DATABASE_FILE));
    info!(?path, "Database path determined");

    let db = Database::new(DbConfig::new(path)).await?;
    info!("Database connected and migrations applied");
    Ok(db)
}

/// Wires the local document store and auth plus the HTTP services behind
/// their traits.
pub fn build_storefront(config: ConfigState, db: Database) -> Storefront {
    let tokens = SessionTokens::new(config.session_secret.clone(), config.session_ttl_secs);
    let remote = Arc::new(LocalStore::new(db.clone()));
    let auth = Arc::new(LocalAuth::new(db, tokens, config.reset_link_base.clone()));

    if !config.image_host.is_configured() {
        warn!("Image host is not configured; product uploads will fail");
    }
    let images = Arc::new(CloudinaryHost::new(
        config.image_host.upload_url(),
        config.image_host.upload_preset.clone(),
    ));
    let postal = Arc::new(IndiaPostClient::new(config.postal_endpoint.clone()));

    Storefront::new(config, remote, auth, images, postal)
}

// =============================================================================
// Session Token File
// =============================================================================

fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

/// The token saved by the last sign-in, if any.
pub fn read_session_token(data_dir: &Path) -> Option<String> {
    let token = std::fs::read_to_string(session_path(data_dir)).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub fn write_session_token(data_dir: &Path, token: &str) -> AppResult<()> {
    std::fs::write(session_path(data_dir), token)
        .map_err(|e| AppError::internal(format!("Could not save session: {}", e)))?;
    debug!("Session token saved");
    Ok(())
}

pub fn remove_session_token(data_dir: &Path) -> AppResult<()> {
    match std::fs::remove_file(session_path(data_dir)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::internal(format!("Could not remove session: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("storefront-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_session_token_file_lifecycle() {
        let dir = temp_dir("session");
        assert_eq!(read_session_token(&dir), None);

        write_session_token(&dir, "abc.def\n").unwrap();
        assert_eq!(read_session_token(&dir).as_deref(), Some("abc.def"));

        remove_session_token(&dir).unwrap();
        remove_session_token(&dir).unwrap();
        assert_eq!(read_session_token(&dir), None);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_build_storefront_over_local_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = build_storefront(ConfigState::default(), db);

        assert!(app.require_session().is_err());
        assert_eq!(commands::catalog::load_catalog(&app).await.unwrap(), 0);
    }
}
