//! Application state shared across all commands.
//!
//! The [`AppState`] struct is wrapped in `Arc<Mutex<>>`; every command
//! locks it, works, and releases before any `await` on media I/O.

use std::sync::{Arc, Mutex, MutexGuard};

use kirala_store::{Database, MediaStore};

use crate::auth::provider::IdentityProvider;
use crate::config::AppConfig;
use crate::session::{Session, SessionContext};

pub type SharedState = Arc<Mutex<AppState>>;

/// Central application state.
pub struct AppState {
    /// Static configuration, read once at startup.
    pub config: AppConfig,

    /// Current session plus its event stream.
    pub session: SessionContext,

    /// Handle to the marketplace document store.
    pub database: Database,

    /// File-backed image storage.  Cheap to clone out of the lock for
    /// async uploads.
    pub media: MediaStore,

    /// The identity provider behind the auth commands.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Open the store and media directories and assemble the shared state.
    pub async fn bootstrap(
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<SharedState> {
        let database = match &config.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Database::open_at(&dir.join("kirala.db"))?
            }
            None => Database::new()?,
        };

        let media = MediaStore::new(config.blob_dir.clone(), config.max_image_bytes).await?;

        Ok(Arc::new(Mutex::new(Self {
            config,
            session: SessionContext::new(),
            database,
            media,
            identity,
        })))
    }

    /// The signed-in session, cloned out of the context.
    pub(crate) fn current_session(&self) -> Option<Session> {
        self.session.current().cloned()
    }
}

/// Lock the shared state, recovering from poisoning.
///
/// The store's own transactions keep the data consistent even if a holder
/// panicked mid-command, so continuing is safe.
pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
