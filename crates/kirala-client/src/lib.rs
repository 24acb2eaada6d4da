//! # kirala-client
//!
//! Application layer of the Oyna-Kirala marketplace: the session context,
//! the identity-provider contract, and one module per screen's worth of
//! behaviour (catalog, listing editor, rental lifecycle, messaging,
//! profile, friends, settings).
//!
//! Every command locks the shared [`state::AppState`], performs its store
//! transaction and returns; real-time views subscribe to the store's change
//! events and re-query on each one.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod friends;
pub mod listing;
pub mod messaging;
pub mod profile;
pub mod rental;
pub mod session;
pub mod settings;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::{AppConfig, CompletionPolicy};
pub use session::{Session, SessionEvent, SessionState};
pub use state::{AppState, SharedState};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default directive.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kirala_client=debug,kirala_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
