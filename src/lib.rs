pub mod api;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod protocol;
pub mod store;

// Shared context for one viewing session: built once at startup and passed
// to every component that needs it. Identity and session are never read
// from ambient globals.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub config: config::Config,
    pub identity: models::UserIdentity,
    pub session_id: String,
}

impl SyncContext {
    pub fn new(
        config: config::Config,
        identity: models::UserIdentity,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            config,
            identity,
            session_id: session_id.into(),
        }
    }
}
