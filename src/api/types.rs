//! Shared state for the API layer.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::lookup::LookupPipeline;

/// Shared context for all API routes.
///
/// SQLite connections are `Send` but not `Sync`, so the single registry
/// connection sits behind a mutex; handlers hold it only for the
/// duration of one repository call sequence. The lookup pipeline itself
/// is stateless and copied freely.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
    pub pipeline: LookupPipeline,
}

impl ApiContext {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            pipeline: LookupPipeline::default(),
        }
    }

    /// Lock the registry connection for one handler's work.
    pub fn db(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}
