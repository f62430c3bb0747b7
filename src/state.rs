use crate::db::Db;
use crate::locks::IdLocks;
use std::time::Duration;

/// Shared by every worker of the HTTP server.
pub struct AppState {
    pub db: Db,
    pub locks: IdLocks,
    pub grading_timeout: Duration,
}

impl AppState {
    pub fn new(db: Db, grading_timeout: Duration) -> Self {
        AppState {
            db,
            locks: IdLocks::new(),
            grading_timeout,
        }
    }
}
