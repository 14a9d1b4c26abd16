use std::sync::Arc;

use crate::config::Settings;
use crate::db::Database;

/// Shared handler state. Settings are loaded once and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}
