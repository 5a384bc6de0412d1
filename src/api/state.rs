//! Application state for shared services

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::tasks::KbTaskService;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub tasks: Arc<dyn KbTaskService>,
    /// Directory where uploads are staged before ingestion
    pub staging_dir: PathBuf,
}

impl AppState {
    pub fn new(tasks: Arc<dyn KbTaskService>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            tasks,
            staging_dir: staging_dir.into(),
        }
    }
}
