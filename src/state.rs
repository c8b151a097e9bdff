use crate::config::Config;
use crate::report::ReportBundle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Bundles are kept in memory, keyed by report id. Each submission produces
/// exactly one bundle; the follow-up download routes look it up by id.
pub struct AppState {
    pub config: Arc<Config>,
    pub reports: RwLock<HashMap<String, ReportBundle>>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            reports: RwLock::new(HashMap::new()),
        }
    }
}
