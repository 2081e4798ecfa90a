use std::sync::Arc;

use crate::config::Config;
use crate::content::edit_mode::EditSession;
use crate::content::Portfolio;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One persisted list store per page section.
    pub portfolio: Arc<Portfolio>,
    /// Owner's edit session: edit-mode flag, unsaved-changes flag, notices.
    pub session: Arc<EditSession>,
    pub config: Config,
}
