//! Edit-mode state for the owner's editing session.
//!
//! One `EditSession` lives in `AppState` for the lifetime of the server and is
//! handed to every store operation by reference.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

/// Notices kept until the owner drains them; older ones are dropped first.
pub const MAX_PENDING_NOTICES: usize = 50;

/// What the list stores need from the surrounding edit session.
pub trait EditContext: Send + Sync {
    fn is_edit_mode(&self) -> bool;
    fn set_has_unsaved_changes(&self, value: bool);
    /// Surfaces a human-readable message to the owner (the toast channel).
    fn notify(&self, message: String);
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EditStatus {
    pub is_edit_mode: bool,
    pub has_unsaved_changes: bool,
    pub pending_notices: usize,
}

#[derive(Debug, Default)]
pub struct EditSession {
    edit_mode: AtomicBool,
    unsaved: AtomicBool,
    notices: Mutex<VecDeque<String>>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_edit_mode(&self, enabled: bool) {
        let was = self.edit_mode.swap(enabled, Ordering::SeqCst);
        if was != enabled {
            info!("Edit mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved.load(Ordering::SeqCst)
    }

    /// Returns and clears every queued notice, oldest first.
    pub fn drain_notices(&self) -> Vec<String> {
        match self.notices.lock() {
            Ok(mut notices) => notices.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    pub fn status(&self) -> EditStatus {
        let pending_notices = match self.notices.lock() {
            Ok(notices) => notices.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        };
        EditStatus {
            is_edit_mode: self.is_edit_mode(),
            has_unsaved_changes: self.has_unsaved_changes(),
            pending_notices,
        }
    }
}

impl EditContext for EditSession {
    fn is_edit_mode(&self) -> bool {
        self.edit_mode.load(Ordering::SeqCst)
    }

    fn set_has_unsaved_changes(&self, value: bool) {
        self.unsaved.store(value, Ordering::SeqCst);
    }

    fn notify(&self, message: String) {
        let mut notices = match self.notices.lock() {
            Ok(notices) => notices,
            Err(poisoned) => poisoned.into_inner(),
        };
        if notices.len() >= MAX_PENDING_NOTICES {
            notices.pop_front();
            warn!("Notice queue full; dropped the oldest notice");
        }
        notices.push_back(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_read_only_and_clean() {
        let session = EditSession::new();
        assert_eq!(
            session.status(),
            EditStatus {
                is_edit_mode: false,
                has_unsaved_changes: false,
                pending_notices: 0,
            }
        );
    }

    #[test]
    fn test_toggle_and_unsaved_flag() {
        let session = EditSession::new();
        session.set_edit_mode(true);
        session.set_has_unsaved_changes(true);
        assert!(session.is_edit_mode());
        assert!(session.has_unsaved_changes());
        session.set_edit_mode(false);
        assert!(!session.is_edit_mode());
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn test_notices_drain_in_order() {
        let session = EditSession::new();
        session.notify("first".to_string());
        session.notify("second".to_string());
        assert_eq!(session.status().pending_notices, 2);
        assert_eq!(session.drain_notices(), vec!["first", "second"]);
        assert!(session.drain_notices().is_empty());
    }

    #[test]
    fn test_notice_queue_keeps_most_recent() {
        let session = EditSession::new();
        for i in 0..MAX_PENDING_NOTICES + 5 {
            session.notify(format!("notice {i}"));
        }
        assert_eq!(session.status().pending_notices, MAX_PENDING_NOTICES);

        let notices = session.drain_notices();
        assert_eq!(notices.len(), MAX_PENDING_NOTICES);
        assert_eq!(notices[0], "notice 5");
        assert_eq!(
            notices.last().map(String::as_str),
            Some(format!("notice {}", MAX_PENDING_NOTICES + 4).as_str())
        );
    }
}
