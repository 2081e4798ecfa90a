use serde::Serialize;

use crate::content::edit_mode::EditContext;
use crate::content::store::{ListStore, PersistOutcome};
use crate::content::Section;

/// Mutation controls a client may show for a section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Affordances {
    pub can_add: bool,
    pub can_delete: bool,
    pub can_edit_fields: bool,
    pub can_edit_progress: bool,
}

impl Affordances {
    pub fn for_mode(is_edit_mode: bool, has_progress: bool) -> Self {
        Self {
            can_add: is_edit_mode,
            can_delete: is_edit_mode,
            can_edit_fields: is_edit_mode,
            can_edit_progress: is_edit_mode && has_progress,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView<R> {
    pub storage_key: String,
    pub records: Vec<R>,
    pub affordances: Affordances,
}

pub fn render_section<R: Section>(store: &ListStore<R>, ctx: &dyn EditContext) -> SectionView<R> {
    SectionView {
        storage_key: store.storage_key().to_string(),
        records: store.records().to_vec(),
        affordances: Affordances::for_mode(ctx.is_edit_mode(), R::HAS_PROGRESS),
    }
}

/// Response to any add/delete/update: the re-rendered section plus what the
/// persist pipeline did with it.
#[derive(Debug, Clone, Serialize)]
pub struct MutationView<R> {
    pub section: SectionView<R>,
    /// Id the mutation targeted (or created).
    pub id: Option<String>,
    pub changed: bool,
    pub persist: PersistOutcome,
    /// Validation message for the owner, when persist was rejected.
    pub notice: Option<String>,
}

impl<R: Section> MutationView<R> {
    pub fn new(
        store: &ListStore<R>,
        ctx: &dyn EditContext,
        id: Option<String>,
        changed: bool,
        persist: PersistOutcome,
    ) -> Self {
        Self {
            section: render_section(store, ctx),
            id,
            changed,
            notice: persist.notice().map(str::to_string),
            persist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_mode_hides_everything() {
        let a = Affordances::for_mode(false, true);
        assert!(!a.can_add && !a.can_delete && !a.can_edit_fields && !a.can_edit_progress);
    }

    #[test]
    fn test_progress_input_only_for_progress_sections() {
        assert!(Affordances::for_mode(true, true).can_edit_progress);
        let plain = Affordances::for_mode(true, false);
        assert!(plain.can_add && plain.can_delete && plain.can_edit_fields);
        assert!(!plain.can_edit_progress);
    }
}
