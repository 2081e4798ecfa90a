// Editable portfolio content.
// Implements: record validation, persisted list stores, edit-mode session,
// durable storage, content sync and the HTTP bindings for each section.

pub mod catalog;
pub mod edit_mode;
pub mod handlers;
pub mod records;
pub mod storage;
pub mod store;
pub mod sync;
pub mod validation;
pub mod view;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::content::records::{Certification, ListRecord, SkillCategory, TechItem, TrainingItem};
use crate::content::storage::ContentStorage;
use crate::content::store::ListStore;
use crate::content::sync::ContentSync;

/// Every editable section of the skills page, one store per storage key.
///
/// Each store sits behind its own lock, so mutations of one collection are
/// strictly ordered while different collections proceed independently.
pub struct Portfolio {
    pub skill_categories: Mutex<ListStore<SkillCategory>>,
    pub tech_stack: Mutex<ListStore<TechItem>>,
    pub certifications: Mutex<ListStore<Certification>>,
    pub training: Mutex<ListStore<TrainingItem>>,
}

impl Portfolio {
    pub async fn load(storage: Arc<dyn ContentStorage>, sync: Arc<dyn ContentSync>) -> Self {
        Self {
            skill_categories: Mutex::new(
                ListStore::load(
                    catalog::SKILL_CATEGORIES_KEY,
                    catalog::default_skill_categories(),
                    storage.clone(),
                    sync.clone(),
                )
                .await,
            ),
            tech_stack: Mutex::new(
                ListStore::load(
                    catalog::TECH_STACK_KEY,
                    catalog::default_tech_stack(),
                    storage.clone(),
                    sync.clone(),
                )
                .await,
            ),
            certifications: Mutex::new(
                ListStore::load(
                    catalog::CERTIFICATIONS_KEY,
                    catalog::default_certifications(),
                    storage.clone(),
                    sync.clone(),
                )
                .await,
            ),
            training: Mutex::new(
                ListStore::load(
                    catalog::TRAINING_KEY,
                    catalog::default_training(),
                    storage,
                    sync,
                )
                .await,
            ),
        }
    }
}

/// A record type that has a section of its own on the page.
pub trait Section: ListRecord {
    /// Whether records carry a 0 – 100 slider edited through a number input.
    const HAS_PROGRESS: bool;

    fn store(portfolio: &Portfolio) -> &Mutex<ListStore<Self>>;
}

impl Section for SkillCategory {
    const HAS_PROGRESS: bool = true;

    fn store(portfolio: &Portfolio) -> &Mutex<ListStore<Self>> {
        &portfolio.skill_categories
    }
}

impl Section for TechItem {
    const HAS_PROGRESS: bool = false;

    fn store(portfolio: &Portfolio) -> &Mutex<ListStore<Self>> {
        &portfolio.tech_stack
    }
}

impl Section for Certification {
    const HAS_PROGRESS: bool = false;

    fn store(portfolio: &Portfolio) -> &Mutex<ListStore<Self>> {
        &portfolio.certifications
    }
}

impl Section for TrainingItem {
    const HAS_PROGRESS: bool = true;

    fn store(portfolio: &Portfolio) -> &Mutex<ListStore<Self>> {
        &portfolio.training
    }
}
