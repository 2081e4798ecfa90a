//! Persisted List Store — one ordered, editable collection per storage key.
//!
//! Every mutation runs the same pipeline synchronously before returning:
//! mutate in memory → validate the whole collection → write durable storage →
//! hand the payload to the sync collaborator. A validation failure leaves
//! durable storage untouched and surfaces exactly one notice; the in-memory
//! collection keeps the offending edit so the owner can correct it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::content::edit_mode::EditContext;
use crate::content::records::{
    FieldError, FieldValue, ListRecord, Skill, SkillCategory, SkillSeed,
};
use crate::content::storage::ContentStorage;
use crate::content::sync::ContentSync;
use crate::errors::AppError;

/// Result of one run of the persist pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistOutcome {
    Persisted,
    /// Empty collections are never written; the previous payload stays.
    SkippedEmpty,
    Rejected { notice: String },
}

impl PersistOutcome {
    pub fn notice(&self) -> Option<&str> {
        match self {
            PersistOutcome::Rejected { notice } => Some(notice),
            _ => None,
        }
    }
}

pub struct ListStore<R: ListRecord> {
    storage_key: String,
    seeds: Vec<R::Seed>,
    records: Vec<R>,
    storage: Arc<dyn ContentStorage>,
    sync: Arc<dyn ContentSync>,
    /// Highest timestamp handed out as an id; ids are never issued twice.
    last_issued_millis: i64,
}

/// Builds seed records with index-based ids (`cert_0`, `cert_1`, …).
pub fn seed_records<R: ListRecord>(seeds: &[R::Seed]) -> Vec<R> {
    seeds
        .iter()
        .cloned()
        .enumerate()
        .map(|(idx, seed)| R::from_seed(format!("{}_{idx}", R::ID_PREFIX), seed))
        .collect()
}

fn has_unique_ids<R: ListRecord>(records: &[R]) -> bool {
    let mut seen = HashSet::new();
    records.iter().all(|r| seen.insert(r.id()))
}

impl<R: ListRecord> ListStore<R> {
    /// Materializes the collection from durable storage, falling back to
    /// `seeds` when nothing usable is stored. Never fails.
    pub async fn load(
        storage_key: &str,
        seeds: Vec<R::Seed>,
        storage: Arc<dyn ContentStorage>,
        sync: Arc<dyn ContentSync>,
    ) -> Self {
        let stored = match storage.read(storage_key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Reading '{storage_key}' failed, using defaults: {e}");
                None
            }
        };

        let records = match stored {
            Some(raw) => match serde_json::from_str::<Vec<R>>(&raw) {
                Ok(records) if has_unique_ids(&records) => {
                    debug!("Loaded {} records from '{storage_key}'", records.len());
                    records
                }
                Ok(_) => {
                    warn!("Stored '{storage_key}' has duplicate ids, using defaults");
                    seed_records::<R>(&seeds)
                }
                Err(e) => {
                    warn!("Stored '{storage_key}' is unparseable, using defaults: {e}");
                    seed_records::<R>(&seeds)
                }
            },
            None => seed_records::<R>(&seeds),
        };

        Self {
            storage_key: storage_key.to_string(),
            seeds,
            records,
            storage,
            sync,
            last_issued_millis: 0,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Issues `{prefix}_{millis}`, bumping past any id already taken.
    fn issue_id(&mut self, prefix: &str, is_taken: impl Fn(&str) -> bool) -> String {
        let mut millis = Utc::now()
            .timestamp_millis()
            .max(self.last_issued_millis + 1);
        loop {
            let id = format!("{prefix}_{millis}");
            if !is_taken(&id) {
                self.last_issued_millis = millis;
                return id;
            }
            millis += 1;
        }
    }

    /// Appends a record built from `seed` (or the record type's defaults)
    /// and returns its new id alongside the persist outcome.
    pub async fn add(
        &mut self,
        seed: Option<R::Seed>,
        ctx: &dyn EditContext,
    ) -> Result<(String, PersistOutcome), AppError> {
        let taken: HashSet<String> = self.records.iter().map(|r| r.id().to_string()).collect();
        let id = self.issue_id(R::ID_PREFIX, |candidate| taken.contains(candidate));

        let record = R::from_seed(id.clone(), seed.unwrap_or_else(R::default_seed));
        self.records.push(record);
        ctx.set_has_unsaved_changes(true);
        info!("Added '{id}' to '{}'", self.storage_key);

        let outcome = self.persist(ctx).await?;
        Ok((id, outcome))
    }

    /// Removes the record with `id`. Returns whether a record was removed;
    /// deleting an absent id changes nothing.
    pub async fn delete(
        &mut self,
        id: &str,
        ctx: &dyn EditContext,
    ) -> Result<(bool, PersistOutcome), AppError> {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        let removed = self.records.len() != before;
        ctx.set_has_unsaved_changes(true);
        if removed {
            info!("Deleted '{id}' from '{}'", self.storage_key);
        }

        let outcome = self.persist(ctx).await?;
        Ok((removed, outcome))
    }

    /// Replaces one field of the record with `id`. Unknown field names are
    /// rejected before anything changes, even when `id` is absent; an absent
    /// id updates nothing.
    pub async fn update_field(
        &mut self,
        id: &str,
        field: &str,
        value: FieldValue,
        ctx: &dyn EditContext,
    ) -> Result<(bool, PersistOutcome), AppError> {
        R::check_field(field).map_err(|e| AppError::Validation(e.to_string()))?;
        self.update_record(id, ctx, |record| record.set_field(field, value))
            .await
    }

    /// Applies `edit` to the record with `id`, then persists.
    async fn update_record<F, E>(
        &mut self,
        id: &str,
        ctx: &dyn EditContext,
        edit: F,
    ) -> Result<(bool, PersistOutcome), AppError>
    where
        F: FnOnce(&mut R) -> Result<(), E>,
        E: std::fmt::Display,
    {
        let updated = match self.records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                // Work on a copy so a rejected edit leaves the record intact.
                let mut draft = record.clone();
                edit(&mut draft).map_err(|e| AppError::Validation(e.to_string()))?;
                *record = draft;
                true
            }
            None => false,
        };
        ctx.set_has_unsaved_changes(true);

        let outcome = self.persist(ctx).await?;
        Ok((updated, outcome))
    }

    /// Discards every edit and re-materializes the seed defaults.
    pub async fn reset(&mut self, ctx: &dyn EditContext) -> Result<PersistOutcome, AppError> {
        self.records = seed_records::<R>(&self.seeds);
        ctx.set_has_unsaved_changes(true);
        info!("Reset '{}' to {} default records", self.storage_key, self.records.len());
        self.persist(ctx).await
    }

    /// Validates and writes the current collection, then forwards it to sync.
    ///
    /// An empty collection is never written, so deleting the last record
    /// leaves the previous payload in durable storage.
    pub async fn persist(&self, ctx: &dyn EditContext) -> Result<PersistOutcome, AppError> {
        if self.records.is_empty() {
            debug!("'{}' is empty; skipping persist", self.storage_key);
            return Ok(PersistOutcome::SkippedEmpty);
        }

        if let Err(e) = self.records.iter().try_for_each(|r| r.validate()) {
            let notice = e.to_string();
            warn!("Rejected persist of '{}': {notice}", self.storage_key);
            ctx.notify(notice.clone());
            return Ok(PersistOutcome::Rejected { notice });
        }

        let payload = serde_json::to_string(&self.records).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("serializing '{}': {e}", self.storage_key))
        })?;
        self.storage.write(&self.storage_key, &payload).await?;
        self.sync.sync_content(&self.storage_key, &payload);

        info!(
            "Persisted {} records under '{}'",
            self.records.len(),
            self.storage_key
        );
        Ok(PersistOutcome::Persisted)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Nested skills inside skill categories
// ────────────────────────────────────────────────────────────────────────────

impl ListStore<SkillCategory> {
    /// Appends a skill to a category. Returns `None` for the id when the
    /// category does not exist.
    pub async fn add_skill(
        &mut self,
        category_id: &str,
        seed: Option<SkillSeed>,
        ctx: &dyn EditContext,
    ) -> Result<(Option<String>, PersistOutcome), AppError> {
        if self.get(category_id).is_none() {
            let outcome = self.persist(ctx).await?;
            return Ok((None, outcome));
        }

        let taken: HashSet<String> = self
            .records
            .iter()
            .flat_map(|c| c.skills.iter().map(|s| s.id.clone()))
            .collect();
        let skill_id = self.issue_id(Skill::ID_PREFIX, |candidate| taken.contains(candidate));
        let skill = Skill::from_seed(skill_id.clone(), seed.unwrap_or_else(SkillSeed::new_skill));

        let (_, outcome) = self
            .update_record(category_id, ctx, |category| {
                category.skills.push(skill);
                Ok::<(), AppError>(())
            })
            .await?;
        Ok((Some(skill_id), outcome))
    }

    pub async fn delete_skill(
        &mut self,
        category_id: &str,
        skill_id: &str,
        ctx: &dyn EditContext,
    ) -> Result<(bool, PersistOutcome), AppError> {
        let mut removed = false;
        let (_, outcome) = self
            .update_record(category_id, ctx, |category| {
                let before = category.skills.len();
                category.skills.retain(|s| s.id != skill_id);
                removed = category.skills.len() != before;
                Ok::<(), AppError>(())
            })
            .await?;
        Ok((removed, outcome))
    }

    pub async fn update_skill_field(
        &mut self,
        category_id: &str,
        skill_id: &str,
        field: &str,
        value: FieldValue,
        ctx: &dyn EditContext,
    ) -> Result<(bool, PersistOutcome), AppError> {
        Skill::check_field(field).map_err(|e| AppError::Validation(e.to_string()))?;
        let mut updated = false;
        let (_, outcome) = self
            .update_record(
                category_id,
                ctx,
                |category: &mut SkillCategory| -> Result<(), FieldError> {
                    if let Some(skill) = category.skill_mut(skill_id) {
                        skill.set_field(field, value)?;
                        updated = true;
                    }
                    Ok(())
                },
            )
            .await?;
        Ok((updated, outcome))
    }
}
