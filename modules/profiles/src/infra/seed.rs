//! Startup seeding of the reference tables from a JSON file.
//!
//! Each kind is reconciled on its own: a failing kind is logged and recorded
//! in the [`SeedOutcome`], and the remaining kinds are still attempted.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::contract::model::{ReferenceEntity, ReferenceKind};
use crate::domain::reconcile::{reconcile, ReconcileError, ReconcileReport, ReferenceStore};
use crate::infra::storage::sea_orm_repo::SeaOrmReferenceStore;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedEntry {
    pub id: i32,
    pub name: String,
}

/// Contents of the seed file. Missing keys are empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedData {
    #[serde(default, alias = "Categories")]
    pub categories: Vec<SeedEntry>,
    #[serde(default)]
    pub roles: Vec<SeedEntry>,
    #[serde(default)]
    pub skill_categories: Vec<SeedEntry>,
}

impl SeedData {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid seed file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("seed JSON does not match the expected shape")
    }

    pub fn entities(&self, kind: ReferenceKind) -> Vec<ReferenceEntity> {
        let entries = match kind {
            ReferenceKind::UserCategory => &self.categories,
            ReferenceKind::Role => &self.roles,
            ReferenceKind::SkillCategory => &self.skill_categories,
        };
        entries
            .iter()
            .map(|e| ReferenceEntity::new(e.id, e.name.clone()))
            .collect()
    }
}

/// One store per reference table.
#[derive(Clone)]
pub struct ReferenceStores {
    pub user_categories: Arc<dyn ReferenceStore>,
    pub roles: Arc<dyn ReferenceStore>,
    pub skill_categories: Arc<dyn ReferenceStore>,
}

impl ReferenceStores {
    pub fn sea_orm(conn: &DatabaseConnection) -> Self {
        let store = |kind| -> Arc<dyn ReferenceStore> {
            Arc::new(SeaOrmReferenceStore::new(conn.clone(), kind))
        };
        Self {
            user_categories: store(ReferenceKind::UserCategory),
            roles: store(ReferenceKind::Role),
            skill_categories: store(ReferenceKind::SkillCategory),
        }
    }

    pub fn get(&self, kind: ReferenceKind) -> &dyn ReferenceStore {
        match kind {
            ReferenceKind::UserCategory => self.user_categories.as_ref(),
            ReferenceKind::Role => self.roles.as_ref(),
            ReferenceKind::SkillCategory => self.skill_categories.as_ref(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SeedOutcome {
    pub reports: Vec<(ReferenceKind, ReconcileReport)>,
    pub failures: Vec<(ReferenceKind, ReconcileError)>,
}

impl SeedOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn report(&self, kind: ReferenceKind) -> Option<&ReconcileReport> {
        self.reports.iter().find(|(k, _)| *k == kind).map(|(_, r)| r)
    }
}

/// Reconcile user categories, roles and skill categories, in that order.
pub async fn seed_reference_data(stores: &ReferenceStores, data: &SeedData) -> SeedOutcome {
    let mut outcome = SeedOutcome::default();
    for kind in ReferenceKind::ALL {
        let desired = data.entities(kind);
        let store = stores.get(kind);
        let result = reconcile(store, &desired).await;
        // A failed run may still have inserted rows before it stopped
        let inserted = result.as_ref().map_or(true, |r| r.inserted > 0);
        if inserted {
            if let Err(e) = store.sync_id_sequence().await {
                warn!(kind = %kind, error = %format!("{e:#}"), "Id sequence sync failed");
            }
        }
        match result {
            Ok(report) => {
                info!(
                    kind = %kind,
                    inserted = report.inserted,
                    updated = report.updated,
                    unchanged = report.unchanged,
                    "Reference data reconciled"
                );
                outcome.reports.push((kind, report));
            }
            Err(e) => {
                error!(
                    kind = %kind,
                    id = e.id(),
                    error = %error_chain(&e),
                    "Reference data reconciliation failed"
                );
                outcome.failures.push((kind, e));
            }
        }
    }
    outcome
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut cur = e.source();
    while let Some(cause) = cur {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        cur = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        rows: Mutex<HashMap<i32, ReferenceEntity>>,
        syncs: Mutex<usize>,
        broken: bool,
    }

    #[async_trait::async_trait]
    impl ReferenceStore for MemStore {
        async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<ReferenceEntity>> {
            if self.broken {
                return Err(anyhow!("table is gone"));
            }
            Ok(self.rows.lock().get(&id).cloned())
        }

        async fn insert(&self, e: &ReferenceEntity) -> anyhow::Result<()> {
            self.rows.lock().insert(e.id, e.clone());
            Ok(())
        }

        async fn update_by_id(&self, id: i32, e: &ReferenceEntity) -> anyhow::Result<()> {
            self.rows.lock().insert(id, e.clone());
            Ok(())
        }

        async fn sync_id_sequence(&self) -> anyhow::Result<()> {
            *self.syncs.lock() += 1;
            Ok(())
        }
    }

    fn stores(roles: MemStore) -> (ReferenceStores, Arc<MemStore>, Arc<MemStore>) {
        let categories = Arc::new(MemStore::default());
        let skill_categories = Arc::new(MemStore::default());
        let stores = ReferenceStores {
            user_categories: categories.clone(),
            roles: Arc::new(roles),
            skill_categories: skill_categories.clone(),
        };
        (stores, categories, skill_categories)
    }

    #[test]
    fn seed_file_accepts_capitalized_categories_and_missing_keys() {
        let data = SeedData::from_json(r#"{"Categories":[{"id":1,"name":"Mentor"}]}"#).unwrap();
        assert_eq!(data.categories.len(), 1);
        assert!(data.roles.is_empty());
        assert!(data.skill_categories.is_empty());
        assert_eq!(
            data.entities(ReferenceKind::UserCategory),
            vec![ReferenceEntity::new(1, "Mentor")]
        );
    }

    #[test]
    fn malformed_seed_file_is_an_error() {
        assert!(SeedData::from_json(r#"{"roles":[{"id":"x"}]}"#).is_err());
        assert!(SeedData::load("/definitely/not/here.json").is_err());
    }

    #[tokio::test]
    async fn failing_kind_does_not_stop_the_others() {
        let (stores, categories, skill_categories) = stores(MemStore {
            broken: true,
            ..Default::default()
        });
        let data = SeedData {
            categories: vec![SeedEntry { id: 1, name: "Mentor".into() }],
            roles: vec![SeedEntry { id: 1, name: "Admin".into() }],
            skill_categories: vec![SeedEntry { id: 7, name: "Backend".into() }],
        };

        let outcome = seed_reference_data(&stores, &data).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, ReferenceKind::Role);
        assert_eq!(outcome.report(ReferenceKind::UserCategory).unwrap().inserted, 1);
        assert_eq!(outcome.report(ReferenceKind::SkillCategory).unwrap().inserted, 1);
        assert!(categories.rows.lock().contains_key(&1));
        assert!(skill_categories.rows.lock().contains_key(&7));
    }

    #[tokio::test]
    async fn id_sequences_are_synced_only_after_inserts() {
        let (stores, categories, skill_categories) = stores(MemStore::default());
        let data = SeedData {
            categories: vec![SeedEntry { id: 1, name: "Mentor".into() }],
            roles: vec![],
            skill_categories: vec![SeedEntry { id: 3, name: "Data".into() }],
        };

        seed_reference_data(&stores, &data).await;
        assert_eq!(*categories.syncs.lock(), 1);
        assert_eq!(*skill_categories.syncs.lock(), 1);

        let renamed = SeedData {
            skill_categories: vec![SeedEntry { id: 3, name: "Analytics".into() }],
            ..data
        };
        let outcome = seed_reference_data(&stores, &renamed).await;
        assert_eq!(outcome.report(ReferenceKind::SkillCategory).unwrap().updated, 1);
        assert_eq!(*categories.syncs.lock(), 1);
        assert_eq!(*skill_categories.syncs.lock(), 1);
    }

    #[tokio::test]
    async fn empty_seed_is_a_successful_noop() {
        let (stores, categories, _) = stores(MemStore::default());
        let outcome = seed_reference_data(&stores, &SeedData::default()).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.reports.len(), 3);
        assert!(categories.rows.lock().is_empty());
    }
}
