//! Upsert-by-fingerprint reconciliation of reference data.
//!
//! Given the desired rows for one reference table, make the store match:
//! insert what is missing, update what changed, leave everything else alone.
//! Rows that exist only in the store are never touched. Entities are handled
//! strictly in order and the first storage error aborts the run; writes made
//! before the failure stay in place.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::contract::model::ReferenceEntity;

/// Storage seen by the reconciler. Three required calls so fakes stay trivial.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// `Ok(None)` means "no row with this id", which is not an error.
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<ReferenceEntity>>;
    async fn insert(&self, entity: &ReferenceEntity) -> anyhow::Result<()>;
    async fn update_by_id(&self, id: i32, entity: &ReferenceEntity) -> anyhow::Result<()>;

    /// Called after rows were inserted with explicit ids, so that ids
    /// generated later by the store do not collide with them.
    async fn sync_id_sequence(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Insert,
    Update,
}

impl std::fmt::Display for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOp::Insert => f.write_str("insert"),
            WriteOp::Update => f.write_str("update"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("lookup of reference id {id} failed")]
    Lookup {
        id: i32,
        #[source]
        source: anyhow::Error,
    },

    #[error("{op} of reference id {id} failed")]
    Write {
        id: i32,
        op: WriteOp,
        #[source]
        source: anyhow::Error,
    },
}

impl ReconcileError {
    pub fn id(&self) -> i32 {
        match self {
            ReconcileError::Lookup { id, .. } | ReconcileError::Write { id, .. } => *id,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ReconcileReport {
    pub fn writes(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Hex SHA-256 over the length-prefixed `(id, name)` pair. Timestamps are not part of it.
pub fn fingerprint(entity: &ReferenceEntity) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entity.id.to_be_bytes());
    hasher.update((entity.name.len() as u64).to_be_bytes());
    hasher.update(entity.name.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[instrument(name = "profiles.reconcile", skip_all, fields(desired = desired.len()))]
pub async fn reconcile<S>(
    store: &S,
    desired: &[ReferenceEntity],
) -> Result<ReconcileReport, ReconcileError>
where
    S: ReferenceStore + ?Sized,
{
    let mut report = ReconcileReport::default();

    for entity in desired {
        let stored = store
            .find_by_id(entity.id)
            .await
            .map_err(|source| ReconcileError::Lookup {
                id: entity.id,
                source,
            })?;

        let Some(stored) = stored else {
            store
                .insert(entity)
                .await
                .map_err(|source| ReconcileError::Write {
                    id: entity.id,
                    op: WriteOp::Insert,
                    source,
                })?;
            debug!(id = entity.id, name = %entity.name, "inserted reference row");
            report.inserted += 1;
            continue;
        };

        if fingerprint(&stored) == fingerprint(entity) {
            report.unchanged += 1;
            continue;
        }

        store
            .update_by_id(entity.id, entity)
            .await
            .map_err(|source| ReconcileError::Write {
                id: entity.id,
                op: WriteOp::Update,
                source,
            })?;
        debug!(id = entity.id, from = %stored.name, to = %entity.name, "updated reference row");
        report.updated += 1;
    }

    info!(
        inserted = report.inserted,
        updated = report.updated,
        unchanged = report.unchanged,
        "reference data reconciled"
    );
    Ok(report)
}
