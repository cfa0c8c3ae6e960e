//! In-memory vehicle store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::store::{StoreError, VehicleStore};
use crate::domain::{StoredVehicle, VehicleDraft, VehicleId};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<VehicleId, StoredVehicle>,
}

/// Vehicle store that keeps records in memory
///
/// Ids are never reused, matching the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryVehicleStore {
    state: RwLock<MemoryState>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn find_all(&self) -> Result<Vec<StoredVehicle>, StoreError> {
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: VehicleId) -> Result<StoredVehicle, StoreError> {
        let state = self.state.read().await;
        state.rows.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, draft: VehicleDraft) -> Result<StoredVehicle, StoreError> {
        let mut state = self.state.write().await;

        match draft.id {
            None => {
                state.last_id += 1;
                let record = StoredVehicle {
                    id: VehicleId(state.last_id),
                    details: draft.details,
                    condition: draft.condition,
                    location: draft.location,
                    created_at: Utc::now(),
                    modified_at: draft.modified_at,
                };
                state.rows.insert(record.id, record.clone());
                Ok(record)
            }
            Some(id) => {
                let existing = state.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
                existing.details = draft.details;
                existing.condition = draft.condition;
                existing.location = draft.location;
                if let Some(created_at) = draft.created_at {
                    existing.created_at = created_at;
                }
                existing.modified_at = draft.modified_at;
                Ok(existing.clone())
            }
        }
    }

    async fn delete(&self, id: VehicleId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Condition, Coordinates, Details};

    fn draft() -> VehicleDraft {
        VehicleDraft::new(
            Details::default().with_model("Civic"),
            Condition::Used,
            Coordinates::new(1.0, 2.0),
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryVehicleStore::new();

        let first = store.save(draft()).await.unwrap();
        let second = store.save(draft()).await.unwrap();

        assert_eq!(first.id, VehicleId(1));
        assert_eq!(second.id, VehicleId(2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = MemoryVehicleStore::new();

        let first = store.save(draft()).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.save(draft()).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryVehicleStore::new();
        let mut update = draft();
        update.id = Some(VehicleId(9));

        let err = store.save(update).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(VehicleId(9))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = MemoryVehicleStore::new();
        let err = store.delete(VehicleId(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
