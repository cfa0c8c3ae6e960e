//! Durable vehicle storage.
//!
//! The store only ever sees the durable attribute group: it reads and
//! writes [`StoredVehicle`] records and never learns about prices or
//! resolved addresses.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{StoredVehicle, VehicleDraft, VehicleId};

/// Errors that can occur in a vehicle store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Vehicle not found: {0}")]
    NotFound(VehicleId),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Key-indexed vehicle storage
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// All records in ascending id order
    async fn find_all(&self) -> Result<Vec<StoredVehicle>, StoreError>;

    /// One record, or `StoreError::NotFound`
    async fn find_by_id(&self, id: VehicleId) -> Result<StoredVehicle, StoreError>;

    /// Insert (`draft.id` is `None`) or overwrite an existing record
    ///
    /// Inserts assign the next id and stamp `created_at`; any caller-supplied
    /// `created_at` is ignored. Overwrites of a missing id fail with
    /// `StoreError::NotFound`.
    async fn save(&self, draft: VehicleDraft) -> Result<StoredVehicle, StoreError>;

    /// Remove a record, or `StoreError::NotFound`
    async fn delete(&self, id: VehicleId) -> Result<(), StoreError>;
}
