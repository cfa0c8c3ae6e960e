//! Errors surfaced by vehicle operations.

use thiserror::Error;

use super::store::StoreError;
use crate::adapters::PriceError;
use crate::domain::VehicleId;

/// Terminal outcome of a failed vehicle operation
#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("Vehicle not found: {0}")]
    NotFound(VehicleId),

    #[error("Price unavailable for vehicle {id}: {source}")]
    PriceUnavailable {
        id: VehicleId,
        #[source]
        source: PriceError,
    },

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl VehicleError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<StoreError> for VehicleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: VehicleError = StoreError::NotFound(VehicleId(4)).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Vehicle not found: 4");
    }

    #[test]
    fn test_backend_error_stays_store_error() {
        let err: VehicleError = StoreError::Backend("disk full".to_string()).into();
        assert!(matches!(err, VehicleError::Store(_)));
    }
}
