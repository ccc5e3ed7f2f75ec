use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid scenario kind: '{kind}' (expected leaseholdCondo, landSwap or masterLease)")]
    InvalidScenarioKind { kind: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Parcel not found: {0}")]
    ParcelNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SimulationError {
    fn from(e: serde_json::Error) -> Self {
        SimulationError::SerializationError(e.to_string())
    }
}
