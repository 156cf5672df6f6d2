//! Wire/boundary support for the remote clinical records API.
//!
//! This crate provides **wire models** and **translation helpers** for the JSON documents the
//! dashboard consumes:
//! - patient resources (identity, gender, age and phone contacts)
//! - HIV summary rows from the clinical summary endpoint
//!
//! This crate focuses on:
//! - tolerant deserialisation of loosely typed API fields (0/1 flags, numeric phone numbers)
//! - translation between wire structs and domain-level carriers
//! - reporting the failing field path when a document does not match the schema
//!
//! No decision logic lives here. Eligibility and summary selection belong in `dashboard-core`.

pub mod hiv_summary;
pub mod patient;

mod wire;

// Re-export facades
pub use hiv_summary::HivSummary;
pub use patient::Patient;

// Re-export public domain-level types
pub use hiv_summary::{HivSummaryData, ViralLoad};
pub use patient::{Gender, PatientData};

pub use dashboard_uuid::PatientUuid;

/// Errors returned by the `openmrs` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum OpenMrsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(String),
}

/// Type alias for Results that can fail with an [`OpenMrsError`].
pub type OpenMrsResult<T> = Result<T, OpenMrsError>;
