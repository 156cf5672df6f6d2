//! Patient identifier and sharded-path utilities.
//!
//! The remote clinical API identifies patients with OpenMRS-style UUIDs, usually in hyphenated
//! form (`5b6e2f9a-1c3d-4e5f-8a9b-0c1d2e3f4a5b`). Callers may also pass the 32-character simple
//! form. [`PatientUuid`] accepts either and normalises it once, so lookups and storage paths never
//! depend on how the identifier was typed.
//!
//! ## Canonical storage form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `5b6e2f9a1c3d4e5f8a9b0c1d2e3f4a5b`
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, the file-backed provider stores a patient under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! This keeps the number of entries in any one directory small.

mod service;

pub use service::{PatientUuid, Uuid};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
