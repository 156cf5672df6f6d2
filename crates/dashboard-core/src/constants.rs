//! Constants used throughout the dashboard core crate.

/// Default directory for patient data when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Filename for the patient resource inside a patient's sharded directory.
pub const PATIENT_JSON_FILENAME: &str = "patient.json";

/// Filename for the HIV summary rows inside a patient's sharded directory.
pub const HIV_SUMMARIES_JSON_FILENAME: &str = "hiv_summaries.json";

/// Default number of summary rows requested per load.
pub const DEFAULT_SUMMARY_LIMIT: usize = 20;

/// Menstruation status concept meaning post-menopausal.
pub const POSTMENOPAUSAL_CONCEPT: i64 = 6496;

/// Youngest age, in years, considered reproductive.
pub const REPRODUCTIVE_AGE_MIN: u32 = 14;

/// Oldest age, in years, considered reproductive.
pub const REPRODUCTIVE_AGE_MAX: u32 = 49;

/// Identifier attached to errors raised while loading the HIV summary.
pub const HIV_SUMMARY_ERROR_ID: &str = "Hiv Summary";

/// User-facing message shown when the HIV summary cannot be loaded.
pub const HIV_SUMMARY_ERROR_MESSAGE: &str =
    "An error occurred while loading Hiv Summary. Please try again.";
