//! # Dashboard Core
//!
//! Core decision logic for the patient dashboard.
//!
//! This crate contains pure data operations and the file-backed provider:
//! - Contacts display state derived from the currently loaded patient
//! - Latest HIV summary resolution: canonical summary, viral-load correction, eligibility
//! - Loading a complete HIV summary view, with provider failures turned into display errors
//!
//! **No API concerns**: HTTP servers, request parsing and the current-patient stream belong in
//! `api-rest`.

pub mod config;
pub mod constants;
pub mod contacts;
pub mod error;
pub mod hiv_summary;
pub mod hiv_summary_latest;
pub mod providers;

pub use config::{CoreConfig, SummaryQuery};
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use contacts::{ContactsDisplay, ContactsService};
pub use error::{DashboardError, DashboardResult};
pub use hiv_summary::{
    resolve, Eligibility, IneligibilityReason, LatestHivSummary, ResolvedHivSummary,
    ViralLoadSource,
};
pub use hiv_summary_latest::{DisplayError, HivSummaryLatestService, HivSummaryLatestView};
pub use providers::{FileProvider, PatientProvider, SummaryProvider};

pub use dashboard_uuid::PatientUuid;
pub use openmrs::{Gender, HivSummaryData, PatientData, ViralLoad};
