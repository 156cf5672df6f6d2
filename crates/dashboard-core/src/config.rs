//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services as an
//! `Arc<CoreConfig>`. Nothing in this crate reads environment variables during request handling;
//! binaries read them in `main` and hand the raw values to the parsers below.

use crate::constants::{DEFAULT_SUMMARY_LIMIT, HIV_SUMMARIES_JSON_FILENAME, PATIENT_JSON_FILENAME};
use crate::{DashboardError, DashboardResult};
use dashboard_uuid::PatientUuid;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Paging and filtering parameters sent to the clinical summary provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryQuery {
    /// Number of rows to skip, in provider order.
    pub start_index: usize,
    /// Maximum number of rows to return.
    pub limit: usize,
    /// When false, ancillary (non-clinical) rows are filtered out before paging.
    pub include_non_clinical: bool,
}

impl Default for SummaryQuery {
    fn default() -> Self {
        Self {
            start_index: 0,
            limit: DEFAULT_SUMMARY_LIMIT,
            include_non_clinical: true,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    summary_query: SummaryQuery,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidInput`] if the summary limit is zero.
    pub fn new(patient_data_dir: PathBuf, summary_query: SummaryQuery) -> DashboardResult<Self> {
        if summary_query.limit == 0 {
            return Err(DashboardError::InvalidInput(
                "summary limit must be at least 1".into(),
            ));
        }

        Ok(Self {
            patient_data_dir,
            summary_query,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn summary_query(&self) -> SummaryQuery {
        self.summary_query
    }

    /// Directory holding one patient's files.
    pub fn patient_dir(&self, uuid: &PatientUuid) -> PathBuf {
        uuid.sharded_dir(&self.patient_data_dir)
    }

    pub fn patient_file(&self, uuid: &PatientUuid) -> PathBuf {
        self.patient_dir(uuid).join(PATIENT_JSON_FILENAME)
    }

    pub fn hiv_summaries_file(&self, uuid: &PatientUuid) -> PathBuf {
        self.patient_dir(uuid).join(HIV_SUMMARIES_JSON_FILENAME)
    }
}

/// Parse the summary page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default limit.
pub fn summary_limit_from_env_value(value: Option<String>) -> DashboardResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_SUMMARY_LIMIT),
        Some(v) => match v.parse::<usize>() {
            Ok(0) | Err(_) => Err(DashboardError::InvalidInput(format!(
                "HIV_SUMMARY_LIMIT must be a positive integer, got '{v}'"
            ))),
            Ok(limit) => Ok(limit),
        },
    }
}

/// Parse the non-clinical inclusion flag from an optional string value.
///
/// Accepts `true`/`false`, `1`/`0` and `yes`/`no` in any case. Missing or blank values default to
/// including non-clinical rows, which the viral-load correction relies on.
pub fn include_non_clinical_from_env_value(value: Option<String>) -> DashboardResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(true),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(DashboardError::InvalidInput(format!(
            "HIV_SUMMARY_INCLUDE_NON_CLINICAL must be a boolean, got '{other}'"
        ))),
    }
}
