//! Data providers standing in for the remote clinical API.
//!
//! The dashboard consumes two collaborators:
//! - a **patient provider** that looks up a patient resource by UUID, and
//! - a **summary provider** that returns HIV summary rows for a patient, in provider order.
//!
//! [`FileProvider`] implements both over a sharded directory tree:
//!
//! ```text
//! <patient_data_dir>/
//!   <s1>/
//!     <s2>/
//!       <uuid>/
//!         patient.json         # patient resource
//!         hiv_summaries.json   # summary rows, newest first
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the canonical UUID.

use crate::config::{CoreConfig, SummaryQuery};
use crate::{DashboardError, DashboardResult};
use dashboard_uuid::PatientUuid;
use openmrs::{HivSummary, HivSummaryData, Patient, PatientData};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

/// Looks up patients by UUID.
pub trait PatientProvider {
    /// Returns the patient, or `None` if the provider has no such patient.
    fn patient_by_uuid(&self, uuid: &PatientUuid) -> DashboardResult<Option<PatientData>>;
}

/// Fetches HIV summary rows for a patient.
pub trait SummaryProvider {
    /// Returns the summary rows selected by `query`, in provider order.
    fn hiv_summaries(
        &self,
        uuid: &PatientUuid,
        query: &SummaryQuery,
    ) -> DashboardResult<Vec<HivSummaryData>>;
}

impl<T: PatientProvider + ?Sized> PatientProvider for Arc<T> {
    fn patient_by_uuid(&self, uuid: &PatientUuid) -> DashboardResult<Option<PatientData>> {
        (**self).patient_by_uuid(uuid)
    }
}

impl<T: SummaryProvider + ?Sized> SummaryProvider for Arc<T> {
    fn hiv_summaries(
        &self,
        uuid: &PatientUuid,
        query: &SummaryQuery,
    ) -> DashboardResult<Vec<HivSummaryData>> {
        (**self).hiv_summaries(uuid, query)
    }
}

/// Applies the non-clinical filter and paging window of `query` to rows in provider order.
pub fn apply_query(rows: Vec<HivSummaryData>, query: &SummaryQuery) -> Vec<HivSummaryData> {
    rows.into_iter()
        .filter(|row| query.include_non_clinical || row.is_clinical_encounter)
        .skip(query.start_index)
        .take(query.limit)
        .collect()
}

/// File-backed provider over the sharded patient data directory.
#[derive(Clone, Debug)]
pub struct FileProvider {
    cfg: Arc<CoreConfig>,
}

impl FileProvider {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Writes a patient resource, creating the patient's directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`DashboardError`] if the directory cannot be created, the patient cannot be
    /// rendered, or the file cannot be written.
    pub fn store_patient(&self, patient: &PatientData) -> DashboardResult<()> {
        let dir = self.cfg.patient_dir(&patient.uuid);
        fs::create_dir_all(&dir).map_err(DashboardError::PatientDirCreation)?;
        let json = Patient::render(patient)?;
        fs::write(self.cfg.patient_file(&patient.uuid), json).map_err(DashboardError::FileWrite)?;
        tracing::debug!(patient = %patient.uuid, "stored patient");
        Ok(())
    }

    /// Replaces a patient's HIV summary rows.
    ///
    /// # Errors
    ///
    /// Returns a [`DashboardError`] if the directory cannot be created, the rows cannot be
    /// rendered, or the file cannot be written.
    pub fn store_hiv_summaries(
        &self,
        uuid: &PatientUuid,
        rows: &[HivSummaryData],
    ) -> DashboardResult<()> {
        let dir = self.cfg.patient_dir(uuid);
        fs::create_dir_all(&dir).map_err(DashboardError::PatientDirCreation)?;
        let json = HivSummary::render_list(rows)?;
        fs::write(self.cfg.hiv_summaries_file(uuid), json).map_err(DashboardError::FileWrite)?;
        tracing::debug!(patient = %uuid, rows = rows.len(), "stored HIV summaries");
        Ok(())
    }
}

/// Reads a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> DashboardResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DashboardError::FileRead(e)),
    }
}

impl PatientProvider for FileProvider {
    fn patient_by_uuid(&self, uuid: &PatientUuid) -> DashboardResult<Option<PatientData>> {
        let Some(contents) = read_optional(&self.cfg.patient_file(uuid))? else {
            tracing::debug!(patient = %uuid, "no patient file");
            return Ok(None);
        };

        let patient = Patient::parse(&contents)?;
        if patient.uuid != *uuid {
            return Err(DashboardError::InvalidInput(format!(
                "patient file for {uuid} holds patient {}",
                patient.uuid
            )));
        }
        Ok(Some(patient))
    }
}

impl SummaryProvider for FileProvider {
    fn hiv_summaries(
        &self,
        uuid: &PatientUuid,
        query: &SummaryQuery,
    ) -> DashboardResult<Vec<HivSummaryData>> {
        let Some(contents) = read_optional(&self.cfg.hiv_summaries_file(uuid))? else {
            tracing::debug!(patient = %uuid, "no HIV summary file");
            return Ok(Vec::new());
        };

        let rows = HivSummary::parse_list(&contents)?;
        Ok(apply_query(rows, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmrs::Gender;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn provider(dir: &TempDir) -> FileProvider {
        let cfg = CoreConfig::new(dir.path().to_path_buf(), SummaryQuery::default()).unwrap();
        FileProvider::new(Arc::new(cfg))
    }

    fn rows() -> Vec<HivSummaryData> {
        let mut out = Vec::new();
        for (i, clinical) in [false, true, false, true, true].into_iter().enumerate() {
            let mut row = HivSummaryData::new(clinical);
            row.cur_who_stage = Some(i as i64);
            out.push(row);
        }
        out
    }

    fn stages(rows: &[HivSummaryData]) -> Vec<i64> {
        rows.iter().filter_map(|r| r.cur_who_stage).collect()
    }

    #[test]
    fn stores_and_reads_back_patient() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let mut patient = PatientData::new(PatientUuid::new());
        patient.gender = Some(Gender::Female);
        patient.age = Some(27);
        patient.patient_phone_number = Some("0700123456".into());

        provider.store_patient(&patient).unwrap();
        let read = provider.patient_by_uuid(&patient.uuid).unwrap();
        assert_eq!(read, Some(patient));
    }

    #[test]
    fn missing_files_are_empty_not_errors() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let uuid = PatientUuid::new();
        assert_eq!(provider.patient_by_uuid(&uuid).unwrap(), None);
        assert!(provider
            .hiv_summaries(&uuid, &SummaryQuery::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_summary_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let uuid = PatientUuid::new();
        provider.store_hiv_summaries(&uuid, &rows()).unwrap();
        let path: PathBuf = provider.cfg.hiv_summaries_file(&uuid);
        fs::write(&path, "{ not json").unwrap();

        let err = provider
            .hiv_summaries(&uuid, &SummaryQuery::default())
            .unwrap_err();
        assert!(matches!(err, DashboardError::OpenMrs(_)), "{err:?}");
    }

    #[test]
    fn rejects_patient_file_under_wrong_uuid() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let stored = PatientData::new(PatientUuid::new());
        let other = PatientUuid::new();
        let json = Patient::render(&stored).unwrap();
        fs::create_dir_all(provider.cfg.patient_dir(&other)).unwrap();
        fs::write(provider.cfg.patient_file(&other), json).unwrap();

        let err = provider.patient_by_uuid(&other).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
    }

    #[test]
    fn query_pages_in_provider_order() {
        let query = SummaryQuery {
            start_index: 1,
            limit: 2,
            include_non_clinical: true,
        };
        assert_eq!(stages(&apply_query(rows(), &query)), vec![1, 2]);
    }

    #[test]
    fn query_can_drop_non_clinical_rows_before_paging() {
        let query = SummaryQuery {
            start_index: 1,
            limit: 5,
            include_non_clinical: false,
        };
        assert_eq!(stages(&apply_query(rows(), &query)), vec![3, 4]);
    }

    #[test]
    fn file_provider_applies_query() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        let uuid = PatientUuid::new();
        provider.store_hiv_summaries(&uuid, &rows()).unwrap();

        let query = SummaryQuery {
            start_index: 0,
            limit: 3,
            include_non_clinical: true,
        };
        let read = provider.hiv_summaries(&uuid, &query).unwrap();
        assert_eq!(stages(&read), vec![0, 1, 2]);
    }
}
