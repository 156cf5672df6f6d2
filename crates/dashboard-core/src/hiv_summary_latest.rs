//! Loading the latest HIV summary view for one patient.
//!
//! This composes the providers with the pure resolver in [`crate::hiv_summary`]. Provider
//! failures never escape: each one is logged and recorded as a [`DisplayError`] on the view, and
//! the view is still returned with whatever could be resolved. Nothing is retried; a caller that
//! wants fresh data calls [`HivSummaryLatestService::load`] again.

use crate::config::CoreConfig;
use crate::constants::{HIV_SUMMARY_ERROR_ID, HIV_SUMMARY_ERROR_MESSAGE};
use crate::hiv_summary::{resolve, Eligibility, LatestHivSummary};
use crate::providers::{PatientProvider, SummaryProvider};
use dashboard_uuid::PatientUuid;
use openmrs::PatientData;
use serde::Serialize;
use std::sync::Arc;

/// A user-facing error entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayError {
    pub id: String,
    pub message: String,
}

impl DisplayError {
    fn hiv_summary() -> Self {
        Self {
            id: HIV_SUMMARY_ERROR_ID.into(),
            message: HIV_SUMMARY_ERROR_MESSAGE.into(),
        }
    }
}

/// Everything the HIV summary panel needs to render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HivSummaryLatestView {
    pub patient_uuid: PatientUuid,
    pub loading: bool,
    pub patient: Option<PatientData>,
    pub summary: LatestHivSummary,
    pub errors: Vec<DisplayError>,
}

impl HivSummaryLatestView {
    /// A view that has not finished loading.
    pub fn loading(patient_uuid: PatientUuid) -> Self {
        Self {
            patient_uuid,
            loading: true,
            patient: None,
            summary: LatestHivSummary::NoClinicalData,
            errors: Vec::new(),
        }
    }

    pub fn eligibility(&self) -> Eligibility {
        self.summary.eligibility()
    }
}

/// Loads patients and HIV summaries and resolves the latest summary view.
#[derive(Clone, Debug)]
pub struct HivSummaryLatestService<P, S> {
    cfg: Arc<CoreConfig>,
    patients: P,
    summaries: S,
}

impl<P: PatientProvider, S: SummaryProvider> HivSummaryLatestService<P, S> {
    pub fn new(cfg: Arc<CoreConfig>, patients: P, summaries: S) -> Self {
        Self {
            cfg,
            patients,
            summaries,
        }
    }

    /// Loads the patient and summary rows for `uuid` and resolves the latest summary.
    ///
    /// Always returns a completed view (`loading == false`). Each failed fetch adds one
    /// "Hiv Summary" entry to `errors`.
    pub fn load(&self, uuid: &PatientUuid) -> HivSummaryLatestView {
        let mut view = HivSummaryLatestView::loading(*uuid);

        match self.patients.patient_by_uuid(uuid) {
            Ok(patient) => {
                if patient.is_none() {
                    tracing::debug!(patient = %uuid, "patient not found; eligibility will be unknown");
                }
                view.patient = patient;
            }
            Err(e) => {
                tracing::warn!(patient = %uuid, error = %e, "failed to load patient");
                view.errors.push(DisplayError::hiv_summary());
            }
        }

        let query = self.cfg.summary_query();
        match self.summaries.hiv_summaries(uuid, &query) {
            Ok(rows) => {
                tracing::debug!(patient = %uuid, rows = rows.len(), "loaded HIV summaries");
                view.summary = resolve(view.patient.as_ref(), &rows);
            }
            Err(e) => {
                tracing::warn!(patient = %uuid, error = %e, "failed to load HIV summaries");
                view.errors.push(DisplayError::hiv_summary());
            }
        }

        view.loading = false;
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummaryQuery;
    use crate::hiv_summary::IneligibilityReason;
    use crate::{DashboardError, DashboardResult};
    use openmrs::{Gender, HivSummaryData};
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FakePatients(Option<PatientData>);

    impl PatientProvider for FakePatients {
        fn patient_by_uuid(&self, _uuid: &PatientUuid) -> DashboardResult<Option<PatientData>> {
            Ok(self.0.clone())
        }
    }

    struct FailingPatients;

    impl PatientProvider for FailingPatients {
        fn patient_by_uuid(&self, _uuid: &PatientUuid) -> DashboardResult<Option<PatientData>> {
            Err(DashboardError::FileRead(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "timeout",
            )))
        }
    }

    #[derive(Default)]
    struct FakeSummaries {
        rows: Vec<HivSummaryData>,
        fail: bool,
        seen: Mutex<Vec<SummaryQuery>>,
    }

    impl SummaryProvider for FakeSummaries {
        fn hiv_summaries(
            &self,
            _uuid: &PatientUuid,
            query: &SummaryQuery,
        ) -> DashboardResult<Vec<HivSummaryData>> {
            self.seen.lock().unwrap().push(*query);
            if self.fail {
                return Err(DashboardError::FileRead(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "unavailable",
                )));
            }
            Ok(self.rows.clone())
        }
    }

    fn cfg() -> Arc<CoreConfig> {
        let query = SummaryQuery {
            start_index: 0,
            limit: 7,
            include_non_clinical: true,
        };
        Arc::new(CoreConfig::new(PathBuf::from("unused"), query).unwrap())
    }

    fn male() -> PatientData {
        let mut patient = PatientData::new(PatientUuid::new());
        patient.gender = Some(Gender::Male);
        patient.age = Some(40);
        patient
    }

    fn clinical_rows() -> Vec<HivSummaryData> {
        vec![HivSummaryData::new(false), HivSummaryData::new(true)]
    }

    #[test]
    fn loads_and_resolves() {
        let patient = male();
        let service = HivSummaryLatestService::new(
            cfg(),
            FakePatients(Some(patient.clone())),
            FakeSummaries {
                rows: clinical_rows(),
                ..Default::default()
            },
        );

        let view = service.load(&patient.uuid);
        assert!(!view.loading);
        assert!(view.errors.is_empty());
        assert_eq!(view.patient, Some(patient));
        assert_eq!(view.summary.resolved().map(|r| r.canonical_index), Some(1));
        assert_eq!(
            view.eligibility(),
            Eligibility::Ineligible(IneligibilityReason::MalePatient)
        );
    }

    #[test]
    fn passes_configured_query_to_provider() {
        let summaries = Arc::new(FakeSummaries::default());
        let service =
            HivSummaryLatestService::new(cfg(), FakePatients(None), Arc::clone(&summaries));
        let _ = service.load(&PatientUuid::new());

        let seen = summaries.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].limit, 7);
        assert!(seen[0].include_non_clinical);
    }

    #[test]
    fn summary_failure_is_reported_not_raised() {
        let service = HivSummaryLatestService::new(
            cfg(),
            FakePatients(Some(male())),
            FakeSummaries {
                fail: true,
                ..Default::default()
            },
        );

        let view = service.load(&PatientUuid::new());
        assert!(!view.loading);
        assert_eq!(view.summary, LatestHivSummary::NoClinicalData);
        assert_eq!(
            view.errors,
            vec![DisplayError {
                id: "Hiv Summary".into(),
                message: HIV_SUMMARY_ERROR_MESSAGE.into(),
            }]
        );
    }

    #[test]
    fn patient_failure_still_resolves_summary() {
        let service = HivSummaryLatestService::new(
            cfg(),
            FailingPatients,
            FakeSummaries {
                rows: clinical_rows(),
                ..Default::default()
            },
        );

        let view = service.load(&PatientUuid::new());
        assert_eq!(view.errors.len(), 1);
        assert!(view.summary.resolved().is_some());
        assert_eq!(view.eligibility(), Eligibility::Unknown);
    }

    #[test]
    fn both_failures_yield_two_errors() {
        let service = HivSummaryLatestService::new(
            cfg(),
            FailingPatients,
            FakeSummaries {
                fail: true,
                ..Default::default()
            },
        );
        let view = service.load(&PatientUuid::new());
        assert_eq!(view.errors.len(), 2);
        assert!(view.errors.iter().all(|e| e.id == HIV_SUMMARY_ERROR_ID));
    }

    #[test]
    fn empty_summaries_yield_no_clinical_data() {
        let service = HivSummaryLatestService::new(
            cfg(),
            FakePatients(Some(male())),
            FakeSummaries::default(),
        );
        let view = service.load(&PatientUuid::new());
        assert!(view.errors.is_empty());
        assert_eq!(view.summary, LatestHivSummary::NoClinicalData);
        assert_eq!(view.eligibility(), Eligibility::Unknown);
    }
}
