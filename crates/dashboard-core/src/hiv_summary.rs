//! Latest HIV summary resolution and eligibility classification.
//!
//! Given a patient and the HIV summary rows returned by the provider, this module:
//!
//! 1. selects the **canonical** summary: the first row, in provider order, flagged as a clinical
//!    encounter;
//! 2. clears the ART start date on that summary when it is unparseable or a 1899/1900 sentinel;
//! 3. finds the latest viral-load date across *all* rows, clinical or not;
//! 4. if the canonical summary's own viral-load date is strictly earlier, copies the viral-load
//!    date and value from the first row dated on that latest day;
//! 5. classifies the patient's eligibility from gender, age and menstruation status.
//!
//! Everything here is pure. The input rows are never modified; the canonical summary is cloned
//! and the corrected copy is returned.

use crate::constants::{POSTMENOPAUSAL_CONCEPT, REPRODUCTIVE_AGE_MAX, REPRODUCTIVE_AGE_MIN};
use dashboard_types::ClinicalDate;
use openmrs::{Gender, HivSummaryData, PatientData};
use serde::ser::SerializeStruct;
use serde::Serialize;
use std::fmt;

// ============================================================================
// Result types
// ============================================================================

/// Why a patient is not eligible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IneligibilityReason {
    MalePatient,
    /// Female patient outside the 14 to 49 age band; carries the recorded age.
    NotReproductiveAge(u32),
    Postmenopausal,
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibilityReason::MalePatient => f.write_str("Male Patient"),
            IneligibilityReason::NotReproductiveAge(age) => {
                write!(f, "Not in reproductive age {age}")
            }
            IneligibilityReason::Postmenopausal => f.write_str("POSTMENOPAUSAL"),
        }
    }
}

/// Eligibility outcome. `Unknown` covers every case the rules do not decide, such as a missing
/// gender or a female patient without a recorded age.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibilityReason),
    Unknown,
}

impl Eligibility {
    /// `Some(true)`/`Some(false)` when decided, `None` when unknown.
    pub fn is_eligible(&self) -> Option<bool> {
        match self {
            Eligibility::Eligible => Some(true),
            Eligibility::Ineligible(_) => Some(false),
            Eligibility::Unknown => None,
        }
    }

    /// Human-readable reason, present only when ineligible.
    pub fn reason(&self) -> Option<String> {
        match self {
            Eligibility::Ineligible(reason) => Some(reason.to_string()),
            _ => None,
        }
    }

    fn status(&self) -> &'static str {
        match self {
            Eligibility::Eligible => "eligible",
            Eligibility::Ineligible(_) => "ineligible",
            Eligibility::Unknown => "unknown",
        }
    }
}

impl Serialize for Eligibility {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Eligibility", 3)?;
        state.serialize_field("status", self.status())?;
        state.serialize_field("eligible", &self.is_eligible())?;
        state.serialize_field("reason", &self.reason())?;
        state.end()
    }
}

/// Where the viral-load fields of the resolved summary came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ViralLoadSource {
    /// The canonical summary's own values were kept.
    Canonical,
    /// Values were copied from the row at `index` in the input.
    LatestRecord { index: usize },
}

/// A canonical summary after correction, with the patient's eligibility.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedHivSummary {
    pub summary: HivSummaryData,
    /// Position of the canonical row in the input.
    pub canonical_index: usize,
    pub viral_load: ViralLoadSource,
    pub eligibility: Eligibility,
}

/// Outcome of resolving the latest HIV summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LatestHivSummary {
    /// No row is flagged as a clinical encounter (including an empty list).
    NoClinicalData,
    Resolved(ResolvedHivSummary),
}

impl LatestHivSummary {
    pub fn resolved(&self) -> Option<&ResolvedHivSummary> {
        match self {
            LatestHivSummary::Resolved(resolved) => Some(resolved),
            LatestHivSummary::NoClinicalData => None,
        }
    }

    /// The eligibility of a resolved summary, `Unknown` otherwise.
    pub fn eligibility(&self) -> Eligibility {
        self.resolved()
            .map(|r| r.eligibility)
            .unwrap_or(Eligibility::Unknown)
    }
}

// ============================================================================
// Resolution steps
// ============================================================================

/// Returns the first clinical-encounter row and its index.
pub fn select_canonical(summaries: &[HivSummaryData]) -> Option<(usize, &HivSummaryData)> {
    summaries
        .iter()
        .enumerate()
        .find(|(_, summary)| summary.is_clinical_encounter)
}

/// Clears the ART start date when it does not parse or is an "unset" sentinel year.
pub fn sanitise_art_start_date(mut summary: HivSummaryData) -> HivSummaryData {
    let usable = summary
        .arv_first_regimen_start_date_parsed()
        .is_some_and(|date| !date.is_unset_sentinel());

    if !usable {
        if let Some(raw) = summary.arv_first_regimen_start_date.take() {
            tracing::debug!(arv_first_regimen_start_date = %raw, "cleared unset ART start date");
        }
    }
    summary
}

/// Latest parseable viral-load date across all rows.
pub fn latest_vl_date(summaries: &[HivSummaryData]) -> Option<ClinicalDate> {
    summaries
        .iter()
        .filter_map(HivSummaryData::vl_1_date_parsed)
        .max()
}

/// First row whose viral-load date falls on `date`.
pub fn find_vl_record(
    summaries: &[HivSummaryData],
    date: ClinicalDate,
) -> Option<(usize, &HivSummaryData)> {
    summaries
        .iter()
        .enumerate()
        .find(|(_, summary)| summary.vl_1_date_parsed() == Some(date))
}

/// Replaces the canonical viral-load date and value with the latest ones, when newer.
///
/// Correction only happens if the canonical row has a parseable viral-load date that is strictly
/// earlier than the latest one.
pub fn correct_viral_load(
    mut canonical: HivSummaryData,
    summaries: &[HivSummaryData],
) -> (HivSummaryData, ViralLoadSource) {
    let (Some(latest), Some(own)) = (latest_vl_date(summaries), canonical.vl_1_date_parsed())
    else {
        return (canonical, ViralLoadSource::Canonical);
    };

    if own >= latest {
        return (canonical, ViralLoadSource::Canonical);
    }

    match find_vl_record(summaries, latest) {
        Some((index, record)) => {
            tracing::debug!(%own, %latest, index, "replacing viral load with latest result");
            canonical.vl_1_date = record.vl_1_date.clone();
            canonical.vl_1 = record.vl_1.clone();
            (canonical, ViralLoadSource::LatestRecord { index })
        }
        None => {
            tracing::warn!(%latest, "no row carries the latest viral-load date");
            (canonical, ViralLoadSource::Canonical)
        }
    }
}

pub fn is_postmenopausal(menstruation_status: Option<i64>) -> bool {
    menstruation_status == Some(POSTMENOPAUSAL_CONCEPT)
}

/// Classifies eligibility. Rules are checked in order and the first match wins.
pub fn classify(patient: &PatientData, summary: &HivSummaryData) -> Eligibility {
    let reproductive = REPRODUCTIVE_AGE_MIN..=REPRODUCTIVE_AGE_MAX;

    match (&patient.gender, patient.age) {
        (Some(Gender::Male), _) => Eligibility::Ineligible(IneligibilityReason::MalePatient),
        (Some(Gender::Female), Some(age)) if !reproductive.contains(&age) => {
            Eligibility::Ineligible(IneligibilityReason::NotReproductiveAge(age))
        }
        (Some(Gender::Female), Some(_)) if is_postmenopausal(summary.menstruation_status) => {
            Eligibility::Ineligible(IneligibilityReason::Postmenopausal)
        }
        (Some(Gender::Female), Some(_)) => Eligibility::Eligible,
        _ => Eligibility::Unknown,
    }
}

/// Resolves the latest HIV summary for `patient` from `summaries` in provider order.
///
/// Without a patient the summary is still resolved, but eligibility is `Unknown`.
pub fn resolve(patient: Option<&PatientData>, summaries: &[HivSummaryData]) -> LatestHivSummary {
    let Some((canonical_index, canonical)) = select_canonical(summaries) else {
        tracing::debug!(rows = summaries.len(), "no clinical encounter among summaries");
        return LatestHivSummary::NoClinicalData;
    };

    let summary = sanitise_art_start_date(canonical.clone());
    let (summary, viral_load) = correct_viral_load(summary, summaries);
    let eligibility = patient
        .map(|p| classify(p, &summary))
        .unwrap_or(Eligibility::Unknown);

    LatestHivSummary::Resolved(ResolvedHivSummary {
        summary,
        canonical_index,
        viral_load,
        eligibility,
    })
}
