//! # API Shared
//!
//! Request/response types for the dashboard's HTTP surface.
//!
//! Contains:
//! - Flat, OpenAPI-described response types (`*Res`) and request types (`*Req`)
//! - Conversions from the `dashboard-core` view types
//! - The shared `HealthService`
//!
//! The core types use tagged enums; the response types flatten them into the shape the
//! dashboard front end binds to (`eligible_patient`, `ineligibility_reason`, ...).

pub mod health;

pub use health::HealthService;

use dashboard_core::{
    ContactsDisplay, DisplayError, HivSummaryData, HivSummaryLatestView, LatestHivSummary,
    PatientData, ViralLoadSource,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Identity fields of a patient, as shown next to the contacts panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub uuid: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
}

impl From<&PatientData> for PatientRes {
    fn from(patient: &PatientData) -> Self {
        Self {
            uuid: patient.uuid.to_string(),
            gender: patient.gender.as_ref().map(ToString::to_string),
            age: patient.age,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContactsRes {
    /// `None` when no patient is selected.
    pub patient: Option<PatientRes>,
    pub patient_phone_number: Option<String>,
    pub nextofkin_phone_number: Option<String>,
    pub partner_phone_number: Option<String>,
    pub alternative_phone_number: Option<String>,
}

impl From<&ContactsDisplay> for ContactsRes {
    fn from(display: &ContactsDisplay) -> Self {
        Self {
            patient: display.patient.as_ref().map(PatientRes::from),
            patient_phone_number: display.patient_phone_number.clone(),
            nextofkin_phone_number: display.nextofkin_phone_number.clone(),
            partner_phone_number: display.partner_phone_number.clone(),
            alternative_phone_number: display.alternative_phone_number.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HivSummaryRes {
    pub is_clinical_encounter: bool,
    pub arv_first_regimen_start_date: Option<String>,
    pub vl_1_date: Option<String>,
    /// Viral load rendered as text (copy count or lab code such as `LDL`).
    pub vl_1: Option<String>,
    pub menstruation_status: Option<i64>,
    pub encounter_datetime: Option<String>,
    pub encounter_type_name: Option<String>,
    pub cur_arv_meds: Option<String>,
    pub cur_who_stage: Option<i64>,
    pub med_pickup_rtc_date: Option<String>,
    pub location_uuid: Option<String>,
}

impl From<&HivSummaryData> for HivSummaryRes {
    fn from(summary: &HivSummaryData) -> Self {
        Self {
            is_clinical_encounter: summary.is_clinical_encounter,
            arv_first_regimen_start_date: summary.arv_first_regimen_start_date.clone(),
            vl_1_date: summary.vl_1_date.clone(),
            vl_1: summary.vl_1.as_ref().map(ToString::to_string),
            menstruation_status: summary.menstruation_status,
            encounter_datetime: summary.encounter_datetime.clone(),
            encounter_type_name: summary.encounter_type_name.clone(),
            cur_arv_meds: summary.cur_arv_meds.clone(),
            cur_who_stage: summary.cur_who_stage,
            med_pickup_rtc_date: summary.med_pickup_rtc_date.clone(),
            location_uuid: summary.location_uuid.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub id: String,
    pub message: String,
}

impl From<&DisplayError> for ErrorRes {
    fn from(error: &DisplayError) -> Self {
        Self {
            id: error.id.clone(),
            message: error.message.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HivSummaryLatestRes {
    pub patient_uuid: String,
    pub loading: bool,
    /// `None` when no summary row is flagged as a clinical encounter.
    pub hiv_summary: Option<HivSummaryRes>,
    /// Index of the row the viral load was taken from, when it was corrected.
    pub vl_source_index: Option<u32>,
    /// One of `eligible`, `ineligible` or `unknown`.
    pub eligibility_status: String,
    pub eligible_patient: Option<bool>,
    pub ineligibility_reason: Option<String>,
    pub errors: Vec<ErrorRes>,
}

impl From<&HivSummaryLatestView> for HivSummaryLatestRes {
    fn from(view: &HivSummaryLatestView) -> Self {
        let eligibility = view.eligibility();
        let (hiv_summary, vl_source_index) = match &view.summary {
            LatestHivSummary::NoClinicalData => (None, None),
            LatestHivSummary::Resolved(resolved) => {
                let index = match resolved.viral_load {
                    ViralLoadSource::Canonical => None,
                    ViralLoadSource::LatestRecord { index } => u32::try_from(index).ok(),
                };
                (Some(HivSummaryRes::from(&resolved.summary)), index)
            }
        };
        let eligibility_status = match eligibility.is_eligible() {
            Some(true) => "eligible",
            Some(false) => "ineligible",
            None => "unknown",
        };

        Self {
            patient_uuid: view.patient_uuid.to_string(),
            loading: view.loading,
            hiv_summary,
            vl_source_index,
            eligibility_status: eligibility_status.into(),
            eligible_patient: eligibility.is_eligible(),
            ineligibility_reason: eligibility.reason(),
            errors: view.errors.iter().map(ErrorRes::from).collect(),
        }
    }
}

/// Body for loading a patient into the current-patient stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoadCurrentPatientReq {
    pub uuid: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentPatientRes {
    /// `None` when no patient is loaded.
    pub uuid: Option<String>,
}
