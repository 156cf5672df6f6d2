//! HIV summary wire models and translation helpers.
//!
//! The clinical summary endpoint returns one row per encounter. Rows flagged with
//! `is_clinical_encounter = 1` are formal clinic visits; the others are ancillary rows (usually lab
//! results) that still carry viral-load data.
//!
//! The endpoint answers either with a bare JSON array or with a paging envelope
//! `{ "startIndex": .., "size": .., "result": [..] }`. Both are accepted.
//!
//! Notes:
//! - Dates are kept as the strings the API sent. Interpretation is left to the caller via
//!   [`HivSummaryData::vl_1_date_parsed`] and friends, so the original text can be shown as-is.
//! - Rows are immutable once parsed; consumers that correct a row work on a clone.

use crate::wire::{from_json_with_path, non_blank, Flag, TextOrNumber};
use crate::{OpenMrsError, OpenMrsResult};
use dashboard_types::ClinicalDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Public domain-level types
// ============================================================================

/// A viral-load result as reported by the lab feed.
///
/// Most results are copy counts, but the feed also carries textual results such as
/// `"LDL"` (lower than detectable limit).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViralLoad {
    Copies(serde_json::Number),
    Text(String),
}

impl fmt::Display for ViralLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViralLoad::Copies(n) => write!(f, "{n}"),
            ViralLoad::Text(s) => f.write_str(s),
        }
    }
}

/// Domain-level carrier for one HIV summary row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HivSummaryData {
    pub is_clinical_encounter: bool,
    pub arv_first_regimen_start_date: Option<String>,
    pub vl_1_date: Option<String>,
    pub vl_1: Option<ViralLoad>,
    /// Coded menstruation status concept.
    pub menstruation_status: Option<i64>,
    pub encounter_datetime: Option<String>,
    pub encounter_type_name: Option<String>,
    pub cur_arv_meds: Option<String>,
    pub cur_who_stage: Option<i64>,
    pub med_pickup_rtc_date: Option<String>,
    pub location_uuid: Option<String>,
}

impl HivSummaryData {
    /// Creates an empty row with the given clinical flag.
    pub fn new(is_clinical_encounter: bool) -> Self {
        Self {
            is_clinical_encounter,
            arv_first_regimen_start_date: None,
            vl_1_date: None,
            vl_1: None,
            menstruation_status: None,
            encounter_datetime: None,
            encounter_type_name: None,
            cur_arv_meds: None,
            cur_who_stage: None,
            med_pickup_rtc_date: None,
            location_uuid: None,
        }
    }

    /// The viral-load date as a calendar day, if present and parseable.
    pub fn vl_1_date_parsed(&self) -> Option<ClinicalDate> {
        ClinicalDate::parse_lenient(self.vl_1_date.as_deref())
    }

    /// The ART start date as a calendar day, if present and parseable.
    pub fn arv_first_regimen_start_date_parsed(&self) -> Option<ClinicalDate> {
        ClinicalDate::parse_lenient(self.arv_first_regimen_start_date.as_deref())
    }
}

// ============================================================================
// Public HivSummary operations
// ============================================================================

/// HIV summary operations.
///
/// This is a zero-sized type used for namespacing summary-related operations.
pub struct HivSummary;

impl HivSummary {
    /// Parse a list of HIV summary rows from JSON text, preserving provider order.
    ///
    /// # Errors
    ///
    /// Returns [`OpenMrsError`] if:
    /// - the text is neither a JSON array nor a paging envelope,
    /// - any row has a field of an unexpected type (the message names the field path).
    pub fn parse_list(json_text: &str) -> OpenMrsResult<Vec<HivSummaryData>> {
        let rows: Vec<HivSummaryWire> = match json_text.trim_start().chars().next() {
            Some('[') => from_json_with_path(json_text, "HivSummary")?,
            Some('{') => {
                let envelope: EnvelopeWire = from_json_with_path(json_text, "HivSummary")?;
                envelope.result
            }
            _ => {
                return Err(OpenMrsError::InvalidInput(
                    "expected a JSON array or an object with a `result` array".into(),
                ))
            }
        };

        Ok(rows.into_iter().map(wire_to_domain).collect())
    }

    /// Render summary rows as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`OpenMrsError`] if serialisation fails.
    pub fn render_list(rows: &[HivSummaryData]) -> OpenMrsResult<String> {
        let wire: Vec<HivSummaryWire> = rows.iter().map(domain_to_wire).collect();
        serde_json::to_string_pretty(&wire).map_err(|e| {
            OpenMrsError::Translation(format!("Failed to serialise HIV summaries: {e}"))
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct EnvelopeWire {
    result: Vec<HivSummaryWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct HivSummaryWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_clinical_encounter: Option<Flag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    arv_first_regimen_start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    vl_1_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    vl_1: Option<TextOrNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    menstruation_status: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    encounter_datetime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    encounter_type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cur_arv_meds: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cur_who_stage: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    med_pickup_rtc_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_uuid: Option<String>,
}

// ============================================================================
// Translation helpers (internal)
// ============================================================================

fn wire_to_domain(wire: HivSummaryWire) -> HivSummaryData {
    HivSummaryData {
        is_clinical_encounter: wire.is_clinical_encounter.is_some_and(Flag::is_set),
        arv_first_regimen_start_date: non_blank(wire.arv_first_regimen_start_date),
        vl_1_date: non_blank(wire.vl_1_date),
        vl_1: wire.vl_1.and_then(|v| match v {
            TextOrNumber::Number(n) => Some(ViralLoad::Copies(n)),
            TextOrNumber::Text(s) => non_blank(Some(s)).map(ViralLoad::Text),
        }),
        menstruation_status: wire.menstruation_status,
        encounter_datetime: non_blank(wire.encounter_datetime),
        encounter_type_name: non_blank(wire.encounter_type_name),
        cur_arv_meds: non_blank(wire.cur_arv_meds),
        cur_who_stage: wire.cur_who_stage,
        med_pickup_rtc_date: non_blank(wire.med_pickup_rtc_date),
        location_uuid: non_blank(wire.location_uuid),
    }
}

fn domain_to_wire(data: &HivSummaryData) -> HivSummaryWire {
    HivSummaryWire {
        is_clinical_encounter: Some(Flag::Int(i64::from(data.is_clinical_encounter))),
        arv_first_regimen_start_date: data.arv_first_regimen_start_date.clone(),
        vl_1_date: data.vl_1_date.clone(),
        vl_1: data.vl_1.as_ref().map(|v| match v {
            ViralLoad::Copies(n) => TextOrNumber::Number(n.clone()),
            ViralLoad::Text(s) => TextOrNumber::Text(s.clone()),
        }),
        menstruation_status: data.menstruation_status,
        encounter_datetime: data.encounter_datetime.clone(),
        encounter_type_name: data.encounter_type_name.clone(),
        cur_arv_meds: data.cur_arv_meds.clone(),
        cur_who_stage: data.cur_who_stage,
        med_pickup_rtc_date: data.med_pickup_rtc_date.clone(),
        location_uuid: data.location_uuid.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "is_clinical_encounter": 0,
            "encounter_type_name": "LAB ORDER",
            "vl_1_date": "2019-05-20T00:00:00.000+0300",
            "vl_1": 0,
            "person_id": 12345
        },
        {
            "is_clinical_encounter": 1,
            "encounter_datetime": "2019-04-02T09:12:00.000+0300",
            "encounter_type_name": "ADULTRETURN",
            "arv_first_regimen_start_date": "1900-01-01T00:00:00.000+0300",
            "vl_1_date": "2018-11-13T00:00:00.000+0300",
            "vl_1": "LDL",
            "menstruation_status": 6496,
            "cur_who_stage": 2
        }
    ]"#;

    #[test]
    fn parses_rows_in_order() {
        let rows = HivSummary::parse_list(SAMPLE).expect("parse rows");
        assert_eq!(rows.len(), 2);

        assert!(!rows[0].is_clinical_encounter);
        assert_eq!(rows[0].vl_1, Some(ViralLoad::Copies(serde_json::Number::from(0u64))));
        assert_eq!(rows[0].vl_1_date_parsed(), ClinicalDate::from_ymd(2019, 5, 20));

        assert!(rows[1].is_clinical_encounter);
        assert_eq!(rows[1].vl_1, Some(ViralLoad::Text("LDL".into())));
        assert_eq!(rows[1].menstruation_status, Some(6496));
        assert_eq!(rows[1].cur_who_stage, Some(2));
        assert_eq!(
            rows[1].arv_first_regimen_start_date_parsed().map(|d| d.year()),
            Some(1900)
        );
    }

    #[test]
    fn accepts_paging_envelope() {
        let json = format!(r#"{{"startIndex": 0, "size": 2, "result": {SAMPLE}}}"#);
        let rows = HivSummary::parse_list(&json).expect("parse envelope");
        assert_eq!(rows, HivSummary::parse_list(SAMPLE).unwrap());
    }

    #[test]
    fn clinical_flag_accepts_booleans_and_ignores_other_numbers() {
        let rows = HivSummary::parse_list(
            r#"[{"is_clinical_encounter": true},
                {"is_clinical_encounter": 2},
                {"is_clinical_encounter": null},
                {}]"#,
        )
        .unwrap();
        let flags: Vec<bool> = rows.iter().map(|r| r.is_clinical_encounter).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn blank_strings_are_absent() {
        let rows = HivSummary::parse_list(
            r#"[{"vl_1_date": "", "vl_1": " ", "arv_first_regimen_start_date": ""}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].vl_1_date, None);
        assert_eq!(rows[0].vl_1, None);
        assert_eq!(rows[0].arv_first_regimen_start_date, None);
    }

    #[test]
    fn wrong_field_type_reports_path() {
        let err = HivSummary::parse_list(r#"[{}, {"menstruation_status": "yes"}]"#)
            .expect_err("should reject string concept code");
        match err {
            OpenMrsError::Translation(msg) => {
                assert!(msg.contains("[1].menstruation_status"), "{msg}")
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_list_documents() {
        let err = HivSummary::parse_list("42").expect_err("not a list");
        assert!(matches!(err, OpenMrsError::InvalidInput(_)));
    }

    #[test]
    fn render_then_parse_preserves_rows() {
        let rows = HivSummary::parse_list(SAMPLE).unwrap();
        let json = HivSummary::render_list(&rows).unwrap();
        assert_eq!(HivSummary::parse_list(&json).unwrap(), rows);
    }
}
