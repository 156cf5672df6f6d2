//! Patient wire models and translation helpers.
//!
//! The clinical API returns a large patient resource. The dashboard needs only the identity,
//! the person's gender and age, and the four contact phone numbers, so the wire model ignores
//! every other key.
//!
//! Responsibilities:
//! - Define the domain-level [`PatientData`] carrier
//! - Define the wire model for (de)serialisation
//! - Normalise phone numbers that arrive as JSON numbers into strings

use crate::wire::{from_json_with_path, non_blank, TextOrNumber};
use crate::{OpenMrsError, OpenMrsResult};
use dashboard_uuid::PatientUuid;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Administrative gender as recorded by the clinical system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    /// Any other recorded value, kept verbatim.
    Other(String),
}

impl Gender {
    fn to_wire(&self) -> &str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other(value) => value,
        }
    }

    /// Parses the wire code. Blank values mean "not recorded" and yield `None`.
    fn from_wire(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        match trimmed {
            "" => None,
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            other => Some(Gender::Other(other.to_owned())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_wire())
    }
}

impl Serialize for Gender {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_wire())
    }
}

/// Domain-level carrier for patient data (flat structure).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientData {
    pub uuid: PatientUuid,
    pub gender: Option<Gender>,
    /// Age in whole years.
    pub age: Option<u32>,
    pub patient_phone_number: Option<String>,
    pub nextofkin_phone_number: Option<String>,
    pub partner_phone_number: Option<String>,
    pub alternative_phone_number: Option<String>,
}

impl PatientData {
    /// Creates a patient with only an identity; every other field is unrecorded.
    pub fn new(uuid: PatientUuid) -> Self {
        Self {
            uuid,
            gender: None,
            age: None,
            patient_phone_number: None,
            nextofkin_phone_number: None,
            partner_phone_number: None,
            alternative_phone_number: None,
        }
    }
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`OpenMrsError`] if:
    /// - the JSON does not match the patient wire schema (the message names the field path),
    /// - the `uuid` is not a valid patient identifier.
    pub fn parse(json_text: &str) -> OpenMrsResult<PatientData> {
        let wire: PatientWire = from_json_with_path(json_text, "Patient")?;
        wire_to_domain(wire)
    }

    /// Render a patient resource as pretty-printed JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`OpenMrsError`] if serialisation fails.
    pub fn render(data: &PatientData) -> OpenMrsResult<String> {
        let wire = domain_to_wire(data);
        serde_json::to_string_pretty(&wire)
            .map_err(|e| OpenMrsError::Translation(format!("Failed to serialise patient: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct PatientWire {
    uuid: String,

    #[serde(default)]
    person: PersonWire,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PersonWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    age: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    patient_phone_number: Option<TextOrNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    nextofkin_phone_number: Option<TextOrNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    partner_phone_number: Option<TextOrNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    alternative_phone_number: Option<TextOrNumber>,
}

// ============================================================================
// Translation helpers (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> OpenMrsResult<PatientData> {
    let uuid = PatientUuid::parse(&wire.uuid)
        .map_err(|e| OpenMrsError::InvalidUuid(format!("patient uuid: {e}")))?;
    let person = wire.person;

    Ok(PatientData {
        uuid,
        gender: person.gender.as_deref().and_then(Gender::from_wire),
        age: person.age,
        patient_phone_number: person.patient_phone_number.and_then(TextOrNumber::into_text),
        nextofkin_phone_number: person.nextofkin_phone_number.and_then(TextOrNumber::into_text),
        partner_phone_number: person.partner_phone_number.and_then(TextOrNumber::into_text),
        alternative_phone_number: person
            .alternative_phone_number
            .and_then(TextOrNumber::into_text),
    })
}

fn domain_to_wire(data: &PatientData) -> PatientWire {
    let phone = |value: &Option<String>| non_blank(value.clone()).map(TextOrNumber::Text);

    PatientWire {
        uuid: data.uuid.to_string(),
        person: PersonWire {
            gender: data.gender.as_ref().map(|g| g.to_wire().to_owned()),
            age: data.age,
            patient_phone_number: phone(&data.patient_phone_number),
            nextofkin_phone_number: phone(&data.nextofkin_phone_number),
            partner_phone_number: phone(&data.partner_phone_number),
            alternative_phone_number: phone(&data.alternative_phone_number),
        },
    }
}
