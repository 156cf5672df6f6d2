//! Contacts display state.
//!
//! The contacts panel shows the four phone numbers held on the currently loaded patient. The
//! state is derived afresh from each patient value; nothing is diffed or merged with what was
//! shown before.

use crate::providers::PatientProvider;
use crate::DashboardResult;
use dashboard_uuid::PatientUuid;
use openmrs::PatientData;
use serde::Serialize;

/// Display state for the contacts panel.
///
/// The default value is the empty placeholder shown when no patient is selected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContactsDisplay {
    /// The full record, kept for rendering.
    pub patient: Option<PatientData>,
    pub patient_phone_number: Option<String>,
    pub nextofkin_phone_number: Option<String>,
    pub partner_phone_number: Option<String>,
    pub alternative_phone_number: Option<String>,
}

impl ContactsDisplay {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derives the display state for `patient`. `None` yields the empty placeholder.
    pub fn derive(patient: Option<&PatientData>) -> Self {
        let Some(patient) = patient else {
            return Self::empty();
        };

        Self {
            patient: Some(patient.clone()),
            patient_phone_number: patient.patient_phone_number.clone(),
            nextofkin_phone_number: patient.nextofkin_phone_number.clone(),
            partner_phone_number: patient.partner_phone_number.clone(),
            alternative_phone_number: patient.alternative_phone_number.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patient.is_none()
    }
}

/// Looks up a patient and derives its contacts display state.
#[derive(Clone, Debug)]
pub struct ContactsService<P> {
    patients: P,
}

impl<P: PatientProvider> ContactsService<P> {
    pub fn new(patients: P) -> Self {
        Self { patients }
    }

    /// Returns the contacts state for `uuid`; an unknown patient yields the empty placeholder.
    ///
    /// # Errors
    ///
    /// Propagates provider failures.
    pub fn contacts(&self, uuid: &PatientUuid) -> DashboardResult<ContactsDisplay> {
        let patient = self.patients.patient_by_uuid(uuid)?;
        Ok(ContactsDisplay::derive(patient.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DashboardError;

    fn patient() -> PatientData {
        let mut patient = PatientData::new(PatientUuid::new());
        patient.patient_phone_number = Some("0722000111".into());
        patient.nextofkin_phone_number = Some("0733000222".into());
        patient.partner_phone_number = None;
        patient.alternative_phone_number = Some("0744000333".into());
        patient
    }

    struct OnePatient(PatientData);

    impl PatientProvider for OnePatient {
        fn patient_by_uuid(&self, uuid: &PatientUuid) -> DashboardResult<Option<PatientData>> {
            Ok((self.0.uuid == *uuid).then(|| self.0.clone()))
        }
    }

    struct Offline;

    impl PatientProvider for Offline {
        fn patient_by_uuid(&self, _uuid: &PatientUuid) -> DashboardResult<Option<PatientData>> {
            Err(DashboardError::FileRead(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "offline",
            )))
        }
    }

    #[test]
    fn no_patient_yields_placeholder() {
        let display = ContactsDisplay::derive(None);
        assert!(display.is_empty());
        assert_eq!(display, ContactsDisplay::empty());
    }

    #[test]
    fn copies_phone_numbers() {
        let patient = patient();
        let display = ContactsDisplay::derive(Some(&patient));
        assert_eq!(display.patient.as_ref(), Some(&patient));
        assert_eq!(display.patient_phone_number.as_deref(), Some("0722000111"));
        assert_eq!(display.nextofkin_phone_number.as_deref(), Some("0733000222"));
        assert_eq!(display.partner_phone_number, None);
        assert_eq!(display.alternative_phone_number.as_deref(), Some("0744000333"));
    }

    #[test]
    fn later_patient_replaces_earlier_state() {
        let first = patient();
        let second = PatientData::new(PatientUuid::new());
        let _ = ContactsDisplay::derive(Some(&first));
        let display = ContactsDisplay::derive(Some(&second));
        assert_eq!(display.patient_phone_number, None);
        assert_eq!(display.patient.map(|p| p.uuid), Some(second.uuid));
    }

    #[test]
    fn service_handles_unknown_patient() {
        let service = ContactsService::new(OnePatient(patient()));
        let display = service.contacts(&PatientUuid::new()).unwrap();
        assert!(display.is_empty());
    }

    #[test]
    fn service_derives_known_patient() {
        let patient = patient();
        let service = ContactsService::new(OnePatient(patient.clone()));
        let display = service.contacts(&patient.uuid).unwrap();
        assert_eq!(display, ContactsDisplay::derive(Some(&patient)));
    }

    #[test]
    fn service_propagates_provider_errors() {
        let service = ContactsService::new(Offline);
        assert!(service.contacts(&PatientUuid::new()).is_err());
    }
}
