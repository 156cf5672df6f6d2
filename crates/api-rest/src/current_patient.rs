//! The currently loaded patient, shared by every request.
//!
//! Backed by a `tokio::sync::watch` channel: every subscriber sees the latest value immediately,
//! including subscribers that join after it was published, and `None` means no patient is
//! selected. Subscriptions end when the receiver is dropped.

use dashboard_core::{ContactsDisplay, PatientData, PatientUuid};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct CurrentPatient {
    tx: Arc<watch::Sender<Option<PatientData>>>,
}

impl CurrentPatient {
    /// Starts with no patient selected.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Publishes a new current patient (or `None` to clear), replacing the previous one.
    pub fn publish(&self, patient: Option<PatientData>) {
        let uuid = patient.as_ref().map(|p| p.uuid);
        self.tx.send_replace(patient);
        match uuid {
            Some(uuid) => tracing::info!(patient = %uuid, "current patient loaded"),
            None => tracing::info!("current patient cleared"),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PatientData>> {
        self.tx.subscribe()
    }

    pub fn current_uuid(&self) -> Option<PatientUuid> {
        self.tx.borrow().as_ref().map(|p| p.uuid)
    }

    /// Contacts display state for the latest published value.
    pub fn contacts(&self) -> ContactsDisplay {
        ContactsDisplay::derive(self.tx.borrow().as_ref())
    }
}

impl Default for CurrentPatient {
    fn default() -> Self {
        Self::new()
    }
}
