use crate::HealthRes;

/// Health check served by the REST API.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Returns a `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Patient dashboard is alive".into(),
        }
    }
}
