use crate::dto::HealthRes;

/// Simple health service shared by the API binaries.
///
/// This service provides a standardised way to check the health status of the AYUNEX system.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "AYUNEX is alive".into(),
        }
    }
}
