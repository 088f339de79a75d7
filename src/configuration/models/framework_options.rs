use duration_string::DurationString;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound for deleting a single namespace during teardown.
pub const DEFAULT_NAMESPACE_DELETION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Per-framework settings, fixed when the framework is constructed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameworkOptions {
    pub client_qps: f32,
    pub client_burst: u32,
    pub skip_namespace_creation: bool,
    pub skip_service_account_wait: bool,
    pub namespace_deletion_timeout: Option<DurationString>,
}

impl Default for FrameworkOptions {
    fn default() -> Self {
        FrameworkOptions {
            client_qps: 20.0,
            client_burst: 50,
            skip_namespace_creation: false,
            skip_service_account_wait: false,
            namespace_deletion_timeout: None,
        }
    }
}

impl FrameworkOptions {
    pub fn with_skip_namespace_creation(mut self, skip: bool) -> Self {
        self.skip_namespace_creation = skip;
        self
    }

    pub fn with_skip_service_account_wait(mut self, skip: bool) -> Self {
        self.skip_service_account_wait = skip;
        self
    }

    pub fn with_namespace_deletion_timeout(mut self, timeout: Duration) -> Self {
        self.namespace_deletion_timeout = Some(timeout.into());
        self
    }

    pub fn with_rate_limit(mut self, qps: f32, burst: u32) -> Self {
        self.client_qps = qps;
        self.client_burst = burst;
        self
    }

    pub fn namespace_deletion_timeout(&self) -> Duration {
        self.namespace_deletion_timeout
            .map(Duration::from)
            .unwrap_or(DEFAULT_NAMESPACE_DELETION_TIMEOUT)
    }
}
