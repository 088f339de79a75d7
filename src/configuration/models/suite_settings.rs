use crate::configuration::models::kube_config_settings::KubeConfigSettings;
use anyhow::Context;
use duration_string::DurationString;
use log::info;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Time allowed for the `default` service account to show up in a fresh namespace.
pub const DEFAULT_SERVICE_ACCOUNT_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Suite-wide switches shared by every framework instance of a test run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuiteSettings {
    /// When false, namespaces are always preserved.
    pub delete_namespace: bool,

    /// When false, namespaces of failed tests are preserved for inspection.
    pub delete_namespace_on_failure: bool,

    pub dump_logs_on_failure: bool,
    pub verify_service_account: bool,
    pub service_account_timeout: DurationString,
    pub kubeconfig: KubeConfigSettings,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        SuiteSettings {
            delete_namespace: true,
            delete_namespace_on_failure: true,
            dump_logs_on_failure: true,
            verify_service_account: true,
            service_account_timeout: DEFAULT_SERVICE_ACCOUNT_TIMEOUT.into(),
            kubeconfig: KubeConfigSettings::default(),
        }
    }
}

impl SuiteSettings {
    pub fn from_yaml(document: &str) -> anyhow::Result<Self> {
        Ok(serde_yml::from_str(document)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        info!("Loading suite settings from {:?}", path);
        let document = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_yaml(&document)
    }

    /// Whether namespaces should be deleted for a test with the given result.
    pub fn should_delete_namespaces(&self, test_failed: bool) -> bool {
        self.delete_namespace && (self.delete_namespace_on_failure || !test_failed)
    }
}
