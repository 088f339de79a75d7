
use crate::configuration::models::suite_settings::SuiteSettings;
use crate::services::backends::kubernetes::client_factory::KubeClientFactory;
use crate::services::backends::kubernetes::kubeconfig_loader;
use crate::services::backends::kubernetes::namespace_dumper::KubeNamespaceDumper;
use crate::services::backends::kubernetes::namespace_strategy::KubeNamespaceStrategy;
use crate::services::backends::kubernetes::service_account_waiter::KubeServiceAccountWaiter;
use crate::services::namespace::NamespaceRecord;
use crate::services::namespace::creation_error::NamespaceCreationError;
use crate::services::namespace::deletion_error::DeletionError;
use async_trait::async_trait;
use kube::{Client, Config};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// User agent reported by framework clients, extended with the test path.
pub const DEFAULT_USER_AGENT: &str = concat!("e2e-framework/", env!("CARGO_PKG_VERSION"));

/// Settings applied to a client built for one test.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub user_agent: Option<String>,
    pub qps: f32,
    pub burst: u32,
}

impl ClientOptions {
    /// `burst` requests per `burst / qps` seconds, or `None` when limiting is disabled.
    pub fn rate_limit(&self) -> Option<(u64, Duration)> {
        if self.qps <= 0.0 || self.burst == 0 {
            return None;
        }
        let period = Duration::from_secs_f64(f64::from(self.burst) / f64::from(self.qps));
        Some((u64::from(self.burst), period))
    }
}

#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn load_config(&self) -> anyhow::Result<Config>;

    fn build_client(&self, config: Config, options: &ClientOptions) -> anyhow::Result<Client>;
}

#[async_trait]
pub trait NamespaceStrategy: Send + Sync {
    /// Creates a namespace whose name is generated from `base_name`.
    async fn create_testing_namespace(
        &self,
        client: &Client,
        base_name: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<NamespaceRecord, NamespaceCreationError>;

    /// Deletes the namespace and waits until it is gone, for at most `timeout`.
    async fn delete_namespace(&self, client: &Client, name: &str, timeout: Duration) -> Result<(), DeletionError>;
}

#[async_trait]
pub trait ServiceAccountWaiter: Send + Sync {
    async fn wait_for_default_service_account(&self, client: &Client, namespace: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait NamespaceDumper: Send + Sync {
    async fn dump_namespace_info(&self, client: &Client, namespace: &str) -> anyhow::Result<()>;
}

/// Cloud provider specific steps executed around every test.
pub trait ProviderHooks: Send + Sync {
    fn framework_before_each(&self, _base_name: &str) {}

    fn framework_after_each(&self, _base_name: &str) {}
}

pub struct NullProvider;

impl ProviderHooks for NullProvider {}

/// Everything the framework needs from the cluster.
#[derive(Clone)]
pub struct ClusterCollaborators {
    pub client_factory: Arc<dyn ClientFactory>,
    pub namespaces: Arc<dyn NamespaceStrategy>,
    pub service_accounts: Arc<dyn ServiceAccountWaiter>,
    pub dumper: Arc<dyn NamespaceDumper>,
    pub provider: Arc<dyn ProviderHooks>,
}

impl ClusterCollaborators {
    /// Collaborators talking to a real cluster, configured from the suite settings.
    pub fn kubernetes(settings: &SuiteSettings) -> Self {
        let loader = kubeconfig_loader::from_settings(&settings.kubeconfig);
        ClusterCollaborators {
            client_factory: Arc::new(KubeClientFactory::new(loader)),
            namespaces: Arc::new(KubeNamespaceStrategy::new()),
            service_accounts: Arc::new(KubeServiceAccountWaiter::new(settings.service_account_timeout.into())),
            dumper: Arc::new(KubeNamespaceDumper),
            provider: Arc::new(NullProvider),
        }
    }

    pub fn with_client_factory(mut self, client_factory: Arc<dyn ClientFactory>) -> Self {
        self.client_factory = client_factory;
        self
    }

    pub fn with_namespace_strategy(mut self, namespaces: Arc<dyn NamespaceStrategy>) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_service_account_waiter(mut self, service_accounts: Arc<dyn ServiceAccountWaiter>) -> Self {
        self.service_accounts = service_accounts;
        self
    }

    pub fn with_dumper(mut self, dumper: Arc<dyn NamespaceDumper>) -> Self {
        self.dumper = dumper;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ProviderHooks>) -> Self {
        self.provider = provider;
        self
    }
}
