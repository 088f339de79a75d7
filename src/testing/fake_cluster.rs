use crate::services::cluster::ClusterCollaborators;
use crate::testing::fake_client_factory::FakeClientFactory;
use crate::testing::recording_collaborators::{RecordingDumper, RecordingProvider, RecordingServiceAccountWaiter};
use crate::testing::recording_namespace_strategy::RecordingNamespaceStrategy;
use std::sync::Arc;

/// A full set of fake collaborators, kept as concrete types so tests can inspect them.
#[derive(Clone, Default)]
pub struct FakeCluster {
    pub client_factory: Arc<FakeClientFactory>,
    pub namespaces: Arc<RecordingNamespaceStrategy>,
    pub service_accounts: Arc<RecordingServiceAccountWaiter>,
    pub dumper: Arc<RecordingDumper>,
    pub provider: Arc<RecordingProvider>,
}

impl FakeCluster {
    pub fn with_client_factory(mut self, client_factory: FakeClientFactory) -> Self {
        self.client_factory = Arc::new(client_factory);
        self
    }

    pub fn with_namespaces(mut self, namespaces: RecordingNamespaceStrategy) -> Self {
        self.namespaces = Arc::new(namespaces);
        self
    }

    pub fn with_service_accounts(mut self, service_accounts: RecordingServiceAccountWaiter) -> Self {
        self.service_accounts = Arc::new(service_accounts);
        self
    }

    pub fn with_dumper(mut self, dumper: RecordingDumper) -> Self {
        self.dumper = Arc::new(dumper);
        self
    }

    pub fn collaborators(&self) -> ClusterCollaborators {
        ClusterCollaborators {
            client_factory: self.client_factory.clone(),
            namespaces: self.namespaces.clone(),
            service_accounts: self.service_accounts.clone(),
            dumper: self.dumper.clone(),
            provider: self.provider.clone(),
        }
    }
}
