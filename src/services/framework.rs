
pub mod status;
pub mod teardown;

use crate::configuration::models::framework_options::FrameworkOptions;
use crate::configuration::models::suite_settings::SuiteSettings;
use crate::services::cleanup_registry::{CleanupActionHandle, CleanupActionRegistry};
use crate::services::cluster::{ClientOptions, ClusterCollaborators, DEFAULT_USER_AGENT};
use crate::services::framework::status::{SetupError, TeardownError, TestFailure};
use crate::services::framework::teardown::{NamespaceDeletion, Teardown};
use crate::services::namespace::NamespaceRecord;
use crate::services::namespace::creation_error::NamespaceCreationError;
use crate::services::panics::{locked, panic_message};
use anyhow::anyhow;
use futures::FutureExt;
use kube::Client;
use log::{debug, info};
use maplit::btreemap;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Label put on every namespace created by [`Framework::before_each`].
pub const FRAMEWORK_LABEL: &str = "e2e-framework";

pub type AfterEachAction = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed,
    /// Teardown triggered by draining the cleanup registry, the test never finished.
    Aborted,
}

impl TestOutcome {
    pub fn is_failed(self) -> bool {
        self != TestOutcome::Passed
    }
}

#[derive(Default)]
pub(crate) struct FrameworkState {
    unique_name: Option<String>,
    namespace: Option<NamespaceRecord>,
    namespaces_to_delete: Vec<NamespaceRecord>,
    client: Option<Client>,
    cleanup_handle: Option<CleanupActionHandle>,
    after_each_actions: Vec<AfterEachAction>,
}

/// Per-test state holder: a cluster client, the namespaces created for the test and the
/// guarantee that those namespaces are removed once the test is over.
///
/// Clones share the same state, so a clone can be handed to the test body.
#[derive(Clone)]
pub struct Framework {
    base_name: String,
    options: FrameworkOptions,
    settings: Arc<SuiteSettings>,
    cluster: ClusterCollaborators,
    registry: Arc<CleanupActionRegistry>,
    supplied_client: Option<Client>,
    state: Arc<Mutex<FrameworkState>>,
}

impl Framework {
    pub fn new(
        base_name: impl Into<String>,
        options: FrameworkOptions,
        settings: Arc<SuiteSettings>,
        cluster: ClusterCollaborators,
        registry: Arc<CleanupActionRegistry>,
    ) -> Self {
        Framework {
            base_name: base_name.into(),
            options,
            settings,
            cluster,
            registry,
            supplied_client: None,
            state: Arc::new(Mutex::new(FrameworkState::default())),
        }
    }

    /// Framework talking to the cluster described by `settings`, using the process-wide
    /// cleanup registry.
    pub fn new_default(base_name: impl Into<String>, settings: Arc<SuiteSettings>) -> Self {
        let cluster = ClusterCollaborators::kubernetes(&settings);
        Framework::new(
            base_name,
            FrameworkOptions::default(),
            settings,
            cluster,
            CleanupActionRegistry::shared(),
        )
    }

    /// Uses `client` for every test instead of building one from the cluster configuration.
    pub fn with_client(mut self, client: Client) -> Self {
        self.supplied_client = Some(client);
        self
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn options(&self) -> &FrameworkOptions {
        &self.options
    }

    pub fn unique_name(&self) -> Option<String> {
        self.state().unique_name.clone()
    }

    pub fn namespace(&self) -> Option<NamespaceRecord> {
        self.state().namespace.clone()
    }

    pub fn client(&self) -> Option<Client> {
        self.state().client.clone()
    }

    pub fn namespaces_to_delete(&self) -> Vec<NamespaceRecord> {
        self.state().namespaces_to_delete.clone()
    }

    pub fn cleanup_handle(&self) -> Option<CleanupActionHandle> {
        self.state().cleanup_handle
    }

    /// Prepares a test: registers the teardown with the cleanup registry, builds the
    /// cluster client if needed and creates the test namespace.
    pub async fn before_each(&self, test_path: &[&str]) -> Result<(), SetupError> {
        let teardown = self.teardown();
        let handle = self
            .registry
            .add(move || async move {
                teardown.run(TestOutcome::Aborted).await?;
                Ok::<(), anyhow::Error>(())
            })
            .await;
        self.state().cleanup_handle = Some(handle);

        let existing = self.client().or_else(|| self.supplied_client.clone());
        let client = match existing {
            Some(client) => client,
            None => self.create_client(test_path).await?,
        };
        self.state().client = Some(client.clone());
        self.cluster.provider.framework_before_each(&self.base_name);

        if self.options.skip_namespace_creation {
            // not guaranteed to be unique, but very likely
            let unique_name = format!("{}-{:08x}", self.base_name, Uuid::new_v4().as_fields().0);
            debug!("Skipping namespace creation, using unique name {}", unique_name);
            self.state().unique_name = Some(unique_name);
            return Ok(());
        }

        info!("STEP: Building a namespace api object, basename {}", self.base_name);
        let labels = btreemap! {
            FRAMEWORK_LABEL.to_string() => self.base_name.clone(),
        };
        let namespace = self
            .create_namespace(&self.base_name, labels)
            .await
            .map_err(SetupError::NamespaceCreation)?;
        self.state().namespace = Some(namespace.clone());

        if self.settings.verify_service_account && !self.options.skip_service_account_wait {
            info!(
                "STEP: Waiting for a default service account to be provisioned in namespace {}",
                namespace.name
            );
            self.cluster
                .service_accounts
                .wait_for_default_service_account(&client, &namespace.name)
                .await
                .map_err(|cause| SetupError::ServiceAccount {
                    namespace: namespace.name.clone(),
                    cause,
                })?;
        } else {
            info!("Skipping waiting for service account");
        }

        self.state().unique_name = Some(namespace.name);
        Ok(())
    }

    /// Tears a test down. Must be called even when `before_each` failed half way.
    pub async fn after_each(&self, outcome: TestOutcome) -> Result<NamespaceDeletion, TeardownError> {
        let handle = self.state().cleanup_handle.take();
        if let Some(handle) = handle {
            self.registry.remove(handle).await;
        }
        self.teardown().run(outcome).await
    }

    /// Creates a namespace and tracks it for deletion. A namespace that came back with an
    /// error is tracked as well.
    pub async fn create_namespace(
        &self,
        base_name: &str,
        labels: BTreeMap<String, String>,
    ) -> Result<NamespaceRecord, NamespaceCreationError> {
        let client = self.client().ok_or_else(|| {
            NamespaceCreationError::new(anyhow!("framework has no cluster client, before_each did not run"))
        })?;
        let result = self
            .cluster
            .namespaces
            .create_testing_namespace(&client, base_name, &labels)
            .await;
        let created = match &result {
            Ok(namespace) => Some(namespace.clone()),
            Err(e) => e.namespace.clone(),
        };
        self.add_namespaces_to_delete(created);
        result
    }

    /// Adds namespaces to be deleted when the test completes.
    pub fn add_namespaces_to_delete(&self, namespaces: impl IntoIterator<Item = NamespaceRecord>) {
        self.state().namespaces_to_delete.extend(namespaces);
    }

    /// Registers a callback executed during teardown, before namespaces are deleted.
    /// Callbacks run in registration order.
    pub fn add_after_each_action<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.state().after_each_actions.push(Box::new(action));
    }

    /// Runs `body` between `before_each` and `after_each`. The body receives a clone of the
    /// framework; an error or panic from it fails the test.
    pub async fn run<F, Fut>(&self, test_path: &[&str], body: F) -> Result<NamespaceDeletion, TestFailure>
    where
        F: FnOnce(Framework) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let setup = self.before_each(test_path).await;
        let body_result = match setup {
            Ok(()) => {
                let framework = self.clone();
                let outcome = AssertUnwindSafe(async move { body(framework).await })
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(format!("{:#}", e)),
                    Err(payload) => Err(panic_message(payload.as_ref())),
                }
            }
            Err(_) => Ok(()),
        };

        let outcome = match (&setup, &body_result) {
            (Ok(()), Ok(())) => TestOutcome::Passed,
            _ => TestOutcome::Failed,
        };
        let teardown = self.after_each(outcome).await;

        match (setup, body_result, teardown) {
            (Err(error), _, teardown) => Err(TestFailure::Setup {
                error,
                teardown: teardown.err(),
            }),
            (Ok(()), Err(message), teardown) => Err(TestFailure::Assertion {
                message,
                teardown: teardown.err(),
            }),
            (Ok(()), Ok(()), Err(error)) => Err(TestFailure::Teardown(error)),
            (Ok(()), Ok(()), Ok(deletion)) => Ok(deletion),
        }
    }

    async fn create_client(&self, test_path: &[&str]) -> Result<Client, SetupError> {
        info!("STEP: Creating a kubernetes client");
        let config = self
            .cluster
            .client_factory
            .load_config()
            .await
            .map_err(SetupError::ClientConfiguration)?;
        let user_agent = if test_path.is_empty() {
            None
        } else {
            Some(format!("{} -- {}", DEFAULT_USER_AGENT, test_path.join(" ")))
        };
        let client_options = ClientOptions {
            user_agent,
            qps: self.options.client_qps,
            burst: self.options.client_burst,
        };
        self.cluster
            .client_factory
            .build_client(config, &client_options)
            .map_err(SetupError::ClientConstruction)
    }

    fn teardown(&self) -> Teardown {
        Teardown {
            base_name: self.base_name.clone(),
            skip_namespace_creation: self.options.skip_namespace_creation,
            deletion_timeout: self.options.namespace_deletion_timeout(),
            settings: self.settings.clone(),
            cluster: self.cluster.clone(),
            state: self.state.clone(),
        }
    }

    fn state(&self) -> MutexGuard<'_, FrameworkState> {
        locked(&self.state)
    }
}
