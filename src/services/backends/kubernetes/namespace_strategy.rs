use crate::services::cluster::NamespaceStrategy;
use crate::services::namespace::NamespaceRecord;
use crate::services::namespace::creation_error::NamespaceCreationError;
use crate::services::namespace::deletion_error::DeletionError;
use anyhow::anyhow;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Label identifying all namespaces created by one test process.
pub const RUN_LABEL: &str = "e2e-run";

const CREATION_ATTEMPTS: u32 = 3;
const CREATION_RETRY_INTERVAL: Duration = Duration::from_secs(2);
const DELETION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Creates namespaces through `generateName` and deletes them in the foreground,
/// polling until they are gone.
pub struct KubeNamespaceStrategy {
    run_id: String,
    poll_interval: Duration,
}

impl KubeNamespaceStrategy {
    pub fn new() -> Self {
        KubeNamespaceStrategy {
            run_id: Uuid::new_v4().to_string(),
            poll_interval: DELETION_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn namespace_definition(&self, base_name: &str, labels: &BTreeMap<String, String>) -> Namespace {
        let mut labels = labels.clone();
        labels.insert(RUN_LABEL.to_string(), self.run_id.clone());
        Namespace {
            metadata: ObjectMeta {
                generate_name: Some(format!("{}-", base_name)),
                labels: Some(labels),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl Default for KubeNamespaceStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamespaceStrategy for KubeNamespaceStrategy {
    async fn create_testing_namespace(
        &self,
        client: &Client,
        base_name: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<NamespaceRecord, NamespaceCreationError> {
        let namespaces: Api<Namespace> = Api::all(client.clone());
        let definition = self.namespace_definition(base_name, labels);

        let mut last_error = None;
        for attempt in 1..=CREATION_ATTEMPTS {
            match namespaces.create(&PostParams::default(), &definition).await {
                Ok(created) => {
                    let record = NamespaceRecord::try_from(&created)?;
                    info!("Namespace {} created successfully", record.name);
                    return Ok(record);
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} to create a namespace for {} failed: {}",
                        attempt, CREATION_ATTEMPTS, base_name, e
                    );
                    last_error = Some(e);
                }
            }
            if attempt < CREATION_ATTEMPTS {
                tokio::time::sleep(CREATION_RETRY_INTERVAL).await;
            }
        }

        let cause = match last_error {
            Some(e) => anyhow!(e),
            None => anyhow!("no namespace creation attempt was made"),
        };
        Err(NamespaceCreationError::new(cause))
    }

    async fn delete_namespace(&self, client: &Client, name: &str, timeout: Duration) -> Result<(), DeletionError> {
        let namespaces: Api<Namespace> = Api::all(client.clone());
        namespaces.delete(name, &DeleteParams::foreground()).await?;

        let started = Instant::now();
        while namespaces.get_opt(name).await?.is_some() {
            if started.elapsed() > timeout {
                return Err(DeletionError::timeout(timeout));
            }
            debug!("Waiting for namespace {} to be deleted", name);
            tokio::time::sleep(self.poll_interval).await;
        }
        Ok(())
    }
}
