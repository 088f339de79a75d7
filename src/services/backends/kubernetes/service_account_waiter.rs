use crate::services::cluster::ServiceAccountWaiter;
use anyhow::bail;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{Api, Client};
use log::debug;
use std::time::{Duration, Instant};

const DEFAULT_SERVICE_ACCOUNT_NAME: &str = "default";
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls for the `default` service account the cluster provisions in every namespace.
pub struct KubeServiceAccountWaiter {
    timeout: Duration,
}

impl KubeServiceAccountWaiter {
    pub fn new(timeout: Duration) -> Self {
        KubeServiceAccountWaiter { timeout }
    }
}

#[async_trait]
impl ServiceAccountWaiter for KubeServiceAccountWaiter {
    async fn wait_for_default_service_account(&self, client: &Client, namespace: &str) -> anyhow::Result<()> {
        let service_accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), namespace);
        let started = Instant::now();
        loop {
            if service_accounts.get_opt(DEFAULT_SERVICE_ACCOUNT_NAME).await?.is_some() {
                return Ok(());
            }
            if started.elapsed() > self.timeout {
                bail!(
                    "service account {:?} was not provisioned within {:?}",
                    DEFAULT_SERVICE_ACCOUNT_NAME,
                    self.timeout
                );
            }
            debug!("Service account {} not yet present in {}", DEFAULT_SERVICE_ACCOUNT_NAME, namespace);
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
