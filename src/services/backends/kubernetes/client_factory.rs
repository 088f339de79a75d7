use crate::services::backends::kubernetes::kubeconfig_loader::KubeConfigLoader;
use crate::services::cluster::{ClientFactory, ClientOptions};
use async_trait::async_trait;
use http::HeaderValue;
use http::header::USER_AGENT;
use kube::client::ClientBuilder;
use kube::{Client, Config};
use log::debug;
use std::sync::Arc;
use tower::limit::RateLimitLayer;

/// Builds clients for a real cluster, with the test path in the user agent and
/// client-side rate limiting.
pub struct KubeClientFactory {
    loader: Arc<dyn KubeConfigLoader>,
}

impl KubeClientFactory {
    pub fn new(loader: Arc<dyn KubeConfigLoader>) -> Self {
        KubeClientFactory { loader }
    }
}

#[async_trait]
impl ClientFactory for KubeClientFactory {
    async fn load_config(&self) -> anyhow::Result<Config> {
        self.loader.load().await
    }

    fn build_client(&self, mut config: Config, options: &ClientOptions) -> anyhow::Result<Client> {
        if let Some(user_agent) = &options.user_agent {
            config.headers.push((USER_AGENT, HeaderValue::from_str(user_agent)?));
        }
        let builder = ClientBuilder::try_from(config)?;
        match options.rate_limit() {
            Some((requests, period)) => {
                debug!("Limiting client to {} requests per {:?}", requests, period);
                Ok(builder.with_layer(&RateLimitLayer::new(requests, period)).build())
            }
            None => Ok(builder.build()),
        }
    }
}
