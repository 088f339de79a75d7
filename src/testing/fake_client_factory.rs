use crate::services::cluster::{ClientFactory, ClientOptions};
use crate::services::panics::locked;
use crate::testing::offline_client;
use anyhow::bail;
use async_trait::async_trait;
use kube::{Client, Config};
use std::sync::Mutex;

/// Client factory handing out offline clients and recording the options it was given.
#[derive(Default)]
pub struct FakeClientFactory {
    config_error: Option<String>,
    build_error: Option<String>,
    requests: Mutex<Vec<ClientOptions>>,
}

impl FakeClientFactory {
    pub fn failing_config(message: &str) -> Self {
        FakeClientFactory {
            config_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_build(message: &str) -> Self {
        FakeClientFactory {
            build_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<ClientOptions> {
        locked(&self.requests).clone()
    }
}

#[async_trait]
impl ClientFactory for FakeClientFactory {
    async fn load_config(&self) -> anyhow::Result<Config> {
        if let Some(message) = &self.config_error {
            bail!("{}", message);
        }
        Ok(Config::new("http://127.0.0.1:6443".parse()?))
    }

    fn build_client(&self, _config: Config, options: &ClientOptions) -> anyhow::Result<Client> {
        locked(&self.requests).push(options.clone());
        if let Some(message) = &self.build_error {
            bail!("{}", message);
        }
        Ok(offline_client())
    }
}
