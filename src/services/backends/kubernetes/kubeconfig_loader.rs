use crate::configuration::models::kube_config_settings::KubeConfigSettings;
use anyhow::bail;
use async_trait::async_trait;
use kube::Config;
use kube::config::Kubeconfig;
use log::{debug, info};
use serde_yml::from_str;
use std::process::Command;
use std::sync::Arc;

pub fn from_command(command: impl Into<String>) -> Arc<dyn KubeConfigLoader> {
    Arc::new(ExecutableKubeConfigLoader {
        command: command.into(),
    })
}

pub fn from_file(path: impl Into<String>) -> Arc<dyn KubeConfigLoader> {
    Arc::new(FileKubeConfigLoader { path: path.into() })
}

pub fn from_environment() -> Arc<dyn KubeConfigLoader> {
    Arc::new(InferredKubeConfigLoader)
}

pub fn from_settings(settings: &KubeConfigSettings) -> Arc<dyn KubeConfigLoader> {
    match settings {
        KubeConfigSettings::Command(command) => from_command(command.clone()),
        KubeConfigSettings::File(path) => from_file(path.clone()),
        KubeConfigSettings::Environment => from_environment(),
    }
}

#[async_trait]
pub trait KubeConfigLoader: Send + Sync {
    async fn load(&self) -> anyhow::Result<Config>;
}

struct ExecutableKubeConfigLoader {
    command: String,
}

#[async_trait]
impl KubeConfigLoader for ExecutableKubeConfigLoader {
    async fn load(&self) -> anyhow::Result<Config> {
        info!("Loading kubeconfig with command: {:?}", self.command);
        let output = Command::new("sh").arg("-c").arg(&self.command).output()?;
        if !output.status.success() {
            bail!(
                "Failed to execute command: {:?}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        let kubeconfig_string = String::from_utf8(output.stdout)?;
        debug!("Kubeconfig used by the tests:\n{:?}", kubeconfig_string);
        let kubeconfig: Kubeconfig = from_str(&kubeconfig_string)?;
        Ok(Config::from_custom_kubeconfig(kubeconfig, &Default::default()).await?)
    }
}

struct FileKubeConfigLoader {
    path: String,
}

#[async_trait]
impl KubeConfigLoader for FileKubeConfigLoader {
    async fn load(&self) -> anyhow::Result<Config> {
        info!("Loading kubeconfig file: {:?}", self.path);
        let kubeconfig_string = std::fs::read_to_string(&self.path)?;
        let kubeconfig: Kubeconfig = from_str(&kubeconfig_string)?;
        Ok(Config::from_custom_kubeconfig(kubeconfig, &Default::default()).await?)
    }
}

struct InferredKubeConfigLoader;

#[async_trait]
impl KubeConfigLoader for InferredKubeConfigLoader {
    async fn load(&self) -> anyhow::Result<Config> {
        info!("Inferring Kubernetes configuration from the environment");
        Ok(Config::infer().await?)
    }
}
