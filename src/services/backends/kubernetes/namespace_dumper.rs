use crate::services::cluster::NamespaceDumper;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Event, Pod};
use kube::api::ListParams;
use kube::{Api, Client};
use log::info;

/// Logs the events and pod phases of a namespace, used after failed tests.
pub struct KubeNamespaceDumper;

#[async_trait]
impl NamespaceDumper for KubeNamespaceDumper {
    async fn dump_namespace_info(&self, client: &Client, namespace: &str) -> anyhow::Result<()> {
        info!("Collecting events from namespace {:?}.", namespace);
        let events: Api<Event> = Api::namespaced(client.clone(), namespace);
        let event_list = events.list(&ListParams::default()).await?;
        info!("Found {} events.", event_list.items.len());
        for event in &event_list.items {
            info!(
                "{} {}: {} {}: {}",
                event.involved_object.kind.as_deref().unwrap_or("<unknown>"),
                event.involved_object.name.as_deref().unwrap_or("<unknown>"),
                event.type_.as_deref().unwrap_or("Normal"),
                event.reason.as_deref().unwrap_or(""),
                event.message.as_deref().unwrap_or("")
            );
        }

        let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
        for pod in pods.list(&ListParams::default()).await?.items {
            let phase = pod.status.as_ref().and_then(|status| status.phase.as_deref()).unwrap_or("Unknown");
            info!(
                "Pod {} is {}: {}",
                pod.metadata.name.as_deref().unwrap_or("<unknown>"),
                phase,
                serde_json::to_string(&pod.status)?
            );
        }
        Ok(())
    }
}
