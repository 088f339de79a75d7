
pub mod creation_error;
pub mod deletion_error;

use anyhow::anyhow;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::BTreeMap;

/// A namespace created for a test and scheduled for deletion when the test ends.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceRecord {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub creation_timestamp: Option<Time>,
}

impl NamespaceRecord {
    pub fn new(name: impl Into<String>, labels: BTreeMap<String, String>) -> Self {
        NamespaceRecord {
            name: name.into(),
            labels,
            creation_timestamp: None,
        }
    }
}

impl TryFrom<&Namespace> for NamespaceRecord {
    type Error = anyhow::Error;

    fn try_from(namespace: &Namespace) -> Result<Self, Self::Error> {
        let name = namespace
            .metadata
            .name
            .clone()
            .ok_or_else(|| anyhow!("Namespace returned by the cluster has no name"))?;
        Ok(NamespaceRecord {
            name,
            labels: namespace.metadata.labels.clone().unwrap_or_default(),
            creation_timestamp: namespace.metadata.creation_timestamp.clone(),
        })
    }
}
