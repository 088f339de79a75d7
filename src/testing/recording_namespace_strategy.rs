use crate::services::cluster::NamespaceStrategy;
use crate::services::namespace::NamespaceRecord;
use crate::services::namespace::creation_error::NamespaceCreationError;
use crate::services::namespace::deletion_error::{DeletionError, DeletionErrorKind};
use crate::services::panics::locked;
use anyhow::anyhow;
use async_trait::async_trait;
use kube::Client;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted answer for deleting one namespace.
#[derive(Debug, Clone)]
pub enum ScriptedDeletion {
    Succeed,
    NotFound,
    Fail(DeletionErrorKind, String),
    /// Never completes, so the framework's deletion timeout has to kick in.
    Hang,
    Panic,
}

#[derive(Debug, Clone)]
enum ScriptedCreationFailure {
    Failed(String),
    Partial(String),
}

/// Namespace strategy that hands out scripted names and deletion results and
/// remembers every call it received.
#[derive(Default)]
pub struct RecordingNamespaceStrategy {
    names: Mutex<VecDeque<String>>,
    creation_failure: Mutex<Option<ScriptedCreationFailure>>,
    deletions: Mutex<HashMap<String, ScriptedDeletion>>,
    created: Mutex<Vec<NamespaceRecord>>,
    delete_calls: Mutex<Vec<String>>,
}

impl RecordingNamespaceStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names returned by the next creations, in order. Once exhausted, names are
    /// generated from the base name.
    pub fn with_names<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        locked(&self.names).extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_deletion(self, name: &str, deletion: ScriptedDeletion) -> Self {
        locked(&self.deletions).insert(name.to_string(), deletion);
        self
    }

    /// The next creation fails without returning a namespace.
    pub fn fail_next_creation(&self, message: &str) {
        *locked(&self.creation_failure) = Some(ScriptedCreationFailure::Failed(message.to_string()));
    }

    /// The next creation returns a namespace together with an error.
    pub fn partially_fail_next_creation(&self, message: &str) {
        *locked(&self.creation_failure) = Some(ScriptedCreationFailure::Partial(message.to_string()));
    }

    pub fn created(&self) -> Vec<NamespaceRecord> {
        locked(&self.created).clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        locked(&self.delete_calls).clone()
    }

    fn next_name(&self, base_name: &str) -> String {
        let scripted = locked(&self.names).pop_front();
        scripted.unwrap_or_else(|| format!("{}-{:04x}", base_name, locked(&self.created).len()))
    }
}

#[async_trait]
impl NamespaceStrategy for RecordingNamespaceStrategy {
    async fn create_testing_namespace(
        &self,
        _client: &Client,
        base_name: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<NamespaceRecord, NamespaceCreationError> {
        let failure = locked(&self.creation_failure).take();
        if let Some(ScriptedCreationFailure::Failed(message)) = failure {
            return Err(NamespaceCreationError::new(anyhow!(message)));
        }

        let namespace = NamespaceRecord::new(self.next_name(base_name), labels.clone());
        locked(&self.created).push(namespace.clone());
        match failure {
            Some(ScriptedCreationFailure::Partial(message)) => {
                Err(NamespaceCreationError::new(anyhow!(message)).with_namespace(namespace))
            }
            _ => Ok(namespace),
        }
    }

    async fn delete_namespace(&self, _client: &Client, name: &str, _timeout: Duration) -> Result<(), DeletionError> {
        locked(&self.delete_calls).push(name.to_string());
        let scripted = locked(&self.deletions).get(name).cloned();
        match scripted.unwrap_or(ScriptedDeletion::Succeed) {
            ScriptedDeletion::Succeed => Ok(()),
            ScriptedDeletion::NotFound => Err(DeletionError::not_found(name)),
            ScriptedDeletion::Fail(kind, message) => Err(DeletionError::new(kind, message)),
            ScriptedDeletion::Hang => {
                futures::future::pending::<()>().await;
                Ok(())
            }
            ScriptedDeletion::Panic => panic!("deleting {} exploded", name),
        }
    }
}
