use crate::configuration::models::suite_settings::SuiteSettings;
use crate::services::cluster::ClusterCollaborators;
use crate::services::framework::status::TeardownError;
use crate::services::framework::{FrameworkState, TestOutcome};
use crate::services::namespace::NamespaceRecord;
use crate::services::namespace::deletion_error::DeletionError;
use crate::services::panics::{locked, panic_message};
use futures::FutureExt;
use kube::Client;
use log::{error, info, warn};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Why namespaces were left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `delete_namespace` is off for the whole suite.
    Disabled,
    /// The test failed and `delete_namespace_on_failure` is off.
    PreservedOnFailure,
}

/// What teardown did with the tracked namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceDeletion {
    Completed {
        deleted: Vec<String>,
        already_gone: Vec<String>,
    },
    Skipped {
        reason: SkipReason,
        preserved: Vec<String>,
    },
}

/// The part of a framework needed to tear a test down. It is captured by the cleanup
/// action registered with the registry, so it must not reference the registry itself.
#[derive(Clone)]
pub(crate) struct Teardown {
    pub base_name: String,
    pub skip_namespace_creation: bool,
    pub deletion_timeout: Duration,
    pub settings: Arc<SuiteSettings>,
    pub cluster: ClusterCollaborators,
    pub state: Arc<Mutex<FrameworkState>>,
}

impl Teardown {
    /// Dumps diagnostics, runs the after-each callbacks and the provider hook, then
    /// deletes the tracked namespaces and resets the framework state. Deletion and reset
    /// happen even if a callback panicked; the first such panic is resumed afterwards.
    /// A panicking deletion is reported as a failure of that namespace only.
    pub async fn run(self, outcome: TestOutcome) -> Result<NamespaceDeletion, TeardownError> {
        let (namespace, client, actions) = {
            let mut state = locked(&self.state);
            (
                state.namespace.clone(),
                state.client.clone(),
                std::mem::take(&mut state.after_each_actions),
            )
        };

        if outcome.is_failed() && self.settings.dump_logs_on_failure && !self.skip_namespace_creation {
            if let (Some(client), Some(namespace)) = (&client, &namespace) {
                self.dump_namespace_info(client, &namespace.name).await;
            }
        }

        let mut pending_panic: Option<Box<dyn Any + Send>> = None;
        for action in actions {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(action)) {
                error!("After-each action panicked: {}", panic_message(payload.as_ref()));
                pending_panic.get_or_insert(payload);
            }
        }
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| {
            self.cluster.provider.framework_after_each(&self.base_name)
        })) {
            error!("Provider after-each hook panicked: {}", panic_message(payload.as_ref()));
            pending_panic.get_or_insert(payload);
        }

        let result = self.delete_namespaces(outcome).await;

        {
            let mut state = locked(&self.state);
            state.namespace = None;
            state.client = None;
            state.namespaces_to_delete.clear();
        }

        if let Some(payload) = pending_panic {
            if let Err(e) = &result {
                error!("{}", e);
            }
            resume_unwind(payload);
        }
        result
    }

    async fn dump_namespace_info(&self, client: &Client, namespace: &str) {
        let dump = AssertUnwindSafe(self.cluster.dumper.dump_namespace_info(client, namespace))
            .catch_unwind()
            .await;
        match dump {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to dump namespace {} info: {:#}", namespace, e),
            Err(payload) => error!(
                "Dumping namespace {} info panicked: {}",
                namespace,
                panic_message(payload.as_ref())
            ),
        }
    }

    async fn delete_namespaces(&self, outcome: TestOutcome) -> Result<NamespaceDeletion, TeardownError> {
        let (namespaces, client) = {
            let mut state = locked(&self.state);
            (std::mem::take(&mut state.namespaces_to_delete), state.client.clone())
        };

        if !self.settings.should_delete_namespaces(outcome.is_failed()) {
            let reason = if !self.settings.delete_namespace {
                info!("Found delete_namespace=false, skipping namespace deletion!");
                SkipReason::Disabled
            } else {
                info!("Found delete_namespace_on_failure=false and current test failed, skipping namespace deletion!");
                SkipReason::PreservedOnFailure
            };
            return Ok(NamespaceDeletion::Skipped {
                reason,
                preserved: namespaces.into_iter().map(|namespace| namespace.name).collect(),
            });
        }

        let mut deleted = Vec::new();
        let mut already_gone = Vec::new();
        let mut failures = BTreeMap::new();
        for NamespaceRecord { name, .. } in namespaces {
            info!("STEP: Destroying namespace {:?} for this suite.", name);
            let deletion = AssertUnwindSafe(self.delete_namespace(client.as_ref(), &name))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(DeletionError::other(format!(
                        "panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                });
            match deletion {
                Ok(()) => deleted.push(name),
                Err(e) if e.is_not_found() => {
                    info!("Namespace {} was already deleted", name);
                    already_gone.push(name);
                }
                Err(e) => {
                    warn!("Failed to delete namespace {}: {}", name, e);
                    failures.insert(name, e);
                }
            }
        }

        if failures.is_empty() {
            Ok(NamespaceDeletion::Completed { deleted, already_gone })
        } else {
            Err(TeardownError { failures })
        }
    }

    async fn delete_namespace(&self, client: Option<&Client>, name: &str) -> Result<(), DeletionError> {
        let Some(client) = client else {
            return Err(DeletionError::other("no cluster client available to delete the namespace"));
        };
        let deletion = self.cluster.namespaces.delete_namespace(client, name, self.deletion_timeout);
        match tokio::time::timeout(self.deletion_timeout, deletion).await {
            Ok(result) => result,
            Err(_) => Err(DeletionError::timeout(self.deletion_timeout)),
        }
    }
}
