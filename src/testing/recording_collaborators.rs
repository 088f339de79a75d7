use crate::services::cluster::{NamespaceDumper, ProviderHooks, ServiceAccountWaiter};
use crate::services::panics::locked;
use anyhow::bail;
use async_trait::async_trait;
use kube::Client;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct RecordingServiceAccountWaiter {
    error: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingServiceAccountWaiter {
    pub fn failing(message: &str) -> Self {
        RecordingServiceAccountWaiter {
            error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        locked(&self.calls).clone()
    }
}

#[async_trait]
impl ServiceAccountWaiter for RecordingServiceAccountWaiter {
    async fn wait_for_default_service_account(&self, _client: &Client, namespace: &str) -> anyhow::Result<()> {
        locked(&self.calls).push(namespace.to_string());
        match &self.error {
            Some(message) => bail!("{}", message),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpBehaviour {
    #[default]
    Succeed,
    Fail,
    Panic,
}

#[derive(Default)]
pub struct RecordingDumper {
    behaviour: DumpBehaviour,
    calls: Mutex<Vec<String>>,
}

impl RecordingDumper {
    pub fn new(behaviour: DumpBehaviour) -> Self {
        RecordingDumper {
            behaviour,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        locked(&self.calls).clone()
    }
}

#[async_trait]
impl NamespaceDumper for RecordingDumper {
    async fn dump_namespace_info(&self, _client: &Client, namespace: &str) -> anyhow::Result<()> {
        locked(&self.calls).push(namespace.to_string());
        match self.behaviour {
            DumpBehaviour::Succeed => Ok(()),
            DumpBehaviour::Fail => bail!("events of {} are unavailable", namespace),
            DumpBehaviour::Panic => panic!("dumping {} exploded", namespace),
        }
    }
}

#[derive(Default)]
pub struct RecordingProvider {
    before_each: AtomicUsize,
    after_each: AtomicUsize,
}

impl RecordingProvider {
    pub fn before_each_calls(&self) -> usize {
        self.before_each.load(Ordering::SeqCst)
    }

    pub fn after_each_calls(&self) -> usize {
        self.after_each.load(Ordering::SeqCst)
    }
}

impl ProviderHooks for RecordingProvider {
    fn framework_before_each(&self, _base_name: &str) {
        self.before_each.fetch_add(1, Ordering::SeqCst);
    }

    fn framework_after_each(&self, _base_name: &str) {
        self.after_each.fetch_add(1, Ordering::SeqCst);
    }
}
