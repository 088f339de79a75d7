use crate::services::namespace::NamespaceRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Namespace creation failed. The cluster may still have handed back a namespace
/// (for example when a follow-up step failed), which then has to be cleaned up.
#[derive(Debug)]
pub struct NamespaceCreationError {
    pub namespace: Option<NamespaceRecord>,
    pub cause: anyhow::Error,
}

impl NamespaceCreationError {
    pub fn new(cause: anyhow::Error) -> Self {
        NamespaceCreationError { namespace: None, cause }
    }

    pub fn with_namespace(mut self, namespace: NamespaceRecord) -> Self {
        self.namespace = Some(namespace);
        self
    }
}

impl From<anyhow::Error> for NamespaceCreationError {
    fn from(cause: anyhow::Error) -> Self {
        NamespaceCreationError::new(cause)
    }
}

impl Display for NamespaceCreationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(
                f,
                "Namespace '{}' was only partially created: {:#}",
                namespace.name, self.cause
            ),
            None => write!(f, "Failed to create namespace: {:#}", self.cause),
        }
    }
}

impl Error for NamespaceCreationError {}
