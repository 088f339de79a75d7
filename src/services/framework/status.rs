use crate::services::namespace::creation_error::NamespaceCreationError;
use crate::services::namespace::deletion_error::DeletionError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fatal error raised while preparing a test. Setup is not retried.
#[derive(Debug)]
pub enum SetupError {
    ClientConfiguration(anyhow::Error),
    ClientConstruction(anyhow::Error),
    NamespaceCreation(NamespaceCreationError),
    ServiceAccount { namespace: String, cause: anyhow::Error },
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::ClientConfiguration(cause) => write!(f, "Failed to load cluster configuration: {:#}", cause),
            SetupError::ClientConstruction(cause) => write!(f, "Failed to create a kubernetes client: {:#}", cause),
            SetupError::NamespaceCreation(cause) => write!(f, "{}", cause),
            SetupError::ServiceAccount { namespace, cause } => write!(
                f,
                "Default service account was not provisioned in namespace '{}': {:#}",
                namespace, cause
            ),
        }
    }
}

impl Error for SetupError {}

/// One or more tracked namespaces could not be deleted.
#[derive(Debug)]
pub struct TeardownError {
    pub failures: BTreeMap<String, DeletionError>,
}

impl Display for TeardownError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .failures
            .iter()
            .map(|(name, error)| format!("Couldn't delete ns: {:?}: {} ({:?})", name, error, error.kind))
            .collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl Error for TeardownError {}

/// Why a test run through [`crate::services::framework::Framework::run`] failed.
#[derive(Debug)]
pub enum TestFailure {
    Setup {
        error: SetupError,
        teardown: Option<TeardownError>,
    },
    Assertion {
        message: String,
        teardown: Option<TeardownError>,
    },
    /// The test itself passed but its namespaces could not be deleted.
    Teardown(TeardownError),
}

impl TestFailure {
    pub fn teardown_error(&self) -> Option<&TeardownError> {
        match self {
            TestFailure::Setup { teardown, .. } | TestFailure::Assertion { teardown, .. } => teardown.as_ref(),
            TestFailure::Teardown(error) => Some(error),
        }
    }
}

impl Display for TestFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TestFailure::Setup { error, .. } => write!(f, "Setup failed: {}", error)?,
            TestFailure::Assertion { message, .. } => write!(f, "Test failed: {}", message)?,
            TestFailure::Teardown(error) => return write!(f, "Teardown failed: {}", error),
        }
        match self.teardown_error() {
            Some(error) => write!(f, "; teardown failed: {}", error),
            None => Ok(()),
        }
    }
}

impl Error for TestFailure {}
