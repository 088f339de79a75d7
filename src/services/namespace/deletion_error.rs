use kube::core::ErrorResponse;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Classification of a failed namespace deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionErrorKind {
    /// The namespace is already gone. Teardown treats this as success.
    NotFound,
    Timeout,
    Forbidden,
    Other,
}

#[derive(Debug)]
pub struct DeletionError {
    pub kind: DeletionErrorKind,
    pub message: String,
}

impl DeletionError {
    pub fn new(kind: DeletionErrorKind, message: impl Into<String>) -> Self {
        DeletionError {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(name: &str) -> Self {
        DeletionError::new(DeletionErrorKind::NotFound, format!("namespace '{}' not found", name))
    }

    pub fn timeout(timeout: Duration) -> Self {
        DeletionError::new(
            DeletionErrorKind::Timeout,
            format!("namespace was not deleted within {:?}", timeout),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        DeletionError::new(DeletionErrorKind::Other, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == DeletionErrorKind::NotFound
    }
}

impl From<kube::Error> for DeletionError {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(ErrorResponse { code: 404, message, .. }) => {
                DeletionError::new(DeletionErrorKind::NotFound, message)
            }
            kube::Error::Api(ErrorResponse { code: 403, message, .. }) => {
                DeletionError::new(DeletionErrorKind::Forbidden, message)
            }
            _ => DeletionError::other(error.to_string()),
        }
    }
}

impl Display for DeletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DeletionErrorKind::NotFound => write!(f, "Not found: {}", self.message),
            DeletionErrorKind::Timeout => write!(f, "Timed out: {}", self.message),
            DeletionErrorKind::Forbidden => write!(f, "Forbidden: {}", self.message),
            DeletionErrorKind::Other => write!(f, "Deletion failed: {}", self.message),
        }
    }
}

impl Error for DeletionError {}
