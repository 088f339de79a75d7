
use crate::services::panics::panic_message;
use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

type CleanupAction = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Opaque reference to an action registered with a [`CleanupActionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CleanupActionHandle(u64);

impl Display for CleanupActionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cleanup-action-{}", self.0)
    }
}

#[derive(Debug)]
pub struct CleanupFailure {
    pub handle: CleanupActionHandle,
    pub message: String,
}

/// Result of [`CleanupActionRegistry::drain_all`].
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Handles in the order their actions were executed.
    pub executed: Vec<CleanupActionHandle>,
    pub failures: Vec<CleanupFailure>,
}

impl DrainReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ledger of pending cleanup actions shared by all tests of a suite.
///
/// Every framework registers its teardown here before a test starts and removes it
/// once the test's own teardown begins. Whatever is still registered when the suite
/// is aborted gets executed by [`CleanupActionRegistry::drain_all`].
///
/// Handles grow monotonically, so iterating the map in key order is registration order.
#[derive(Default)]
pub struct CleanupActionRegistry {
    actions: Mutex<BTreeMap<CleanupActionHandle, CleanupAction>>,
    next_handle: AtomicU64,
}

impl CleanupActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by frameworks that are not given one explicitly.
    pub fn shared() -> Arc<CleanupActionRegistry> {
        static SHARED: OnceLock<Arc<CleanupActionRegistry>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(CleanupActionRegistry::new())).clone()
    }

    pub async fn add<F, Fut>(&self, action: F) -> CleanupActionHandle
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handle = CleanupActionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let action: CleanupAction = Box::new(move || action().boxed());
        self.actions.lock().await.insert(handle, action);
        debug!("Registered cleanup action {}", handle);
        handle
    }

    /// Unregisters an action. Unknown or already removed handles are ignored.
    /// Returns whether an action was actually removed.
    pub async fn remove(&self, handle: CleanupActionHandle) -> bool {
        let removed = self.actions.lock().await.remove(&handle).is_some();
        if removed {
            debug!("Removed cleanup action {}", handle);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.actions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.actions.lock().await.is_empty()
    }

    /// Runs every registered action, last registered first, and empties the registry.
    pub async fn drain_all(&self) -> DrainReport {
        let pending = std::mem::take(&mut *self.actions.lock().await);
        info!("Running {} pending cleanup actions", pending.len());

        let mut report = DrainReport::default();
        for (handle, action) in pending.into_iter().rev() {
            let outcome = AssertUnwindSafe(async move { action().await }).catch_unwind().await;
            report.executed.push(handle);
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(cause)) => format!("{:#}", cause),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            error!("Cleanup action {} failed: {}", handle, message);
            report.failures.push(CleanupFailure { handle, message });
        }
        report
    }
}

/// Drains `registry` when the process receives Ctrl-C, then exits with status 130.
pub fn drain_on_interrupt(registry: Arc<CleanupActionRegistry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for the interrupt signal: {}", e);
            return;
        }
        warn!("Interrupted, running pending cleanup actions before exiting");
        let report = registry.drain_all().await;
        if !report.is_success() {
            error!("{} of {} cleanup actions failed", report.failures.len(), report.executed.len());
        }
        std::process::exit(130);
    })
}
