//! Debounced catalog search.
//!
//! Each keystroke replaces the single pending search. The search runs once
//! input has been quiet for the configured period. Only the *scheduling* is
//! cancelable: once the quiet period elapses the request runs to completion
//! even if more keystrokes arrive.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::catalog::Catalog;

/// Trailing-edge debouncer holding at most one scheduled task.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<Scheduled>,
}

/// The latest scheduled task.
///
/// `handle` completes once the task itself has completed; `fired` flips when
/// the quiet period is over and the task can no longer be cancelled.
#[derive(Debug)]
struct Scheduled {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

impl Debouncer {
    /// Quiet period used by the storefront search box.
    pub const DEFAULT_QUIET: Duration = Duration::from_millis(500);

    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub const fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Schedule `task` to run after the quiet period, replacing any task
    /// that has not fired yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let quiet = self.quiet;
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            flag.store(true, Ordering::Release);
            // Detach so that aborting the timer no longer reaches the task.
            if tokio::spawn(task).await.is_err() {
                debug!("Debounced task panicked");
            }
        });
        self.pending = Some(Scheduled { handle, fired });
    }

    /// Drop the scheduled task if it has not fired yet.
    ///
    /// A task that already fired keeps running. Returns `true` if a task was
    /// still waiting.
    pub fn cancel(&mut self) -> bool {
        let Some(scheduled) = self.pending.take() else {
            return false;
        };
        let waiting = !scheduled.fired.load(Ordering::Acquire) && !scheduled.handle.is_finished();
        scheduled.handle.abort();
        waiting
    }

    /// Whether a task is waiting for its quiet period to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|s| !s.fired.load(Ordering::Acquire) && !s.handle.is_finished())
    }

    /// Whether the latest task has been scheduled and not yet completed,
    /// counting both the quiet period and the task's own run time.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.as_ref().is_some_and(|s| !s.handle.is_finished())
    }

    /// Wait until the latest scheduled task has fired and completed.
    ///
    /// Returns immediately if nothing was scheduled or the task is done.
    pub async fn settle(&mut self) {
        if let Some(scheduled) = self.pending.as_mut()
            && !scheduled.handle.is_finished()
            && (&mut scheduled.handle).await.is_err()
        {
            debug!("Debounced task was cancelled");
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUIET)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Search input bound to a catalog.
pub struct SearchBox {
    catalog: Catalog,
    debouncer: Debouncer,
}

impl SearchBox {
    #[must_use]
    pub fn new(catalog: Catalog, quiet: Duration) -> Self {
        Self {
            catalog,
            debouncer: Debouncer::new(quiet),
        }
    }

    /// Feed the current contents of the search field.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_keystroke(&mut self, raw_query: &str) {
        let catalog = self.catalog.clone();
        let query = raw_query.to_owned();
        if self.debouncer.is_pending() {
            debug!("Replacing pending search");
        }
        self.debouncer.schedule(async move {
            // Failures are already reported by the catalog as notices.
            if let Err(err) = catalog.search(&query).await {
                debug!(error = %err, "Debounced search failed");
            }
        });
    }

    /// Whether a search is waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Wait until the last typed query has been searched and applied.
    pub async fn settle(&mut self) {
        self.debouncer.settle().await;
    }

    /// The catalog this box searches.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
