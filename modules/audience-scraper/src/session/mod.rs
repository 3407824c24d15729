// Session driver: bounded pool of page sessions, a hard deadline per load,
// and a close on every exit path.

mod browserless;
mod fixture;
mod http;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::dom::PageSnapshot;
use crate::error::{Result, ScrapeError};
use crate::plan::{LoadPlan, OnTimeout, Readiness, Transport};

pub use browserless::BrowserlessProvider;
pub use fixture::FixtureProvider;
pub use http::HttpSession;

/// How the readiness steps of a plan resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// The step at this index matched first.
    Matched { step: usize },
    /// No step matched and the plan allows continuing.
    Unmatched,
    /// The plan had no steps.
    NotRequired,
}

/// A page as it stood once the session decided it was ready.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub html: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: Option<u16>,
    pub ready: ReadyState,
}

/// One page load against one browser (or HTTP client) instance.
#[async_trait]
pub trait Session: Send {
    async fn load(&mut self, plan: &LoadPlan) -> Result<LoadedPage>;

    /// Release the underlying browser. Called exactly once by the driver.
    async fn close(&mut self);
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(&self, transport: Transport) -> Result<Box<dyn Session>>;
}

pub struct SessionDriver {
    provider: Arc<dyn SessionProvider>,
    permits: Semaphore,
}

impl SessionDriver {
    pub fn new(provider: Arc<dyn SessionProvider>, max_sessions: usize) -> Self {
        Self {
            provider,
            permits: Semaphore::new(max_sessions.max(1)),
        }
    }

    /// Load `plan` in a fresh session and hand the page to `work`.
    ///
    /// The load runs under `plan.budget()`. `work` is synchronous and runs
    /// with the session still open; a panic inside it becomes
    /// `ScrapeError::Panicked`. The session is closed once whatever happens.
    pub async fn with_session<T, F>(&self, plan: &LoadPlan, work: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(LoadedPage) -> Result<T> + Send,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ScrapeError::Pool("session semaphore closed".to_string()))?;

        let mut session = self.provider.open(plan.transport).await?;
        debug!(url = %plan.url, transport = ?plan.transport, "Session opened");

        let outcome = match tokio::time::timeout(plan.budget(), session.load(plan)).await {
            Ok(Ok(page)) => run_work(work, page),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(url = %plan.url, budget_secs = plan.budget().as_secs(), "Session deadline exceeded");
                Err(ScrapeError::Timeout(format!(
                    "page did not finish loading within {}s",
                    plan.budget().as_secs()
                )))
            }
        };

        session.close().await;
        debug!(url = %plan.url, "Session closed");
        outcome
    }
}

/// Readiness outcome for the step that matched first, if any. `None` means
/// a required step never matched and the load must fail.
fn ready_state(readiness: &Readiness, matched: Option<usize>) -> Option<ReadyState> {
    match matched {
        Some(step) => Some(ReadyState::Matched { step }),
        None if readiness.steps.is_empty() => Some(ReadyState::NotRequired),
        None if readiness.on_timeout == OnTimeout::Continue => Some(ReadyState::Unmatched),
        None => None,
    }
}

/// Readiness evaluated against HTML that will not change any more. The
/// snapshot is dropped before returning so callers stay `Send`.
fn static_first_met(plan: &LoadPlan, html: &str, url: &str) -> Option<usize> {
    plan.readiness.first_met(&PageSnapshot::parse(html, url))
}

/// Document responses that are errors in their own right.
fn check_status(status: Option<u16>, url: &str) -> Result<()> {
    match status {
        Some(status) if status >= 400 => Err(ScrapeError::Http {
            status,
            url: url.to_string(),
        }),
        _ => Ok(()),
    }
}

fn run_work<T, F>(work: F, page: LoadedPage) -> Result<T>
where
    F: FnOnce(LoadedPage) -> Result<T>,
{
    catch_unwind(AssertUnwindSafe(|| work(page))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(ScrapeError::Panicked(message))
    })
}
