// Offline sessions serving canned HTML by URL. Used by tests and for
// replaying captured pages without a browser.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, ScrapeError};
use crate::plan::{LoadPlan, Transport};

use super::{check_status, ready_state, static_first_met, LoadedPage, Session, SessionProvider};

#[derive(Debug, Clone)]
struct FixturePage {
    html: String,
    status: u16,
    final_url: Option<String>,
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Serves registered pages and counts session opens and closes. Clones share
/// the counters, so a test can keep one handle and give another to the
/// scraper.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    pages: Arc<HashMap<String, FixturePage>>,
    load_delay: Option<Duration>,
    counters: Arc<Counters>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(
            url.to_string(),
            FixturePage {
                html: html.to_string(),
                status: 200,
                final_url: None,
            },
        );
        self
    }

    /// Answer `url` with `status`. Registers an empty page if none exists.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        Arc::make_mut(&mut self.pages)
            .entry(url.to_string())
            .or_insert_with(|| FixturePage {
                html: String::new(),
                status,
                final_url: None,
            })
            .status = status;
        self
    }

    /// Report `final_url` as where `url` ended up after redirects.
    pub fn with_redirect(mut self, url: &str, final_url: &str) -> Self {
        Arc::make_mut(&mut self.pages)
            .entry(url.to_string())
            .or_insert_with(|| FixturePage {
                html: String::new(),
                status: 200,
                final_url: None,
            })
            .final_url = Some(final_url.to_string());
        self
    }

    /// Make every load take this long, for deadline tests.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for FixtureProvider {
    async fn open(&self, _transport: Transport) -> Result<Box<dyn Session>> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureSession {
            pages: Arc::clone(&self.pages),
            load_delay: self.load_delay,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct FixtureSession {
    pages: Arc<HashMap<String, FixturePage>>,
    load_delay: Option<Duration>,
    counters: Arc<Counters>,
}

#[async_trait]
impl Session for FixtureSession {
    async fn load(&mut self, plan: &LoadPlan) -> Result<LoadedPage> {
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.get(&plan.url).ok_or_else(|| ScrapeError::Http {
            status: 404,
            url: plan.url.clone(),
        })?;
        check_status(Some(page.status), &plan.url)?;

        let final_url = page.final_url.clone().unwrap_or_else(|| plan.url.clone());
        let matched = static_first_met(plan, &page.html, &final_url);
        // Stands in for a browser, which would have waited out the step.
        let ready = ready_state(&plan.readiness, matched).ok_or_else(|| {
            ScrapeError::Timeout(format!("waiting for {}", plan.readiness.describe()))
        })?;

        Ok(LoadedPage {
            html: page.html.clone(),
            final_url,
            status: Some(page.status),
            ready,
        })
    }

    async fn close(&mut self) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Condition, OnTimeout, Readiness, WaitUntil, DEFAULT_NAVIGATION_TIMEOUT};
    use crate::session::ReadyState;

    fn plan(url: &str, readiness: Readiness) -> LoadPlan {
        LoadPlan {
            url: url.to_string(),
            transport: Transport::Browser,
            wait_until: WaitUntil::NetworkIdle2,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            scroll_to: None,
            readiness,
            incognito: false,
        }
    }

    async fn load(provider: &FixtureProvider, plan: &LoadPlan) -> Result<LoadedPage> {
        let mut session = provider.open(plan.transport).await?;
        let page = session.load(plan).await;
        session.close().await;
        page
    }

    #[tokio::test]
    async fn unknown_url_is_not_found() {
        let provider = FixtureProvider::new();
        let err = load(&provider, &plan("https://example.com/x", Readiness::none()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Http { status: 404, .. }));
        assert_eq!((provider.opened(), provider.closed()), (1, 1));
    }

    #[tokio::test]
    async fn required_selector_missing_times_out() {
        let provider = FixtureProvider::new().with_page("https://example.com/x", "<p>nothing</p>");
        let readiness = Readiness::required(Condition::Css("main"), Duration::from_secs(5));
        let err = load(&provider, &plan("https://example.com/x", readiness))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout(_)));
    }

    #[tokio::test]
    async fn optional_selector_missing_continues() {
        let provider = FixtureProvider::new().with_page("https://example.com/x", "<p>nothing</p>");
        let readiness = Readiness {
            on_timeout: OnTimeout::Continue,
            ..Readiness::required(Condition::Css("main"), Duration::from_secs(5))
        };
        let page = load(&provider, &plan("https://example.com/x", readiness))
            .await
            .unwrap();
        assert_eq!(page.ready, ReadyState::Unmatched);
    }

    #[tokio::test]
    async fn redirect_and_status_are_reported() {
        let provider = FixtureProvider::new()
            .with_page("https://example.com/x", "<main>login</main>")
            .with_redirect("https://example.com/x", "https://example.com/login")
            .with_status("https://example.com/gone", 410);

        let page = load(&provider, &plan("https://example.com/x", Readiness::none()))
            .await
            .unwrap();
        assert_eq!(page.final_url, "https://example.com/login");
        assert_eq!(page.ready, ReadyState::NotRequired);

        let err = load(&provider, &plan("https://example.com/gone", Readiness::none()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Http { status: 410, .. }));
    }
}
