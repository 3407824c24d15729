// Scrape orchestration: validate, dispatch, load, classify, normalize.
// Every outcome, including panics and timeouts, ends up as a ScrapeResult.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::classify::{classify, BlockPolicy, PageSignal};
use crate::config::ScraperConfig;
use crate::dom::PageSnapshot;
use crate::error::{Result, ScrapeError};
use crate::platform::{validate_handle, ScrapeRequest};
use crate::session::{BrowserlessProvider, LoadedPage, SessionDriver, SessionProvider};
use crate::strategy::{strategy_for, ExtractionStrategy};
use crate::types::{FailureReason, Metric, MetricSet, RawExtraction, ScrapeResult};

pub struct Scraper {
    driver: SessionDriver,
}

impl Scraper {
    pub fn new(provider: Arc<dyn SessionProvider>, max_sessions: usize) -> Self {
        info!("Scraper initialized (max_sessions={max_sessions})");
        Self {
            driver: SessionDriver::new(provider, max_sessions),
        }
    }

    /// Production scraper backed by Browserless.
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        config.log_redacted();
        let provider = BrowserlessProvider::from_config(config)?;
        Ok(Self::new(Arc::new(provider), config.max_sessions))
    }

    pub async fn scrape(&self, request: &ScrapeRequest) -> ScrapeResult {
        let span = tracing::info_span!(
            "scrape",
            request_id = %Uuid::new_v4(),
            platform = %request.platform,
            handle = %request.handle
        );
        self.run(request).instrument(span).await
    }

    /// Entry point for callers holding plain route strings.
    pub async fn scrape_named(&self, platform: &str, handle: &str) -> ScrapeResult {
        match ScrapeRequest::parse(platform, handle) {
            Ok(request) => self.scrape(&request).await,
            Err(e) => failed(&e),
        }
    }

    /// Independent requests run concurrently; the session pool still caps
    /// how many browsers are open at once. Results keep request order.
    pub async fn scrape_many(&self, requests: &[ScrapeRequest]) -> Vec<ScrapeResult> {
        futures::future::join_all(requests.iter().map(|r| self.scrape(r))).await
    }

    async fn run(&self, request: &ScrapeRequest) -> ScrapeResult {
        info!("Scrape started");

        let handle = match validate_handle(&request.handle) {
            Ok(handle) => handle,
            Err(e) => return failed(&e),
        };

        let strategy = strategy_for(request.platform);
        let plan = strategy.load_plan(handle);

        match self
            .driver
            .with_session(&plan, |page| inspect(strategy, page))
            .await
        {
            Ok(extraction) => {
                let set = metric_set(strategy, handle, &extraction);
                info!(url = %plan.url, metrics = set.metrics.len(), "Scrape finished");
                ScrapeResult::Success(set)
            }
            Err(e) => failed(&e),
        }
    }
}

/// Runs inside the session: snapshot, content checks, extraction.
fn inspect(strategy: &dyn ExtractionStrategy, page: LoadedPage) -> Result<RawExtraction> {
    let snapshot = PageSnapshot::parse(&page.html, &page.final_url);
    let body_text = snapshot.body_text();
    let policy = strategy.block_policy();

    if policy.blocks_unconditionally(&body_text, &page.final_url) {
        return Err(restricted(&policy, &body_text, &page.final_url));
    }

    let extraction = strategy.extract(&snapshot);
    let signal = PageSignal::Loaded {
        body_text: &body_text,
        final_url: &page.final_url,
        extraction: &extraction,
        policy: &policy,
    };
    match classify(&signal) {
        None => Ok(extraction),
        Some(FailureReason::AccessRestricted) => {
            Err(restricted(&policy, &body_text, &page.final_url))
        }
        Some(_) => Err(ScrapeError::ElementNotFound(format!(
            "no {} metrics on {}",
            strategy.platform(),
            page.final_url
        ))),
    }
}

fn restricted(policy: &BlockPolicy, body_text: &str, final_url: &str) -> ScrapeError {
    let marker = policy.marker(body_text, final_url).unwrap_or("login wall");
    ScrapeError::AccessRestricted(format!("'{marker}' on {final_url}"))
}

fn metric_set(
    strategy: &dyn ExtractionStrategy,
    handle: &str,
    extraction: &RawExtraction,
) -> MetricSet {
    let metrics: BTreeMap<String, Metric> = extraction
        .iter()
        .map(|(name, raw)| {
            let metric = Metric {
                raw: raw.to_string(),
                clean: strategy.clean(name, raw),
            };
            (name.to_string(), metric)
        })
        .collect();

    MetricSet {
        platform: strategy.platform(),
        handle: handle.to_string(),
        entity: extraction.entity(),
        metrics,
        captured_at: Utc::now(),
    }
}

fn failed(err: &ScrapeError) -> ScrapeResult {
    let reason = classify(&PageSignal::Failed(err)).unwrap_or(FailureReason::UnexpectedError);
    match reason {
        FailureReason::UnexpectedError => error!(error = %err, "Scrape failed"),
        _ => warn!(reason = ?reason, error = %err, "Scrape failed"),
    }
    ScrapeResult::failure(reason, err.to_string())
}
