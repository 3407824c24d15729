// Plain HTTP sessions for pages whose counts are in the server-rendered HTML.

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::plan::LoadPlan;

use super::{check_status, ready_state, static_first_met, LoadedPage, Session};

pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    /// `client` carries the user agent and request timeout.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn load(&mut self, plan: &LoadPlan) -> Result<LoadedPage> {
        let parsed = url::Url::parse(&plan.url).context("Invalid URL")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ScrapeError::InvalidInput(format!(
                "only http/https URLs allowed, got: {}",
                parsed.scheme()
            )));
        }

        info!(url = %plan.url, fetcher = "http", "Fetching page");

        let resp = self.client.get(parsed).send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        check_status(Some(status), &final_url)?;

        let html = resp.text().await?;
        let matched = static_first_met(plan, &html, &final_url);
        // No scripts run here, so a missing required element will never show up.
        let ready = ready_state(&plan.readiness, matched).ok_or_else(|| {
            ScrapeError::ElementNotFound(format!(
                "{} absent from static page",
                plan.readiness.describe()
            ))
        })?;

        info!(url = %final_url, fetcher = "http", bytes = html.len(), "Fetched successfully");

        Ok(LoadedPage {
            html,
            final_url,
            status: Some(status),
            ready,
        })
    }

    async fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Readiness, Transport, WaitUntil, DEFAULT_NAVIGATION_TIMEOUT};

    #[tokio::test]
    async fn non_http_schemes_are_rejected_before_fetching() {
        let mut session = HttpSession::new(reqwest::Client::new());
        let plan = LoadPlan {
            url: "file:///etc/passwd".to_string(),
            transport: Transport::Http,
            wait_until: WaitUntil::NetworkIdle2,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            scroll_to: None,
            readiness: Readiness::none(),
            incognito: false,
        };
        let err = session.load(&plan).await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidInput(_)));
    }
}
