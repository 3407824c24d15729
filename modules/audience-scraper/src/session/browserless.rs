// Remote headless browser sessions via Browserless `/function`.
//
// Each load compiles the plan into one Puppeteer function: navigate, scroll,
// wait for readiness, and hand back the rendered DOM. Browserless owns the
// browser lifecycle and tears it down when the function returns or its
// session timeout fires.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, FunctionRequest, SessionOptions};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::plan::{LoadPlan, Transport};

use super::{check_status, ready_state, HttpSession, LoadedPage, Session, SessionProvider};

/// Puppeteer function run per load. `context` comes from `script_context`.
const PAGE_SCRIPT: &str = r#"
export default async function ({ page, context }) {
  const { url, userAgent, waitUntil, navigationTimeout, scrollTo, steps } = context;
  await page.setUserAgent(userAgent);

  let status = null;
  try {
    const response = await page.goto(url, { waitUntil, timeout: navigationTimeout });
    status = response ? response.status() : null;
  } catch (err) {
    return {
      data: {
        html: '',
        url: page.url(),
        status,
        matchedStep: null,
        timedOut: err && err.name === 'TimeoutError',
        failure: String((err && err.message) || err),
      },
      type: 'application/json',
    };
  }

  if (scrollTo !== null) {
    await page.evaluate((y) => window.scrollTo(0, y), scrollTo);
  }

  let matchedStep = null;
  for (let i = 0; i < steps.length; i++) {
    const { selectors, timeout } = steps[i];
    try {
      await Promise.any(selectors.map((s) => page.waitForSelector(s, { timeout })));
      matchedStep = i;
      break;
    } catch (_) {}
  }

  return {
    data: {
      html: await page.content(),
      url: page.url(),
      status,
      matchedStep,
      timedOut: steps.length > 0 && matchedStep === null,
      failure: null,
    },
    type: 'application/json',
  };
}
"#;

/// What `PAGE_SCRIPT` returns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptOutcome {
    html: String,
    url: String,
    status: Option<u16>,
    matched_step: Option<usize>,
    #[serde(default)]
    timed_out: bool,
    failure: Option<String>,
}

fn script_context(plan: &LoadPlan, user_agent: &str) -> serde_json::Value {
    let steps: Vec<serde_json::Value> = plan
        .readiness
        .steps
        .iter()
        .map(|step| {
            json!({
                "selectors": step.any_of.iter().map(|c| c.puppeteer_selector()).collect::<Vec<_>>(),
                "timeout": step.timeout.as_millis() as u64,
            })
        })
        .collect();

    json!({
        "url": plan.url,
        "userAgent": user_agent,
        "waitUntil": plan.wait_until.as_puppeteer(),
        "navigationTimeout": plan.navigation_timeout.as_millis() as u64,
        "scrollTo": plan.scroll_to,
        "steps": steps,
    })
}

fn session_options(plan: &LoadPlan) -> SessionOptions {
    let mut launch_args = Vec::new();
    if plan.incognito {
        launch_args.push("--incognito".to_string());
    }
    SessionOptions {
        timeout: Some(plan.budget()),
        launch_args,
    }
}

/// Turn the script's report into a page or a classified error.
fn settle(plan: &LoadPlan, outcome: ScriptOutcome) -> Result<LoadedPage> {
    if let Some(failure) = outcome.failure {
        return Err(if outcome.timed_out {
            ScrapeError::Timeout(format!("navigation to {}: {failure}", plan.url))
        } else {
            ScrapeError::Network(format!("navigation to {}: {failure}", plan.url))
        });
    }
    check_status(outcome.status, &outcome.url)?;

    let ready = ready_state(&plan.readiness, outcome.matched_step).ok_or_else(|| {
        ScrapeError::Timeout(format!("waiting for {}", plan.readiness.describe()))
    })?;

    Ok(LoadedPage {
        html: outcome.html,
        final_url: outcome.url,
        status: outcome.status,
        ready,
    })
}

/// Production provider: browser loads go to Browserless, HTTP loads use a
/// shared reqwest client.
pub struct BrowserlessProvider {
    client: Arc<BrowserlessClient>,
    http: reqwest::Client,
    user_agent: String,
}

impl BrowserlessProvider {
    pub fn new(client: BrowserlessClient, user_agent: &str, http_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(http_timeout)
            .build()?;
        Ok(Self {
            client: Arc::new(client),
            http,
            user_agent: user_agent.to_string(),
        })
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        // Browserless enforces the per-session budget; the HTTP deadline only
        // has to outlast the longest plan.
        let client = BrowserlessClient::new(
            &config.browserless_url,
            config.browserless_token.as_deref(),
            Duration::from_secs(120),
        )?;
        info!(base_url = %config.browserless_url, "BrowserlessProvider initialized");
        Self::new(client, &config.user_agent, config.http_timeout)
    }
}

#[async_trait]
impl SessionProvider for BrowserlessProvider {
    async fn open(&self, transport: Transport) -> Result<Box<dyn Session>> {
        Ok(match transport {
            Transport::Browser => Box::new(BrowserlessSession {
                client: Arc::clone(&self.client),
                user_agent: self.user_agent.clone(),
            }),
            Transport::Http => Box::new(HttpSession::new(self.http.clone())),
        })
    }
}

struct BrowserlessSession {
    client: Arc<BrowserlessClient>,
    user_agent: String,
}

#[async_trait]
impl Session for BrowserlessSession {
    async fn load(&mut self, plan: &LoadPlan) -> Result<LoadedPage> {
        info!(url = %plan.url, fetcher = "browserless", "Fetching page");

        let request = FunctionRequest {
            code: PAGE_SCRIPT.to_string(),
            context: script_context(plan, &self.user_agent),
        };
        let outcome: ScriptOutcome = self
            .client
            .function(&request, &session_options(plan))
            .await?;

        if outcome.timed_out {
            warn!(url = %plan.url, fetcher = "browserless", "Readiness wait timed out");
        }
        let page = settle(plan, outcome)?;
        info!(url = %page.final_url, fetcher = "browserless", bytes = page.html.len(), "Fetched successfully");
        Ok(page)
    }

    async fn close(&mut self) {
        debug!(fetcher = "browserless", "Session released");
    }
}
