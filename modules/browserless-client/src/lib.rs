pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Body of a `/function` call: an ES module whose default export receives
/// `{ page, context }` and returns `{ data, type }`.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionRequest {
    pub code: String,
    pub context: serde_json::Value,
}

/// Per-session knobs passed to Browserless as query parameters.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Hard ceiling for the whole browser session. Browserless kills the
    /// browser and answers 408 when it is exceeded.
    pub timeout: Option<Duration>,
    /// Extra Chrome launch arguments, e.g. `--incognito`.
    pub launch_args: Vec<String>,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    /// Build the `/function` endpoint with token, timeout and launch options.
    pub fn function_endpoint(&self, options: &SessionOptions) -> Result<url::Url> {
        let mut endpoint = url::Url::parse(&format!("{}/function", self.base_url))?;
        {
            let mut query = endpoint.query_pairs_mut();
            if let Some(ref token) = self.token {
                query.append_pair("token", token);
            }
            if let Some(timeout) = options.timeout {
                query.append_pair("timeout", &timeout.as_millis().to_string());
            }
            if !options.launch_args.is_empty() {
                let launch = serde_json::json!({ "args": options.launch_args });
                query.append_pair("launch", &launch.to_string());
            }
        }
        if endpoint.query() == Some("") {
            endpoint.set_query(None);
        }
        Ok(endpoint)
    }

    /// Run a Puppeteer function inside a fresh remote browser session and
    /// decode its JSON result. Browserless closes the page and browser when
    /// the function returns or the session timeout fires.
    pub async fn function<T: DeserializeOwned>(
        &self,
        request: &FunctionRequest,
        options: &SessionOptions,
    ) -> Result<T> {
        let endpoint = self.function_endpoint(options)?;
        tracing::debug!(base_url = %self.base_url, "browserless: running function");

        let resp = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
