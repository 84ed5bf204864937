use crate::error::{Error, Result};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const INITIAL_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 5000;

/// HTTP client shared by the store adapter and the report scraper.
///
/// Each operation has one deadline, the configured timeout, covering all
/// of its attempts and the body download. Within it, timeouts, connection
/// errors, 429 and 5xx responses are retried with exponential backoff.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    max_retries: u32,
}

/// Retry bookkeeping for one logical request
struct RetryState {
    attempt: u32,
    max_retries: u32,
    backoff_ms: u64,
}

impl RetryState {
    fn new(max_retries: u32) -> Self {
        Self {
            attempt: 0,
            max_retries: max_retries.max(1),
            backoff_ms: INITIAL_BACKOFF_MS,
        }
    }

    fn can_retry(&self) -> bool {
        self.attempt < self.max_retries - 1
    }

    fn increment(&mut self) {
        self.attempt += 1;
        self.backoff_ms = (self.backoff_ms * 2).min(MAX_BACKOFF_MS);
    }

    /// Get delay from Retry-After header or use backoff
    fn get_delay(&self, response: &Response) -> u64 {
        response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(|secs| secs * 1000)
            .unwrap_or(self.backoff_ms)
            .min(MAX_BACKOFF_MS)
    }

    async fn wait(&self, delay_ms: u64) {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Check if response requires retry and handle logging/waiting
async fn should_retry_response(response: &Response, state: &mut RetryState) -> bool {
    if !state.can_retry() {
        return false;
    }

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        let delay = state.get_delay(response);
        warn!(
            "Rate limited by {} (attempt {}/{}), retrying in {}ms",
            response.url(),
            state.attempt + 1,
            state.max_retries,
            delay
        );
        state.wait(delay).await;
        state.increment();
        return true;
    }

    if response.status().is_server_error() {
        warn!(
            "Server error {} from {} (attempt {}/{}), retrying in {}ms",
            response.status(),
            response.url(),
            state.attempt + 1,
            state.max_retries,
            state.backoff_ms
        );
        state.wait(state.backoff_ms).await;
        state.increment();
        return true;
    }

    false
}

impl HttpClient {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self> {
        let user_agent = format!(
            "moveset/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_retries,
        })
    }

    /// Run one whole operation under the deadline
    async fn within_deadline<T, Fut>(&self, url: &Url, operation: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| {
                Error::UpstreamUnavailable(format!("{} timed out after {:?}", url, self.timeout))
            })?
    }

    /// Execute a request with retry logic. The final response is returned
    /// without a status check.
    async fn with_retry<F, Fut>(&self, request_fn: F) -> Result<Response>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = reqwest::Result<Response>>,
    {
        let mut state = RetryState::new(self.max_retries);

        loop {
            match request_fn().await {
                Ok(response) => {
                    if should_retry_response(&response, &mut state).await {
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && state.can_retry() => {
                    warn!(
                        "Connection error (attempt {}/{}): {}, retrying in {}ms",
                        state.attempt + 1,
                        state.max_retries,
                        e,
                        state.backoff_ms
                    );
                    state.wait(state.backoff_ms).await;
                    state.increment();
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// GET a text document, failing on any non-success status
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        debug!("GET {}", url);
        self.within_deadline(url, async {
            let response = self
                .with_retry(|| self.client.get(url.clone()).send())
                .await?
                .error_for_status()?;
            Ok(response.text().await?)
        })
        .await
    }

    /// GET a JSON document. A 404 or a JSON `null` body is `None`.
    pub async fn get_json(&self, url: &Url) -> Result<Option<Value>> {
        debug!("GET {}", url);
        self.within_deadline(url, async {
            let response = self
                .with_retry(|| self.client.get(url.clone()).send())
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let value: Value = response.error_for_status()?.json().await?;
            Ok((!value.is_null()).then_some(value))
        })
        .await
    }

    /// Send a JSON body with PUT or PATCH
    pub async fn send_json(&self, method: Method, url: &Url, body: &Value) -> Result<()> {
        debug!("{} {}", method, url);
        self.within_deadline(url, async {
            self.with_retry(|| {
                self.client
                    .request(method.clone(), url.clone())
                    .json(body)
                    .send()
            })
            .await?
            .error_for_status()?;
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, url: &Url) -> Result<()> {
        debug!("DELETE {}", url);
        self.within_deadline(url, async {
            self.with_retry(|| self.client.delete(url.clone()).send())
                .await?
                .error_for_status()?;
            Ok(())
        })
        .await
    }
}

/// Parse a base URL from configuration
pub fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidInput(format!("invalid URL {:?}: {}", raw, e)))
}
