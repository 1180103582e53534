use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method, Url,
};
use serde::Serialize;
use tokio::time::sleep;

use crate::{
    debug::{request_lines, response_lines},
    ApiClientError, ApiRequest, ApiResponse, ClientConfig, DebugSink, Result, TracingSink,
};

#[derive(Clone)]
/// HTTP client that sends [`ApiRequest`]s against a fixed base URL.
///
/// Cloning is cheap; clones share the underlying connection pool.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    sink: Arc<dyn DebugSink>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client with the default 10 second per-attempt timeout.
    ///
    /// Nothing is validated here; a malformed base URL fails at send time.
    pub fn new(
        base_url: impl Into<String>,
        debug: bool,
        max_retries: usize,
        retry_delay: Duration,
    ) -> Self {
        Self::from_config(
            ClientConfig::new(base_url)
                .with_debug(debug)
                .with_max_retries(max_retries)
                .with_retry_delay(retry_delay),
        )
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `APICLIENT_BASE_URL`: required, non-empty
    /// - `APICLIENT_DEBUG`: `1`, `true`, `yes` or `on` enables debug dumps
    /// - `APICLIENT_MAX_RETRIES`: retries after the first attempt
    /// - `APICLIENT_RETRY_DELAY_MS`: delay between attempts
    /// - `APICLIENT_TIMEOUT_MS`: per-attempt timeout
    ///
    /// # Example
    ///
    /// ```no_run
    /// use apiclient::ApiClient;
    ///
    /// let client = ApiClient::from_env().expect("missing APICLIENT_BASE_URL");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        config_from_lookup(|key| std::env::var(key).ok()).map(Self::from_config)
    }

    /// Replaces the sink that receives debug dumps.
    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a request, retrying up to `max_retries` times on any error.
    ///
    /// Every HTTP status counts as success. Between failed attempts the
    /// client waits exactly `retry_delay`. The error of the last attempt is
    /// returned when all attempts fail.
    pub async fn send_request<B: Serialize>(&self, request: &ApiRequest<B>) -> Result<ApiResponse> {
        let max_attempts = self.config.max_attempts();
        let mut attempt = 1usize;
        loop {
            match self.send(request).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < max_attempts => {
                    if self.config.debug {
                        tracing::debug!(
                            attempt,
                            max_attempts,
                            error = %err,
                            "request failed, retrying after {:?}",
                            self.config.retry_delay
                        );
                    }
                    sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send<B: Serialize>(&self, request: &ApiRequest<B>) -> Result<ApiResponse> {
        let url = join_url(&self.config.base_url, &request.endpoint);
        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ApiClientError::Serialization)?;

        let outbound = self.build_request(&request.method, &url, &request.headers, body)?;

        if self.config.debug {
            let lines = request_lines(
                outbound.method(),
                outbound.url(),
                outbound.headers(),
                outbound
                    .body()
                    .and_then(|body| body.as_bytes())
                    .unwrap_or_default(),
            );
            self.emit(&lines);
        }

        let response = self
            .http
            .execute(outbound)
            .await
            .map_err(ApiClientError::Network)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ApiClientError::Io)?;

        if self.config.debug {
            self.emit(&response_lines(status, &headers, &body));
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            headers: collect_headers(&headers),
            body: body.to_vec(),
        })
    }

    fn build_request(
        &self,
        method: &str,
        url: &str,
        headers: &HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Request> {
        let method = Method::from_bytes(method.as_bytes()).map_err(|err| {
            ApiClientError::RequestConstruction(format!("invalid method '{method}': {err}"))
        })?;
        let url = Url::parse(url).map_err(|err| {
            ApiClientError::RequestConstruction(format!("invalid url '{url}': {err}"))
        })?;
        let headers = build_header_map(headers)?;

        let mut builder = self
            .http
            .request(method, url)
            .timeout(self.config.timeout);
        if let Some(body) = body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        // Caller headers replace the defaults above.
        builder
            .headers(headers)
            .build()
            .map_err(|err| ApiClientError::RequestConstruction(err.to_string()))
    }

    fn emit(&self, lines: &[String]) {
        for line in lines {
            self.sink.line(line);
        }
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!("{base_url}{endpoint}")
}

fn build_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            ApiClientError::RequestConstruction(format!("invalid header name '{name}': {err}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            ApiClientError::RequestConstruction(format!(
                "invalid value for header '{name}': {err}"
            ))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn collect_headers(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
    let mut collected: HashMap<String, Vec<String>> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_owned())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

fn config_from_lookup<F>(lookup: F) -> std::result::Result<ClientConfig, String>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = lookup("APICLIENT_BASE_URL")
        .ok_or_else(|| "missing APICLIENT_BASE_URL environment variable".to_owned())?;
    if base_url.trim().is_empty() {
        return Err("APICLIENT_BASE_URL is set but empty".to_owned());
    }

    let mut config = ClientConfig::new(base_url);
    if let Some(debug) = lookup("APICLIENT_DEBUG") {
        config.debug = parse_flag("APICLIENT_DEBUG", &debug)?;
    }
    if let Some(max_retries) = lookup("APICLIENT_MAX_RETRIES") {
        config.max_retries = parse_number("APICLIENT_MAX_RETRIES", &max_retries)?;
    }
    if let Some(delay_ms) = lookup("APICLIENT_RETRY_DELAY_MS") {
        config.retry_delay =
            Duration::from_millis(parse_number("APICLIENT_RETRY_DELAY_MS", &delay_ms)?);
    }
    if let Some(timeout_ms) = lookup("APICLIENT_TIMEOUT_MS") {
        config.timeout = Duration::from_millis(parse_number("APICLIENT_TIMEOUT_MS", &timeout_ms)?);
    }
    Ok(config)
}

fn parse_flag(key: &str, raw: &str) -> std::result::Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!(
            "{key} must be one of 1/true/yes/on/0/false/no/off, got '{raw}'"
        )),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> std::result::Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{key} must be a non-negative integer, got '{raw}'"))
}
