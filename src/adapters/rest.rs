use crate::config::{Endpoint, HttpConfig};
use crate::domain::model::{Record, WriteMode};
use crate::domain::ports::{Sink, Source};
use crate::utils::error::{MigrationError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const PREFER_INSERT: &str = "return=representation";
const PREFER_UPSERT: &str = "return=representation,resolution=merge-duplicates";
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// PostgREST client for one Supabase project (`{base}/rest/v1/{table}`).
pub struct RestClient {
    client: Client,
    endpoint: Endpoint,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl RestClient {
    pub fn new(endpoint: Endpoint, http: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = http.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            retry_attempts: http.retry_attempts,
            retry_delay: Duration::from_millis(http.retry_delay_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.endpoint.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.endpoint.api_key)
            .bearer_auth(&self.endpoint.api_key)
            .header("Content-Type", "application/json")
    }

    /// Sends the request built by `build`, retrying connect errors with
    /// exponential backoff. Timeouts are retried only when `retry_timeouts` is
    /// set: a timed-out write may already be committed. Any HTTP response is
    /// returned as-is.
    async fn send_with_retry<F>(
        &self,
        table: &str,
        retry_timeouts: bool,
        build: F,
    ) -> Result<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 0u32;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let err = MigrationError::Http(e);
                    let retryable =
                        err.is_connect_failure() || (retry_timeouts && err.is_transient());
                    if !retryable || attempt >= self.retry_attempts {
                        return Err(err);
                    }
                    let delay = self
                        .retry_delay
                        .saturating_mul(2u32.saturating_pow(attempt))
                        .min(MAX_BACKOFF);
                    attempt += 1;
                    tracing::warn!(
                        "Request for {} failed ({}), retry {}/{} in {:?}",
                        table,
                        err,
                        attempt,
                        self.retry_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn ensure_success(table: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("{} response status: {}", table, status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if !body.is_empty() {
            tracing::error!("Response content: {}", body);
        }
        Err(MigrationError::Status {
            table: table.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Only a JSON array of objects counts as a row set.
pub fn decode_rows(table: &str, body: &str) -> Result<Vec<Record>> {
    let malformed = |message: String| MigrationError::MalformedBody {
        table: table.to_string(),
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                serde_json::Value::Object(obj) => Ok(Record::from(obj)),
                other => Err(malformed(format!(
                    "row {} is not an object: {}",
                    index, other
                ))),
            })
            .collect(),
        other => Err(malformed(format!(
            "expected an array of rows, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[async_trait]
impl Source for RestClient {
    async fn fetch_rows(&self, table: &str) -> Result<Vec<Record>> {
        let url = self.table_url(table);
        tracing::debug!("GET {}?select=*", url);

        let response = self
            .send_with_retry(table, true, || {
                self.authorized(self.client.get(&url))
                    .header("Prefer", PREFER_INSERT)
                    .query(&[("select", "*")])
            })
            .await?;
        let response = Self::ensure_success(table, response).await?;

        let body = response.text().await?;
        decode_rows(table, &body)
    }

    fn describe(&self) -> String {
        self.endpoint.base_url.clone()
    }
}

#[async_trait]
impl Sink for RestClient {
    async fn write_batch(&self, table: &str, batch: &[Record], mode: WriteMode) -> Result<()> {
        let url = self.table_url(table);
        let prefer = match mode {
            WriteMode::Insert => PREFER_INSERT,
            WriteMode::Upsert => PREFER_UPSERT,
        };
        tracing::debug!("POST {} ({} rows, {:?})", url, batch.len(), mode);

        let response = self
            .send_with_retry(table, false, || {
                self.authorized(self.client.post(&url))
                    .header("Prefer", prefer)
                    .json(batch)
            })
            .await?;
        Self::ensure_success(table, response).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.base_url.clone()
    }
}
