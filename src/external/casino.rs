use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::{CasinoConfig, IntegrationConfig};
use crate::error::{AppError, AppResult};
use crate::models::{CasinoGame, Grant, GrantAck};
use crate::utils::sign_body;

pub const METHOD_GET_GAMES: &str = "getGames";

/// Outbound calls to the casino platform.
#[async_trait]
pub trait CasinoGateway: Send + Sync {
    async fn get_games(&self, casino_id: i64) -> AppResult<Vec<CasinoGame>>;

    /// Delivers one prize. Casinos deduplicate on `grant.transaction_id`, so a
    /// grant may be sent again after an ambiguous failure.
    async fn send_grant(&self, casino_id: i64, grant: &Grant) -> AppResult<GrantAck>;
}

#[derive(Debug, Deserialize)]
pub struct CasinoResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug)]
enum CallError {
    /// Network failure, timeout or 5xx. Worth another try.
    Transient(String),
    /// The casino answered and said no, or answered garbage.
    Rejected(String),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Transient(msg) | CallError::Rejected(msg) => write!(f, "{msg}"),
        }
    }
}

/// JSON-RPC style client: every call is `POST {endpoint}` with
/// `{"method", "params"}` signed by the casino's shared secret.
pub struct CasinoIntegrationAdapter {
    client: Client,
    casinos: HashMap<i64, CasinoConfig>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl CasinoIntegrationAdapter {
    pub fn new(config: &IntegrationConfig, casinos: &[CasinoConfig]) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            casinos: casinos.iter().map(|c| (c.id, c.clone())).collect(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    fn casino(&self, casino_id: i64) -> AppResult<&CasinoConfig> {
        self.casinos
            .get(&casino_id)
            .ok_or_else(|| AppError::NotFound(format!("Casino {casino_id} is not configured")))
    }

    /// Serialized body and its hex signature.
    pub fn build_request(secret: &str, method: &str, params: Value) -> AppResult<(Vec<u8>, String)> {
        let body = serde_json::to_vec(&json!({ "method": method, "params": params }))?;
        let signature = sign_body(secret, &body)?;
        Ok((body, signature))
    }

    async fn call(&self, casino_id: i64, method: &str, params: Value) -> AppResult<Option<Value>> {
        let casino = self.casino(casino_id)?;
        let (body, signature) = Self::build_request(&casino.secret, method, params)?;

        let mut backoff = self.retry_backoff;
        let mut attempt = 0;
        loop {
            log::info!(
                "Casino {} request {}: {}",
                casino_id,
                method,
                String::from_utf8_lossy(&body)
            );
            let result = self
                .send_once(casino, &body, &signature)
                .await
                .and_then(Self::into_data);

            match result {
                Ok(data) => return Ok(data),
                Err(CallError::Transient(msg)) if attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Casino {casino_id} {method} failed ({msg}), retry {attempt}/{} in {}ms",
                        self.max_retries,
                        backoff.as_millis()
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => {
                    log::error!("Casino {casino_id} {method} failed: {err}");
                    return Err(AppError::IntegrationUnavailable(format!(
                        "{method} on casino {casino_id}: {err}"
                    )));
                }
            }
        }
    }

    async fn send_once(
        &self,
        casino: &CasinoConfig,
        body: &[u8],
        signature: &str,
    ) -> Result<CasinoResponse, CallError> {
        let response = self
            .client
            .post(&casino.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Casino-Id", casino.id.to_string())
            .header("X-Signature", signature)
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| CallError::Transient(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CallError::Transient(e.to_string()))?;
        log::info!("Casino {} response {}: {}", casino.id, status, text);

        if status.is_server_error() {
            return Err(CallError::Transient(format!("HTTP {status}")));
        }
        serde_json::from_str(&text)
            .map_err(|e| CallError::Rejected(format!("Invalid response (HTTP {status}): {e}")))
    }

    fn into_data(response: CasinoResponse) -> Result<Option<Value>, CallError> {
        if response.status == "ok" {
            Ok(response.data)
        } else {
            Err(CallError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| format!("status `{}`", response.status)),
            ))
        }
    }
}

#[async_trait]
impl CasinoGateway for CasinoIntegrationAdapter {
    async fn get_games(&self, casino_id: i64) -> AppResult<Vec<CasinoGame>> {
        let data = self.call(casino_id, METHOD_GET_GAMES, json!({})).await?;
        serde_json::from_value(data.unwrap_or(Value::Array(Vec::new()))).map_err(|e| {
            AppError::IntegrationUnavailable(format!("Invalid game list from casino {casino_id}: {e}"))
        })
    }

    async fn send_grant(&self, casino_id: i64, grant: &Grant) -> AppResult<GrantAck> {
        let data = self.call(casino_id, grant.method(), grant.params()).await?;
        match data {
            None | Some(Value::Null) => Ok(GrantAck::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                AppError::IntegrationUnavailable(format!("Invalid grant ack from casino {casino_id}: {e}"))
            }),
        }
    }
}
