//! # HTTP Ledger Client
//!
//! Talks to the metagraph over plain HTTP:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | submit | `POST {data_l1_url}/data` with `{value, proofs}` |
//! | fetch_channel | `GET {l0_url}/data-application/channels/{id}` |

use std::time::Duration;

use async_trait::async_trait;
use channel_telemetry::LEDGER_REQUESTS;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::algorithms::SignedSubmission;
use crate::config::ChannelConfig;
use crate::domain::{ChannelError, ChannelSnapshot, Command, Proof, TxHash};
use crate::ports::LedgerGateway;

#[derive(Deserialize)]
struct SubmitResponse {
    hash: Option<String>,
}

/// reqwest-backed [`LedgerGateway`].
pub struct HttpLedgerClient {
    client: Client,
    l0_url: String,
    data_l1_url: String,
}

impl HttpLedgerClient {
    /// Build a client with the configured timeouts.
    pub fn new(config: &ChannelConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| ChannelError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            l0_url: config.l0_url.trim_end_matches('/').to_string(),
            data_l1_url: config.data_l1_url.trim_end_matches('/').to_string(),
        })
    }

    fn transport_error(&self, base: &str, e: reqwest::Error) -> ChannelError {
        if e.is_connect() {
            ChannelError::NetworkError(format!("Cannot connect to {base}"))
        } else if e.is_timeout() {
            ChannelError::NetworkError(format!("Request to {base} timed out"))
        } else {
            ChannelError::NetworkError(e.to_string())
        }
    }

    async fn post_data(&self, command: &Command, proof: &Proof) -> Result<TxHash, ChannelError> {
        let url = format!("{}/data", self.data_l1_url);
        let response = self
            .client
            .post(&url)
            .json(&SignedSubmission::new(command, proof))
            .send()
            .await
            .map_err(|e| self.transport_error(&self.data_l1_url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&self.data_l1_url, e))?;

        if !status.is_success() {
            return Err(ChannelError::RejectedByLedger {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<SubmitResponse>(&body)
            .ok()
            .and_then(|r| r.hash)
            .filter(|hash| !hash.is_empty())
            .ok_or_else(|| ChannelError::MalformedResponse(format!("no hash in {body:?}")))
    }

    async fn get_channel(&self, channel_id: &str) -> Result<ChannelSnapshot, ChannelError> {
        let url = format!("{}/data-application/channels/{}", self.l0_url, channel_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&self.l0_url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ChannelError::NotFound(channel_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = format!("HTTP {}: {body}", status.as_u16());
            // Gateway and upstream outages are worth polling through
            return Err(if status.is_server_error() {
                ChannelError::NetworkError(detail)
            } else {
                ChannelError::MalformedResponse(detail)
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&self.l0_url, e))?;
        let snapshot: Option<ChannelSnapshot> = serde_json::from_str(&body)
            .map_err(|e| ChannelError::MalformedResponse(e.to_string()))?;

        let mut snapshot =
            snapshot.ok_or_else(|| ChannelError::NotFound(channel_id.to_string()))?;

        // Some ledger versions omit the id from the state they serve
        if snapshot.id.is_empty() {
            snapshot.id = channel_id.to_string();
        }
        snapshot.validate()?;
        Ok(snapshot)
    }
}

fn outcome_label<T>(result: &Result<T, ChannelError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(ChannelError::NetworkError(_)) => "network_error",
        Err(ChannelError::RejectedByLedger { .. }) => "rejected",
        Err(ChannelError::NotFound(_)) => "not_found",
        Err(_) => "malformed",
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerClient {
    #[instrument(skip(self, command, proof), fields(command = %command.kind()))]
    async fn submit(&self, command: &Command, proof: &Proof) -> Result<TxHash, ChannelError> {
        let result = self.post_data(command, proof).await;
        LEDGER_REQUESTS
            .with_label_values(&["submit", outcome_label(&result)])
            .inc();

        match &result {
            Ok(hash) => debug!(%hash, "Ledger accepted data update"),
            Err(e) => warn!(error = %e, "Ledger submission failed"),
        }
        result
    }

    #[instrument(skip(self))]
    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelSnapshot, ChannelError> {
        let result = self.get_channel(channel_id).await;
        LEDGER_REQUESTS
            .with_label_values(&["fetch_channel", outcome_label(&result)])
            .inc();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ChannelConfig::for_testing().with_base_url("http://127.0.0.1:9/");
        let client = HttpLedgerClient::new(&config).unwrap();
        assert_eq!(client.l0_url, "http://127.0.0.1:9");
        assert_eq!(client.data_l1_url, "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn test_unreachable_ledger_is_network_error() {
        // Port 9 (discard) is closed on test hosts
        let config = ChannelConfig::for_testing().with_base_url("http://127.0.0.1:9");
        let client = HttpLedgerClient::new(&config).unwrap();

        let err = client.fetch_channel("c1").await.unwrap_err();
        assert!(matches!(err, ChannelError::NetworkError(_)), "{err:?}");
        assert!(err.is_transient());
    }
}
