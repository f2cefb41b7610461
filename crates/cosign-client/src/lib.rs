//! Client library for the cosign coordination API.
//!
//! Used by signer tooling and the `cosign proposal` commands. Every method
//! maps onto one HTTP route; error bodies returned by the service are decoded
//! into [`ClientError::Api`].

use cosign_errors::ErrorKind;
use cosign_types::api::{
    AppendSignatureRequest, ErrorResponse, HealthResponse, ListProposalsResponse,
    ProposalResponse, ResetResponse, StatusResponse,
};
use cosign_types::{Proposal, ProposalDraft, SequenceNumber};
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("json parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The service rejected the request
    #[error("api error {status} ({kind}): {message}")]
    Api {
        status: u16,
        kind: ErrorKind,
        message: String,
    },

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Error kind reported by the service, if the failure came from it
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the coordination service
    pub node_url: Url,
    /// Request timeout
    pub timeout: Duration,
}

impl Config {
    pub fn new(node_url: &str) -> Result<Self> {
        Ok(Self {
            node_url: Url::parse(node_url)?,
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Coordination API client
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    http_client: HttpClient,
}

impl Client {
    /// Create a new client
    pub fn new(config: Config) -> Result<Self> {
        let http_client = HttpClient::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Shorthand for a client with default settings
    pub fn connect(node_url: &str) -> Result<Self> {
        Self::new(Config::new(node_url)?)
    }

    pub fn node_url(&self) -> &Url {
        &self.config.node_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.config.node_url.join(path)?)
    }

    fn proposal_url(&self, sequence_number: SequenceNumber, suffix: &str) -> Result<Url> {
        self.url(&format!("/api/proposals/{sequence_number}{suffix}"))
    }

    /// Liveness check
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.http_client.get(self.url("/health")?).send().await?;
        decode(response).await
    }

    /// Service status with store occupancy
    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self.http_client.get(self.url("/status")?).send().await?;
        decode(response).await
    }

    pub async fn list_proposals(&self) -> Result<ListProposalsResponse> {
        let response = self
            .http_client
            .get(self.url("/api/proposals")?)
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch one proposal. With `required_signatures` the service also
    /// reports whether that many signatures have been collected.
    pub async fn get_proposal(
        &self,
        sequence_number: SequenceNumber,
        required_signatures: Option<u32>,
    ) -> Result<ProposalResponse> {
        let mut url = self.proposal_url(sequence_number, "")?;
        if let Some(required) = required_signatures {
            url.query_pairs_mut()
                .append_pair("requiredSignatures", &required.to_string());
        }

        let response = self.http_client.get(url).send().await?;
        decode(response).await
    }

    /// Publish a new proposal together with the creator's signature
    pub async fn create_proposal(&self, draft: &ProposalDraft) -> Result<Proposal> {
        debug!(sequence_number = %draft.sequence_number, "creating proposal");
        let response = self
            .http_client
            .post(self.url("/api/proposals")?)
            .json(draft)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn append_signature(
        &self,
        sequence_number: SequenceNumber,
        signature: &str,
    ) -> Result<Proposal> {
        let body = AppendSignatureRequest {
            signature: signature.to_string(),
        };
        let response = self
            .http_client
            .put(self.proposal_url(sequence_number, "/signatures")?)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    /// Record that the proposal was executed on chain
    pub async fn mark_executed(&self, sequence_number: SequenceNumber) -> Result<Proposal> {
        let response = self
            .http_client
            .put(self.proposal_url(sequence_number, "/executed")?)
            .send()
            .await?;
        decode(response).await
    }

    /// Drop every proposal on the service
    pub async fn reset(&self) -> Result<ResetResponse> {
        let response = self
            .http_client
            .delete(self.url("/api/proposals")?)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&body)?);
    }

    match serde_json::from_slice::<ErrorResponse>(&body) {
        Ok(err) => Err(ClientError::Api {
            status: status.as_u16(),
            kind: err.kind,
            message: err.error,
        }),
        Err(_) => Err(ClientError::InvalidResponse(format!(
            "status {status}: {}",
            String::from_utf8_lossy(&body)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new("http://localhost:5000").unwrap();
        assert_eq!(config.node_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.timeout, Duration::from_secs(30));

        let config = config.with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(Config::new("not a url"), Err(ClientError::Url(_))));
    }

    #[test]
    fn test_proposal_urls() {
        let client = Client::connect("http://localhost:5000").unwrap();
        let url = client
            .proposal_url(SequenceNumber::new(7), "/signatures")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/proposals/7/signatures");
    }

    #[test]
    fn test_error_kind() {
        let err = ClientError::Api {
            status: 409,
            kind: ErrorKind::Conflict,
            message: "duplicate".to_string(),
        };
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
        assert!(err.to_string().contains("409"));
        assert_eq!(ClientError::InvalidResponse("x".into()).kind(), None);
    }
}
