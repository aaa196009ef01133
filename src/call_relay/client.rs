//! HTTP client for the call provider's web-call endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::RelayError;
use crate::config::CallProviderConfig;
use crate::voice::TokenSource;

const CREATE_WEB_CALL_PATH: &str = "/v2/create-web-call";

#[derive(Serialize)]
struct CreateWebCallRequest<'a> {
    agent_id: &'a str,
}

/// Expected 2xx body. Only `access_token` is required by the relay.
#[derive(Deserialize, Debug)]
struct CreateWebCallResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    call_id: Option<String>,
}

/// Stateless relay exchanging the server-held key for a per-call token
#[derive(Clone)]
pub struct CallTokenRelay {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CallTokenRelay {
    pub fn new(config: &CallProviderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        if config.api_key.is_none() {
            warn!("No call provider API key configured; create-call will answer 503");
        }

        Ok(Self {
            client,
            endpoint: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                CREATE_WEB_CALL_PATH
            ),
            api_key: config.api_key.clone(),
        })
    }

    /// Ask the provider for a web-call access token for `agent_id`
    pub async fn create_call(&self, agent_id: &str) -> Result<String, RelayError> {
        if agent_id.trim().is_empty() {
            return Err(RelayError::MissingAgentId);
        }
        let api_key = self.api_key.as_deref().ok_or(RelayError::NotConfigured)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&CreateWebCallRequest { agent_id })
            .send()
            .await
            .map_err(|e| {
                warn!("Call provider request failed: {}", e);
                RelayError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %body.chars().take(512).collect::<String>(),
                "Call provider rejected create-web-call"
            );
            return Err(RelayError::Upstream {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(RelayError::from)?;
        let parsed: CreateWebCallResponse = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Call provider response did not match schema: {}", e);
            RelayError::InvalidResponse(e.to_string())
        })?;

        match parsed.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                info!(call_id = ?parsed.call_id, "Web call created");
                Ok(token)
            }
            None => {
                warn!("Call provider response carried no access token");
                Err(RelayError::MissingToken)
            }
        }
    }
}

#[async_trait]
impl TokenSource for CallTokenRelay {
    async fn access_token(&self, agent_id: &str) -> Result<String, RelayError> {
        self.create_call(agent_id).await
    }
}
