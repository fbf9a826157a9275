//! Client for the upstream agent API
//!
//! Without an API key the client runs in mock mode and answers locally with
//! deterministic development responses.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use helpdesk_shared::AgentAnalytics;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::circuit_breaker::{CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerManager};
use super::types::*;

/// Maximum number of retry attempts for idempotent reads
const MAX_RETRIES: usize = 3;

/// Initial backoff duration for retries (100ms)
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Maximum backoff duration for retries (5 seconds)
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// Breaker key for agent registration, which has no upstream id yet
const CREATE_KEY: &str = "__create__";

/// Error type for upstream agent API operations
#[derive(Debug, thiserror::Error)]
pub enum LyzrError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Agent service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Circuit breaker is OPEN (too many recent failures)")]
    CircuitOpen,

    #[error("Invalid response from agent service: {0}")]
    InvalidResponse(String),
}

impl LyzrError {
    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            LyzrError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LyzrError::Status { status, .. } => *status >= 500 || *status == 429,
            LyzrError::CircuitOpen => false,
            LyzrError::InvalidResponse(_) => false,
        }
    }
}

pub type LyzrResult<T> = Result<T, LyzrError>;

/// Upstream agent API client
pub struct LyzrClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    breakers: CircuitBreakerManager,
}

impl LyzrClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> LyzrResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        if api_key.is_none() {
            tracing::warn!("LYZR_API_KEY not set - agent service running in mock mode");
        }

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            breakers: CircuitBreakerManager::new(CircuitBreakerConfig::default()),
        })
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn check(response: Response) -> LyzrResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LyzrError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> LyzrResult<T> {
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| LyzrError::InvalidResponse(e.to_string()))
    }

    /// Run `operation` behind the breaker for `key`
    async fn guarded<T, F, Fut>(&self, key: &str, operation: F) -> LyzrResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = LyzrResult<T>>,
    {
        match self.breakers.call(key, operation).await {
            Ok(value) => Ok(value),
            Err(CircuitBreakerError::Rejected) => {
                tracing::warn!(upstream = %key, "Circuit breaker OPEN - request rejected");
                Err(LyzrError::CircuitOpen)
            }
            Err(CircuitBreakerError::Inner(err)) => Err(err),
        }
    }

    /// Register a new agent upstream
    pub async fn create_agent(&self, spec: &AgentSpec) -> LyzrResult<UpstreamAgent> {
        if self.is_mock() {
            return Ok(UpstreamAgent {
                id: Some(mock_agent_id(&spec.name)),
                status: Some("created".to_string()),
            });
        }

        self.guarded(CREATE_KEY, || async {
            let response = self
                .authorized(self.http.post(self.url("/agents")))
                .json(spec)
                .send()
                .await?;
            Self::decode(response).await
        })
        .await
    }

    pub async fn update_agent(&self, upstream_id: &str, spec: &AgentSpec) -> LyzrResult<UpstreamAgent> {
        if self.is_mock() {
            return Ok(UpstreamAgent {
                id: Some(upstream_id.to_string()),
                status: Some("updated".to_string()),
            });
        }

        self.guarded(upstream_id, || async {
            let response = self
                .authorized(self.http.put(self.url(&format!("/agents/{}", upstream_id))))
                .json(spec)
                .send()
                .await?;
            Self::decode(response).await
        })
        .await
    }

    pub async fn delete_agent(&self, upstream_id: &str) -> LyzrResult<()> {
        if self.is_mock() {
            return Ok(());
        }

        self.guarded(upstream_id, || async {
            let response = self
                .authorized(self.http.delete(self.url(&format!("/agents/{}", upstream_id))))
                .send()
                .await?;
            Self::check(response).await.map(|_| ())
        })
        .await
    }

    /// Send one user message to an agent. Never retried.
    pub async fn chat(&self, upstream_id: &str, message: &str) -> LyzrResult<UpstreamChatReply> {
        if self.is_mock() {
            return Ok(UpstreamChatReply {
                response: format!(
                    "Thank you for your message: '{}'. This is a mock response from the Lyzr agent.",
                    message
                ),
                confidence_score: Some(0.85),
            });
        }

        let payload = UpstreamChatRequest {
            agent_id: upstream_id,
            message,
            context: serde_json::json!({}),
        };

        self.guarded(upstream_id, || async {
            let response = self
                .authorized(self.http.post(self.url("/chat")))
                .json(&payload)
                .send()
                .await?;
            Self::decode(response).await
        })
        .await
    }

    /// Fetch agent analytics, retrying transient failures
    pub async fn agent_analytics(&self, upstream_id: &str) -> LyzrResult<AgentAnalytics> {
        use tokio_retry::strategy::{jitter, ExponentialBackoff};
        use tokio_retry::Retry;

        if self.is_mock() {
            return Ok(AgentAnalytics {
                agent_id: upstream_id.to_string(),
                total_conversations: 150,
                average_confidence: 0.82,
                tickets_created: 12,
                user_satisfaction: 4.5,
                response_time_avg: 2.3,
            });
        }

        let retry_strategy = ExponentialBackoff::from_millis(RETRY_BASE_DELAY.as_millis() as u64)
            .max_delay(RETRY_MAX_DELAY)
            .take(MAX_RETRIES)
            .map(jitter);

        Retry::spawn(retry_strategy, || async {
            let result = self
                .guarded(upstream_id, || async {
                    let response = self
                        .authorized(
                            self.http
                                .get(self.url(&format!("/agents/{}/analytics", upstream_id))),
                        )
                        .send()
                        .await?;
                    Self::decode::<AgentAnalytics>(response).await
                })
                .await;

            match &result {
                Ok(_) => Ok(result),
                Err(e) if e.is_transient() => {
                    tracing::debug!(upstream = %upstream_id, error = %e, "Transient error - will retry");
                    Err(result)
                }
                Err(e) => {
                    tracing::debug!(upstream = %upstream_id, error = %e, "Permanent error - will not retry");
                    Ok(result)
                }
            }
        })
        .await
        .unwrap_or_else(|e| e)
    }
}

/// Stable development id derived from the agent name
fn mock_agent_id(name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    format!("lyzr_agent_{}", hasher.finish() % 10_000)
}
