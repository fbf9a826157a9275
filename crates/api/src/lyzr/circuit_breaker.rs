//! Circuit breakers for upstream agents
//!
//! Each upstream agent gets its own breaker. It opens after consecutive
//! failures and lets a single probe through once the backoff has elapsed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Manages circuit breakers keyed by upstream agent id
pub struct CircuitBreakerManager {
    breakers: Arc<RwLock<HashMap<String, CircuitBreakerState>>>,
    config: CircuitBreakerConfig,
}

#[derive(Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening circuit
    pub failure_threshold: u32,
    /// Minimum backoff duration when circuit opens
    pub min_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
struct CircuitBreakerState {
    consecutive_failures: u32,
    last_failure_time: Option<Instant>,
    current_backoff: Duration,
}

impl Default for CircuitBreakerState {
    fn default() -> Self {
        Self {
            consecutive_failures: 0,
            last_failure_time: None,
            current_backoff: Duration::from_secs(1),
        }
    }
}

impl CircuitBreakerManager {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    pub async fn is_call_permitted(&self, key: &str) -> bool {
        let breakers = self.breakers.read().await;

        let Some(state) = breakers.get(key) else {
            return true;
        };
        if state.consecutive_failures < self.config.failure_threshold {
            return true;
        }
        match state.last_failure_time {
            Some(last_failure) if last_failure.elapsed() < state.current_backoff => {
                tracing::debug!(
                    upstream = %key,
                    failures = state.consecutive_failures,
                    backoff_remaining = ?state.current_backoff.saturating_sub(last_failure.elapsed()),
                    "Circuit breaker OPEN - rejecting call"
                );
                false
            }
            _ => {
                tracing::debug!(upstream = %key, "Circuit breaker HALF-OPEN - allowing probe");
                true
            }
        }
    }

    pub async fn record_success(&self, key: &str) {
        let mut breakers = self.breakers.write().await;

        if let Some(state) = breakers.remove(key) {
            if state.consecutive_failures > 0 {
                tracing::info!(
                    upstream = %key,
                    previous_failures = state.consecutive_failures,
                    "Circuit breaker reset - request succeeded"
                );
            }
        }
    }

    pub async fn record_failure(&self, key: &str) {
        let mut breakers = self.breakers.write().await;

        let state = breakers.entry(key.to_string()).or_default();
        state.consecutive_failures += 1;
        state.last_failure_time = Some(Instant::now());

        if state.consecutive_failures >= self.config.failure_threshold {
            let exponent = state
                .consecutive_failures
                .saturating_sub(self.config.failure_threshold)
                .min(16);
            state.current_backoff = (self.config.min_backoff * 2u32.pow(exponent))
                .min(self.config.max_backoff);

            tracing::warn!(
                upstream = %key,
                consecutive_failures = state.consecutive_failures,
                backoff = ?state.current_backoff,
                "Circuit breaker OPENED"
            );
        } else {
            tracing::debug!(
                upstream = %key,
                consecutive_failures = state.consecutive_failures,
                threshold = self.config.failure_threshold,
                "Failure recorded - circuit still closed"
            );
        }
    }

    /// Execute an async operation with circuit breaker protection
    pub async fn call<F, Fut, T, E>(&self, key: &str, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if !self.is_call_permitted(key).await {
            return Err(CircuitBreakerError::Rejected);
        }

        match operation().await {
            Ok(result) => {
                self.record_success(key).await;
                Ok(result)
            }
            Err(err) => {
                self.record_failure(key).await;
                Err(CircuitBreakerError::Inner(err))
            }
        }
    }
}

#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// Circuit breaker is open - call rejected
    Rejected,
    /// Inner error from the operation
    Inner(E),
}
