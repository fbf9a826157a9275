//! Upstream agent API integration
//!
//! Mirrors dashboard agents to the remote inference service and relays
//! chat messages to it.

pub mod circuit_breaker;
pub mod client;
pub mod types;

pub use client::{LyzrClient, LyzrError, LyzrResult};
pub use types::{AgentSpec, UpstreamAgent, UpstreamChatReply};
