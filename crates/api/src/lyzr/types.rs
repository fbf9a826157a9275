//! Wire types of the upstream agent API

use serde::{Deserialize, Serialize};

use helpdesk_shared::{NewAgent, Tone};

/// Generation settings sent when an agent is first registered
#[derive(Debug, Clone, Serialize)]
pub struct AgentSettings {
    pub temperature: f64,
    pub max_tokens: u32,
    pub fallback_threshold: f64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
            fallback_threshold: 0.7,
        }
    }
}

/// Agent definition as the upstream expects it
#[derive(Debug, Clone, Serialize)]
pub struct AgentSpec {
    pub name: String,
    pub description: String,
    pub tone: Tone,
    pub personality: String,
    pub knowledge_base: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<AgentSettings>,
}

impl AgentSpec {
    pub fn for_create(agent: &NewAgent) -> Self {
        Self {
            settings: Some(AgentSettings::default()),
            ..Self::for_update(agent)
        }
    }

    pub fn for_update(agent: &NewAgent) -> Self {
        Self {
            name: agent.name.clone(),
            description: agent.description.clone(),
            tone: agent.tone,
            personality: agent.personality.clone(),
            knowledge_base: agent.knowledge_base.clone(),
            settings: None,
        }
    }
}

/// Upstream acknowledgement of an agent write
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamAgent {
    pub id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpstreamChatRequest<'a> {
    pub agent_id: &'a str,
    pub message: &'a str,
    pub context: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamChatReply {
    pub response: String,
    /// Missing when the upstream could not score its own answer
    #[serde(default)]
    pub confidence_score: Option<f64>,
}
