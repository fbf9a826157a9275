//! Widget embed configuration
//!
//! Mirrors the object a host page passes to the widget loader. Every field
//! is optional on the wire; missing ones take the defaults below.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{WidgetError, WidgetResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_AGENT_ID: &str = "default";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub api_url: String,
    pub agent_id: String,
    pub theme: Theme,
    pub position: Position,
    pub primary_color: String,
    pub title: String,
    pub subtitle: String,
    /// Session to resume; a fresh one is generated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            theme: Theme::default(),
            position: Position::default(),
            primary_color: "#3b82f6".to_string(),
            title: "Need Help?".to_string(),
            subtitle: "Chat with our support team".to_string(),
            session_id: None,
        }
    }
}

impl WidgetConfig {
    /// Parse a host-page config object, filling in defaults
    pub fn from_json(raw: &str) -> WidgetResult<Self> {
        serde_json::from_str(raw).map_err(|e| WidgetError::InvalidConfig(e.to_string()))
    }

    /// The API base URL, which must be absolute http(s)
    pub fn api_base(&self) -> WidgetResult<Url> {
        let url = Url::parse(self.api_url.trim())
            .map_err(|e| WidgetError::InvalidConfig(format!("apiUrl {:?}: {}", self.api_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(WidgetError::InvalidConfig(format!(
                "apiUrl must use http or https, got {}",
                other
            ))),
        }
    }

    /// Agent the widget talks to; blank falls back to `default`
    pub fn effective_agent_id(&self) -> &str {
        let trimmed = self.agent_id.trim();
        if trimmed.is_empty() {
            DEFAULT_AGENT_ID
        } else {
            trimmed
        }
    }
}
