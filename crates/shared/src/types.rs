//! Common types used across Helpdesk

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Conversational tone an agent answers in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Friendly,
    Casual,
    Formal,
    Enthusiastic,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Casual,
        Tone::Formal,
        Tone::Enthusiastic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Friendly => "friendly",
            Self::Casual => "casual",
            Self::Formal => "formal",
            Self::Enthusiastic => "enthusiastic",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "professional" => Ok(Self::Professional),
            "friendly" => Ok(Self::Friendly),
            "casual" => Ok(Self::Casual),
            "formal" => Ok(Self::Formal),
            "enthusiastic" => Ok(Self::Enthusiastic),
            _ => Err(format!("Invalid tone: {}", s)),
        }
    }
}

/// Ticket status. Any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(format!("Invalid ticket status: {}", s)),
        }
    }
}

/// Priority of a legacy support request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Lifecycle of a legacy support request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

// =============================================================================
// Records
// =============================================================================

/// A configured chat-bot profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub tone: Tone,
    pub personality: String,
    pub knowledge_base: Vec<String>,
    /// Identifier of the mirrored agent on the upstream inference API
    pub lyzr_agent_id: Option<String>,
    pub user_id: Uuid,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Escalated support query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub question: String,
    pub user_session: String,
    pub status: TicketStatus,
    pub confidence_score: Option<f64>,
    pub manual_response: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// One logged chat exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub user_session: String,
    pub message: String,
    pub response: String,
    pub confidence_score: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Contact-form request kept for older clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SupportRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
    pub status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Validated inputs
// =============================================================================

/// Agent fields after validation, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub tone: Tone,
    pub personality: String,
    pub knowledge_base: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub agent_id: Uuid,
    pub question: String,
    pub user_session: String,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatSession {
    pub agent_id: Uuid,
    pub user_session: String,
    pub message: String,
    pub response: String,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSupportRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
}

// =============================================================================
// Wire types
// =============================================================================

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub agent_id: String,
    pub message: String,
    pub user_session: String,
}

/// Reply of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub confidence_score: f64,
    pub ticket_created: bool,
}

/// Body of `PUT /api/tickets/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub status: TicketStatus,
    #[serde(default)]
    pub manual_response: Option<String>,
}

/// Platform-wide counters for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewAnalytics {
    pub total_agents: i64,
    pub total_chats: i64,
    pub total_tickets: i64,
    pub open_tickets: i64,
    pub average_confidence: f64,
    pub active_agents: i64,
}

/// Per-agent performance figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnalytics {
    pub agent_id: String,
    pub total_conversations: i64,
    pub average_confidence: f64,
    pub tickets_created: i64,
    pub user_satisfaction: f64,
    pub response_time_avg: f64,
}

/// Mean confidence rounded to two decimals; `0.0` for no samples
pub fn average_confidence<I>(scores: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0.0_f64, 0_u64), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        return 0.0;
    }
    round2(sum / count as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
