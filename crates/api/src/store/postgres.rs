//! Postgres-backed store

use helpdesk_shared::{
    round2, Agent, ChatSession, HelpdeskError, HelpdeskResult, NewAgent, NewChatSession,
    NewSupportRequest, NewTicket, OverviewAnalytics, SupportRequest, Ticket, TicketStatus,
    TicketUpdate,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::AgentActivity;

/// PostgreSQL foreign key violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

const AGENT_COLUMNS: &str = "id, name, description, tone, personality, knowledge_base, \
     lyzr_agent_id, user_id, is_active, created_at, updated_at";

const TICKET_COLUMNS: &str = "id, agent_id, question, user_session, status, confidence_score, \
     manual_response, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, name, email, subject, message, priority, status, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct OverviewRow {
    total_agents: i64,
    active_agents: i64,
    total_chats: i64,
    total_tickets: i64,
    open_tickets: i64,
    average_confidence: Option<f64>,
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    total_conversations: i64,
    average_confidence: Option<f64>,
    tickets_created: i64,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> HelpdeskResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn insert_agent(
        &self,
        owner: Uuid,
        agent: &NewAgent,
        lyzr_agent_id: Option<String>,
    ) -> HelpdeskResult<Agent> {
        let row = sqlx::query_as::<_, Agent>(&format!(
            r#"
            INSERT INTO agents (name, description, tone, personality, knowledge_base,
                                lyzr_agent_id, user_id, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(agent.tone)
        .bind(&agent.personality)
        .bind(&agent.knowledge_base)
        .bind(lyzr_agent_id)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_agents(&self, owner: Uuid) -> HelpdeskResult<Vec<Agent>> {
        let rows = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_agent(&self, id: Uuid) -> HelpdeskResult<Option<Agent>> {
        let row = sqlx::query_as::<_, Agent>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_agent(
        &self,
        owner: Uuid,
        id: Uuid,
        agent: &NewAgent,
        is_active: Option<bool>,
    ) -> HelpdeskResult<Option<Agent>> {
        let row = sqlx::query_as::<_, Agent>(&format!(
            r#"
            UPDATE agents
            SET name = $3, description = $4, tone = $5, personality = $6,
                knowledge_base = $7, is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(agent.tone)
        .bind(&agent.personality)
        .bind(&agent.knowledge_base)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_agent(&self, owner: Uuid, id: Uuid) -> HelpdeskResult<Option<Agent>> {
        let row = sqlx::query_as::<_, Agent>(&format!(
            "DELETE FROM agents WHERE id = $1 AND user_id = $2 RETURNING {AGENT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_ticket(&self, ticket: &NewTicket) -> HelpdeskResult<Ticket> {
        let result = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            INSERT INTO tickets (agent_id, question, user_session, status, confidence_score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket.agent_id)
        .bind(&ticket.question)
        .bind(&ticket.user_session)
        .bind(TicketStatus::Open)
        .bind(ticket.confidence_score)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
            {
                Err(HelpdeskError::NotFound(format!("agent {}", ticket.agent_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_tickets(&self) -> HelpdeskResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_ticket(&self, id: Uuid) -> HelpdeskResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Last write wins; `manual_response` is only overwritten when supplied
    pub async fn update_ticket(
        &self,
        id: Uuid,
        update: &TicketUpdate,
    ) -> HelpdeskResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET status = $2,
                manual_response = COALESCE($3, manual_response),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.status)
        .bind(update.manual_response.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_chat_session(&self, chat: &NewChatSession) -> HelpdeskResult<ChatSession> {
        let row = sqlx::query_as::<_, ChatSession>(
            r#"
            INSERT INTO chat_sessions (agent_id, user_session, message, response, confidence_score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, agent_id, user_session, message, response, confidence_score, created_at
            "#,
        )
        .bind(chat.agent_id)
        .bind(&chat.user_session)
        .bind(&chat.message)
        .bind(&chat.response)
        .bind(chat.confidence_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn overview(&self) -> HelpdeskResult<OverviewAnalytics> {
        let row = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM agents) AS total_agents,
                (SELECT COUNT(*) FROM agents WHERE is_active) AS active_agents,
                (SELECT COUNT(*) FROM chat_sessions) AS total_chats,
                (SELECT COUNT(*) FROM tickets) AS total_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'open') AS open_tickets,
                (SELECT AVG(confidence_score) FROM chat_sessions) AS average_confidence
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OverviewAnalytics {
            total_agents: row.total_agents,
            active_agents: row.active_agents,
            total_chats: row.total_chats,
            total_tickets: row.total_tickets,
            open_tickets: row.open_tickets,
            average_confidence: row.average_confidence.map(round2).unwrap_or(0.0),
        })
    }

    pub async fn agent_activity(&self, agent_id: Uuid) -> HelpdeskResult<AgentActivity> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM chat_sessions WHERE agent_id = $1) AS total_conversations,
                (SELECT AVG(confidence_score) FROM chat_sessions WHERE agent_id = $1) AS average_confidence,
                (SELECT COUNT(*) FROM tickets WHERE agent_id = $1) AS tickets_created
            "#,
        )
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AgentActivity {
            total_conversations: row.total_conversations,
            average_confidence: row.average_confidence.map(round2).unwrap_or(0.0),
            tickets_created: row.tickets_created,
        })
    }

    pub async fn insert_support_request(
        &self,
        request: &NewSupportRequest,
    ) -> HelpdeskResult<SupportRequest> {
        let row = sqlx::query_as::<_, SupportRequest>(&format!(
            r#"
            INSERT INTO support_requests (name, email, subject, message, priority, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.subject)
        .bind(&request.message)
        .bind(request.priority)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_support_requests(&self) -> HelpdeskResult<Vec<SupportRequest>> {
        let rows = sqlx::query_as::<_, SupportRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM support_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_support_request(&self, id: Uuid) -> HelpdeskResult<Option<SupportRequest>> {
        let row = sqlx::query_as::<_, SupportRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM support_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
