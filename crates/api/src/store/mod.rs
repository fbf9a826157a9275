//! Persistence for agents, tickets, chat logs and support requests
//!
//! Postgres is used whenever `DATABASE_URL` is set; otherwise the service
//! keeps everything in process memory, which is what local development
//! and the handler tests run against.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use helpdesk_shared::{
    Agent, AgentAnalytics, ChatSession, HelpdeskResult, NewAgent, NewChatSession,
    NewSupportRequest, NewTicket, OverviewAnalytics, SupportRequest, Ticket, TicketUpdate,
};
use uuid::Uuid;

/// Locally recorded activity of one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentActivity {
    pub total_conversations: i64,
    pub average_confidence: f64,
    pub tickets_created: i64,
}

impl AgentActivity {
    /// Analytics payload for agents with no upstream counterpart
    pub fn into_analytics(self, agent_id: Uuid) -> AgentAnalytics {
        AgentAnalytics {
            agent_id: agent_id.to_string(),
            total_conversations: self.total_conversations,
            average_confidence: self.average_confidence,
            tickets_created: self.tickets_created,
            user_satisfaction: 0.0,
            response_time_avg: 0.0,
        }
    }
}

#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

macro_rules! dispatch {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match $self {
            Store::Postgres(store) => store.$method($($arg),*).await,
            Store::Memory(store) => store.$method($($arg),*).await,
        }
    };
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(MemoryStore::default())
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    pub async fn ping(&self) -> HelpdeskResult<()> {
        dispatch!(self.ping())
    }

    // Agents

    pub async fn insert_agent(
        &self,
        owner: Uuid,
        agent: &NewAgent,
        lyzr_agent_id: Option<String>,
    ) -> HelpdeskResult<Agent> {
        dispatch!(self.insert_agent(owner, agent, lyzr_agent_id))
    }

    /// Agents of `owner`, newest first
    pub async fn list_agents(&self, owner: Uuid) -> HelpdeskResult<Vec<Agent>> {
        dispatch!(self.list_agents(owner))
    }

    pub async fn get_agent(&self, id: Uuid) -> HelpdeskResult<Option<Agent>> {
        dispatch!(self.get_agent(id))
    }

    pub async fn get_owned_agent(&self, owner: Uuid, id: Uuid) -> HelpdeskResult<Option<Agent>> {
        Ok(self.get_agent(id).await?.filter(|a| a.user_id == owner))
    }

    /// Replace the editable fields of an owned agent. `is_active` of `None`
    /// keeps the current state.
    pub async fn update_agent(
        &self,
        owner: Uuid,
        id: Uuid,
        agent: &NewAgent,
        is_active: Option<bool>,
    ) -> HelpdeskResult<Option<Agent>> {
        dispatch!(self.update_agent(owner, id, agent, is_active))
    }

    /// Remove an owned agent, returning the deleted record
    pub async fn delete_agent(&self, owner: Uuid, id: Uuid) -> HelpdeskResult<Option<Agent>> {
        dispatch!(self.delete_agent(owner, id))
    }

    // Tickets

    /// Fails with `NotFound` when the agent does not exist
    pub async fn insert_ticket(&self, ticket: &NewTicket) -> HelpdeskResult<Ticket> {
        dispatch!(self.insert_ticket(ticket))
    }

    /// All tickets, newest first
    pub async fn list_tickets(&self) -> HelpdeskResult<Vec<Ticket>> {
        dispatch!(self.list_tickets())
    }

    pub async fn get_ticket(&self, id: Uuid) -> HelpdeskResult<Option<Ticket>> {
        dispatch!(self.get_ticket(id))
    }

    pub async fn update_ticket(
        &self,
        id: Uuid,
        update: &TicketUpdate,
    ) -> HelpdeskResult<Option<Ticket>> {
        dispatch!(self.update_ticket(id, update))
    }

    // Chat log

    pub async fn insert_chat_session(&self, chat: &NewChatSession) -> HelpdeskResult<ChatSession> {
        dispatch!(self.insert_chat_session(chat))
    }

    // Analytics

    pub async fn overview(&self) -> HelpdeskResult<OverviewAnalytics> {
        dispatch!(self.overview())
    }

    pub async fn agent_activity(&self, agent_id: Uuid) -> HelpdeskResult<AgentActivity> {
        dispatch!(self.agent_activity(agent_id))
    }

    // Legacy support requests

    pub async fn insert_support_request(
        &self,
        request: &NewSupportRequest,
    ) -> HelpdeskResult<SupportRequest> {
        dispatch!(self.insert_support_request(request))
    }

    pub async fn list_support_requests(&self) -> HelpdeskResult<Vec<SupportRequest>> {
        dispatch!(self.list_support_requests())
    }

    pub async fn get_support_request(&self, id: Uuid) -> HelpdeskResult<Option<SupportRequest>> {
        dispatch!(self.get_support_request(id))
    }
}
