//! In-process store used without a database

use std::sync::Arc;

use helpdesk_shared::{
    average_confidence, Agent, ChatSession, HelpdeskError, HelpdeskResult, NewAgent,
    NewChatSession, NewSupportRequest, NewTicket, OverviewAnalytics, RequestStatus,
    SupportRequest, Ticket, TicketStatus, TicketUpdate,
};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AgentActivity;

#[derive(Debug, Default)]
struct Tables {
    agents: Vec<Agent>,
    tickets: Vec<Ticket>,
    chat_sessions: Vec<ChatSession>,
    support_requests: Vec<SupportRequest>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

/// Newest first; rows created in the same instant keep reverse insertion order
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

impl MemoryStore {
    pub async fn ping(&self) -> HelpdeskResult<()> {
        Ok(())
    }

    pub async fn insert_agent(
        &self,
        owner: Uuid,
        agent: &NewAgent,
        lyzr_agent_id: Option<String>,
    ) -> HelpdeskResult<Agent> {
        let now = OffsetDateTime::now_utc();
        let record = Agent {
            id: Uuid::new_v4(),
            name: agent.name.clone(),
            description: agent.description.clone(),
            tone: agent.tone,
            personality: agent.personality.clone(),
            knowledge_base: agent.knowledge_base.clone(),
            lyzr_agent_id,
            user_id: owner,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.agents.push(record.clone());
        Ok(record)
    }

    pub async fn list_agents(&self, owner: Uuid) -> HelpdeskResult<Vec<Agent>> {
        let tables = self.tables.read().await;
        let owned: Vec<Agent> = tables
            .agents
            .iter()
            .filter(|a| a.user_id == owner)
            .cloned()
            .collect();
        Ok(newest_first(&owned, |a| a.created_at))
    }

    pub async fn get_agent(&self, id: Uuid) -> HelpdeskResult<Option<Agent>> {
        let tables = self.tables.read().await;
        Ok(tables.agents.iter().find(|a| a.id == id).cloned())
    }

    pub async fn update_agent(
        &self,
        owner: Uuid,
        id: Uuid,
        agent: &NewAgent,
        is_active: Option<bool>,
    ) -> HelpdeskResult<Option<Agent>> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables
            .agents
            .iter_mut()
            .find(|a| a.id == id && a.user_id == owner)
        else {
            return Ok(None);
        };
        record.name = agent.name.clone();
        record.description = agent.description.clone();
        record.tone = agent.tone;
        record.personality = agent.personality.clone();
        record.knowledge_base = agent.knowledge_base.clone();
        if let Some(active) = is_active {
            record.is_active = active;
        }
        record.updated_at = OffsetDateTime::now_utc();
        Ok(Some(record.clone()))
    }

    /// Cascades to the agent's tickets and chat log
    pub async fn delete_agent(&self, owner: Uuid, id: Uuid) -> HelpdeskResult<Option<Agent>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables
            .agents
            .iter()
            .position(|a| a.id == id && a.user_id == owner)
        else {
            return Ok(None);
        };
        let removed = tables.agents.remove(index);
        tables.tickets.retain(|t| t.agent_id != id);
        tables.chat_sessions.retain(|c| c.agent_id != id);
        Ok(Some(removed))
    }

    pub async fn insert_ticket(&self, ticket: &NewTicket) -> HelpdeskResult<Ticket> {
        let mut tables = self.tables.write().await;
        if !tables.agents.iter().any(|a| a.id == ticket.agent_id) {
            return Err(HelpdeskError::NotFound(format!("agent {}", ticket.agent_id)));
        }
        let now = OffsetDateTime::now_utc();
        let record = Ticket {
            id: Uuid::new_v4(),
            agent_id: ticket.agent_id,
            question: ticket.question.clone(),
            user_session: ticket.user_session.clone(),
            status: TicketStatus::Open,
            confidence_score: ticket.confidence_score,
            manual_response: None,
            created_at: now,
            updated_at: now,
        };
        tables.tickets.push(record.clone());
        Ok(record)
    }

    pub async fn list_tickets(&self) -> HelpdeskResult<Vec<Ticket>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.tickets, |t| t.created_at))
    }

    pub async fn get_ticket(&self, id: Uuid) -> HelpdeskResult<Option<Ticket>> {
        let tables = self.tables.read().await;
        Ok(tables.tickets.iter().find(|t| t.id == id).cloned())
    }

    pub async fn update_ticket(
        &self,
        id: Uuid,
        update: &TicketUpdate,
    ) -> HelpdeskResult<Option<Ticket>> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        record.status = update.status;
        if let Some(response) = &update.manual_response {
            record.manual_response = Some(response.clone());
        }
        record.updated_at = OffsetDateTime::now_utc();
        Ok(Some(record.clone()))
    }

    pub async fn insert_chat_session(&self, chat: &NewChatSession) -> HelpdeskResult<ChatSession> {
        let mut tables = self.tables.write().await;
        if !tables.agents.iter().any(|a| a.id == chat.agent_id) {
            return Err(HelpdeskError::NotFound(format!("agent {}", chat.agent_id)));
        }
        let record = ChatSession {
            id: Uuid::new_v4(),
            agent_id: chat.agent_id,
            user_session: chat.user_session.clone(),
            message: chat.message.clone(),
            response: chat.response.clone(),
            confidence_score: chat.confidence_score,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.chat_sessions.push(record.clone());
        Ok(record)
    }

    pub async fn overview(&self) -> HelpdeskResult<OverviewAnalytics> {
        let tables = self.tables.read().await;
        Ok(OverviewAnalytics {
            total_agents: tables.agents.len() as i64,
            active_agents: tables.agents.iter().filter(|a| a.is_active).count() as i64,
            total_chats: tables.chat_sessions.len() as i64,
            total_tickets: tables.tickets.len() as i64,
            open_tickets: tables
                .tickets
                .iter()
                .filter(|t| t.status == TicketStatus::Open)
                .count() as i64,
            average_confidence: average_confidence(
                tables.chat_sessions.iter().filter_map(|c| c.confidence_score),
            ),
        })
    }

    pub async fn agent_activity(&self, agent_id: Uuid) -> HelpdeskResult<AgentActivity> {
        let tables = self.tables.read().await;
        let chats: Vec<&ChatSession> = tables
            .chat_sessions
            .iter()
            .filter(|c| c.agent_id == agent_id)
            .collect();
        Ok(AgentActivity {
            total_conversations: chats.len() as i64,
            average_confidence: average_confidence(chats.iter().filter_map(|c| c.confidence_score)),
            tickets_created: tables
                .tickets
                .iter()
                .filter(|t| t.agent_id == agent_id)
                .count() as i64,
        })
    }

    pub async fn insert_support_request(
        &self,
        request: &NewSupportRequest,
    ) -> HelpdeskResult<SupportRequest> {
        let record = SupportRequest {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            email: request.email.clone(),
            subject: request.subject.clone(),
            message: request.message.clone(),
            priority: request.priority,
            status: RequestStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables
            .write()
            .await
            .support_requests
            .push(record.clone());
        Ok(record)
    }

    pub async fn list_support_requests(&self) -> HelpdeskResult<Vec<SupportRequest>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.support_requests, |r| r.created_at))
    }

    pub async fn get_support_request(&self, id: Uuid) -> HelpdeskResult<Option<SupportRequest>> {
        let tables = self.tables.read().await;
        Ok(tables.support_requests.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use helpdesk_shared::Tone;

    fn new_agent(name: &str) -> NewAgent {
        NewAgent {
            name: name.into(),
            description: "Answers product questions".into(),
            tone: Tone::Professional,
            personality: "Helpful and to the point".into(),
            knowledge_base: vec![],
        }
    }

    fn new_ticket(agent_id: Uuid, score: Option<f64>) -> NewTicket {
        NewTicket {
            agent_id,
            question: "How do I reset my password?".into(),
            user_session: "session_1".into(),
            confidence_score: score,
        }
    }

    #[tokio::test]
    async fn test_agents_are_scoped_to_owner_and_newest_first() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let first = store.insert_agent(owner, &new_agent("First"), None).await.unwrap();
        let second = store.insert_agent(owner, &new_agent("Second"), None).await.unwrap();
        store
            .insert_agent(Uuid::new_v4(), &new_agent("Other"), None)
            .await
            .unwrap();

        let listed = store.list_agents(owner).await.unwrap();
        assert_eq!(
            listed.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert!(listed.iter().all(|a| a.is_active));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_ownership() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let agent = store.insert_agent(owner, &new_agent("Bot"), None).await.unwrap();

        let stranger = Uuid::new_v4();
        assert!(store
            .update_agent(stranger, agent.id, &new_agent("Hijacked"), None)
            .await
            .unwrap()
            .is_none());
        assert!(store.delete_agent(stranger, agent.id).await.unwrap().is_none());

        let updated = store
            .update_agent(owner, agent.id, &new_agent("Renamed"), Some(false))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert!(!updated.is_active);
        assert!(updated.updated_at >= agent.updated_at);

        let untouched = store
            .update_agent(owner, agent.id, &new_agent("Renamed again"), None)
            .await
            .unwrap()
            .unwrap();
        assert!(!untouched.is_active);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_tickets() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let agent = store.insert_agent(owner, &new_agent("Bot"), None).await.unwrap();
        let ticket = store.insert_ticket(&new_ticket(agent.id, Some(0.3))).await.unwrap();

        store.delete_agent(owner, agent.id).await.unwrap();
        assert!(store.get_ticket(ticket.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ticket_requires_existing_agent() {
        let store = MemoryStore::default();
        let err = store
            .insert_ticket(&new_ticket(Uuid::new_v4(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ticket_update_keeps_response_when_omitted() {
        let store = MemoryStore::default();
        let agent = store
            .insert_agent(Uuid::new_v4(), &new_agent("Bot"), None)
            .await
            .unwrap();
        let ticket = store.insert_ticket(&new_ticket(agent.id, Some(0.5))).await.unwrap();

        store
            .update_ticket(
                ticket.id,
                &TicketUpdate {
                    status: TicketStatus::InProgress,
                    manual_response: Some("Use the reset link".into()),
                },
            )
            .await
            .unwrap();
        let resolved = store
            .update_ticket(
                ticket.id,
                &TicketUpdate {
                    status: TicketStatus::Resolved,
                    manual_response: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.status, TicketStatus::Resolved);
        assert_eq!(resolved.manual_response.as_deref(), Some("Use the reset link"));

        assert!(store
            .update_ticket(Uuid::new_v4(), &TicketUpdate {
                status: TicketStatus::Open,
                manual_response: None,
            })
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_overview_and_activity_counts() {
        let store = MemoryStore::default();
        let agent = store
            .insert_agent(Uuid::new_v4(), &new_agent("Bot"), None)
            .await
            .unwrap();
        let idle = store
            .insert_agent(Uuid::new_v4(), &new_agent("Idle"), None)
            .await
            .unwrap();

        for score in [Some(0.9), Some(0.5), None] {
            store
                .insert_chat_session(&NewChatSession {
                    agent_id: agent.id,
                    user_session: "session_1".into(),
                    message: "hi".into(),
                    response: "hello".into(),
                    confidence_score: score,
                })
                .await
                .unwrap();
        }
        store.insert_ticket(&new_ticket(agent.id, Some(0.5))).await.unwrap();

        let overview = store.overview().await.unwrap();
        assert_eq!(overview.total_agents, 2);
        assert_eq!(overview.active_agents, 2);
        assert_eq!(overview.total_chats, 3);
        assert_eq!(overview.total_tickets, 1);
        assert_eq!(overview.open_tickets, 1);
        assert_eq!(overview.average_confidence, 0.7);

        let activity = store.agent_activity(agent.id).await.unwrap();
        assert_eq!(activity.total_conversations, 3);
        assert_eq!(activity.tickets_created, 1);
        assert_eq!(activity.average_confidence, 0.7);

        let quiet = store.agent_activity(idle.id).await.unwrap();
        assert_eq!(quiet.total_conversations, 0);
        assert_eq!(quiet.average_confidence, 0.0);
    }

    #[tokio::test]
    async fn test_support_requests_start_pending() {
        let store = MemoryStore::default();
        let request = store
            .insert_support_request(&NewSupportRequest {
                name: "Jo".into(),
                email: "jo@example.com".into(),
                subject: "Login fails".into(),
                message: "I cannot sign in since Monday".into(),
                priority: helpdesk_shared::Priority::High,
            })
            .await
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(
            store.get_support_request(request.id).await.unwrap(),
            Some(request.clone())
        );
        assert_eq!(store.list_support_requests().await.unwrap().len(), 1);
    }
}
