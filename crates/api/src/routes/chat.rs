//! Public chat endpoint used by the embeddable widget

use axum::{extract::State, Json};
use helpdesk_shared::{ChatReply, ChatRequest, NewChatSession, NewTicket};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Relay one visitor message to the agent, log the exchange and escalate
/// low-confidence answers to a ticket
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if req.user_session.trim().is_empty() {
        return Err(ApiError::BadRequest("user_session is required".into()));
    }

    let agent_id = Uuid::parse_str(req.agent_id.trim()).map_err(|_| ApiError::NotFound("Agent"))?;
    let agent = state
        .store
        .get_agent(agent_id)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;

    if !agent.is_active {
        return Err(ApiError::BadRequest("Agent is not active".into()));
    }

    let upstream_id = agent
        .lyzr_agent_id
        .clone()
        .unwrap_or_else(|| agent.id.to_string());
    let reply = state.lyzr.chat(&upstream_id, &req.message).await?;

    state
        .store
        .insert_chat_session(&NewChatSession {
            agent_id,
            user_session: req.user_session.clone(),
            message: req.message.clone(),
            response: reply.response.clone(),
            confidence_score: reply.confidence_score,
        })
        .await?;

    // No score means the upstream did not grade the answer; never escalate on that
    let ticket_created = match reply.confidence_score {
        Some(score) if score < state.config.ticket_confidence_threshold => {
            let ticket = state
                .store
                .insert_ticket(&NewTicket {
                    agent_id,
                    question: req.message.clone(),
                    user_session: req.user_session.clone(),
                    confidence_score: Some(score),
                })
                .await?;
            tracing::info!(
                agent_id = %agent_id,
                ticket_id = %ticket.id,
                confidence = score,
                "Low-confidence answer escalated to ticket"
            );
            true
        }
        _ => false,
    };

    tracing::debug!(agent_id = %agent_id, session = %req.user_session, ticket_created, "Chat exchange logged");

    Ok(Json(ChatReply {
        response: reply.response,
        confidence_score: reply.confidence_score.unwrap_or(0.0),
        ticket_created,
    }))
}
