//! Ticket routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use helpdesk_shared::{HelpdeskError, NewTicket, Ticket, TicketFilterQuery, TicketUpdate};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub agent_id: String,
    pub question: String,
    pub user_session: String,
    pub confidence_score: Option<f64>,
}

/// List tickets, newest first, narrowed by `status` and `agent_id`
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<TicketFilterQuery>,
) -> ApiResult<Json<Vec<Ticket>>> {
    let filter = query.parse().map_err(ApiError::BadRequest)?;
    let tickets = state.store.list_tickets().await?;
    Ok(Json(filter.apply(tickets)))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state
        .store
        .get_ticket(ticket_id)
        .await?
        .ok_or(ApiError::NotFound("Ticket"))?;
    Ok(Json(ticket))
}

/// Open a ticket by hand
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(req): Json<CreateTicketRequest>,
) -> ApiResult<Json<Ticket>> {
    if req.question.trim().is_empty() {
        return Err(ApiError::Validation("Question cannot be empty".into()));
    }
    if let Some(score) = req.confidence_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(ApiError::Validation(
                "confidence_score must be between 0 and 1".into(),
            ));
        }
    }
    let agent_id = Uuid::parse_str(req.agent_id.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid agent id: {}", req.agent_id)))?;

    let ticket = state
        .store
        .insert_ticket(&NewTicket {
            agent_id,
            question: req.question.trim().to_string(),
            user_session: req.user_session,
            confidence_score: req.confidence_score,
        })
        .await
        .map_err(|e| match e {
            HelpdeskError::NotFound(_) => ApiError::NotFound("Agent"),
            other => other.into(),
        })?;

    tracing::info!(ticket_id = %ticket.id, agent_id = %agent_id, "Ticket created manually");
    Ok(Json(ticket))
}

/// Set status and, optionally, the manual response
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
    Json(update): Json<TicketUpdate>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state
        .store
        .update_ticket(ticket_id, &update)
        .await?
        .ok_or(ApiError::NotFound("Ticket"))?;

    tracing::info!(ticket_id = %ticket_id, status = %ticket.status, "Ticket updated");
    Ok(Json(ticket))
}
