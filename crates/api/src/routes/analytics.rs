//! Analytics routes

use axum::{
    extract::{Path, State},
    Json,
};
use helpdesk_shared::{AgentAnalytics, OverviewAnalytics};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Totals across every agent
pub async fn overview(State(state): State<AppState>) -> ApiResult<Json<OverviewAnalytics>> {
    let overview = state.store.overview().await?;
    Ok(Json(overview))
}

/// Per-agent analytics: from the upstream service when the agent is
/// mirrored there, otherwise computed from the local logs
pub async fn agent_analytics(
    State(state): State<AppState>,
    Path(agent_id): Path<Uuid>,
) -> ApiResult<Json<AgentAnalytics>> {
    let agent = state
        .store
        .get_agent(agent_id)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;

    let analytics = match agent.lyzr_agent_id.as_deref() {
        Some(upstream_id) => {
            let mut analytics = state.lyzr.agent_analytics(upstream_id).await?;
            analytics.agent_id = agent.id.to_string();
            analytics
        }
        None => state
            .store
            .agent_activity(agent.id)
            .await?
            .into_analytics(agent.id),
    };

    Ok(Json(analytics))
}
