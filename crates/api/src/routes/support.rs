//! Legacy contact-form support requests

use axum::{
    extract::{Path, State},
    Json,
};
use helpdesk_shared::{SupportRequest, SupportRequestDraft};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SupportResponse {
    pub id: Uuid,
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn create_support_request(
    State(state): State<AppState>,
    Json(draft): Json<SupportRequestDraft>,
) -> ApiResult<Json<SupportResponse>> {
    let request = draft.validate()?;
    let record = state.store.insert_support_request(&request).await?;

    tracing::info!(
        request_id = %record.id,
        priority = ?record.priority,
        "Support request created"
    );

    Ok(Json(SupportResponse {
        id: record.id,
        status: "success",
        message: "Support request created successfully",
    }))
}

pub async fn list_support_requests(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SupportRequest>>> {
    Ok(Json(state.store.list_support_requests().await?))
}

pub async fn get_support_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<SupportRequest>> {
    let request = state
        .store
        .get_support_request(request_id)
        .await?
        .ok_or(ApiError::NotFound("Support request"))?;
    Ok(Json(request))
}
