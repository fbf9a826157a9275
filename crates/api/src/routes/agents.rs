//! Agent registry routes
//!
//! Agents belong to the signed-in dashboard user. Every agent is mirrored
//! to the upstream agent service on a best-effort basis: an upstream
//! failure never blocks the local write, it only leaves `lyzr_agent_id`
//! unset.

use axum::{
    extract::{Extension, Multipart, Path, State},
    Json,
};
use helpdesk_shared::{Agent, AgentDraft, NewAgent};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    lyzr::AgentSpec,
    state::AppState,
    storage::UploadedFile,
};

#[derive(Debug, Serialize)]
pub struct EmbedCode {
    pub agent_id: Uuid,
    pub embed_code: String,
}

/// `<script>` tag a customer pastes into their site
pub fn embed_snippet(script_url: &str, agent_id: Uuid) -> String {
    format!(r#"<script src="{}" agent-id="{}"></script>"#, script_url, agent_id)
}

/// Register upstream (best effort) and store the agent
async fn register_agent(state: &AppState, owner: Uuid, agent: NewAgent) -> ApiResult<Agent> {
    let lyzr_agent_id = match state.lyzr.create_agent(&AgentSpec::for_create(&agent)).await {
        Ok(upstream) => upstream.id,
        Err(e) => {
            tracing::warn!(error = %e, name = %agent.name, "Upstream agent registration failed - storing without upstream id");
            None
        }
    };

    let record = state.store.insert_agent(owner, &agent, lyzr_agent_id).await?;

    tracing::info!(
        agent_id = %record.id,
        user_id = %owner,
        upstream = record.lyzr_agent_id.as_deref().unwrap_or("none"),
        knowledge_items = record.knowledge_base.len(),
        "Agent created"
    );

    Ok(record)
}

/// Create an agent from a JSON body
pub async fn create_agent(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(draft): Json<AgentDraft>,
) -> ApiResult<Json<Agent>> {
    let agent = draft.validate(Vec::new())?;
    let record = register_agent(&state, auth_user.user_id, agent).await?;
    Ok(Json(record))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {}", e)))
}

/// Create an agent from the dashboard form, including knowledge-base files
///
/// Text fields: `name`, `description`, `tone`, `personality` and any number
/// of `knowledge_base` items. File fields: `files`.
pub async fn create_agent_form(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<Json<Agent>> {
    let mut draft = AgentDraft::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => draft.name = field_text(field).await?,
            "description" => draft.description = field_text(field).await?,
            "tone" => draft.tone = field_text(field).await?,
            "personality" => draft.personality = field_text(field).await?,
            "knowledge_base" => draft.knowledge_base.push(field_text(field).await?),
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file upload: {}", e)))?;
                if bytes.is_empty() {
                    continue;
                }
                files.push(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    // Reject bad input before anything is uploaded
    draft.check()?;

    let file_urls = state.storage.upload_all(&files).await?;
    let agent = draft.validate(file_urls)?;
    let record = register_agent(&state, auth_user.user_id, agent).await?;
    Ok(Json(record))
}

/// List the caller's agents, newest first
pub async fn list_agents(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Agent>>> {
    let agents = state.store.list_agents(auth_user.user_id).await?;
    Ok(Json(agents))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(agent_id): Path<Uuid>,
) -> ApiResult<Json<Agent>> {
    let agent = state
        .store
        .get_owned_agent(auth_user.user_id, agent_id)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;
    Ok(Json(agent))
}

/// Replace the editable fields of an agent
pub async fn update_agent(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(agent_id): Path<Uuid>,
    Json(draft): Json<AgentDraft>,
) -> ApiResult<Json<Agent>> {
    let is_active = draft.is_active;
    let agent = draft.validate(Vec::new())?;

    let record = state
        .store
        .update_agent(auth_user.user_id, agent_id, &agent, is_active)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;

    if let Some(upstream_id) = record.lyzr_agent_id.as_deref() {
        if let Err(e) = state
            .lyzr
            .update_agent(upstream_id, &AgentSpec::for_update(&agent))
            .await
        {
            tracing::warn!(agent_id = %agent_id, upstream = %upstream_id, error = %e, "Upstream agent sync failed");
        }
    }

    tracing::info!(agent_id = %agent_id, user_id = %auth_user.user_id, is_active = record.is_active, "Agent updated");
    Ok(Json(record))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(agent_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let removed = state
        .store
        .delete_agent(auth_user.user_id, agent_id)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;

    if let Some(upstream_id) = removed.lyzr_agent_id.as_deref() {
        if let Err(e) = state.lyzr.delete_agent(upstream_id).await {
            tracing::warn!(agent_id = %agent_id, upstream = %upstream_id, error = %e, "Upstream agent delete failed");
        }
    }

    tracing::info!(agent_id = %agent_id, user_id = %auth_user.user_id, "Agent deleted");
    Ok(Json(json!({ "message": "Agent deleted successfully" })))
}

/// Embed snippet for an agent's widget
pub async fn embed_code(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(agent_id): Path<Uuid>,
) -> ApiResult<Json<EmbedCode>> {
    let agent = state
        .store
        .get_owned_agent(auth_user.user_id, agent_id)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;

    Ok(Json(EmbedCode {
        agent_id: agent.id,
        embed_code: embed_snippet(&state.config.widget_script_url, agent.id),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::test_helpers::{bearer, call, send, test_app};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;

    fn agent_body(name: &str) -> Value {
        json!({
            "name": name,
            "description": "Answers billing questions",
            "tone": "friendly",
            "personality": "Warm, patient and precise",
            "knowledge_base": ["https://docs.example.com/billing", "  "]
        })
    }

    #[test]
    fn test_embed_snippet() {
        let id = Uuid::nil();
        assert_eq!(
            embed_snippet("https://cdn.example.com/chat-widget.js", id),
            r#"<script src="https://cdn.example.com/chat-widget.js" agent-id="00000000-0000-0000-0000-000000000000"></script>"#
        );
    }

    #[tokio::test]
    async fn test_agent_routes_require_auth() {
        let app = test_app();
        let (status, _) = call(&app, Method::GET, "/api/agents", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = call(&app, Method::POST, "/api/agents", None, Some(agent_body("Bot"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_list_get_agent() {
        let app = test_app();
        let owner = Uuid::new_v4();
        let token = bearer(owner);

        let (status, created) = call(
            &app,
            Method::POST,
            "/api/agents",
            Some(&token),
            Some(agent_body("Billing Bot")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["user_id"], owner.to_string());
        assert_eq!(created["is_active"], true);
        assert!(created["lyzr_agent_id"]
            .as_str()
            .unwrap()
            .starts_with("lyzr_agent_"));
        assert_eq!(created["knowledge_base"], json!(["https://docs.example.com/billing"]));

        let (_, second) = call(
            &app,
            Method::POST,
            "/api/agents",
            Some(&token),
            Some(agent_body("Returns Bot")),
        )
        .await;

        let (status, listed) = call(&app, Method::GET, "/api/agents", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 2);
        assert_eq!(listed[0]["id"], second["id"]);

        let uri = format!("/api/agents/{}", created["id"].as_str().unwrap());
        let (status, fetched) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Billing Bot");

        // Other users cannot see it
        let (status, _) = call(&app, Method::GET, &uri, Some(&bearer(Uuid::new_v4())), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_agent_validation_errors() {
        let app = test_app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/agents",
            Some(&bearer(Uuid::new_v4())),
            Some(json!({"name": "B", "description": "short", "tone": "grumpy", "personality": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("Agent name must be at least 2 characters"));
        assert!(message.contains("Invalid tone: grumpy"));
    }

    #[tokio::test]
    async fn test_update_delete_and_embed() {
        let app = test_app();
        let token = bearer(Uuid::new_v4());
        let (_, created) = call(&app, Method::POST, "/api/agents", Some(&token), Some(agent_body("Bot"))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let mut changed = agent_body("Renamed Bot");
        changed["tone"] = json!("formal");
        let (status, updated) = call(
            &app,
            Method::PUT,
            &format!("/api/agents/{}", id),
            Some(&token),
            Some(changed),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Renamed Bot");
        assert_eq!(updated["tone"], "formal");
        assert_eq!(updated["lyzr_agent_id"], created["lyzr_agent_id"]);

        let (status, embed) = call(
            &app,
            Method::GET,
            &format!("/api/agents/{}/embed", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(embed["embed_code"]
            .as_str()
            .unwrap()
            .contains(&format!(r#"agent-id="{}""#, id)));

        let (status, _) = call(&app, Method::DELETE, &format!("/api/agents/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::DELETE, &format!("/api/agents/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn multipart_request(token: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let boundary = "helpdesk-test-boundary";
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{}\r\n", boundary));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", boundary));

        Request::builder()
            .method(Method::POST)
            .uri("/api/agents/form")
            .header("Authorization", format!("Bearer {}", token))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_form_create_with_manual_items() {
        let app = test_app();
        let token = bearer(Uuid::new_v4());
        let request = multipart_request(
            &token,
            &[
                ("name", None, "Form Bot"),
                ("description", None, "Created from the dashboard form"),
                ("tone", None, "casual"),
                ("personality", None, "Laid back but helpful"),
                ("knowledge_base", None, "https://docs.example.com/faq"),
                ("knowledge_base", None, " Shipping takes 3 days "),
            ],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tone"], "casual");
        assert_eq!(
            body["knowledge_base"],
            json!(["https://docs.example.com/faq", "Shipping takes 3 days"])
        );
    }

    #[tokio::test]
    async fn test_form_validates_before_uploading() {
        let app = test_app();
        let token = bearer(Uuid::new_v4());
        let request = multipart_request(
            &token,
            &[("name", None, "X"), ("files", Some("faq.txt"), "Refunds take 5 days")],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_form_files_lead_knowledge_base() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock(
                "POST",
                mockito::Matcher::Regex(r"^/storage/v1/object/knowledge-base/\d+-[ab]\.txt$".into()),
            )
            .match_header("apikey", "service-role-test")
            .with_status(200)
            .with_body(r#"{"Key":"ok"}"#)
            .expect(2)
            .create_async()
            .await;

        let mut config = crate::config::Config::for_tests(crate::auth::jwt::tests::TEST_SECRET);
        config.supabase_url = server.url();
        config.supabase_service_role_key = "service-role-test".into();
        let app = crate::routes::create_router(crate::routes::test_helpers::test_state_with(config));

        let token = bearer(Uuid::new_v4());
        let request = multipart_request(
            &token,
            &[
                ("name", None, "Form Bot"),
                ("description", None, "Created from the dashboard form"),
                ("tone", None, "casual"),
                ("personality", None, "Laid back but helpful"),
                ("knowledge_base", None, "manual-1"),
                ("files", Some("a.txt"), "Refunds take 5 days"),
                ("knowledge_base", None, "manual-2"),
                ("files", Some("b.txt"), "Shipping takes 3 days"),
            ],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        upload.assert_async().await;

        let items: Vec<&str> = body["knowledge_base"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(items.len(), 4);
        let prefix = format!("{}/storage/v1/object/public/knowledge-base/", server.url());
        assert!(items[0].starts_with(&prefix) && items[0].ends_with("-a.txt"));
        assert!(items[1].starts_with(&prefix) && items[1].ends_with("-b.txt"));
        assert_eq!(&items[2..], ["manual-1", "manual-2"]);

        // Stored record matches the response
        let uri = format!("/api/agents/{}", body["id"].as_str().unwrap());
        let (_, fetched) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(fetched["knowledge_base"], body["knowledge_base"]);
    }

    #[tokio::test]
    async fn test_form_upload_failure_is_bad_gateway() {
        // Test config has no storage credentials
        let app = test_app();
        let token = bearer(Uuid::new_v4());
        let request = multipart_request(
            &token,
            &[
                ("name", None, "Form Bot"),
                ("description", None, "Created from the dashboard form"),
                ("tone", None, "casual"),
                ("personality", None, "Laid back but helpful"),
                ("files", Some("faq.txt"), "Refunds take 5 days"),
            ],
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "STORAGE_ERROR");
    }
}
