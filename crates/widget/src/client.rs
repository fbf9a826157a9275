//! HTTP client for the chat endpoint

use std::time::Duration;

use helpdesk_shared::{ChatReply, ChatRequest};
use reqwest::Client;
use url::Url;

use crate::error::{WidgetError, WidgetResult};

/// Request timeout for one chat exchange
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: Url,
}

/// `{base path}/api/chat`; the base's query and fragment are dropped
fn chat_endpoint(api_base: &Url) -> WidgetResult<Url> {
    let mut endpoint = api_base.clone();
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    endpoint
        .path_segments_mut()
        .map_err(|_| WidgetError::InvalidConfig(format!("apiUrl {} cannot be a base", api_base)))?
        .pop_if_empty()
        .extend(["api", "chat"]);
    Ok(endpoint)
}

impl ChatClient {
    pub fn new(api_base: &Url) -> WidgetResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: chat_endpoint(api_base)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// One `POST /api/chat`; never retried
    pub async fn send(&self, request: &ChatRequest) -> WidgetResult<ChatReply> {
        let response = self.http.post(self.endpoint.clone()).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| WidgetError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_path() {
        let client = ChatClient::new(&Url::parse("https://support.example.com/").unwrap()).unwrap();
        assert_eq!(client.endpoint(), "https://support.example.com/api/chat");

        let nested = ChatClient::new(&Url::parse("https://example.com/helpdesk").unwrap()).unwrap();
        assert_eq!(nested.endpoint(), "https://example.com/helpdesk/api/chat");
    }

    #[test]
    fn test_endpoint_drops_query_and_fragment() {
        let client =
            ChatClient::new(&Url::parse("https://x.com/support?tenant=1#top").unwrap()).unwrap();
        assert_eq!(client.endpoint(), "https://x.com/support/api/chat");

        let trailing = ChatClient::new(&Url::parse("https://x.com/support/?tenant=1").unwrap()).unwrap();
        assert_eq!(trailing.endpoint(), "https://x.com/support/api/chat");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"error":{"code":"NOT_FOUND","message":"Agent not found"}}"#)
            .create_async()
            .await;

        let client = ChatClient::new(&Url::parse(&server.url()).unwrap()).unwrap();
        let err = client
            .send(&ChatRequest {
                agent_id: "default".into(),
                message: "hi".into(),
                user_session: "session_1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WidgetError::Status { status: 404 }));
    }
}
