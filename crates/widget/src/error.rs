//! Widget error types

/// Failures inside a chat exchange. `ChatWidget::send` turns every one of
/// them into the apology message; they surface only through logs and the
/// lower-level [`crate::ChatClient`].
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("Invalid widget configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat endpoint returned {status}")]
    Status { status: u16 },

    #[error("Invalid chat response: {0}")]
    InvalidResponse(String),
}

pub type WidgetResult<T> = Result<T, WidgetError>;
