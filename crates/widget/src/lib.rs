//! Helpdesk chat widget core
//!
//! The protocol side of the embeddable support widget: configuration,
//! visitor session id, transcript and the request/response exchange with
//! the helpdesk API. Rendering is left to the host.

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod transcript;
pub mod widget;

pub use client::ChatClient;
pub use config::{Position, Theme, WidgetConfig};
pub use error::{WidgetError, WidgetResult};
pub use transcript::{ChatMessage, Sender, Transcript};
pub use widget::{ChatWidget, Exchange, APOLOGY, GREETING, TICKET_NOTICE};
