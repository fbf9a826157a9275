//! Helpdesk Shared Types and Utilities
//!
//! Domain records, wire types, validation rules and database helpers shared
//! by the API service and the chat widget client.

pub mod db;
pub mod error;
pub mod filter;
pub mod types;
pub mod validation;

pub use db::*;
pub use error::*;
pub use filter::{TicketFilter, TicketFilterQuery};
pub use types::*;
pub use validation::{AgentDraft, SupportRequestDraft, ValidationErrors};
