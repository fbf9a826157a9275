//! Helpdesk API Library
//!
//! REST service behind the agent dashboard and the embeddable chat widget.

pub mod auth;
pub mod config;
pub mod error;
pub mod lyzr;
pub mod routes;
pub mod security;
pub mod state;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
pub use store::Store;
