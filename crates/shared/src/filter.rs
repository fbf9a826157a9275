//! Ticket list filtering
//!
//! The filter is a pure predicate over tickets: the filtered set is always
//! the intersection of the status predicate and the agent predicate.

use serde::Deserialize;
use uuid::Uuid;

use crate::types::{Ticket, TicketStatus};

/// Value the dashboard sends for "no restriction"
pub const MATCH_ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub agent_id: Option<Uuid>,
}

/// Query-string form of [`TicketFilter`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilterQuery {
    pub status: Option<String>,
    pub agent_id: Option<String>,
}

impl TicketFilterQuery {
    pub fn parse(&self) -> Result<TicketFilter, String> {
        let status = match restriction(self.status.as_deref()) {
            Some(raw) => Some(raw.parse::<TicketStatus>()?),
            None => None,
        };
        let agent_id = match restriction(self.agent_id.as_deref()) {
            Some(raw) => Some(
                Uuid::parse_str(raw).map_err(|_| format!("Invalid agent id: {}", raw))?,
            ),
            None => None,
        };
        Ok(TicketFilter { status, agent_id })
    }
}

fn restriction(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(MATCH_ALL))
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let status_match = self.status.map_or(true, |s| ticket.status == s);
        let agent_match = self.agent_id.map_or(true, |a| ticket.agent_id == a);
        status_match && agent_match
    }

    /// Keep matching tickets, preserving order
    pub fn apply(&self, tickets: Vec<Ticket>) -> Vec<Ticket> {
        tickets.into_iter().filter(|t| self.matches(t)).collect()
    }
}
