//! Formatting utilities used for CLI and export outputs.

use crate::models::ticket::{TicketPriority, TicketStatus};

pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Truncate to `max` visible characters, marking the cut with "…".
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

/// Restituisce una descrizione testuale e un colore ANSI per lo stato del ticket.
pub fn describe_status(status: TicketStatus) -> (&'static str, &'static str) {
    match status {
        TicketStatus::Open => ("open", "\x1b[34m"),
        TicketStatus::Assigned => ("assigned", "\x1b[36m"),
        TicketStatus::InProgress => ("in progress", "\x1b[33m"),
        TicketStatus::OnHold => ("on hold", "\x1b[35m"),
        TicketStatus::Closed => ("closed", "\x1b[32m"),
        TicketStatus::Cancelled => ("cancelled", "\x1b[90m"),
    }
}

pub fn describe_priority(priority: TicketPriority) -> (&'static str, &'static str) {
    match priority {
        TicketPriority::Low => ("low", "\x1b[90m"),
        TicketPriority::Medium => ("medium", "\x1b[0m"),
        TicketPriority::High => ("high", "\x1b[33m"),
        TicketPriority::Emergency => ("EMERGENCY", "\x1b[41;97;1m"),
    }
}
