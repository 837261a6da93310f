use chrono::{DateTime, FixedOffset};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Assigned,
    InProgress,
    OnHold,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 6] = [
        TicketStatus::Open,
        TicketStatus::Assigned,
        TicketStatus::InProgress,
        TicketStatus::OnHold,
        TicketStatus::Closed,
        TicketStatus::Cancelled,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Assigned => "assigned",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::OnHold => "on_hold",
            TicketStatus::Closed => "closed",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.to_db_str() == s)
    }

    /// Helper: accept CLI input in any case, with '-' or '_'.
    pub fn from_input(s: &str) -> Option<Self> {
        Self::from_db_str(&s.trim().to_lowercase().replace('-', "_"))
    }

    /// Closed and cancelled tickets no longer need work.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Emergency,
}

impl TicketPriority {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Emergency => "emergency",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TicketPriority::Low),
            "medium" => Some(TicketPriority::Medium),
            "high" => Some(TicketPriority::High),
            "emergency" => Some(TicketPriority::Emergency),
            _ => None,
        }
    }

    pub fn from_input(s: &str) -> Option<Self> {
        Self::from_db_str(&s.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub asset_id: i64,
    pub branch_id: i64,
    pub title: String,
    pub category: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assigned_to: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: String, // ⇔ tickets.updated_at, testo ISO8601 così come salvato
    pub closed_at: Option<DateTime<FixedOffset>>,
    pub cost: f64,
}

impl Ticket {
    pub fn is_emergency(&self) -> bool {
        self.priority == TicketPriority::Emergency
    }

    /// Hours elapsed from creation to closure, if closed.
    pub fn resolution_hours(&self) -> Option<f64> {
        self.closed_at
            .map(|closed| (closed - self.created_at).num_seconds() as f64 / 3600.0)
    }
}
