use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

impl AuditAction {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AuditAction::Insert => "insert",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "insert" => Some(AuditAction::Insert),
            "update" => Some(AuditAction::Update),
            "delete" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

/// Before/after row images captured on every change to an audited table.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub table_name: String,
    pub record_id: i64,
    pub action: AuditAction,
    pub old_data: Option<Value>,
    pub new_data: Option<Value>,
    pub changed_by: Option<i64>,
    pub created_at: String,
}
