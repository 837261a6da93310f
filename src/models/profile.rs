use super::coordinates::Coordinates;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Technician,
}

impl Role {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Technician => "technician",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "technician" => Some(Role::Technician),
            _ => None,
        }
    }

    pub fn from_input(s: &str) -> Option<Self> {
        Self::from_db_str(&s.trim().to_lowercase())
    }

    /// Admins and managers see every branch; technicians only their own work.
    pub fn sees_everything(&self) -> bool {
        !matches!(self, Role::Technician)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub last_location: Option<Coordinates>,
    pub last_seen: Option<String>,
}
