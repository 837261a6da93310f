use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum AttendanceKind {
    CheckIn,
    CheckOut,
}

impl AttendanceKind {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AttendanceKind::CheckIn => "check_in",
            AttendanceKind::CheckOut => "check_out",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "check_in" => Some(AttendanceKind::CheckIn),
            "check_out" => Some(AttendanceKind::CheckOut),
            _ => None,
        }
    }

    pub fn is_in(&self) -> bool {
        matches!(self, AttendanceKind::CheckIn)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceKind::CheckIn => "in",
            AttendanceKind::CheckOut => "out",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceEvent {
    pub id: i64,
    pub profile_id: i64,
    pub branch_id: i64,
    pub kind: AttendanceKind,
    pub lat: f64,
    pub lng: f64,
    pub distance_meters: Option<f64>, // None quando il geofence è disabilitato
    pub created_at: String,           // ISO8601, come salvato
}
