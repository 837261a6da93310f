// src/export/model.rs

use crate::models::asset::Asset;
use crate::models::attendance::AttendanceEvent;
use crate::models::spare_part::SparePart;
use crate::models::ticket::Ticket;
use serde::Serialize;

/// A flat, serializable row of an exported table.
///
/// `headers` and `cells` must list the fields in the same order as the
/// struct, so CSV (through serde) and XLSX columns line up.
pub trait ExportRow: Serialize {
    const SHEET: &'static str;

    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

#[derive(Serialize, Clone, Debug)]
pub struct TicketExport {
    pub id: i64,
    pub asset_id: i64,
    pub branch_id: i64,
    pub title: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<i64>,
    pub created_at: String,
    pub closed_at: Option<String>,
    pub resolution_hours: Option<f64>,
    pub cost: f64,
}

impl From<&Ticket> for TicketExport {
    fn from(t: &Ticket) -> Self {
        Self {
            id: t.id,
            asset_id: t.asset_id,
            branch_id: t.branch_id,
            title: t.title.clone(),
            category: t.category.clone(),
            priority: t.priority.to_db_str().to_string(),
            status: t.status.to_db_str().to_string(),
            assigned_to: t.assigned_to,
            created_at: t.created_at.to_rfc3339(),
            closed_at: t.closed_at.map(|c| c.to_rfc3339()),
            resolution_hours: t.resolution_hours(),
            cost: t.cost,
        }
    }
}

impl ExportRow for TicketExport {
    const SHEET: &'static str = "Tickets";

    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "asset_id",
            "branch_id",
            "title",
            "category",
            "priority",
            "status",
            "assigned_to",
            "created_at",
            "closed_at",
            "resolution_hours",
            "cost",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.asset_id.to_string(),
            self.branch_id.to_string(),
            self.title.clone(),
            self.category.clone(),
            self.priority.clone(),
            self.status.clone(),
            opt(&self.assigned_to),
            self.created_at.clone(),
            opt(&self.closed_at),
            self.resolution_hours
                .map(|h| format!("{h:.1}"))
                .unwrap_or_default(),
            format!("{:.2}", self.cost),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct AssetExport {
    pub id: i64,
    pub branch_id: i64,
    pub area_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub serial: Option<String>,
    pub status: String,
    pub tickets: usize,
    pub health: u32,
    pub created_at: String,
}

impl AssetExport {
    pub fn new(a: &Asset, tickets: usize, health: u32) -> Self {
        Self {
            id: a.id,
            branch_id: a.branch_id,
            area_id: a.area_id,
            name: a.name.clone(),
            category: a.category.clone(),
            serial: a.serial.clone(),
            status: a.status.clone(),
            tickets,
            health,
            created_at: a.created_at.clone(),
        }
    }
}

impl ExportRow for AssetExport {
    const SHEET: &'static str = "Assets";

    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "branch_id",
            "area_id",
            "name",
            "category",
            "serial",
            "status",
            "tickets",
            "health",
            "created_at",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.branch_id.to_string(),
            opt(&self.area_id),
            self.name.clone(),
            self.category.clone(),
            opt(&self.serial),
            self.status.clone(),
            self.tickets.to_string(),
            self.health.to_string(),
            self.created_at.clone(),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct AttendanceExport {
    pub id: i64,
    pub profile_id: i64,
    pub branch_id: i64,
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_meters: Option<f64>,
    pub created_at: String,
}

impl From<&AttendanceEvent> for AttendanceExport {
    fn from(e: &AttendanceEvent) -> Self {
        Self {
            id: e.id,
            profile_id: e.profile_id,
            branch_id: e.branch_id,
            kind: e.kind.to_db_str().to_string(),
            lat: e.lat,
            lng: e.lng,
            distance_meters: e.distance_meters,
            created_at: e.created_at.clone(),
        }
    }
}

impl ExportRow for AttendanceExport {
    const SHEET: &'static str = "Attendance";

    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "profile_id",
            "branch_id",
            "kind",
            "lat",
            "lng",
            "distance_meters",
            "created_at",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.profile_id.to_string(),
            self.branch_id.to_string(),
            self.kind.clone(),
            self.lat.to_string(),
            self.lng.to_string(),
            self.distance_meters
                .map(|d| format!("{d:.1}"))
                .unwrap_or_default(),
            self.created_at.clone(),
        ]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct PartExport {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub stock: i64,
    pub unit_cost: f64,
    pub low_stock: bool,
}

impl PartExport {
    pub fn new(p: &SparePart, threshold: i64) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            sku: p.sku.clone(),
            stock: p.stock,
            unit_cost: p.unit_cost,
            low_stock: p.is_low_stock(threshold),
        }
    }
}

impl ExportRow for PartExport {
    const SHEET: &'static str = "Spare parts";

    fn headers() -> &'static [&'static str] {
        &["id", "name", "sku", "stock", "unit_cost", "low_stock"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.sku.clone(),
            self.stock.to_string(),
            format!("{:.2}", self.unit_cost),
            self.low_stock.to_string(),
        ]
    }
}
