//! Organisation structure: brands own branches, sectors group areas.

use super::coordinates::Coordinates;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Branch {
    pub id: i64,
    pub brand_id: Option<i64>,
    pub name: String,
    pub location: Option<Coordinates>,
    /// Per-branch override of the global geofence radius.
    pub geofence_radius_meters: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sector {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Area {
    pub id: i64,
    pub sector_id: i64,
    pub name: String,
}
