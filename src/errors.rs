//! Unified application error type.
//! All modules (db, core, geofence, reports, cli) return AppError to keep the
//! error handling consistent and easy to manage.

use crate::geofence::GeofenceError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    /// A stored row does not match the shape the application expects.
    #[error("Unexpected row shape in '{table}': {detail}")]
    Schema { table: &'static str, detail: String },

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    // ---------------------------
    // Parsing / user input
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid ticket status: {0}")]
    InvalidStatus(String),

    #[error("Invalid ticket priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid specification JSON: {0}")]
    InvalidSpecification(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Geofence
    // ---------------------------
    #[error(transparent)]
    Geofence(#[from] GeofenceError),

    #[error("Outside the allowed area: {distance} away (radius {radius_meters} m)")]
    OutsideGeofence { distance: String, radius_meters: f64 },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
