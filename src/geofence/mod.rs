//! Geofenced site actions.
//!
//! A technician may only check in at a branch, or close a ticket for an
//! asset, while the device is within the site's radius. The decision is
//! taken on each position sample, either once (`evaluate`) or continuously
//! through a [`GeofenceEvaluator`] fed by a [`LocationProvider`].

mod decision;
mod distance;
mod evaluator;
mod ping;
mod provider;

pub use decision::{
    GEOFENCE_SETTINGS_KEY, GPS_SLACK_METERS, GeofenceConfig, GeofenceDecision, decide, evaluate,
};
pub use distance::{EARTH_RADIUS_METERS, format_distance, haversine_meters};
pub use evaluator::{GeofenceEvaluator, GeofenceHandle, GeofenceState};
pub use ping::{LocationPing, spawn_location_ping};
pub use provider::{
    LocationProvider, LocationUpdate, NoLocationProvider, ReplayProvider, WatchOptions,
};

use thiserror::Error;

/// Failures reported by the host location service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeofenceError {
    #[error("Geolocation is not available on this device")]
    CapabilityUnavailable,

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Timed out waiting for a position")]
    Timeout,
}

impl GeofenceError {
    /// Terminal errors end the evaluation; the caller has to start again.
    /// Transient ones are skipped and the next sample is awaited.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GeofenceError::CapabilityUnavailable | GeofenceError::PermissionDenied
        )
    }
}
