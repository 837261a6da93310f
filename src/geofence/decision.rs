use super::distance::{format_distance, haversine_meters};
use crate::db::settings::SettingsSource;
use crate::errors::{AppError, AppResult};
use crate::models::coordinates::{Coordinates, PositionSample};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings row holding the geofence parameters.
pub const GEOFENCE_SETTINGS_KEY: &str = "geofence_config";

/// Extra tolerance added to every radius to absorb GPS drift.
pub const GPS_SLACK_METERS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceConfig {
    pub radius_meters: f64,
    pub enabled: bool,
}

impl GeofenceConfig {
    /// Read the configuration from the settings store.
    ///
    /// A missing row yields `fallback`; a row that does not parse into
    /// `{ radius_meters, enabled }` is an error, never silently coerced.
    pub fn load<S: SettingsSource + ?Sized>(
        settings: &S,
        fallback: GeofenceConfig,
    ) -> AppResult<GeofenceConfig> {
        let Some(raw) = settings.get_setting(GEOFENCE_SETTINGS_KEY)? else {
            debug!(key = GEOFENCE_SETTINGS_KEY, "no geofence settings, using defaults");
            return Ok(fallback);
        };

        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> AppResult<GeofenceConfig> {
        let cfg: GeofenceConfig = serde_json::from_str(raw).map_err(|e| AppError::Schema {
            table: "app_settings",
            detail: format!("{GEOFENCE_SETTINGS_KEY}: {e}"),
        })?;

        if !cfg.radius_meters.is_finite() || cfg.radius_meters < 0.0 {
            return Err(AppError::Schema {
                table: "app_settings",
                detail: format!(
                    "{GEOFENCE_SETTINGS_KEY}: radius_meters must be a non-negative number, got {}",
                    cfg.radius_meters
                ),
            });
        }

        Ok(cfg)
    }

    /// Per-site radius override, keeping the enabled flag.
    pub fn with_radius(self, radius_meters: Option<f64>) -> Self {
        match radius_meters {
            Some(r) => Self {
                radius_meters: r,
                ..self
            },
            None => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeofenceDecision {
    pub allowed: bool,
    /// `None` when the geofence is disabled and no distance was computed.
    pub distance_meters: Option<f64>,
    pub radius_meters: f64,
}

impl GeofenceDecision {
    /// Fail-open decision used when the geofence is switched off.
    pub fn disabled(radius_meters: f64) -> Self {
        Self {
            allowed: true,
            distance_meters: None,
            radius_meters,
        }
    }

    pub fn distance_label(&self) -> String {
        self.distance_meters
            .map(format_distance)
            .unwrap_or_else(|| "--".to_string())
    }
}

/// Decision for an already computed distance.
pub fn decide(distance_meters: f64, radius_meters: f64) -> GeofenceDecision {
    GeofenceDecision {
        allowed: distance_meters <= radius_meters + GPS_SLACK_METERS,
        distance_meters: Some(distance_meters),
        radius_meters,
    }
}

/// One-shot evaluation of a single sample against a site.
pub fn evaluate(
    config: &GeofenceConfig,
    target: Coordinates,
    sample: &PositionSample,
) -> GeofenceDecision {
    if !config.enabled {
        return GeofenceDecision::disabled(config.radius_meters);
    }

    let distance = haversine_meters(sample.coordinates(), target);
    decide(distance, config.radius_meters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SITE: Coordinates = Coordinates {
        lat: 30.0444,
        lng: 31.2357,
    };

    #[test]
    fn boundary_includes_gps_slack() {
        assert!(decide(205.0, 200.0).allowed);
        assert!(!decide(206.0, 200.0).allowed);
        assert!(decide(0.0, 0.0).allowed);
    }

    #[test]
    fn disabled_config_allows_without_distance() {
        let cfg = GeofenceConfig {
            radius_meters: 200.0,
            enabled: false,
        };
        let far_away = PositionSample::new(31.2001, 29.9187);

        let d = evaluate(&cfg, SITE, &far_away);
        assert!(d.allowed);
        assert_eq!(d.distance_meters, None);
        assert_eq!(d.distance_label(), "--");
    }

    #[test]
    fn enabled_config_denies_far_samples() {
        let cfg = GeofenceConfig {
            radius_meters: 200.0,
            enabled: true,
        };

        let near = PositionSample::new(30.0454, 31.2357); // ~111 m
        let far = PositionSample::new(30.0544, 31.2357); // ~1.1 km

        assert!(evaluate(&cfg, SITE, &near).allowed);
        let d = evaluate(&cfg, SITE, &far);
        assert!(!d.allowed);
        assert!(d.distance_meters.unwrap() > 1_000.0);
    }

    #[test]
    fn load_uses_fallback_when_missing() {
        let settings: HashMap<String, String> = HashMap::new();
        let fallback = GeofenceConfig {
            radius_meters: 150.0,
            enabled: true,
        };
        assert_eq!(GeofenceConfig::load(&settings, fallback).unwrap(), fallback);
    }

    #[test]
    fn load_parses_stored_row() {
        let mut settings = HashMap::new();
        settings.insert(
            GEOFENCE_SETTINGS_KEY.to_string(),
            r#"{"radius_meters": 75, "enabled": false}"#.to_string(),
        );
        let fallback = GeofenceConfig {
            radius_meters: 200.0,
            enabled: true,
        };

        let cfg = GeofenceConfig::load(&settings, fallback).unwrap();
        assert_eq!(cfg.radius_meters, 75.0);
        assert!(!cfg.enabled);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        for raw in [
            r#"{"radius_meters": "200", "enabled": true}"#,
            r#"{"enabled": true}"#,
            r#"{"radius_meters": -1, "enabled": true}"#,
            "not json",
        ] {
            let err = GeofenceConfig::parse(raw).unwrap_err();
            assert!(matches!(err, AppError::Schema { .. }), "{raw}");
        }
    }
}
