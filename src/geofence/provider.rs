use super::GeofenceError;
use crate::errors::{AppError, AppResult};
use crate::models::coordinates::PositionSample;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub type LocationUpdate = Result<PositionSample, GeofenceError>;

/// Options handed to the location service when a watch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Host location service.
///
/// `watch` starts delivering updates on the returned channel; dropping the
/// receiver clears the watch and the provider must stop producing.
pub trait LocationProvider: Send {
    fn watch(&mut self, options: WatchOptions) -> Result<mpsc::Receiver<LocationUpdate>, GeofenceError>;
}

/// Provider for hosts without any geolocation capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocationProvider;

impl LocationProvider for NoLocationProvider {
    fn watch(&mut self, _options: WatchOptions) -> Result<mpsc::Receiver<LocationUpdate>, GeofenceError> {
        Err(GeofenceError::CapabilityUnavailable)
    }
}

/// Replays a recorded sequence of updates at a fixed cadence.
///
/// Must be watched from inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    updates: Vec<LocationUpdate>,
    cadence: Duration,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Sample(PositionSample),
    Failure { error: String },
}

impl ReplayProvider {
    pub fn new(updates: Vec<LocationUpdate>, cadence: Duration) -> Self {
        Self { updates, cadence }
    }

    /// Load a JSON-lines recording. Each line is either a sample
    /// (`{"lat":..,"lng":..,"accuracy":..,"timestamp":..}`) or a provider
    /// failure (`{"error":"permission_denied"}`). Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_jsonl(path: &Path, cadence: Duration) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut updates = Vec::new();

        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed: ReplayLine = serde_json::from_str(line).map_err(|e| {
                AppError::InvalidInput(format!("{} line {}: {e}", path.display(), n + 1))
            })?;

            let update = match parsed {
                ReplayLine::Sample(s) => Ok(s),
                ReplayLine::Failure { error } => Err(parse_failure(&error).ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "{} line {}: unknown location error '{error}'",
                        path.display(),
                        n + 1
                    ))
                })?),
            };
            updates.push(update);
        }

        Ok(Self::new(updates, cadence))
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

fn parse_failure(code: &str) -> Option<GeofenceError> {
    match code {
        "permission_denied" => Some(GeofenceError::PermissionDenied),
        "unavailable" | "capability_unavailable" => Some(GeofenceError::CapabilityUnavailable),
        "timeout" => Some(GeofenceError::Timeout),
        other if other.starts_with("position_unavailable") => Some(
            GeofenceError::PositionUnavailable(
                other
                    .trim_start_matches("position_unavailable")
                    .trim_start_matches(':')
                    .trim()
                    .to_string(),
            ),
        ),
        _ => None,
    }
}

impl LocationProvider for ReplayProvider {
    fn watch(&mut self, options: WatchOptions) -> Result<mpsc::Receiver<LocationUpdate>, GeofenceError> {
        let (tx, rx) = mpsc::channel(16);
        let updates = std::mem::take(&mut self.updates);
        let cadence = self.cadence;

        debug!(
            samples = updates.len(),
            high_accuracy = options.enable_high_accuracy,
            "replay watch started"
        );

        tokio::spawn(async move {
            for update in updates {
                if !cadence.is_zero() {
                    tokio::time::sleep(cadence).await;
                }
                if tx.send(update).await.is_err() {
                    debug!("replay watch cleared by consumer");
                    return;
                }
            }
            debug!("replay exhausted");
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn failure_codes_map_to_errors() {
        assert_eq!(
            parse_failure("permission_denied"),
            Some(GeofenceError::PermissionDenied)
        );
        assert_eq!(parse_failure("timeout"), Some(GeofenceError::Timeout));
        assert_eq!(
            parse_failure("position_unavailable: no fix"),
            Some(GeofenceError::PositionUnavailable("no fix".into()))
        );
        assert_eq!(parse_failure("whatever"), None);
    }

    #[test]
    fn jsonl_recording_is_parsed() {
        let mut path = env::temp_dir();
        path.push("maintdesk_replay_parse.jsonl");
        fs::write(
            &path,
            "# morning round\n\
             {\"lat\": 30.0444, \"lng\": 31.2357, \"accuracy\": 8.0}\n\
             \n\
             {\"error\": \"permission_denied\"}\n",
        )
        .unwrap();

        let provider = ReplayProvider::from_jsonl(&path, Duration::ZERO).unwrap();
        assert_eq!(provider.len(), 2);
        assert!(matches!(provider.updates[0], Ok(ref s) if s.accuracy == Some(8.0)));
        assert_eq!(provider.updates[1], Err(GeofenceError::PermissionDenied));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn jsonl_rejects_unknown_lines() {
        let mut path = env::temp_dir();
        path.push("maintdesk_replay_bad.jsonl");
        fs::write(&path, "{\"latitude\": 1}\n").unwrap();

        let err = ReplayProvider::from_jsonl(&path, Duration::ZERO).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn no_provider_reports_missing_capability() {
        let err = NoLocationProvider.watch(WatchOptions::default()).unwrap_err();
        assert_eq!(err, GeofenceError::CapabilityUnavailable);
    }
}
