use super::GeofenceError;
use super::provider::{LocationProvider, LocationUpdate, WatchOptions};
use crate::models::coordinates::PositionSample;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Passive location ping: forwards at most one position per period.
///
/// The task is owned by this handle; dropping it stops the timer and
/// releases the provider watch.
pub struct LocationPing {
    updates: mpsc::Receiver<LocationUpdate>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Start pinging on the current tokio runtime.
pub fn spawn_location_ping<P: LocationProvider + 'static>(
    mut provider: P,
    options: WatchOptions,
    every: Duration,
    cancel: CancellationToken,
) -> Result<LocationPing, GeofenceError> {
    let mut source = provider.watch(options)?;
    let (tx, rx) = mpsc::channel(8);
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut latest: Option<PositionSample> = None;

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                _ = ticker.tick() => {
                    if let Some(sample) = latest.take()
                        && tx.send(Ok(sample)).await.is_err()
                    {
                        break;
                    }
                }

                update = source.recv() => match update {
                    Some(Ok(sample)) => latest = Some(sample),
                    Some(Err(e)) if e.is_terminal() => {
                        warn!(error = %e, "location ping stopped");
                        let _ = tx.send(Err(e)).await;
                        break;
                    }
                    Some(Err(e)) => debug!(error = %e, "location ping skipped a sample"),
                    None => {
                        if let Some(sample) = latest.take()
                            && !token.is_cancelled()
                        {
                            let _ = tx.send(Ok(sample)).await;
                        }
                        break;
                    }
                }
            }
        }

        debug!("location ping finished");
    });

    Ok(LocationPing {
        updates: rx,
        cancel,
        task,
    })
}

impl LocationPing {
    /// Next throttled position, or `None` once the ping has ended.
    pub async fn next(&mut self) -> Option<LocationUpdate> {
        self.updates.recv().await
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "location ping task ended abnormally");
        }
    }
}

impl Drop for LocationPing {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
