use super::GeofenceError;
use super::decision::{GeofenceConfig, GeofenceDecision, evaluate};
use super::provider::{LocationProvider, WatchOptions};
use crate::models::coordinates::Coordinates;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Lifecycle of a live geofence evaluation.
///
/// `Idle → Initializing → {Allowed, Denied, Error}`. Allowed and Denied are
/// re-entered on every sample; Error is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceState {
    Idle,
    Initializing,
    Allowed(GeofenceDecision),
    Denied(GeofenceDecision),
    Error(GeofenceError),
}

impl GeofenceState {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GeofenceState::Allowed(_))
    }

    pub fn decision(&self) -> Option<&GeofenceDecision> {
        match self {
            GeofenceState::Allowed(d) | GeofenceState::Denied(d) => Some(d),
            _ => None,
        }
    }

    fn from_decision(decision: GeofenceDecision) -> Self {
        if decision.allowed {
            GeofenceState::Allowed(decision)
        } else {
            GeofenceState::Denied(decision)
        }
    }
}

/// Undelivered states the evaluator may run ahead of its owner.
const EVENT_BACKLOG: usize = 32;

pub struct GeofenceEvaluator<P> {
    provider: P,
    target: Option<Coordinates>,
    config: GeofenceConfig,
    options: WatchOptions,
}

impl<P: LocationProvider + 'static> GeofenceEvaluator<P> {
    pub fn new(
        provider: P,
        target: Option<Coordinates>,
        config: GeofenceConfig,
        options: WatchOptions,
    ) -> Self {
        Self {
            provider,
            target,
            config,
            options,
        }
    }

    /// Start the evaluation on the current tokio runtime.
    ///
    /// The evaluation ends when `cancel` fires, the handle is dropped, the
    /// provider closes its stream or a terminal error is reported.
    pub fn spawn(self, cancel: CancellationToken) -> GeofenceHandle {
        let (state_tx, state_rx) = watch::channel(GeofenceState::Idle);
        let (events_tx, events_rx) = mpsc::channel(EVENT_BACKLOG);
        let out = Publisher {
            state: state_tx,
            events: events_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(self.run(out));

        GeofenceHandle {
            state: state_rx,
            events: events_rx,
            cancel,
            task,
        }
    }

    async fn run(mut self, out: Publisher) {
        let cancel = out.cancel.clone();
        let Some(target) = self.target else {
            debug!("no target location, geofence stays idle");
            return;
        };

        out.commit(GeofenceState::Initializing).await;

        if !self.config.enabled {
            debug!("geofence disabled, allowing without distance check");
            out.commit(GeofenceState::Allowed(GeofenceDecision::disabled(
                self.config.radius_meters,
            )))
            .await;
            return;
        }

        let mut updates = match self.provider.watch(self.options) {
            Ok(rx) => rx,
            Err(e) => {
                warn!(error = %e, "location watch could not start");
                out.commit(GeofenceState::Error(e)).await;
                return;
            }
        };

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("geofence evaluation cancelled");
                    break;
                }

                update = updates.recv() => match update {
                    None => {
                        debug!("location stream ended");
                        break;
                    }
                    Some(Ok(sample)) => {
                        let decision = evaluate(&self.config, target, &sample);
                        debug!(
                            distance = ?decision.distance_meters,
                            allowed = decision.allowed,
                            "position sample evaluated"
                        );
                        out.commit(GeofenceState::from_decision(decision)).await;
                    }
                    Some(Err(e)) if e.is_terminal() => {
                        warn!(error = %e, "location watch failed");
                        out.commit(GeofenceState::Error(e)).await;
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "transient location error, waiting for next sample");
                    }
                }
            }
        }

        // Dropping the receiver clears the provider watch.
        drop(updates);
    }
}

/// Evaluator side of the handle: latest state plus the ordered stream of
/// every state committed.
struct Publisher {
    state: watch::Sender<GeofenceState>,
    events: mpsc::Sender<GeofenceState>,
    cancel: CancellationToken,
}

impl Publisher {
    /// Publish a new state unless the owner already tore the evaluation down.
    /// Waits for room in the event queue, so no state is ever skipped.
    async fn commit(&self, state: GeofenceState) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.state.send_replace(state.clone());

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {}
            // Err only when the handle is gone
            _ = self.events.send(state) => {}
        }
    }
}

/// Owner side of a running evaluation. Dropping it cancels the evaluation.
pub struct GeofenceHandle {
    state: watch::Receiver<GeofenceState>,
    events: mpsc::Receiver<GeofenceState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl GeofenceHandle {
    /// Latest published state.
    pub fn state(&self) -> GeofenceState {
        self.state.borrow().clone()
    }

    /// Next committed state, in order; every decision is delivered once.
    /// `None` once the evaluation is over and every state has been observed.
    ///
    /// The evaluator stalls when more than a small backlog is left unread.
    pub async fn changed(&mut self) -> Option<GeofenceState> {
        self.events.recv().await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the evaluation and wait until the provider subscription is released.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "geofence task ended abnormally");
        }
    }
}

impl Drop for GeofenceHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
