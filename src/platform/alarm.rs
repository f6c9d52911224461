use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use color_eyre::Result;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use super::{AlarmService, WakeHandler, WakeRequest, WakeState};
use crate::reminder::{Clock, ReminderId};

/// Longest single timer sleep. Monotonic timers stall while the machine is
/// suspended, so the wall clock is re-read at least this often.
const MAX_SLEEP_SLICE: Duration = Duration::from_secs(30);

/// Per-id alarm state shared by the UI thread and the alarm thread.
#[derive(Debug, Default)]
pub struct WakeLedger {
    states: Mutex<HashMap<ReminderId, WakeState>>,
}

impl WakeLedger {
    pub fn state(&self, id: ReminderId) -> WakeState {
        self.lock()
            .get(&id)
            .copied()
            .unwrap_or(WakeState::Unscheduled)
    }

    /// `Unscheduled | Scheduled -> Scheduled`.
    pub fn schedule(&self, id: ReminderId) -> bool {
        self.transition(id, WakeState::Scheduled, |from| !from.is_terminal())
    }

    /// `Scheduled -> Fired`.
    pub fn fire(&self, id: ReminderId) -> bool {
        self.transition(id, WakeState::Fired, |from| from == WakeState::Scheduled)
    }

    /// `Scheduled -> Cancelled`.
    pub fn cancel(&self, id: ReminderId) -> bool {
        self.transition(id, WakeState::Cancelled, |from| from == WakeState::Scheduled)
    }

    fn transition(
        &self,
        id: ReminderId,
        to: WakeState,
        allowed: impl Fn(WakeState) -> bool,
    ) -> bool {
        let mut states = self.lock();
        let from = states.get(&id).copied().unwrap_or(WakeState::Unscheduled);
        if !allowed(from) {
            return false;
        }
        states.insert(id, to);
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ReminderId, WakeState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum AlarmCommand {
    Schedule(WakeRequest),
    Cancel(ReminderId),
}

/// Alarm service backed by a dedicated `alarm-service` thread running a
/// current-thread tokio runtime. Each registration is one timer task.
pub struct TokioAlarmService {
    commands: mpsc::UnboundedSender<AlarmCommand>,
    ledger: Arc<WakeLedger>,
}

impl TokioAlarmService {
    pub fn start(handler: Arc<dyn WakeHandler>, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::start_with_slice(handler, clock, MAX_SLEEP_SLICE)
    }

    /// Like [`TokioAlarmService::start`], re-reading the clock every `slice`.
    pub fn start_with_slice(
        handler: Arc<dyn WakeHandler>,
        clock: Arc<dyn Clock>,
        slice: Duration,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        let (commands, rx) = mpsc::unbounded_channel();
        let ledger = Arc::new(WakeLedger::default());
        let worker_ledger = Arc::clone(&ledger);

        std::thread::Builder::new()
            .name("alarm-service".to_string())
            .spawn(move || runtime.block_on(run(rx, handler, clock, worker_ledger, slice)))?;

        info!("Alarm service started");
        Ok(Self { commands, ledger })
    }

    fn send(&self, command: AlarmCommand) {
        if self.commands.send(command).is_err() {
            warn!("Alarm service thread is gone, command dropped");
        }
    }
}

impl AlarmService for TokioAlarmService {
    fn can_schedule_exact(&self) -> bool {
        // Timer tasks re-check the wall clock, so precision needs no grant.
        true
    }

    fn request_exact_permission(&self) {
        debug!("Exact alarms are always available on the timer thread");
    }

    fn schedule_exact(&self, request: WakeRequest) {
        if !self.ledger.schedule(request.id) {
            warn!(
                id = request.id,
                state = ?self.ledger.state(request.id),
                "Refusing to reschedule a finished alarm"
            );
            return;
        }
        debug!(id = request.id, at = %request.at, "Scheduling alarm");
        self.send(AlarmCommand::Schedule(request));
    }

    fn cancel(&self, id: ReminderId) {
        if self.ledger.cancel(id) {
            debug!(id, "Cancelling alarm");
            self.send(AlarmCommand::Cancel(id));
        }
    }

    fn state(&self, id: ReminderId) -> WakeState {
        self.ledger.state(id)
    }
}

async fn run(
    mut commands: mpsc::UnboundedReceiver<AlarmCommand>,
    handler: Arc<dyn WakeHandler>,
    clock: Arc<dyn Clock>,
    ledger: Arc<WakeLedger>,
    slice: Duration,
) {
    let mut pending: HashMap<ReminderId, AbortHandle> = HashMap::new();

    while let Some(command) = commands.recv().await {
        pending.retain(|_, task| !task.is_finished());

        match command {
            AlarmCommand::Schedule(request) => {
                if let Some(previous) = pending.remove(&request.id) {
                    previous.abort();
                }
                let id = request.id;
                let task = tokio::spawn(wait_and_fire(
                    request,
                    Arc::clone(&handler),
                    Arc::clone(&clock),
                    Arc::clone(&ledger),
                    slice,
                ));
                pending.insert(id, task.abort_handle());
            }
            AlarmCommand::Cancel(id) => {
                if let Some(task) = pending.remove(&id) {
                    task.abort();
                }
            }
        }
    }

    debug!(pending = pending.len(), "Alarm service shutting down");
}

async fn wait_and_fire(
    request: WakeRequest,
    handler: Arc<dyn WakeHandler>,
    clock: Arc<dyn Clock>,
    ledger: Arc<WakeLedger>,
    slice: Duration,
) {
    loop {
        let Ok(remaining) = (request.at - clock.now()).to_std() else {
            break;
        };
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(remaining.min(slice)).await;
    }

    if !ledger.fire(request.id) {
        debug!(id = request.id, "Alarm was cancelled before firing");
        return;
    }

    let id = request.id;
    info!(id, "Alarm fired");
    if let Err(err) = tokio::task::spawn_blocking(move || handler.on_wake(request)).await {
        error!(id, error = %err, "Wake handler failed");
    }
}
