use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::utils::clock::Clock;

/// Periodic jobs of the service. Each fires on its own timer and is delivered to the processing
/// module as a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    IdleCheck,
    UnlockSample,
    NotificationSample,
    Autosave,
    LimitCheck,
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::IdleCheck => "idle-check",
            TaskKind::UnlockSample => "unlock-sample",
            TaskKind::NotificationSample => "notification-sample",
            TaskKind::Autosave => "autosave",
            TaskKind::LimitCheck => "limit-check",
        }
    }
}

/// Period of every scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePlan {
    pub idle_check: Duration,
    pub unlock_sample: Duration,
    pub notification_sample: Duration,
    pub autosave: Duration,
    pub limit_check: Duration,
}

impl Default for SchedulePlan {
    fn default() -> Self {
        Self {
            idle_check: Duration::from_secs(30),
            unlock_sample: Duration::from_secs(60),
            notification_sample: Duration::from_secs(30),
            autosave: Duration::from_secs(5),
            limit_check: Duration::from_secs(5),
        }
    }
}

impl SchedulePlan {
    pub fn entries(&self) -> [(TaskKind, Duration); 5] {
        [
            (TaskKind::IdleCheck, self.idle_check),
            (TaskKind::UnlockSample, self.unlock_sample),
            (TaskKind::NotificationSample, self.notification_sample),
            (TaskKind::Autosave, self.autosave),
            (TaskKind::LimitCheck, self.limit_check),
        ]
    }
}

/// Owns the periodic timers. Every task runs until it is stopped individually, the scheduler is
/// stopped, or the shutdown token is cancelled. A stopped task never delivers another tick.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    ticks: mpsc::Sender<TaskKind>,
    tasks: HashMap<TaskKind, (CancellationToken, JoinHandle<()>)>,
}

const TICK_CHANNEL_CAPACITY: usize = 16;

impl Scheduler {
    pub fn new(
        clock: Arc<dyn Clock>,
        shutdown: &CancellationToken,
    ) -> (Self, mpsc::Receiver<TaskKind>) {
        let (ticks, receiver) = mpsc::channel(TICK_CHANNEL_CAPACITY);
        (
            Self {
                clock,
                shutdown: shutdown.clone(),
                ticks,
                tasks: HashMap::new(),
            },
            receiver,
        )
    }

    pub fn start(&mut self, plan: &SchedulePlan) {
        for (kind, period) in plan.entries() {
            self.schedule(kind, period);
        }
    }

    /// Starts a task firing every `period`, the first tick one period from now. Rescheduling a
    /// running task replaces its timer.
    pub fn schedule(&mut self, kind: TaskKind, period: Duration) {
        if period.is_zero() {
            warn!("Refusing to schedule {} with a zero period", kind.name());
            return;
        }
        self.stop_task(kind);

        let token = self.shutdown.child_token();
        let clock = self.clock.clone();
        let ticks = self.ticks.clone();
        let mut next = clock.instant();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                next += period;
                tokio::select! {
                    _ = cancelled.cancelled() => return,
                    _ = clock.sleep_until(next) => ()
                }
                tokio::select! {
                    _ = cancelled.cancelled() => return,
                    sent = ticks.send(kind) => {
                        if sent.is_err() {
                            debug!("Nobody listens for {} anymore", kind.name());
                            return;
                        }
                    }
                }
            }
        });
        debug!("Scheduled {} every {period:?}", kind.name());
        self.tasks.insert(kind, (token, handle));
    }

    pub fn stop_task(&mut self, kind: TaskKind) {
        if let Some((token, handle)) = self.tasks.remove(&kind) {
            token.cancel();
            handle.abort();
            debug!("Stopped {}", kind.name());
        }
    }

    /// Cancels every task. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for (_, (token, handle)) in self.tasks.drain() {
            token.cancel();
            handle.abort();
        }
        info!("Scheduler stopped");
    }

    pub fn is_running(&self, kind: TaskKind) -> bool {
        self.tasks
            .get(&kind)
            .is_some_and(|(token, handle)| !token.is_cancelled() && !handle.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
