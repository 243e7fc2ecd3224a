use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use output::{HostMessage, HostSink};
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracker::Tracker;

use crate::utils::clock::Clock;

use super::{
    collection::bridge::HostEvent,
    scheduler::TaskKind,
    storage::{kv_store::KeyValueStore, persistence::Persistence},
};

pub mod alerts;
pub mod output;
pub mod score;
pub mod tracker;

/// Owns the tracker. Host events and scheduler ticks are applied one at a time, in the order they
/// arrive, so no state is shared between tasks.
pub struct ProcessingModule<S> {
    tracker: Tracker,
    persistence: Persistence<S>,
    events: Receiver<HostEvent>,
    ticks: Receiver<TaskKind>,
    sink: Box<dyn HostSink>,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
}

impl<S: KeyValueStore> ProcessingModule<S> {
    /// Applies stored settings on top of the tracker's goals, if there are any.
    pub fn new(
        tracker: Tracker,
        persistence: Persistence<S>,
        events: Receiver<HostEvent>,
        ticks: Receiver<TaskKind>,
        sink: Box<dyn HostSink>,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> Self {
        let mut module = Self {
            tracker,
            persistence,
            events,
            ticks,
            sink,
            clock,
            shutdown,
        };
        module.reload_settings();
        module
    }

    /// Executes the processing event loop. Runs until the host stops sending events or the
    /// shutdown token is cancelled, then closes the open session and saves.
    pub async fn run(mut self) -> Result<()> {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        info!("Host event stream ended, shutting down");
                        self.shutdown.cancel();
                        break;
                    }
                },
                Some(task) = self.ticks.recv() => self.handle_tick(task),
                _ = self.shutdown.cancelled() => break,
            }
        }

        self.finalize()
    }

    fn handle_event(&mut self, event: HostEvent) {
        let now = self.clock.time();
        debug!("Processing event {event:?}");
        match event {
            HostEvent::Input { kind } => self.tracker.record_input(kind, now),
            HostEvent::ScreenView { name } => {
                self.tracker.record_screen_view(&name, now);
                self.save(now);
            }
            HostEvent::Visibility { visible: true } | HostEvent::Focus => {
                self.tracker.set_visible(true, now);
            }
            HostEvent::Visibility { visible: false } => {
                self.tracker.set_visible(false, now);
                self.save(now);
            }
            HostEvent::Blur => {
                self.tracker.set_visible(false, now);
            }
            HostEvent::Unload => self.save(now),
            HostEvent::Summary => self.send_summary(now),
            HostEvent::ReloadSettings => self.reload_settings(),
            HostEvent::Clear => {
                self.persistence.clear();
                self.tracker.reset(now);
            }
        }
    }

    fn handle_tick(&mut self, task: TaskKind) {
        let now = self.clock.time();
        debug!("Running {}", task.name());
        match task {
            TaskKind::IdleCheck => {
                self.tracker.check_idle(now);
            }
            TaskKind::UnlockSample => {
                let alerts = self.tracker.on_unlock_tick(now);
                alerts.into_iter().for_each(|a| self.send(a.into()));
            }
            TaskKind::NotificationSample => self.tracker.on_notification_tick(now),
            TaskKind::Autosave => self.save(now),
            TaskKind::LimitCheck => {
                let alerts = self.tracker.check_limits(now);
                alerts.into_iter().for_each(|a| self.send(a.into()));
            }
        }
    }

    fn reload_settings(&mut self) {
        if !self.persistence.has_settings() {
            debug!("No stored settings, keeping goals");
            return;
        }
        let settings = self.persistence.load_settings();
        match self.tracker.apply_settings(&settings) {
            Ok(()) => info!("Applied stored settings"),
            Err(e) => warn!("Ignoring goals from stored settings: {e}"),
        }
    }

    fn send_summary(&mut self, now: DateTime<Utc>) {
        let message = match self.tracker.summary(now) {
            Ok(summary) => HostMessage::Summary { summary },
            Err(e) => HostMessage::Error {
                message: e.to_string(),
            },
        };
        self.send(message);
    }

    fn send(&mut self, message: HostMessage) {
        if let Err(e) = self.sink.send(message) {
            error!("Failed to deliver message to the host {e:?}");
        }
    }

    fn save(&mut self, now: DateTime<Utc>) {
        let data = self.tracker.snapshot(now);
        self.persistence.save(data);
    }

    fn finalize(mut self) -> Result<()> {
        self.events.close();
        self.ticks.close();

        let now = self.clock.time();
        let data = self.tracker.shutdown(now);
        if !self.persistence.save(data) {
            bail!("Failed to save tracking data on shutdown");
        }
        info!("Saved final state");
        Ok(())
    }
}
