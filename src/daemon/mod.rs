use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use args::ServeArgs;
use collection::{
    bridge::{HostBridge, HostEvent},
    signal::ActivitySignalSource,
};
use processing::{
    output::{HostSink, JsonLinesSink},
    tracker::{Tracker, TrackerConfig},
    ProcessingModule,
};
use scheduler::{SchedulePlan, Scheduler, TaskKind};
use storage::{
    kv_store::{FileStore, KeyValueStore},
    persistence::Persistence,
};
use tokio::{
    io::{AsyncBufRead, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::utils::clock::{Clock, DefaultClock};

pub mod args;
pub mod collection;
pub mod processing;
pub mod scheduler;
pub mod shutdown;
pub mod storage;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Directory under the application directory holding the key-value store.
pub const STORE_DIR: &str = "store";

/// Represents the starting point for the service. Host events are read from stdin, messages for
/// the host are written to stdout.
pub async fn start_daemon(dir: PathBuf, args: ServeArgs) -> Result<()> {
    let store = FileStore::new(dir.join(STORE_DIR))?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let shutdown_token = CancellationToken::new();

    let (sender, receiver) = mpsc::channel::<HostEvent>(EVENT_CHANNEL_CAPACITY);
    let bridge = create_bridge(BufReader::new(tokio::io::stdin()), sender, &shutdown_token);
    let (mut scheduler, ticks) =
        create_scheduler(clock.clone(), &shutdown_token, &args.schedule_plan());
    let processor = create_processor(
        Persistence::new(store),
        args.tracker_config(),
        args.signal_source(),
        receiver,
        ticks,
        Box::new(JsonLinesSink::stdout()),
        clock,
        &shutdown_token,
    );
    info!("Service started");

    let (_, bridge_result, processing_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        bridge.run(),
        processor.run(),
    );
    scheduler.stop();

    if let Err(bridge_result) = bridge_result {
        error!("Host bridge got an error {:?}", bridge_result);
    }

    if let Err(processing_result) = processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    info!("Service stopped");
    Ok(())
}

fn create_bridge<R: AsyncBufRead + Unpin>(
    input: R,
    sender: mpsc::Sender<HostEvent>,
    shutdown_token: &CancellationToken,
) -> HostBridge<R> {
    HostBridge::new(input, sender, shutdown_token.clone())
}

fn create_scheduler(
    clock: Arc<dyn Clock>,
    shutdown_token: &CancellationToken,
    plan: &SchedulePlan,
) -> (Scheduler, mpsc::Receiver<TaskKind>) {
    let (mut scheduler, ticks) = Scheduler::new(clock, shutdown_token);
    scheduler.start(plan);
    (scheduler, ticks)
}

#[allow(clippy::too_many_arguments)]
fn create_processor<S: KeyValueStore>(
    persistence: Persistence<S>,
    config: TrackerConfig,
    signals: Box<dyn ActivitySignalSource>,
    receiver: mpsc::Receiver<HostEvent>,
    ticks: mpsc::Receiver<TaskKind>,
    sink: Box<dyn HostSink>,
    clock: Arc<dyn Clock>,
    shutdown_token: &CancellationToken,
) -> ProcessingModule<S> {
    let tracker = Tracker::new(persistence.load(), config, signals, clock.time());
    ProcessingModule::new(
        tracker,
        persistence,
        receiver,
        ticks,
        sink,
        clock,
        shutdown_token.clone(),
    )
}
