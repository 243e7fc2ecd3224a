use std::time::Duration;

use clap::Args;

use super::{
    collection::{
        idle::DEFAULT_IDLE_THRESHOLD_SECS,
        signal::{ActivitySignalSource, SilentSignalSource, SimulatedSignalSource},
    },
    processing::tracker::TrackerConfig,
    scheduler::SchedulePlan,
};

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_IDLE_THRESHOLD_SECS as u64,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds without input after which the focus session ends"
    )]
    pub idle_threshold_secs: u64,
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "How often tracking data is saved, in seconds"
    )]
    pub autosave_secs: u64,
    #[arg(
        long,
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Focus session length in minutes after which a break reminder is sent"
    )]
    pub break_minutes: u64,
    #[arg(long, help = "Seed for simulated unlocks and notifications")]
    pub seed: Option<u64>,
    #[arg(
        long,
        help = "Do not simulate unlocks and notifications. Their counts stay at zero"
    )]
    pub no_simulation: bool,
}

impl ServeArgs {
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            idle_threshold: chrono::Duration::seconds(self.idle_threshold_secs as i64),
            break_interval: chrono::Duration::minutes(self.break_minutes as i64),
        }
    }

    /// The idle check runs as often as the idle threshold.
    pub fn schedule_plan(&self) -> SchedulePlan {
        SchedulePlan {
            idle_check: Duration::from_secs(self.idle_threshold_secs),
            autosave: Duration::from_secs(self.autosave_secs),
            ..SchedulePlan::default()
        }
    }

    pub fn signal_source(&self) -> Box<dyn ActivitySignalSource> {
        if self.no_simulation {
            Box::new(SilentSignalSource)
        } else {
            Box::new(SimulatedSignalSource::new(self.seed))
        }
    }
}
