use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{daemon::storage::entities::duration_ms, utils::time::format_duration};

/// Advisory raised by the tracker. The tracker only produces these; showing a system
/// notification or an in-app toast is up to whoever consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WellbeingAlert {
    DailyLimitExceeded {
        #[serde(with = "duration_ms")]
        usage: Duration,
        #[serde(with = "duration_ms")]
        limit: Duration,
    },
    UnlockLimitExceeded {
        unlocks: u32,
        limit: u32,
    },
    BreakReminder {
        #[serde(with = "duration_ms")]
        session: Duration,
    },
}

impl WellbeingAlert {
    pub fn title(&self) -> &'static str {
        match self {
            WellbeingAlert::DailyLimitExceeded { .. } => "Daily limit reached",
            WellbeingAlert::UnlockLimitExceeded { .. } => "Too many unlocks",
            WellbeingAlert::BreakReminder { .. } => "Time for a break",
        }
    }

    pub fn message(&self) -> String {
        match self {
            WellbeingAlert::DailyLimitExceeded { usage, .. } => format!(
                "You have used the device for {} today. Consider taking a break.",
                format_duration(*usage)
            ),
            WellbeingAlert::UnlockLimitExceeded { unlocks, .. } => format!(
                "You have unlocked the device {unlocks} times today. Try to unlock it less often."
            ),
            WellbeingAlert::BreakReminder { session } => format!(
                "You have been focused for {}. Stretch and rest your eyes.",
                format_duration(*session)
            ),
        }
    }
}

/// Values the monitor compares against their limits on each check.
#[derive(Debug, Clone, Copy)]
pub struct LimitMetrics {
    pub daily_usage: Duration,
    pub max_daily_time: Duration,
    pub unlocks: u32,
    pub max_unlocks: u32,
    /// Start and length of the focus session currently open, if any.
    pub open_session: Option<(DateTime<Utc>, Duration)>,
}

#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    pub limit_alerts: bool,
    pub break_reminders: bool,
    pub break_interval: Duration,
}

/// Fires each limit alert once per crossing. A limit re-arms once its metric is back within the
/// limit, which happens on a new day, after raising a goal or after clearing data. Break
/// reminders fire at most once per focus session.
#[derive(Debug, Clone)]
pub struct LimitMonitor {
    daily_over: bool,
    unlocks_over: bool,
    reminded_session: Option<DateTime<Utc>>,
}

impl Default for LimitMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl LimitMonitor {
    pub fn new() -> Self {
        Self {
            daily_over: false,
            unlocks_over: false,
            reminded_session: None,
        }
    }

    pub fn evaluate(&mut self, metrics: &LimitMetrics, policy: &AlertPolicy) -> Vec<WellbeingAlert> {
        let mut alerts = vec![];

        let daily_over = metrics.daily_usage > metrics.max_daily_time;
        if daily_over && !self.daily_over && policy.limit_alerts {
            alerts.push(WellbeingAlert::DailyLimitExceeded {
                usage: metrics.daily_usage,
                limit: metrics.max_daily_time,
            });
        }
        // A crossing that happens while alerts are disabled is consumed silently.
        self.daily_over = daily_over;

        let unlocks_over = metrics.unlocks > metrics.max_unlocks;
        if unlocks_over && !self.unlocks_over && policy.limit_alerts {
            alerts.push(WellbeingAlert::UnlockLimitExceeded {
                unlocks: metrics.unlocks,
                limit: metrics.max_unlocks,
            });
        }
        self.unlocks_over = unlocks_over;

        if let Some((start, length)) = metrics.open_session {
            let due = length >= policy.break_interval && self.reminded_session != Some(start);
            if due && policy.break_reminders {
                alerts.push(WellbeingAlert::BreakReminder { session: length });
                self.reminded_session = Some(start);
            }
        }

        alerts
    }
}
