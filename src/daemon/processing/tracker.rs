use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    daemon::{
        collection::{idle::IdleEvaluator, signal::ActivitySignalSource},
        storage::entities::{
            duration_ms, DailyUsageEntity, FocusSessionEntity, SettingsEntity, TrackingDataEntity,
        },
    },
    utils::time::{day_key, next_day_start, saturating_add, split_by_day},
};

use super::{
    alerts::{AlertPolicy, LimitMetrics, LimitMonitor, WellbeingAlert},
    score::{compute_score, Goals, ScoreError, ScoreInputs},
};

/// The tracker is always in exactly one of these states. A focus session is open exactly while
/// the state is [ActivityState::Active].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active { session_start: DateTime<Utc> },
    Inactive,
}

impl ActivityState {
    pub fn is_active(&self) -> bool {
        matches!(self, ActivityState::Active { .. })
    }

    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        match self {
            ActivityState::Active { session_start } => Some(*session_start),
            ActivityState::Inactive => None,
        }
    }
}

/// Inputs that count as user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl InputKind {
    fn is_click(&self) -> bool {
        matches!(self, InputKind::Click | InputKind::TouchStart)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// Inactivity after which the idle check closes the focus session.
    pub idle_threshold: Duration,
    /// Focus session length after which a break reminder is raised.
    pub break_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            idle_threshold: Duration::seconds(30),
            break_interval: Duration::minutes(60),
        }
    }
}

/// Read-only view of the tracker. Values without `total` in their name refer to the current
/// calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WellbeingSummary {
    pub is_active: bool,
    #[serde(with = "duration_ms")]
    pub session_time: Duration,
    #[serde(with = "duration_ms")]
    pub daily_time: Duration,
    pub unlocks: u32,
    pub notifications: u32,
    #[serde(with = "duration_ms")]
    pub focus_time: Duration,
    pub total_unlocks: u32,
    pub total_notifications: u32,
    #[serde(with = "duration_ms")]
    pub total_focus_time: Duration,
    pub click_count: u64,
    pub page_views: u64,
    /// Views per screen name.
    pub screens: BTreeMap<String, u64>,
    pub focus_sessions: usize,
    pub wellbeing_score: u8,
    /// Whether unlock and notification counts come from the simulated source. Unknown for data
    /// read back from the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_signals: Option<bool>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_activity: Option<DateTime<Utc>>,
}

/// Live parts of the tracker that are not persisted.
#[derive(Debug, Clone, Copy)]
pub struct LiveState {
    pub open_session: Option<DateTime<Utc>>,
    pub session_time: Duration,
    pub simulated_signals: Option<bool>,
}

impl LiveState {
    /// State of stored data with no tracker running.
    pub fn stored() -> Self {
        Self {
            open_session: None,
            session_time: Duration::zero(),
            simulated_signals: None,
        }
    }
}

/// Today's bucket with the part of the open focus session that falls on today added to it.
fn today_metrics(
    data: &TrackingDataEntity,
    open_session: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DailyUsageEntity {
    let today = now.date_naive();
    let mut bucket = data
        .daily_usage
        .get(&day_key(today))
        .cloned()
        .unwrap_or_default();
    if let Some(start) = open_session {
        let today_start = next_day_start(now) - Duration::days(1);
        let live = now - start.max(today_start);
        if live > Duration::zero() {
            bucket.focus_time = saturating_add(bucket.focus_time, live);
        }
    }
    bucket
}

/// Builds a summary out of tracking data. The score is computed from today's usage, today's
/// unlocks and today's focus time.
pub fn summarize(
    data: &TrackingDataEntity,
    live: LiveState,
    now: DateTime<Utc>,
) -> Result<WellbeingSummary, ScoreError> {
    let today = today_metrics(data, live.open_session, now);
    let open_length = live
        .open_session
        .map(|start| (now - start).max(Duration::zero()))
        .unwrap_or_else(Duration::zero);

    let score = compute_score(
        &ScoreInputs {
            daily_usage: today.total_time,
            unlocks: today.unlocks,
            focus_time: today.focus_time,
        },
        &data.goals,
    )?;

    Ok(WellbeingSummary {
        is_active: live.open_session.is_some(),
        session_time: live.session_time,
        daily_time: today.total_time,
        unlocks: today.unlocks,
        notifications: today.notifications,
        focus_time: today.focus_time,
        total_unlocks: data.unlock_count,
        total_notifications: data.notification_count,
        total_focus_time: saturating_add(data.focus_time, open_length),
        click_count: data.click_count,
        page_views: data.page_views,
        screens: data
            .screens
            .iter()
            .map(|(name, screen)| (name.clone(), screen.views))
            .collect(),
        focus_sessions: data.focus_sessions.len(),
        wellbeing_score: score.total,
        simulated_signals: live.simulated_signals,
        last_activity: data.last_activity,
    })
}

fn default_policy(config: &TrackerConfig) -> AlertPolicy {
    AlertPolicy {
        limit_alerts: true,
        break_reminders: true,
        break_interval: config.break_interval,
    }
}

/// Tracks focus sessions, daily usage and device signals. Owned by a single task; every method
/// takes the current time explicitly.
pub struct Tracker {
    data: TrackingDataEntity,
    state: ActivityState,
    last_activity_at: DateTime<Utc>,
    /// Point up to which usage time has been added to the daily buckets.
    last_accumulation: DateTime<Utc>,
    started_at: DateTime<Utc>,
    config: TrackerConfig,
    idle: IdleEvaluator,
    signals: Box<dyn ActivitySignalSource>,
    monitor: LimitMonitor,
    policy: AlertPolicy,
}

impl Tracker {
    /// Creates a tracker over previously stored data. The tracker starts active, with a focus
    /// session opened at `now`.
    pub fn new(
        mut data: TrackingDataEntity,
        config: TrackerConfig,
        signals: Box<dyn ActivitySignalSource>,
        now: DateTime<Utc>,
    ) -> Self {
        if let Err(e) = data.goals.validate() {
            warn!("Stored goals are unusable ({e}), falling back to defaults");
            data.goals = Goals::default();
        }
        if signals.is_simulated() {
            info!("Unlock and notification counts are SIMULATED");
        }

        Self {
            data,
            state: ActivityState::Active { session_start: now },
            last_activity_at: now,
            last_accumulation: now,
            started_at: now,
            config,
            idle: IdleEvaluator::new(config.idle_threshold),
            signals,
            monitor: LimitMonitor::new(),
            policy: default_policy(&config),
        }
    }

    /// Drops all tracking data and starts over with a session opened at `now`. Configuration and
    /// the signal source are kept, alert preferences go back to defaults. Used after the persisted
    /// data has been cleared.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.data = TrackingDataEntity::default();
        self.state = ActivityState::Active { session_start: now };
        self.last_activity_at = now;
        self.last_accumulation = now;
        self.started_at = now;
        self.monitor = LimitMonitor::new();
        self.policy = default_policy(&self.config);
        info!("Tracking restarted from scratch");
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn data(&self) -> &TrackingDataEntity {
        &self.data
    }

    pub fn goals(&self) -> &Goals {
        &self.data.goals
    }

    pub fn record_input(&mut self, kind: InputKind, now: DateTime<Utc>) {
        if kind.is_click() {
            self.data.click_count = self.data.click_count.saturating_add(1);
        }
        self.register_activity(now);
    }

    /// Counts a page view and a view of the named screen.
    pub fn record_screen_view(&mut self, name: &str, now: DateTime<Utc>) {
        debug!("Screen view {name}");
        self.data.page_views = self.data.page_views.saturating_add(1);
        let screen = self.data.screens.entry(name.to_owned()).or_default();
        screen.views = screen.views.saturating_add(1);
        self.register_activity(now);
    }

    /// Visibility and window focus changes. Losing either closes the current focus session.
    pub fn set_visible(&mut self, visible: bool, now: DateTime<Utc>) -> Option<FocusSessionEntity> {
        if visible {
            self.register_activity(now);
            None
        } else {
            self.deactivate(now)
        }
    }

    /// Periodic idle check. Closes the session when there was no activity for longer than the
    /// idle threshold.
    pub fn check_idle(&mut self, now: DateTime<Utc>) -> Option<FocusSessionEntity> {
        if self.state.is_active() && self.idle.is_idle(self.last_activity_at, now) {
            debug!("No activity since {}", self.last_activity_at);
            self.deactivate(now)
        } else {
            None
        }
    }

    /// Samples the unlock signal. New unlocks trigger a limit check right away.
    pub fn on_unlock_tick(&mut self, now: DateTime<Utc>) -> Vec<WellbeingAlert> {
        let unlocks = self.signals.sample_unlocks();
        if unlocks == 0 {
            return vec![];
        }
        debug!(
            simulated = self.signals.is_simulated(),
            "Recorded {unlocks} unlocks"
        );
        self.data.unlock_count = self.data.unlock_count.saturating_add(unlocks);
        let bucket = self.bucket_mut(now.date_naive());
        bucket.unlocks = bucket.unlocks.saturating_add(unlocks);

        self.check_limits(now)
    }

    pub fn on_notification_tick(&mut self, now: DateTime<Utc>) {
        let notifications = self.signals.sample_notifications();
        if notifications == 0 {
            return;
        }
        debug!(
            simulated = self.signals.is_simulated(),
            "Recorded {notifications} notifications"
        );
        self.data.notification_count = self.data.notification_count.saturating_add(notifications);
        let bucket = self.bucket_mut(now.date_naive());
        bucket.notifications = bucket.notifications.saturating_add(notifications);
    }

    pub fn check_limits(&mut self, now: DateTime<Utc>) -> Vec<WellbeingAlert> {
        self.accumulate_usage(now);
        let open_session = self.state.session_start();
        let today = today_metrics(&self.data, open_session, now);

        let metrics = LimitMetrics {
            daily_usage: today.total_time,
            max_daily_time: self.data.goals.max_daily_time,
            unlocks: today.unlocks,
            max_unlocks: self.data.goals.max_unlocks,
            open_session: open_session.map(|start| (start, (now - start).max(Duration::zero()))),
        };
        let alerts = self.monitor.evaluate(&metrics, &self.policy);
        for alert in &alerts {
            info!("Raising alert {alert:?}");
        }
        alerts
    }

    /// Focus time accumulated so far, including the open session. Reading it doesn't close or
    /// restart the session.
    pub fn focus_time(&self, now: DateTime<Utc>) -> Duration {
        let open = self
            .state
            .session_start()
            .map(|start| (now - start).max(Duration::zero()))
            .unwrap_or_else(Duration::zero);
        saturating_add(self.data.focus_time, open)
    }

    pub fn wellbeing_score(&mut self, now: DateTime<Utc>) -> Result<u8, ScoreError> {
        Ok(self.summary(now)?.wellbeing_score)
    }

    pub fn summary(&mut self, now: DateTime<Utc>) -> Result<WellbeingSummary, ScoreError> {
        self.accumulate_usage(now);
        let mut data_view = summarize(
            &self.data,
            LiveState {
                open_session: self.state.session_start(),
                session_time: (now - self.started_at).max(Duration::zero()),
                simulated_signals: Some(self.signals.is_simulated()),
            },
            now,
        )?;
        data_view.last_activity = Some(self.last_activity_at);
        Ok(data_view)
    }

    pub fn set_goals(&mut self, goals: Goals) -> Result<(), ScoreError> {
        goals.validate()?;
        info!("Goals updated to {goals:?}");
        self.data.goals = goals;
        Ok(())
    }

    /// Applies user settings: alert preferences and the goals that settings carry.
    pub fn apply_settings(&mut self, settings: &SettingsEntity) -> Result<(), ScoreError> {
        self.policy.limit_alerts = settings.limit_alerts;
        self.policy.break_reminders = settings.break_reminders;
        self.set_goals(self.data.goals.with_settings(settings))
    }

    /// Brings persisted fields up to date and returns them for saving.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> &TrackingDataEntity {
        self.accumulate_usage(now);
        self.data.last_activity = Some(self.last_activity_at);
        &self.data
    }

    /// Closes the open session and returns the final state to persist.
    pub fn shutdown(&mut self, now: DateTime<Utc>) -> &TrackingDataEntity {
        self.deactivate(now);
        self.snapshot(now)
    }

    /// Adds usage time since the previous accumulation point to the daily buckets. Time spent
    /// inactive is skipped and time spanning midnight is split between the days.
    pub fn accumulate_usage(&mut self, now: DateTime<Utc>) {
        let from = self.last_accumulation;
        if now <= from {
            return;
        }
        self.last_accumulation = now;
        if !self.state.is_active() {
            return;
        }
        for (day, portion) in split_by_day(from, now) {
            let bucket = self.bucket_mut(day);
            bucket.total_time = saturating_add(bucket.total_time, portion);
        }
    }

    fn register_activity(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = self.last_activity_at.max(now);
        self.activate(now);
    }

    fn activate(&mut self, now: DateTime<Utc>) -> bool {
        if self.state.is_active() {
            return false;
        }
        self.accumulate_usage(now);
        self.state = ActivityState::Active { session_start: now };
        info!("Focus session started");
        true
    }

    fn deactivate(&mut self, now: DateTime<Utc>) -> Option<FocusSessionEntity> {
        let ActivityState::Active { session_start } = self.state else {
            return None;
        };
        self.accumulate_usage(now);

        let session = FocusSessionEntity::new(session_start, now);
        self.data.focus_time = saturating_add(self.data.focus_time, session.duration);
        for (day, portion) in split_by_day(session.start, session.end) {
            let bucket = self.bucket_mut(day);
            bucket.focus_time = saturating_add(bucket.focus_time, portion);
        }
        self.data.focus_sessions.push(session.clone());
        self.state = ActivityState::Inactive;

        info!("Focus session ended after {}s", session.duration.num_seconds());
        Some(session)
    }

    fn bucket_mut(&mut self, day: NaiveDate) -> &mut DailyUsageEntity {
        self.data.daily_usage.entry(day_key(day)).or_default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::daemon::{
        collection::signal::{MockActivitySignalSource, SilentSignalSource},
        processing::{alerts::WellbeingAlert, score::Goals},
        storage::entities::{DailyUsageEntity, SettingsEntity, TrackingDataEntity},
    };

    use super::{summarize, ActivityState, InputKind, LiveState, Tracker, TrackerConfig};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn tracker_at(now: DateTime<Utc>) -> Tracker {
        Tracker::new(
            TrackingDataEntity::default(),
            TrackerConfig::default(),
            Box::new(SilentSignalSource),
            now,
        )
    }

    fn unlocking_source(unlocks_per_tick: u32) -> MockActivitySignalSource {
        let mut source = MockActivitySignalSource::new();
        source
            .expect_sample_unlocks()
            .returning(move || unlocks_per_tick);
        source.expect_sample_notifications().returning(|| 1);
        source.expect_is_simulated().return_const(true);
        source
    }

    #[test]
    fn test_starts_active() {
        let tracker = tracker_at(start());
        assert_eq!(
            tracker.state(),
            ActivityState::Active {
                session_start: start()
            }
        );
    }

    #[test]
    fn test_session_closed_only_on_deactivation() {
        let mut tracker = tracker_at(start());

        for i in 1..10 {
            tracker.record_input(InputKind::PointerMove, start() + Duration::seconds(i));
        }
        assert!(tracker.data().focus_sessions.is_empty());

        let session = tracker
            .set_visible(false, start() + Duration::seconds(20))
            .unwrap();
        assert_eq!(session.duration, Duration::seconds(20));
        assert!(!tracker.state().is_active());

        // Already inactive, nothing to close.
        assert!(tracker
            .set_visible(false, start() + Duration::seconds(25))
            .is_none());
        assert_eq!(tracker.data().focus_sessions.len(), 1);

        tracker.record_input(InputKind::KeyPress, start() + Duration::seconds(40));
        assert_eq!(
            tracker.state(),
            ActivityState::Active {
                session_start: start() + Duration::seconds(40)
            }
        );
        tracker.set_visible(false, start() + Duration::seconds(55));

        let sessions = &tracker.data().focus_sessions;
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s.end - s.start == s.duration));
        assert_eq!(tracker.data().focus_time, Duration::seconds(35));
    }

    #[test]
    fn test_idle_check_transitions_after_threshold() {
        let mut tracker = tracker_at(start());
        tracker.record_input(InputKind::Click, start() + Duration::seconds(5));

        assert!(tracker.check_idle(start() + Duration::seconds(30)).is_none());
        assert!(tracker.state().is_active());

        let session = tracker.check_idle(start() + Duration::seconds(60)).unwrap();
        assert_eq!(session.start, start());
        assert_eq!(session.end, start() + Duration::seconds(60));
        assert!(!tracker.state().is_active());
        assert_eq!(tracker.data().click_count, 1);
    }

    #[test]
    fn test_live_focus_time_does_not_double_count() {
        let mut tracker = tracker_at(start());

        for i in 1..=30 {
            tracker.record_input(InputKind::Scroll, start() + Duration::seconds(i));
            assert_eq!(
                tracker.focus_time(start() + Duration::seconds(i)),
                Duration::seconds(i)
            );
        }
        assert_eq!(tracker.data().focus_time, Duration::zero());
        assert!(tracker.state().is_active());
    }

    #[test]
    fn test_usage_accumulates_from_last_point_only() {
        let mut tracker = tracker_at(start());

        for i in 1..=12 {
            tracker.snapshot(start() + Duration::seconds(5 * i));
        }
        let summary = tracker.summary(start() + Duration::seconds(60)).unwrap();
        assert_eq!(summary.daily_time, Duration::seconds(60));

        // Inactive time doesn't count as usage.
        tracker.set_visible(false, start() + Duration::seconds(60));
        tracker.snapshot(start() + Duration::minutes(30));
        tracker.set_visible(true, start() + Duration::minutes(30));
        let summary = tracker
            .summary(start() + Duration::minutes(30) + Duration::seconds(10))
            .unwrap();
        assert_eq!(summary.daily_time, Duration::seconds(70));
    }

    #[test]
    fn test_daily_buckets_split_at_midnight() {
        let evening = Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
        let mut tracker = tracker_at(evening);

        tracker.set_visible(false, evening + Duration::minutes(20));
        tracker.set_visible(true, evening + Duration::minutes(30));
        tracker.set_visible(false, evening + Duration::minutes(40));
        let day_one = tracker.data().daily_usage["2024-05-01"].clone();
        assert_eq!(tracker.data().daily_usage.len(), 1);
        assert_eq!(day_one.total_time, Duration::minutes(30));
        assert_eq!(day_one.focus_time, Duration::minutes(30));

        // A session that starts after midnight creates a new bucket.
        let after_midnight = Utc.with_ymd_and_hms(2024, 5, 2, 0, 15, 0).unwrap();
        tracker.set_visible(true, after_midnight);
        tracker.set_visible(false, after_midnight + Duration::minutes(10));
        assert_eq!(tracker.data().daily_usage["2024-05-01"], day_one);
        assert_eq!(
            tracker.data().daily_usage["2024-05-02"].total_time,
            Duration::minutes(10)
        );

        // A session spanning midnight is split between both days.
        let late = Utc.with_ymd_and_hms(2024, 5, 2, 23, 50, 0).unwrap();
        tracker.set_visible(true, late);
        tracker.set_visible(false, late + Duration::minutes(25));
        assert_eq!(
            tracker.data().daily_usage["2024-05-02"].focus_time,
            Duration::minutes(20)
        );
        assert_eq!(
            tracker.data().daily_usage["2024-05-03"].focus_time,
            Duration::minutes(15)
        );
    }

    #[test]
    fn test_unlock_ticks_raise_alert_once() {
        let mut tracker = Tracker::new(
            TrackingDataEntity::default(),
            TrackerConfig::default(),
            Box::new(unlocking_source(10)),
            start(),
        );

        let mut raised = vec![];
        for i in 1..=8 {
            raised.extend(tracker.on_unlock_tick(start() + Duration::minutes(i)));
        }

        assert_eq!(
            raised,
            vec![WellbeingAlert::UnlockLimitExceeded {
                unlocks: 60,
                limit: 50
            }]
        );
        assert_eq!(tracker.data().unlock_count, 80);
        assert_eq!(tracker.data().daily_usage["2024-05-01"].unlocks, 80);
    }

    #[test]
    fn test_notification_ticks_count() {
        let mut tracker = Tracker::new(
            TrackingDataEntity::default(),
            TrackerConfig::default(),
            Box::new(unlocking_source(0)),
            start(),
        );
        tracker.on_notification_tick(start());
        tracker.on_notification_tick(start() + Duration::seconds(30));

        let summary = tracker.summary(start() + Duration::seconds(30)).unwrap();
        assert_eq!(summary.notifications, 2);
        assert_eq!(summary.total_notifications, 2);
        assert_eq!(summary.simulated_signals, Some(true));
    }

    #[test]
    fn test_daily_limit_alert() {
        let mut tracker = tracker_at(start());
        tracker
            .set_goals(Goals {
                max_daily_time: Duration::minutes(10),
                ..Goals::default()
            })
            .unwrap();

        let mut alerts = vec![];
        for i in 1..=20 {
            let now = start() + Duration::minutes(i);
            tracker.record_input(InputKind::PointerDown, now);
            alerts.extend(tracker.check_limits(now));
        }

        assert_eq!(
            alerts,
            vec![WellbeingAlert::DailyLimitExceeded {
                usage: Duration::minutes(11),
                limit: Duration::minutes(10),
            }]
        );
    }

    #[test]
    fn test_settings_disable_alerts_and_set_goals() {
        let mut tracker = tracker_at(start());
        tracker
            .apply_settings(&SettingsEntity {
                max_daily_time: 1,
                max_unlocks: 5,
                limit_alerts: false,
                break_reminders: false,
                ..SettingsEntity::default()
            })
            .unwrap();

        assert_eq!(tracker.goals().max_daily_time, Duration::hours(1));
        assert_eq!(tracker.goals().max_unlocks, 5);
        assert_eq!(tracker.goals().focus_goal, Duration::hours(2));

        tracker.record_input(InputKind::Click, start() + Duration::hours(3));
        assert!(tracker.check_limits(start() + Duration::hours(3)).is_empty());

        let invalid = SettingsEntity {
            max_unlocks: 0,
            ..SettingsEntity::default()
        };
        assert!(tracker.apply_settings(&invalid).is_err());
        assert_eq!(tracker.goals().max_unlocks, 5);
    }

    #[test]
    fn test_break_reminder() {
        let mut tracker = tracker_at(start());
        let mut alerts = vec![];
        for minute in (5..=120).step_by(5) {
            let now = start() + Duration::minutes(minute);
            tracker.record_input(InputKind::KeyPress, now);
            alerts.extend(tracker.check_limits(now));
        }

        assert_eq!(
            alerts,
            vec![WellbeingAlert::BreakReminder {
                session: Duration::minutes(60)
            }]
        );
    }

    #[test]
    fn test_invalid_stored_goals_fall_back() {
        let mut data = TrackingDataEntity::default();
        data.goals.focus_goal = Duration::zero();

        let tracker = Tracker::new(
            data,
            TrackerConfig::default(),
            Box::new(SilentSignalSource),
            start(),
        );
        assert_eq!(tracker.goals(), &Goals::default());
    }

    #[test]
    fn test_summary_score() {
        let mut tracker = tracker_at(start());
        tracker.record_input(InputKind::Click, start() + Duration::hours(1));

        let summary = tracker.summary(start() + Duration::hours(1)).unwrap();
        assert_eq!(summary.session_time, Duration::hours(1));
        assert_eq!(summary.daily_time, Duration::hours(1));
        assert_eq!(summary.focus_time, Duration::hours(1));
        assert_eq!(summary.last_activity, Some(start() + Duration::hours(1)));
        // time 75, unlocks 100, focus 50
        assert_eq!(summary.wellbeing_score, 75);
        assert_eq!(tracker.wellbeing_score(start() + Duration::hours(1)), Ok(75));
        assert!(tracker.data().focus_sessions.is_empty());
    }

    #[test]
    fn test_summarize_stored_data() {
        let mut tracker = tracker_at(start());
        let data = tracker.shutdown(start() + Duration::hours(2)).clone();

        let summary = summarize(&data, LiveState::stored(), start() + Duration::hours(3)).unwrap();
        assert!(!summary.is_active);
        assert_eq!(summary.daily_time, Duration::hours(2));
        assert_eq!(summary.focus_time, Duration::hours(2));
        assert_eq!(summary.focus_sessions, 1);
        assert_eq!(summary.simulated_signals, None);
        // time 50, unlocks 100, focus 100
        assert_eq!(summary.wellbeing_score, 83);
    }

    #[test]
    fn test_screen_views_are_counted_per_screen() {
        let mut tracker = tracker_at(start());
        tracker.set_visible(false, start() + Duration::seconds(5));

        tracker.record_screen_view("dashboard", start() + Duration::seconds(10));
        tracker.record_screen_view("settings", start() + Duration::seconds(20));
        tracker.record_screen_view("dashboard", start() + Duration::seconds(30));

        assert!(tracker.state().is_active());
        assert_eq!(tracker.data().page_views, 3);
        assert_eq!(tracker.data().screens["dashboard"].views, 2);

        let summary = tracker.summary(start() + Duration::seconds(30)).unwrap();
        assert_eq!(
            summary.screens,
            [("dashboard".to_owned(), 2), ("settings".to_owned(), 1)].into()
        );
    }

    #[test]
    fn test_huge_stored_totals_saturate() {
        let mut data = TrackingDataEntity::default();
        data.focus_time = Duration::MAX;
        data.daily_usage.insert(
            "2024-05-01".into(),
            DailyUsageEntity {
                total_time: Duration::MAX,
                focus_time: Duration::MAX,
                ..DailyUsageEntity::default()
            },
        );
        let mut tracker = Tracker::new(
            data,
            TrackerConfig::default(),
            Box::new(SilentSignalSource),
            start(),
        );

        let summary = tracker.summary(start() + Duration::minutes(5)).unwrap();
        assert_eq!(summary.total_focus_time, Duration::MAX);
        assert_eq!(summary.daily_time, Duration::MAX);
        // time 0, unlocks 100, focus 100
        assert_eq!(summary.wellbeing_score, 67);
        assert_eq!(tracker.focus_time(start() + Duration::minutes(5)), Duration::MAX);

        let data = tracker.shutdown(start() + Duration::minutes(10));
        assert_eq!(data.focus_time, Duration::MAX);
        assert_eq!(data.daily_usage["2024-05-01"].focus_time, Duration::MAX);
    }

    #[test]
    fn test_reset() {
        let mut tracker = tracker_at(start());
        tracker.set_visible(false, start() + Duration::minutes(5));
        assert_eq!(tracker.data().focus_sessions.len(), 1);

        tracker.reset(start() + Duration::minutes(6));
        assert!(tracker.data().focus_sessions.is_empty());
        assert!(tracker.data().daily_usage.is_empty());
        assert_eq!(
            tracker.state(),
            ActivityState::Active {
                session_start: start() + Duration::minutes(6)
            }
        );
    }
}
