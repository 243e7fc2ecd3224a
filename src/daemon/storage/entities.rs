use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::daemon::processing::score::Goals;

/// A closed focus session. Sessions are appended to the log once and never touched again.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct FocusSessionEntity {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl FocusSessionEntity {
    /// Builds a session between two moments. Wall clocks can step backwards, so an `end` before
    /// `start` produces an empty session instead of a negative one.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let end = end.max(start);
        Self {
            start,
            end,
            duration: end - start,
        }
    }
}

/// Aggregated metrics for one calendar day. Unknown per-day fields are kept in `extra`.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyUsageEntity {
    #[serde(with = "duration_ms")]
    pub total_time: Duration,
    pub unlocks: u32,
    pub notifications: u32,
    #[serde(with = "duration_ms")]
    pub focus_time: Duration,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DailyUsageEntity {
    fn default() -> Self {
        Self {
            total_time: Duration::zero(),
            unlocks: 0,
            notifications: 0,
            focus_time: Duration::zero(),
            extra: Map::new(),
        }
    }
}

/// How often a named screen was shown.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenViewsEntity {
    pub views: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The blob stored under the tracking key. Missing fields fall back to their defaults and fields
/// this crate doesn't know about are carried along in `extra`, so data written by other clients
/// survives a load/save cycle.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingDataEntity {
    pub daily_usage: BTreeMap<String, DailyUsageEntity>,
    pub session_data: Map<String, Value>,
    pub focus_sessions: Vec<FocusSessionEntity>,
    pub distractions: Vec<Value>,
    pub screens: BTreeMap<String, ScreenViewsEntity>,
    pub goals: Goals,
    pub click_count: u64,
    pub page_views: u64,
    pub unlock_count: u32,
    pub notification_count: u32,
    #[serde(with = "duration_ms")]
    pub focus_time: Duration,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TrackingDataEntity {
    fn default() -> Self {
        Self {
            daily_usage: BTreeMap::new(),
            session_data: Map::new(),
            focus_sessions: vec![],
            distractions: vec![],
            screens: BTreeMap::new(),
            goals: Goals::default(),
            click_count: 0,
            page_views: 0,
            unlock_count: 0,
            notification_count: 0,
            focus_time: Duration::zero(),
            last_activity: None,
            extra: Map::new(),
        }
    }
}

pub const DEFAULT_USER_NAME: &str = "Anonymous user";
pub const DEFAULT_USER_EMAIL: &str = "Not registered";

/// User settings. `max_daily_time` is expressed in whole hours here, unlike [Goals].
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsEntity {
    pub name: String,
    pub email: String,
    pub max_daily_time: u32,
    pub max_unlocks: u32,
    pub limit_alerts: bool,
    pub break_reminders: bool,
}

impl Default for SettingsEntity {
    fn default() -> Self {
        Self {
            name: DEFAULT_USER_NAME.into(),
            email: DEFAULT_USER_EMAIL.into(),
            max_daily_time: 4,
            max_unlocks: 50,
            limit_alerts: true,
            break_reminders: true,
        }
    }
}

/// Document produced by an export and accepted by an import. Both payloads are kept as raw JSON
/// because they are copied verbatim between the file and the store.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub wellbeing: Option<Value>,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
}

/// Durations are persisted as integer milliseconds. Numbers written as floats by other clients
/// are rounded on the way in. Negative and out of range values are rejected, which makes the
/// whole document unreadable.
pub mod duration_ms {
    use chrono::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_milliseconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = f64::deserialize(deserializer)?.round();
        if !ms.is_finite() || ms < 0. || ms >= i64::MAX as f64 {
            return Err(de::Error::custom(format!("duration of {ms}ms is out of range")));
        }
        Duration::try_milliseconds(ms as i64)
            .ok_or_else(|| de::Error::custom(format!("duration of {ms}ms is out of range")))
    }
}
