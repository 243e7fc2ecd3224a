//! Wellbeing score: three sub-scores against the configured [Goals], averaged into 0..=100.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    daemon::storage::entities::{duration_ms, SettingsEntity},
    utils::percentage::{duration_percentage, ratio_percentage, Percentage},
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ScoreError {
    #[error("Goal `{0}` must be at least 1")]
    InvalidGoal(&'static str),
}

/// Daily targets the score is measured against.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct Goals {
    #[serde(with = "duration_ms")]
    pub max_daily_time: Duration,
    pub max_unlocks: u32,
    #[serde(with = "duration_ms")]
    pub focus_goal: Duration,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            max_daily_time: Duration::hours(4),
            max_unlocks: 50,
            focus_goal: Duration::hours(2),
        }
    }
}

impl Goals {
    /// Every goal has to be at least 1 (one millisecond for durations), otherwise the score
    /// would divide by zero.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.max_daily_time < Duration::milliseconds(1) {
            return Err(ScoreError::InvalidGoal("maxDailyTime"));
        }
        if self.max_unlocks < 1 {
            return Err(ScoreError::InvalidGoal("maxUnlocks"));
        }
        if self.focus_goal < Duration::milliseconds(1) {
            return Err(ScoreError::InvalidGoal("focusGoal"));
        }
        Ok(())
    }

    /// Goals with the daily time (whole hours) and unlock limits taken from user settings.
    /// Settings have no focus goal, so it is kept.
    pub fn with_settings(&self, settings: &SettingsEntity) -> Goals {
        Goals {
            max_daily_time: Duration::hours(settings.max_daily_time as i64),
            max_unlocks: settings.max_unlocks,
            focus_goal: self.focus_goal,
        }
    }
}

/// Metrics the score is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInputs {
    pub daily_usage: Duration,
    pub unlocks: u32,
    pub focus_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellbeingScore {
    pub time_score: Percentage,
    pub unlock_score: Percentage,
    pub focus_score: Percentage,
    pub total: u8,
}

pub fn compute_score(inputs: &ScoreInputs, goals: &Goals) -> Result<WellbeingScore, ScoreError> {
    let time_score = duration_percentage(inputs.daily_usage, goals.max_daily_time)
        .ok_or(ScoreError::InvalidGoal("maxDailyTime"))?
        .remainder();
    let unlock_score = ratio_percentage(inputs.unlocks as f64, goals.max_unlocks as f64)
        .ok_or(ScoreError::InvalidGoal("maxUnlocks"))?
        .remainder();
    let focus_score = duration_percentage(inputs.focus_time, goals.focus_goal)
        .ok_or(ScoreError::InvalidGoal("focusGoal"))?;

    let total = ((*time_score + *unlock_score + *focus_score) / 3.).round() as u8;

    Ok(WellbeingScore {
        time_score,
        unlock_score,
        focus_score,
        total,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{compute_score, Goals, ScoreError, ScoreInputs};

    fn inputs(daily_usage: Duration, unlocks: u32, focus_time: Duration) -> ScoreInputs {
        ScoreInputs {
            daily_usage,
            unlocks,
            focus_time,
        }
    }

    #[test]
    fn test_halfway_everywhere() {
        let score = compute_score(
            &inputs(Duration::hours(2), 25, Duration::hours(1)),
            &Goals::default(),
        )
        .unwrap();

        assert_eq!(*score.time_score, 50.);
        assert_eq!(*score.unlock_score, 50.);
        assert_eq!(*score.focus_score, 50.);
        assert_eq!(score.total, 50);
    }

    #[test]
    fn test_perfect_day() {
        let goals = Goals::default();
        let score = compute_score(&inputs(Duration::zero(), 0, goals.focus_goal), &goals).unwrap();

        assert_eq!(score.total, 100);
    }

    #[test]
    fn test_over_the_limit_clamps() {
        let goals = Goals::default();
        let score = compute_score(
            &inputs(goals.max_daily_time + Duration::hours(3), 500, Duration::hours(9)),
            &goals,
        )
        .unwrap();

        assert_eq!(*score.time_score, 0.);
        assert_eq!(*score.unlock_score, 0.);
        assert_eq!(*score.focus_score, 100.);
        assert_eq!(score.total, 33);

        let exact = compute_score(&inputs(goals.max_daily_time, 0, Duration::zero()), &goals)
            .unwrap();
        assert_eq!(*exact.time_score, 0.);
    }

    #[test]
    fn test_more_unlocks_never_help() {
        let goals = Goals::default();
        let mut previous = u8::MAX;
        for unlocks in 0..80 {
            let score = compute_score(
                &inputs(Duration::minutes(90), unlocks, Duration::minutes(40)),
                &goals,
            )
            .unwrap();
            assert!(score.total <= previous, "score grew at {unlocks} unlocks");
            previous = score.total;
        }
    }

    #[test]
    fn test_more_focus_never_hurts() {
        let goals = Goals::default();
        let mut previous = 0;
        for minutes in (0..200).step_by(7) {
            let score = compute_score(
                &inputs(Duration::minutes(90), 12, Duration::minutes(minutes)),
                &goals,
            )
            .unwrap();
            assert!(score.total >= previous, "score dropped at {minutes} minutes");
            previous = score.total;
        }
    }

    #[test]
    fn test_zero_goals_are_rejected() {
        let unlocks = Goals {
            max_unlocks: 0,
            ..Goals::default()
        };
        assert_eq!(
            compute_score(&inputs(Duration::zero(), 0, Duration::zero()), &unlocks),
            Err(ScoreError::InvalidGoal("maxUnlocks"))
        );
        assert_eq!(unlocks.validate(), Err(ScoreError::InvalidGoal("maxUnlocks")));

        let focus = Goals {
            focus_goal: Duration::zero(),
            ..Goals::default()
        };
        assert_eq!(focus.validate(), Err(ScoreError::InvalidGoal("focusGoal")));
        assert!(Goals::default().validate().is_ok());
    }
}
