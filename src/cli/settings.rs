use std::io::Write;

use anyhow::Result;
use chrono::Duration;
use clap::{value_parser, Subcommand};
use tracing::info;

use crate::{
    daemon::{
        processing::score::Goals,
        storage::{entities::SettingsEntity, kv_store::KeyValueStore, persistence::Persistence},
    },
    utils::time::format_duration,
};

use super::summary::load_effective_data;

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    #[command(about = "Print current settings")]
    Show,
    #[command(about = "Change settings. Only the given values are changed")]
    Set(SettingsPatch),
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct SettingsPatch {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, value_parser = value_parser!(u32).range(1..), help = "Daily screen time limit in hours")]
    pub max_daily_hours: Option<u32>,
    #[arg(long, value_parser = value_parser!(u32).range(1..), help = "Daily unlock limit")]
    pub max_unlocks: Option<u32>,
    #[arg(long, help = "Send alerts when a daily limit is exceeded")]
    pub limit_alerts: Option<bool>,
    #[arg(long, help = "Send a reminder to take a break during long focus sessions")]
    pub break_reminders: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum GoalsCommand {
    #[command(about = "Print the goals the wellbeing score is measured against")]
    Show,
    #[command(about = "Change goals. Only the given values are changed")]
    Set(GoalsPatch),
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct GoalsPatch {
    #[arg(long, value_parser = value_parser!(u32).range(1..), help = "Daily screen time limit in hours")]
    pub max_daily_hours: Option<u32>,
    #[arg(long, value_parser = value_parser!(u32).range(1..), help = "Daily unlock limit")]
    pub max_unlocks: Option<u32>,
    #[arg(long, value_parser = value_parser!(u32).range(1..), help = "Daily focus goal in minutes")]
    pub focus_goal_minutes: Option<u32>,
}

/// Command to process `settings`. Limits in settings are mirrored into the stored goals so the
/// score and the alerts pick them up.
pub fn process_settings_command<S: KeyValueStore>(
    persistence: &Persistence<S>,
    command: SettingsCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        SettingsCommand::Show => print_settings(&persistence.load_settings(), out),
        SettingsCommand::Set(patch) => {
            let mut settings = persistence.load_settings();
            if let Some(name) = patch.name {
                settings.name = name;
            }
            if let Some(email) = patch.email {
                settings.email = email;
            }
            if let Some(hours) = patch.max_daily_hours {
                settings.max_daily_time = hours;
            }
            if let Some(unlocks) = patch.max_unlocks {
                settings.max_unlocks = unlocks;
            }
            if let Some(limit_alerts) = patch.limit_alerts {
                settings.limit_alerts = limit_alerts;
            }
            if let Some(break_reminders) = patch.break_reminders {
                settings.break_reminders = break_reminders;
            }

            let mut data = load_effective_data(persistence);
            data.goals = data.goals.with_settings(&settings);
            data.goals.validate()?;

            persistence.save_settings(&settings)?;
            persistence.save(&data);
            info!("Settings updated");
            print_settings(&settings, out)
        }
    }
}

/// Command to process `goals`. When settings exist, the limits they carry are updated too,
/// otherwise they would override the new goals on the next start.
pub fn process_goals_command<S: KeyValueStore>(
    persistence: &Persistence<S>,
    command: GoalsCommand,
    out: &mut impl Write,
) -> Result<()> {
    let mut data = load_effective_data(persistence);
    match command {
        GoalsCommand::Show => print_goals(&data.goals, out),
        GoalsCommand::Set(patch) => {
            let mut goals = data.goals.clone();
            if let Some(hours) = patch.max_daily_hours {
                goals.max_daily_time = Duration::hours(hours as i64);
            }
            if let Some(unlocks) = patch.max_unlocks {
                goals.max_unlocks = unlocks;
            }
            if let Some(minutes) = patch.focus_goal_minutes {
                goals.focus_goal = Duration::minutes(minutes as i64);
            }
            goals.validate()?;

            if persistence.has_settings() {
                let mut settings = persistence.load_settings();
                if let Some(hours) = patch.max_daily_hours {
                    settings.max_daily_time = hours;
                }
                if let Some(unlocks) = patch.max_unlocks {
                    settings.max_unlocks = unlocks;
                }
                persistence.save_settings(&settings)?;
            }
            data.goals = goals;
            persistence.save(&data);
            info!("Goals updated to {:?}", data.goals);
            print_goals(&data.goals, out)
        }
    }
}

fn print_settings(settings: &SettingsEntity, out: &mut impl Write) -> Result<()> {
    let on_off = |v: bool| if v { "on" } else { "off" };
    writeln!(out, "Name               {}", settings.name)?;
    writeln!(out, "Email              {}", settings.email)?;
    writeln!(out, "Daily time limit   {}h", settings.max_daily_time)?;
    writeln!(out, "Unlock limit       {}", settings.max_unlocks)?;
    writeln!(out, "Limit alerts       {}", on_off(settings.limit_alerts))?;
    writeln!(out, "Break reminders    {}", on_off(settings.break_reminders))?;
    Ok(())
}

fn print_goals(goals: &Goals, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Daily time limit   {}", format_duration(goals.max_daily_time))?;
    writeln!(out, "Unlock limit       {}", goals.max_unlocks)?;
    writeln!(out, "Focus goal         {}", format_duration(goals.focus_goal))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::Duration;

    use crate::daemon::storage::{
        entities::{SettingsEntity, TrackingDataEntity},
        kv_store::MemoryStore,
        persistence::Persistence,
    };

    use super::{
        process_goals_command, process_settings_command, GoalsCommand, GoalsPatch,
        SettingsCommand, SettingsPatch,
    };

    #[test]
    fn test_settings_set_patches_settings_and_goals() -> Result<()> {
        let persistence = Persistence::new(MemoryStore::new());
        let mut out = vec![];

        process_settings_command(
            &persistence,
            SettingsCommand::Set(SettingsPatch {
                name: Some("Ada".into()),
                max_unlocks: Some(20),
                break_reminders: Some(false),
                ..SettingsPatch::default()
            }),
            &mut out,
        )?;

        let settings = persistence.load_settings();
        assert_eq!(
            settings,
            SettingsEntity {
                name: "Ada".into(),
                max_unlocks: 20,
                break_reminders: false,
                ..SettingsEntity::default()
            }
        );
        let goals = persistence.load().goals;
        assert_eq!(goals.max_unlocks, 20);
        assert_eq!(goals.max_daily_time, Duration::hours(4));
        assert!(String::from_utf8(out)?.contains("Break reminders    off"));
        Ok(())
    }

    #[test]
    fn test_goals_set_keeps_settings_in_sync() -> Result<()> {
        let persistence = Persistence::new(MemoryStore::new());
        persistence.save_settings(&SettingsEntity::default())?;
        let mut data = TrackingDataEntity::default();
        data.click_count = 3;
        persistence.save(&data);

        let mut out = vec![];
        process_goals_command(
            &persistence,
            GoalsCommand::Set(GoalsPatch {
                max_daily_hours: Some(2),
                focus_goal_minutes: Some(45),
                ..GoalsPatch::default()
            }),
            &mut out,
        )?;

        let stored = persistence.load();
        assert_eq!(stored.goals.max_daily_time, Duration::hours(2));
        assert_eq!(stored.goals.focus_goal, Duration::minutes(45));
        assert_eq!(stored.goals.max_unlocks, 50);
        assert_eq!(stored.click_count, 3);
        assert_eq!(persistence.load_settings().max_daily_time, 2);
        assert_eq!(
            String::from_utf8(out)?,
            "Daily time limit   2h 0m\nUnlock limit       50\nFocus goal         45m\n"
        );
        Ok(())
    }

    #[test]
    fn test_goals_set_without_settings_does_not_create_them() -> Result<()> {
        let persistence = Persistence::new(MemoryStore::new());
        process_goals_command(
            &persistence,
            GoalsCommand::Set(GoalsPatch {
                max_unlocks: Some(10),
                ..GoalsPatch::default()
            }),
            &mut Vec::<u8>::new(),
        )?;

        assert!(!persistence.has_settings());
        assert_eq!(persistence.load().goals.max_unlocks, 10);
        Ok(())
    }
}
