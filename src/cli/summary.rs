use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use crate::{
    daemon::{
        processing::tracker::{summarize, LiveState, WellbeingSummary},
        storage::{entities::TrackingDataEntity, kv_store::KeyValueStore, persistence::Persistence},
    },
    utils::time::format_duration,
};

/// Stored tracking data with the limits from settings applied, the same way the service applies
/// them on start.
pub fn load_effective_data<S: KeyValueStore>(persistence: &Persistence<S>) -> TrackingDataEntity {
    let mut data = persistence.load();
    if persistence.has_settings() {
        let goals = data.goals.with_settings(&persistence.load_settings());
        if goals.validate().is_ok() {
            data.goals = goals;
        }
    }
    if data.goals.validate().is_err() {
        data.goals = Default::default();
    }
    data
}

/// Command to process `summary`. Works on stored data only; a running service saves every few
/// seconds, so the numbers lag behind by at most that much.
pub fn print_summary<S: KeyValueStore>(
    persistence: &Persistence<S>,
    json: bool,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let data = load_effective_data(persistence);
    let summary = summarize(&data, LiveState::stored(), now)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    print_text(&summary, &data, now, out)
}

fn print_text(
    summary: &WellbeingSummary,
    data: &TrackingDataEntity,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let goals = &data.goals;
    writeln!(out, "Today ({})", now.date_naive())?;
    writeln!(
        out,
        "  Screen time      {} of {}",
        format_duration(summary.daily_time),
        format_duration(goals.max_daily_time)
    )?;
    writeln!(
        out,
        "  Focus time       {} of {}",
        format_duration(summary.focus_time),
        format_duration(goals.focus_goal)
    )?;
    writeln!(out, "  Unlocks          {} of {}*", summary.unlocks, goals.max_unlocks)?;
    writeln!(out, "  Notifications    {}*", summary.notifications)?;
    writeln!(out, "  Wellbeing score  {}", summary.wellbeing_score)?;
    writeln!(out)?;
    writeln!(out, "All time")?;
    writeln!(out, "  Focus sessions   {}", summary.focus_sessions)?;
    writeln!(
        out,
        "  Focus time       {}",
        format_duration(summary.total_focus_time)
    )?;
    writeln!(out, "  Unlocks          {}*", summary.total_unlocks)?;
    writeln!(out, "  Notifications    {}*", summary.total_notifications)?;
    writeln!(out, "  Clicks           {}", summary.click_count)?;
    writeln!(out, "  Page views       {}", summary.page_views)?;
    if !summary.screens.is_empty() {
        let screens = summary
            .screens
            .iter()
            .map(|(name, views)| format!("{name} {views}"))
            .collect::<Vec<_>>();
        writeln!(out, "  Screens          {}", screens.join(", "))?;
    }
    if let Some(last) = summary.last_activity {
        writeln!(
            out,
            "  Last activity    {}",
            last.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "* Unlocks and notifications are simulated unless the service runs with --no-simulation"
    )?;
    Ok(())
}
