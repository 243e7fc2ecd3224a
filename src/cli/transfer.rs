use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::{
    daemon::storage::{kv_store::KeyValueStore, persistence::Persistence},
    utils::time::day_key,
};

pub fn default_export_name(date: NaiveDate) -> String {
    format!("focuswave-data-{}.json", day_key(date))
}

/// Command to process `export`. Writes tracking data and settings into a single JSON document and
/// returns where it was written.
pub fn export_data<S: KeyValueStore>(
    persistence: &Persistence<S>,
    output: Option<PathBuf>,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let document = persistence.export(now)?;
    let path = output.unwrap_or_else(|| PathBuf::from(default_export_name(now.date_naive())));

    let raw = serde_json::to_string_pretty(&document)?;
    std::fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Exported data to {}", path.display());
    Ok(path)
}

/// Command to process `import`. Nothing is written unless the whole file parses.
pub fn import_data<S: KeyValueStore>(
    persistence: &Persistence<S>,
    path: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let outcome = persistence.import(&raw)?;

    match (outcome.wellbeing, outcome.settings) {
        (false, false) => writeln!(out, "Nothing to import in {}", path.display())?,
        (wellbeing, settings) => {
            let parts = [(wellbeing, "tracking data"), (settings, "settings")]
                .into_iter()
                .filter_map(|(imported, name)| imported.then_some(name))
                .collect::<Vec<_>>();
            writeln!(out, "Imported {}", parts.join(" and "))?;
        }
    }
    Ok(())
}

/// Command to process `clear`. Deletes tracking data and settings.
pub fn clear_data<S: KeyValueStore>(
    persistence: &Persistence<S>,
    confirmed: bool,
    out: &mut impl Write,
) -> Result<()> {
    if !confirmed {
        bail!("This deletes all tracking data and settings. Run again with --yes to confirm");
    }
    persistence.clear();
    writeln!(out, "All tracking data and settings were deleted")?;
    Ok(())
}
