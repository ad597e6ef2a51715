// Valued-table CSV output.

use crate::valuation::category::Category;
use crate::valuation::ValuationRun;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write CSV to {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

const BASE_COLUMNS: [&str; 9] = [
    "player_id",
    "player",
    "position",
    "format",
    "production_value",
    "scored_position",
    "draftable",
    "points_above_replacement",
    "dollar_value",
];

/// Categories appearing in any run's breakdowns, in category order.
fn breakdown_columns(runs: &[ValuationRun]) -> Vec<Category> {
    let set: BTreeSet<Category> = runs
        .iter()
        .flat_map(|r| r.players.iter())
        .flat_map(|p| p.scored.breakdown.iter().map(|c| c.category))
        .collect();
    set.into_iter().collect()
}

/// Write every run's players as one table. Rows without a value for a
/// `cat_*` column (points formats) leave it empty.
pub fn write_valuations<W: Write>(wtr: W, runs: &[ValuationRun]) -> Result<(), csv::Error> {
    let categories = breakdown_columns(runs);
    let mut writer = csv::Writer::from_writer(wtr);

    let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(categories.iter().map(|c| format!("cat_{}", c.label())));
    writer.write_record(&header)?;

    for run in runs {
        for p in &run.players {
            let mut record = vec![
                p.scored.line.id.clone(),
                p.scored.line.name.clone(),
                p.scored.line.positions.to_string(),
                run.format.as_str().to_string(),
                format!("{:.4}", p.scored.production_value),
                p.scored.scored_position.to_string(),
                p.draftable.to_string(),
                format!("{:.4}", p.points_above_replacement),
                format!("{:.1}", p.dollar_value),
            ];
            for category in &categories {
                let cell = p
                    .scored
                    .breakdown
                    .iter()
                    .find(|c| c.category == *category)
                    .map(|c| format!("{:.4}", c.value))
                    .unwrap_or_default();
                record.push(cell);
            }
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write the valued table to a file, replacing it if present.
pub fn write_valuations_file(path: &Path, runs: &[ValuationRun]) -> Result<(), OutputError> {
    let file = std::fs::File::create(path).map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_valuations(file, runs).map_err(|e| OutputError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}
