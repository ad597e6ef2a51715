use std::path::PathBuf;

use anyhow::Context;
use ottobasket_core::{config, stats, valuation::sgp::SgpBundle};
use tracing::info;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SgpArg {
    /// Standings CSV, one per league; bundles are averaged across leagues
    #[arg(long, required = true, num_args = 1..)]
    standings: Vec<PathBuf>,
    /// Output JSON path
    #[arg(long)]
    out: PathBuf,
    /// Directory holding config/ and defaults/
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

pub(crate) fn run(arg: &SgpArg) -> anyhow::Result<()> {
    let config = config::load_config(&arg.config_dir).context("failed to load configuration")?;
    let categories = config.scoring.categories.computed();

    let mut bundles = Vec::with_capacity(arg.standings.len());
    for path in &arg.standings {
        let teams = stats::load_standings(path)
            .with_context(|| format!("failed to load standings {}", path.display()))?;
        let bundle = SgpBundle::from_standings(&teams, &categories, config.league.roster_slots)
            .with_context(|| format!("failed to fit SGP from {}", path.display()))?;
        info!("fitted {} ({} teams)", path.display(), teams.len());
        bundles.push(bundle);
    }

    let bundle = SgpBundle::mean(&bundles).context("no standings given")?;
    let text = serde_json::to_string_pretty(&bundle)?;
    std::fs::write(&arg.out, text)
        .with_context(|| format!("failed to write {}", arg.out.display()))?;
    info!(
        "wrote SGP bundle for {} categories to {}",
        bundle.slopes.len(),
        arg.out.display()
    );
    Ok(())
}
