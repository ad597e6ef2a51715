use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use ottobasket_core::{
    config::{self, CategoryMethod},
    output,
    projection::{self, MinutesBasis},
    stats,
    valuation::{self, sgp, ScoringFormat, ValuationError, ValuationRun},
};
use tracing::info;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ValueArg {
    /// Per-game stat table (CSV)
    #[arg(long, required_unless_present = "projections", conflicts_with = "projections")]
    stats: Option<PathBuf>,
    /// Per-100-possession projections (CSV), converted with --basis
    #[arg(long)]
    projections: Option<PathBuf>,
    /// Minutes basis for projections: current, full_strength or rest_of_season
    #[arg(long, default_value = "current")]
    basis: MinutesBasis,
    /// Scoring formats, comma separated, or "all"
    #[arg(long, default_value = "all")]
    format: String,
    /// Directory holding config/ and defaults/
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
    /// Output CSV path (stdout if omitted)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also write a JSON run summary
    #[arg(long)]
    summary: Option<PathBuf>,
}

/// Expand a format selector list into formats, in the order given.
fn parse_formats(selector: &str) -> Result<Vec<ScoringFormat>, ValuationError> {
    if selector.trim().eq_ignore_ascii_case("all") {
        return Ok(ScoringFormat::ALL.to_vec());
    }
    let mut formats = Vec::new();
    for part in selector.split(',') {
        let format: ScoringFormat = part.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

pub(crate) fn run(arg: &ValueArg) -> anyhow::Result<()> {
    let config = config::load_config(&arg.config_dir).context("failed to load configuration")?;
    info!(
        "config loaded: league={}, {} teams, ${} salary cap",
        config.league.name, config.league.num_teams, config.league.salary_cap
    );

    let formats = parse_formats(&arg.format).context("invalid --format")?;

    let lines = match (&arg.stats, &arg.projections) {
        (Some(path), _) => stats::load_stat_table(path)
            .with_context(|| format!("failed to load stat table {}", path.display()))?,
        (None, Some(path)) => {
            let projections = projection::load_projections(path)
                .with_context(|| format!("failed to load projections {}", path.display()))?;
            info!("converting projections on the {} basis", arg.basis.as_str());
            projection::to_stat_lines(&projections, arg.basis)
        }
        (None, None) => anyhow::bail!("one of --stats or --projections is required"),
    };
    info!("loaded {} players", lines.len());

    let needs_sgp = formats.contains(&ScoringFormat::Categories)
        && config.scoring.categories.method == CategoryMethod::Sgp;
    let bundle = match (&config.scoring.sgp, needs_sgp) {
        (Some(source), true) => Some(
            sgp::resolve_bundle(source, &arg.config_dir).context("failed to load SGP bundle")?,
        ),
        _ => None,
    };

    let runs = valuation::value_all_formats(
        &lines,
        &config.league,
        &config.scoring,
        bundle.as_ref(),
        &formats,
    )
    .context("valuation failed")?;

    match &arg.out {
        Some(path) => {
            output::write_valuations_file(path, &runs)?;
            info!("wrote valued table to {}", path.display());
        }
        None => output::write_valuations(std::io::stdout().lock(), &runs)
            .context("failed to write valued table")?,
    }

    if let Some(path) = &arg.summary {
        let summary = summary_json(&config.league.name, &runs);
        let text = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write summary {}", path.display()))?;
    }

    Ok(())
}

fn summary_json(league: &str, runs: &[ValuationRun]) -> serde_json::Value {
    let formats: Vec<serde_json::Value> = runs
        .iter()
        .map(|run| {
            let baselines: BTreeMap<String, f64> = run
                .baselines
                .iter()
                .map(|(g, v)| (g.to_string(), *v))
                .collect();
            let steps: Vec<serde_json::Value> = run
                .pool
                .steps
                .iter()
                .map(|step| {
                    serde_json::json!({
                        "label": step.label,
                        "quota": step.quota,
                        "players": step.player_ids,
                    })
                })
                .collect();
            serde_json::json!({
                "format": run.format.as_str(),
                "players": run.players.len(),
                "draftable": run.pool.draftable_count(),
                "above_replacement": run.auction.positive_count,
                "budget": run.auction.budget,
                "surplus_factor": run.auction.surplus_factor,
                "replacement_levels": baselines,
                "draft_steps": steps,
            })
        })
        .collect();
    serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "league": league,
        "formats": formats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ottobasket_core::{
        config::{DraftStep, LeagueConfig, ScoringConfig},
        roster::PositionGroup,
    };

    #[test]
    fn all_expands_to_every_format() {
        assert_eq!(parse_formats("all").unwrap(), ScoringFormat::ALL.to_vec());
    }

    #[test]
    fn list_keeps_order_and_drops_repeats() {
        assert_eq!(
            parse_formats("categories,simple_points,categories").unwrap(),
            vec![ScoringFormat::Categories, ScoringFormat::SimplePoints]
        );
    }

    #[test]
    fn unknown_selector_rejected() {
        assert!(parse_formats("simple_points,roto").is_err());
    }

    #[test]
    fn summary_lists_each_draft_step_selection() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../ottobasket-core/tests/fixtures/stats.csv");
        let lines = stats::load_stat_table(&path).unwrap();
        let league = LeagueConfig {
            name: "Summary League".into(),
            num_teams: 12,
            salary_cap: 400,
            roster_slots: 3,
            draft_steps: vec![
                DraftStep::new("C", &[PositionGroup::Center], 1),
                DraftStep::new("G", &[PositionGroup::Guard], 1),
                DraftStep::new("UTIL", &[], 1),
            ],
        };
        let runs = valuation::value_all_formats(
            &lines,
            &league,
            &ScoringConfig::default(),
            None,
            &[ScoringFormat::SimplePoints],
        )
        .unwrap();

        let summary = summary_json(&league.name, &runs);
        let steps = summary["formats"][0]["draft_steps"].as_array().unwrap();
        let labels: Vec<&str> = steps.iter().map(|s| s["label"].as_str().unwrap()).collect();
        assert_eq!(labels, ["C", "G", "UTIL"]);
        for step in steps {
            assert_eq!(step["quota"], 12);
            assert_eq!(step["players"].as_array().unwrap().len(), 12);
        }
        assert_eq!(summary["formats"][0]["draftable"], 36);
    }
}
