// Valuation engine: production values, scored positions, draft pool,
// replacement levels and auction dollars.

pub mod auction;
pub mod category;
pub mod draft_pool;
pub mod points;
pub mod position;
pub mod replacement;
pub mod sgp;
pub mod zscore;

use crate::config::{CategoryMethod, LeagueConfig, ScoringConfig};
use crate::roster::PositionGroup;
use crate::stats::PlayerStatLine;
use auction::AuctionValues;
use category::CategoryValue;
use draft_pool::DraftPool;
use rayon::prelude::*;
use replacement::ReplacementBaselines;
use sgp::SgpBundle;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};
use zscore::ZScoreModel;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Failures of a valuation run. Nothing is partially returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// League or scoring settings that cannot produce a valuation.
    #[error("configuration error for `{field}`: {message}")]
    Configuration { field: String, message: String },

    /// Input data that breaks a computation (zero variance, unfillable
    /// draft step, missing stats, ...).
    #[error("data error for {subject}: {message}")]
    Data { subject: String, message: String },
}

impl ValuationError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValuationError::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn data(subject: impl Into<String>, message: impl Into<String>) -> Self {
        ValuationError::Data {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoringFormat {
    SimplePoints,
    TraditionalPoints,
    Categories,
}

impl ScoringFormat {
    pub const ALL: [ScoringFormat; 3] = [
        ScoringFormat::SimplePoints,
        ScoringFormat::TraditionalPoints,
        ScoringFormat::Categories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringFormat::SimplePoints => "simple_points",
            ScoringFormat::TraditionalPoints => "trad_points",
            ScoringFormat::Categories => "categories",
        }
    }
}

impl fmt::Display for ScoringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringFormat {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple_points" => Ok(ScoringFormat::SimplePoints),
            "trad_points" => Ok(ScoringFormat::TraditionalPoints),
            "categories" => Ok(ScoringFormat::Categories),
            other => Err(ValuationError::config(
                "format",
                format!("unknown scoring format '{other}'"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A player with a production value and the position they are scored at.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPlayer {
    pub line: PlayerStatLine,
    pub production_value: f64,
    /// Per-category values; empty for points formats.
    pub breakdown: Vec<CategoryValue>,
    pub scored_position: PositionGroup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuedPlayer {
    pub scored: ScoredPlayer,
    pub draftable: bool,
    pub points_above_replacement: f64,
    pub dollar_value: f64,
}

/// Everything one format's run produced.
#[derive(Debug, Clone)]
pub struct ValuationRun {
    pub format: ScoringFormat,
    /// Sorted by dollar value, then production value, descending.
    pub players: Vec<ValuedPlayer>,
    pub pool: DraftPool,
    pub baselines: ReplacementBaselines,
    pub auction: AuctionValues,
}

// ---------------------------------------------------------------------------
// League checks
// ---------------------------------------------------------------------------

/// Check that league settings can produce a valuation.
pub fn check_league(league: &LeagueConfig) -> Result<(), ValuationError> {
    if league.num_teams == 0 {
        return Err(ValuationError::config("league.num_teams", "must be greater than 0"));
    }
    if league.salary_cap == 0 {
        return Err(ValuationError::config("league.salary_cap", "must be greater than 0"));
    }
    if league.roster_slots == 0 {
        return Err(ValuationError::config("league.roster_slots", "must be greater than 0"));
    }
    if league.draft_steps.is_empty() {
        return Err(ValuationError::config("league.draft_steps", "must list at least one step"));
    }
    if let Some(step) = league.draft_steps.iter().find(|s| s.slots == 0) {
        return Err(ValuationError::config(
            "league.draft_steps",
            format!("step {} has no slots", step.label),
        ));
    }
    let step_slots: usize = league.draft_steps.iter().map(|s| s.slots).sum();
    if step_slots != league.roster_slots {
        return Err(ValuationError::config(
            "league.draft_steps",
            format!(
                "step slots add up to {step_slots}, expected roster_slots = {}",
                league.roster_slots
            ),
        ));
    }
    if league.budget() < league.total_slots() as f64 {
        return Err(ValuationError::config(
            "league.salary_cap",
            format!(
                "league budget {} is less than $1 for each of {} roster spots",
                league.budget(),
                league.total_slots()
            ),
        ));
    }
    Ok(())
}

fn check_stat_lines(lines: &[PlayerStatLine]) -> Result<(), ValuationError> {
    if lines.is_empty() {
        return Err(ValuationError::data("stat table", "no players"));
    }
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if !seen.insert(line.id.as_str()) {
            return Err(ValuationError::data(
                &line.name,
                format!("duplicate player id '{}'", line.id),
            ));
        }
        if let Some(stat) = line.first_non_finite() {
            return Err(ValuationError::data(
                &line.name,
                format!("{stat} is missing or not finite"),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Production values
// ---------------------------------------------------------------------------

/// Production value and category breakdown for every line, index-aligned.
fn production_values(
    lines: &[PlayerStatLine],
    scoring: &ScoringConfig,
    sgp: Option<&SgpBundle>,
    format: ScoringFormat,
) -> Result<Vec<(f64, Vec<CategoryValue>)>, ValuationError> {
    match format {
        ScoringFormat::SimplePoints => Ok(lines
            .iter()
            .map(|l| (points::fantasy_points(l, &scoring.simple_points), Vec::new()))
            .collect()),
        ScoringFormat::TraditionalPoints => Ok(lines
            .iter()
            .map(|l| (points::fantasy_points(l, &scoring.traditional_points), Vec::new()))
            .collect()),
        ScoringFormat::Categories => {
            let cats = &scoring.categories;
            let breakdowns: Vec<Vec<CategoryValue>> = match cats.method {
                CategoryMethod::ZScore => {
                    let model = ZScoreModel::fit(lines, cats)?;
                    lines
                        .iter()
                        .map(|l| model.score(l))
                        .collect::<Result<_, _>>()?
                }
                CategoryMethod::Sgp => {
                    let bundle = sgp.ok_or_else(|| {
                        ValuationError::config(
                            "sgp",
                            "categories method is sgp but no bundle was given",
                        )
                    })?;
                    lines
                        .iter()
                        .map(|l| bundle.values(l, cats))
                        .collect::<Result<_, _>>()?
                }
            };
            Ok(breakdowns
                .into_iter()
                .map(|b| (category::total(&b), b))
                .collect())
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Value every player for one scoring format.
///
/// `sgp` is only consulted for categories runs using the SGP method.
pub fn value_players(
    lines: &[PlayerStatLine],
    league: &LeagueConfig,
    scoring: &ScoringConfig,
    sgp: Option<&SgpBundle>,
    format: ScoringFormat,
) -> Result<ValuationRun, ValuationError> {
    check_league(league)?;
    check_stat_lines(lines)?;

    let production = production_values(lines, scoring, sgp, format)?;
    if let Some((line, (value, _))) = lines
        .iter()
        .zip(&production)
        .find(|(_, (v, _))| !v.is_finite())
    {
        return Err(ValuationError::data(
            &line.name,
            format!("{format} production value is {value}"),
        ));
    }

    let values: Vec<f64> = production.iter().map(|(v, _)| *v).collect();
    let positions = position::assign_positions(lines, &values)?;

    let scored: Vec<ScoredPlayer> = lines
        .iter()
        .zip(production)
        .zip(positions)
        .map(|((line, (production_value, breakdown)), scored_position)| ScoredPlayer {
            line: line.clone(),
            production_value,
            breakdown,
            scored_position,
        })
        .collect();

    let pool = draft_pool::select_draft_pool(&scored, league)?;
    let baselines = replacement::replacement_levels(&scored, &pool)?;
    debug!("{format} replacement levels: {:?}", baselines);

    let surpluses: Vec<f64> = scored
        .iter()
        .map(|p| replacement::points_above_replacement(p, &baselines))
        .collect::<Result<_, _>>()?;
    let auction = auction::compute_auction_values(&surpluses, league.budget())?;

    let mut players: Vec<ValuedPlayer> = scored
        .into_iter()
        .zip(surpluses)
        .map(|(scored, par)| ValuedPlayer {
            draftable: pool.is_draftable(&scored.line.id),
            points_above_replacement: par,
            dollar_value: auction::player_dollar_value(par, &auction),
            scored,
        })
        .collect();
    players.sort_by(|a, b| {
        b.dollar_value
            .partial_cmp(&a.dollar_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.scored
                    .production_value
                    .partial_cmp(&a.scored.production_value)
                    .unwrap_or(Ordering::Equal)
            })
    });

    info!(
        "valued {} players for {}: {} draftable, {} above replacement, surplus factor {:.4}",
        players.len(),
        format,
        pool.draftable_count(),
        auction.positive_count,
        auction.surplus_factor
    );

    Ok(ValuationRun {
        format,
        players,
        pool,
        baselines,
        auction,
    })
}

/// Value every player for several formats in parallel, one run per format in
/// the order given.
pub fn value_all_formats(
    lines: &[PlayerStatLine],
    league: &LeagueConfig,
    scoring: &ScoringConfig,
    sgp: Option<&SgpBundle>,
    formats: &[ScoringFormat],
) -> Result<Vec<ValuationRun>, ValuationError> {
    formats
        .par_iter()
        .map(|&format| value_players(lines, league, scoring, sgp, format))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
