// Standings-gain-points (SGP) category values.
//
// A slope says how much of a category moves a team one place in the
// standings; a player's SGP in that category is their per-game contribution
// divided by the slope. Percentage categories are valued by dropping the
// player into an otherwise average roster and measuring the change in team
// percentage.

use crate::config::{CategoriesConfig, SgpSource};
use crate::stats::{PlayerStatLine, TeamTotals};
use crate::valuation::category::{Category, CategoryValue};
use crate::valuation::ValuationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Bundle types
// ---------------------------------------------------------------------------

/// Average-roster baseline for a percentage category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBaseline {
    /// Makes of an average roster with one slot left open.
    pub team_minus_one_makes: f64,
    pub team_minus_one_attempts: f64,
    /// League-wide makes / attempts.
    pub league_pct: f64,
}

/// Per-category slopes and ratio baselines fitted from league standings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SgpBundle {
    /// Category total per standings place. Turnovers carry a negative slope.
    pub slopes: BTreeMap<Category, f64>,
    #[serde(default)]
    pub ratios: BTreeMap<Category, RatioBaseline>,
}

#[derive(Debug, Error)]
pub enum SgpBundleError {
    #[error("failed to read SGP bundle {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse SGP bundle {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Slope fitting
// ---------------------------------------------------------------------------

/// Least-squares slope of `values` against the ranks 1..=N.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let mean_x = (n + 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = (i + 1) as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    num / den
}

/// Fit the slope for one category from a league's standings.
fn fit_slope(teams: &[TeamTotals], category: Category) -> Result<f64, ValuationError> {
    let mut values: Vec<f64> = teams.iter().map(|t| category.team_value(t)).collect();
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(ValuationError::data(
            category.label(),
            format!("standings value for team '{}' is not finite", teams[pos].team),
        ));
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let slope = linear_slope(&values);
    Ok(if category.lower_is_better() { -slope } else { slope })
}

fn fit_ratio(
    teams: &[TeamTotals],
    category: Category,
    roster_slots: usize,
) -> Result<Option<RatioBaseline>, ValuationError> {
    if !category.is_percentage() {
        return Ok(None);
    }
    let (makes, attempts) = teams
        .iter()
        .filter_map(|t| category.team_shots(t))
        .fold((0.0, 0.0), |(m, a), (tm, ta)| (m + tm, a + ta));
    if attempts <= 0.0 {
        return Err(ValuationError::data(
            category.label(),
            "no attempts in the standings",
        ));
    }
    let rostered = (teams.len() * roster_slots) as f64;
    let open = roster_slots.saturating_sub(1) as f64;
    Ok(Some(RatioBaseline {
        team_minus_one_makes: open * makes / rostered,
        team_minus_one_attempts: open * attempts / rostered,
        league_pct: makes / attempts,
    }))
}

impl SgpBundle {
    /// Fit a bundle from one league's end-of-season standings.
    pub fn from_standings(
        teams: &[TeamTotals],
        categories: &[Category],
        roster_slots: usize,
    ) -> Result<Self, ValuationError> {
        if teams.len() < 2 {
            return Err(ValuationError::data(
                "standings",
                format!("need at least two teams, found {}", teams.len()),
            ));
        }
        if roster_slots == 0 {
            return Err(ValuationError::config("league.roster_slots", "must be greater than 0"));
        }
        let mut bundle = SgpBundle::default();
        for &category in categories {
            bundle.slopes.insert(category, fit_slope(teams, category)?);
            if let Some(ratio) = fit_ratio(teams, category, roster_slots)? {
                bundle.ratios.insert(category, ratio);
            }
        }
        debug!("fitted SGP slopes from {} teams: {:?}", teams.len(), bundle.slopes);
        Ok(bundle)
    }

    /// Average several leagues' bundles entry by entry. Entries missing from
    /// a bundle do not count toward that entry's average.
    pub fn mean(bundles: &[SgpBundle]) -> Option<SgpBundle> {
        if bundles.is_empty() {
            return None;
        }
        let mut slopes: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
        let mut ratios: BTreeMap<Category, (RatioBaseline, usize)> = BTreeMap::new();
        for bundle in bundles {
            for (&c, &s) in &bundle.slopes {
                let entry = slopes.entry(c).or_insert((0.0, 0));
                entry.0 += s;
                entry.1 += 1;
            }
            for (&c, r) in &bundle.ratios {
                let entry = ratios.entry(c).or_insert((
                    RatioBaseline {
                        team_minus_one_makes: 0.0,
                        team_minus_one_attempts: 0.0,
                        league_pct: 0.0,
                    },
                    0,
                ));
                entry.0.team_minus_one_makes += r.team_minus_one_makes;
                entry.0.team_minus_one_attempts += r.team_minus_one_attempts;
                entry.0.league_pct += r.league_pct;
                entry.1 += 1;
            }
        }
        Some(SgpBundle {
            slopes: slopes
                .into_iter()
                .map(|(c, (sum, n))| (c, sum / n as f64))
                .collect(),
            ratios: ratios
                .into_iter()
                .map(|(c, (sum, n))| {
                    let n = n as f64;
                    (
                        c,
                        RatioBaseline {
                            team_minus_one_makes: sum.team_minus_one_makes / n,
                            team_minus_one_attempts: sum.team_minus_one_attempts / n,
                            league_pct: sum.league_pct / n,
                        },
                    )
                })
                .collect(),
        })
    }

    /// Blend a prior-season bundle into the current one, weighting the prior
    /// by the share of the season still to play. Entries present in only one
    /// bundle are taken from it unchanged.
    pub fn blend(
        prior: &SgpBundle,
        current: &SgpBundle,
        current_week: u32,
        total_weeks: u32,
    ) -> SgpBundle {
        let total = total_weeks.max(1) as f64;
        let w_current = (current_week.min(total_weeks) as f64) / total;
        let w_prior = 1.0 - w_current;
        let mix = |p: f64, c: f64| w_prior * p + w_current * c;

        let mut slopes = prior.slopes.clone();
        for (&c, &cur) in &current.slopes {
            let blended = match prior.slopes.get(&c) {
                Some(&p) => mix(p, cur),
                None => cur,
            };
            slopes.insert(c, blended);
        }

        let mut ratios = prior.ratios.clone();
        for (&c, cur) in &current.ratios {
            let blended = match prior.ratios.get(&c) {
                Some(p) => RatioBaseline {
                    team_minus_one_makes: mix(p.team_minus_one_makes, cur.team_minus_one_makes),
                    team_minus_one_attempts: mix(
                        p.team_minus_one_attempts,
                        cur.team_minus_one_attempts,
                    ),
                    league_pct: mix(p.league_pct, cur.league_pct),
                },
                None => *cur,
            };
            ratios.insert(c, blended);
        }

        SgpBundle { slopes, ratios }
    }

    fn slope(&self, category: Category) -> Result<f64, ValuationError> {
        let slope = *self.slopes.get(&category).ok_or_else(|| {
            ValuationError::data(category.label(), "no SGP slope in bundle")
        })?;
        if slope == 0.0 || !slope.is_finite() {
            return Err(ValuationError::data(
                category.label(),
                format!("unusable SGP slope {slope}"),
            ));
        }
        Ok(slope)
    }

    /// Per-category SGP values for one player.
    pub fn values(
        &self,
        line: &PlayerStatLine,
        config: &CategoriesConfig,
    ) -> Result<Vec<CategoryValue>, ValuationError> {
        config
            .computed()
            .into_iter()
            .map(|category| {
                let slope = self.slope(category)?;
                let value = match category.player_shots(line) {
                    Some((makes, attempts)) => {
                        let ratio = self.ratios.get(&category).ok_or_else(|| {
                            ValuationError::data(category.label(), "no ratio baseline in bundle")
                        })?;
                        let team_attempts = ratio.team_minus_one_attempts + attempts;
                        if team_attempts == 0.0 {
                            return Err(ValuationError::data(
                                category.label(),
                                format!("zero team attempts with player '{}'", line.name),
                            ));
                        }
                        let team_pct = (ratio.team_minus_one_makes + makes) / team_attempts;
                        (team_pct - ratio.league_pct) / slope
                    }
                    None => category.player_total(line).unwrap_or(f64::NAN) / slope,
                };
                Ok(CategoryValue {
                    category,
                    value,
                    counted: config.is_counted(category),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Read a bundle from a JSON file.
pub fn load_bundle(path: &Path) -> Result<SgpBundle, SgpBundleError> {
    let text = std::fs::read_to_string(path).map_err(|e| SgpBundleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| SgpBundleError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the bundle(s) named by an `[sgp]` config section, relative to
/// `base_dir`, and blend in the prior season when one is given.
pub fn resolve_bundle(source: &SgpSource, base_dir: &Path) -> Result<SgpBundle, SgpBundleError> {
    let current = load_bundle(&base_dir.join(&source.current))?;
    let Some(prior_path) = &source.prior else {
        return Ok(current);
    };
    let prior = load_bundle(&base_dir.join(prior_path))?;
    info!(
        "blending SGP bundles at week {}/{}",
        source.current_week, source.total_weeks
    );
    Ok(SgpBundle::blend(
        &prior,
        &current,
        source.current_week,
        source.total_weeks,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryMethod;
    use crate::roster::{PositionGroup, PositionSet};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn team(name: &str, points: f64, turnovers: f64, fgm: f64, fga: f64) -> TeamTotals {
        TeamTotals {
            team: name.into(),
            points,
            rebounds: 0.0,
            assists: 0.0,
            steals: 0.0,
            blocks: 0.0,
            turnovers,
            fgm,
            fga,
            ftm: 0.0,
            fta: 0.0,
            fg3m: 0.0,
            fg3a: 0.0,
        }
    }

    fn standings() -> Vec<TeamTotals> {
        vec![
            team("A", 300.0, 30.0, 450.0, 1000.0),
            team("B", 100.0, 10.0, 500.0, 1000.0),
            team("C", 200.0, 20.0, 550.0, 1000.0),
        ]
    }

    fn config(categories: &[Category]) -> CategoriesConfig {
        CategoriesConfig {
            method: CategoryMethod::Sgp,
            categories: categories.to_vec(),
            exclude: Vec::new(),
            variant: None,
        }
    }

    fn player(points: f64, turnovers: f64, fgm: f64, fga: f64) -> PlayerStatLine {
        PlayerStatLine {
            id: "p".into(),
            name: "Player".into(),
            positions: PositionSet::from_groups(&[PositionGroup::Forward]),
            minutes: 30.0,
            points,
            rebounds: 0.0,
            assists: 0.0,
            steals: 0.0,
            blocks: 0.0,
            turnovers,
            fgm,
            fga,
            ftm: 0.0,
            fta: 0.0,
            fg3m: 0.0,
            fg3a: 0.0,
        }
    }

    #[test]
    fn slope_of_evenly_spaced_values() {
        assert!(approx_eq(linear_slope(&[100.0, 200.0, 300.0]), 100.0, 1e-9));
        assert!(approx_eq(linear_slope(&[5.0, 5.0, 5.0, 5.0]), 0.0, 1e-12));
        assert_eq!(linear_slope(&[1.0]), 0.0);
    }

    #[test]
    fn turnover_slope_is_negative() {
        let bundle =
            SgpBundle::from_standings(&standings(), &[Category::Points, Category::Turnovers], 10)
                .unwrap();
        assert!(approx_eq(bundle.slopes[&Category::Points], 100.0, 1e-9));
        assert!(approx_eq(bundle.slopes[&Category::Turnovers], -10.0, 1e-9));
    }

    #[test]
    fn ratio_baseline_uses_average_roster() {
        let bundle =
            SgpBundle::from_standings(&standings(), &[Category::FieldGoalPct], 10).unwrap();
        let ratio = bundle.ratios[&Category::FieldGoalPct];
        // 1500 makes over 30 rostered players -> 50 per player, 9 open slots.
        assert!(approx_eq(ratio.team_minus_one_makes, 450.0, 1e-9));
        assert!(approx_eq(ratio.team_minus_one_attempts, 900.0, 1e-9));
        assert!(approx_eq(ratio.league_pct, 0.5, 1e-12));
        assert!(approx_eq(bundle.slopes[&Category::FieldGoalPct], 0.05, 1e-12));
    }

    #[test]
    fn counting_and_percentage_values() {
        let bundle = SgpBundle::from_standings(
            &standings(),
            &[Category::Points, Category::Turnovers, Category::FieldGoalPct],
            10,
        )
        .unwrap();
        let cfg = config(&[Category::Points, Category::Turnovers, Category::FieldGoalPct]);
        let values = bundle.values(&player(20.0, 2.0, 60.0, 100.0), &cfg).unwrap();

        assert!(approx_eq(values[0].value, 0.2, 1e-12));
        assert!(approx_eq(values[1].value, -0.2, 1e-12));
        // (450 + 60) / (900 + 100) = 0.51 -> 0.01 above league / 0.05 slope
        assert!(approx_eq(values[2].value, 0.2, 1e-9));
    }

    #[test]
    fn zero_slope_is_error() {
        let flat = vec![
            team("A", 100.0, 10.0, 500.0, 1000.0),
            team("B", 100.0, 20.0, 500.0, 1000.0),
        ];
        let bundle = SgpBundle::from_standings(&flat, &[Category::Points], 10).unwrap();
        let err = bundle
            .values(&player(10.0, 1.0, 1.0, 2.0), &config(&[Category::Points]))
            .unwrap_err();
        assert!(err.to_string().contains("PTS"));
    }

    #[test]
    fn missing_category_is_error() {
        let bundle = SgpBundle::from_standings(&standings(), &[Category::Points], 10).unwrap();
        let err = bundle
            .values(&player(10.0, 1.0, 1.0, 2.0), &config(&[Category::Blocks]))
            .unwrap_err();
        match err {
            ValuationError::Data { subject, .. } => assert_eq!(subject, "BLK"),
            other => panic!("expected Data error, got {other:?}"),
        }
    }

    #[test]
    fn zero_team_attempts_is_error() {
        let mut bundle = SgpBundle::default();
        bundle.slopes.insert(Category::FreeThrowPct, 0.01);
        bundle.ratios.insert(
            Category::FreeThrowPct,
            RatioBaseline {
                team_minus_one_makes: 0.0,
                team_minus_one_attempts: 0.0,
                league_pct: 0.75,
            },
        );
        let err = bundle
            .values(&player(10.0, 1.0, 1.0, 2.0), &config(&[Category::FreeThrowPct]))
            .unwrap_err();
        assert!(err.to_string().contains("FT%"));
    }

    #[test]
    fn standings_without_attempts_rejected() {
        let err = SgpBundle::from_standings(&standings(), &[Category::FreeThrowPct], 10)
            .unwrap_err();
        assert!(err.to_string().contains("FT%"));
    }

    #[test]
    fn mean_averages_per_entry() {
        let mut a = SgpBundle::default();
        a.slopes.insert(Category::Points, 100.0);
        a.slopes.insert(Category::Blocks, 4.0);
        let mut b = SgpBundle::default();
        b.slopes.insert(Category::Points, 200.0);

        let mean = SgpBundle::mean(&[a, b]).unwrap();
        assert!(approx_eq(mean.slopes[&Category::Points], 150.0, 1e-12));
        assert!(approx_eq(mean.slopes[&Category::Blocks], 4.0, 1e-12));
        assert!(SgpBundle::mean(&[]).is_none());
    }

    #[test]
    fn blend_weights_prior_by_remaining_season() {
        let mut prior = SgpBundle::default();
        prior.slopes.insert(Category::Points, 100.0);
        let mut current = SgpBundle::default();
        current.slopes.insert(Category::Points, 200.0);
        current.slopes.insert(Category::Steals, 3.0);

        let opening = SgpBundle::blend(&prior, &current, 0, 22);
        assert!(approx_eq(opening.slopes[&Category::Points], 100.0, 1e-12));

        let midseason = SgpBundle::blend(&prior, &current, 11, 22);
        assert!(approx_eq(midseason.slopes[&Category::Points], 150.0, 1e-12));
        assert!(approx_eq(midseason.slopes[&Category::Steals], 3.0, 1e-12));

        let finale = SgpBundle::blend(&prior, &current, 22, 22);
        assert!(approx_eq(finale.slopes[&Category::Points], 200.0, 1e-12));
    }

    #[test]
    fn bundle_json_uses_category_labels() {
        let bundle =
            SgpBundle::from_standings(&standings(), &[Category::FieldGoalPct], 10).unwrap();
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"FG%\""));
        let back: SgpBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn load_bundle_missing_file() {
        let err = load_bundle(Path::new("/nonexistent/sgp.json")).unwrap_err();
        assert!(matches!(err, SgpBundleError::Io { .. }));
    }
}
