// Z-score category values with volume-weighted percentage categories.

use crate::config::CategoriesConfig;
use crate::stats::PlayerStatLine;
use crate::valuation::category::{Category, CategoryValue};
use crate::valuation::ValuationError;

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation for a single category across the player table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Compute mean and sample standard deviation (N-1 denominator).
///
/// Returns a zero stdev for fewer than two values; `compute_zscore` then
/// refuses to divide by it.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return PoolStats { mean, stdev: 0.0 };
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Compute a z-score, failing if the category has no spread.
pub fn compute_zscore(
    value: f64,
    stats: &PoolStats,
    category: Category,
) -> Result<f64, ValuationError> {
    if stats.stdev < STDEV_EPSILON {
        return Err(ValuationError::data(
            category.label(),
            "zero variance across the player table",
        ));
    }
    Ok((value - stats.mean) / stats.stdev)
}

/// Makes above what a league-average shooter would hit on the same attempts.
///
/// A 5-for-5 shooter and a 400-for-600 shooter both beat a 50% league, but by
/// 2.5 and 100 adjusted makes respectively.
pub fn adjusted_makes(makes: f64, attempts: f64, league_pct: f64) -> f64 {
    makes - league_pct * attempts
}

// ---------------------------------------------------------------------------
// Fitted model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct CategoryModel {
    category: Category,
    /// League shooting percentage, for percentage categories only.
    league_pct: Option<f64>,
    stats: PoolStats,
    counted: bool,
}

impl CategoryModel {
    fn raw_value(&self, line: &PlayerStatLine) -> f64 {
        match (self.league_pct, self.category.player_shots(line)) {
            (Some(pct), Some((makes, attempts))) => adjusted_makes(makes, attempts, pct),
            _ => self.category.player_total(line).unwrap_or(f64::NAN),
        }
    }
}

/// League means and deviations for every configured category.
#[derive(Debug, Clone)]
pub struct ZScoreModel {
    categories: Vec<CategoryModel>,
}

impl ZScoreModel {
    /// Fit the model against the whole player table.
    pub fn fit(
        lines: &[PlayerStatLine],
        config: &CategoriesConfig,
    ) -> Result<Self, ValuationError> {
        if lines.len() < 2 {
            return Err(ValuationError::data(
                "z-score",
                format!("need at least two players, found {}", lines.len()),
            ));
        }
        let n = lines.len() as f64;
        let mut categories = Vec::new();
        for category in config.computed() {
            let league_pct = if category.is_percentage() {
                let (makes, attempts) = lines
                    .iter()
                    .filter_map(|l| category.player_shots(l))
                    .fold((0.0, 0.0), |(m, a), (pm, pa)| (m + pm, a + pa));
                if attempts <= 0.0 {
                    return Err(ValuationError::data(
                        category.label(),
                        "no attempts across the player table",
                    ));
                }
                // mean(makes) / mean(attempts)
                Some((makes / n) / (attempts / n))
            } else {
                None
            };
            let mut model = CategoryModel {
                category,
                league_pct,
                stats: compute_pool_stats(&[]),
                counted: config.is_counted(category),
            };
            let values: Vec<f64> = lines.iter().map(|l| model.raw_value(l)).collect();
            model.stats = compute_pool_stats(&values);
            if model.stats.stdev < STDEV_EPSILON {
                return Err(ValuationError::data(
                    category.label(),
                    "zero variance across the player table",
                ));
            }
            categories.push(model);
        }
        Ok(ZScoreModel { categories })
    }

    /// Per-category z-scores for one player. Turnovers are negated so that
    /// higher is better in every category.
    pub fn score(&self, line: &PlayerStatLine) -> Result<Vec<CategoryValue>, ValuationError> {
        self.categories
            .iter()
            .map(|m| {
                let z = compute_zscore(m.raw_value(line), &m.stats, m.category)?;
                let value = if m.category.lower_is_better() { -z } else { z };
                Ok(CategoryValue {
                    category: m.category,
                    value,
                    counted: m.counted,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
