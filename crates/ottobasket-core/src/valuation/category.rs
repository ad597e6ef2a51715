// Head-to-head scoring categories.

use crate::stats::{PlayerStatLine, TeamTotals};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A categories-league scoring category.
///
/// Counting categories are summed per game; percentage categories are
/// valued through makes and attempts so volume is weighed with efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "PTS")]
    Points,
    #[serde(rename = "REB")]
    Rebounds,
    #[serde(rename = "AST")]
    Assists,
    #[serde(rename = "STL")]
    Steals,
    #[serde(rename = "BLK")]
    Blocks,
    #[serde(rename = "TOV")]
    Turnovers,
    #[serde(rename = "FTM")]
    FreeThrowsMade,
    #[serde(rename = "3PM")]
    ThreesMade,
    #[serde(rename = "FG%")]
    FieldGoalPct,
    #[serde(rename = "FT%")]
    FreeThrowPct,
    #[serde(rename = "3PT%")]
    ThreePointPct,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Points,
        Category::Rebounds,
        Category::Assists,
        Category::Steals,
        Category::Blocks,
        Category::Turnovers,
        Category::FreeThrowsMade,
        Category::ThreesMade,
        Category::FieldGoalPct,
        Category::FreeThrowPct,
        Category::ThreePointPct,
    ];

    /// The nine categories Ottoneu basketball leagues score.
    pub const OTTONEU: [Category; 9] = [
        Category::Points,
        Category::Rebounds,
        Category::Assists,
        Category::Steals,
        Category::Blocks,
        Category::Turnovers,
        Category::FreeThrowsMade,
        Category::FieldGoalPct,
        Category::ThreePointPct,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Points => "PTS",
            Category::Rebounds => "REB",
            Category::Assists => "AST",
            Category::Steals => "STL",
            Category::Blocks => "BLK",
            Category::Turnovers => "TOV",
            Category::FreeThrowsMade => "FTM",
            Category::ThreesMade => "3PM",
            Category::FieldGoalPct => "FG%",
            Category::FreeThrowPct => "FT%",
            Category::ThreePointPct => "3PT%",
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            Category::FieldGoalPct | Category::FreeThrowPct | Category::ThreePointPct
        )
    }

    /// Turnovers are the only category where fewer is better.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Category::Turnovers)
    }

    /// Per-game value of a counting category. Percentage categories return
    /// `None`; use [`Category::player_shots`] for those.
    pub fn player_total(&self, line: &PlayerStatLine) -> Option<f64> {
        match self {
            Category::Points => Some(line.points),
            Category::Rebounds => Some(line.rebounds),
            Category::Assists => Some(line.assists),
            Category::Steals => Some(line.steals),
            Category::Blocks => Some(line.blocks),
            Category::Turnovers => Some(line.turnovers),
            Category::FreeThrowsMade => Some(line.ftm),
            Category::ThreesMade => Some(line.fg3m),
            _ => None,
        }
    }

    /// `(makes, attempts)` behind a percentage category.
    pub fn player_shots(&self, line: &PlayerStatLine) -> Option<(f64, f64)> {
        match self {
            Category::FieldGoalPct => Some((line.fgm, line.fga)),
            Category::FreeThrowPct => Some((line.ftm, line.fta)),
            Category::ThreePointPct => Some((line.fg3m, line.fg3a)),
            _ => None,
        }
    }

    pub fn team_shots(&self, team: &TeamTotals) -> Option<(f64, f64)> {
        match self {
            Category::FieldGoalPct => Some((team.fgm, team.fga)),
            Category::FreeThrowPct => Some((team.ftm, team.fta)),
            Category::ThreePointPct => Some((team.fg3m, team.fg3a)),
            _ => None,
        }
    }

    /// A team's standings figure for this category. Percentages are
    /// makes / attempts, NaN when the team took no attempts.
    pub fn team_value(&self, team: &TeamTotals) -> f64 {
        match self {
            Category::Points => team.points,
            Category::Rebounds => team.rebounds,
            Category::Assists => team.assists,
            Category::Steals => team.steals,
            Category::Blocks => team.blocks,
            Category::Turnovers => team.turnovers,
            Category::FreeThrowsMade => team.ftm,
            Category::ThreesMade => team.fg3m,
            Category::FieldGoalPct | Category::FreeThrowPct | Category::ThreePointPct => {
                match self.team_shots(team) {
                    Some((_, attempts)) if attempts == 0.0 => f64::NAN,
                    Some((makes, attempts)) => makes / attempts,
                    None => f64::NAN,
                }
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Historical alternative category totals, each dropping two of the eleven
/// categories from the sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalVariant {
    /// Ottoneu standard: FTM, FG%, 3PT%.
    V1,
    /// Free-throw percentage instead of free throws made.
    V2,
    /// Threes made plus both FG% and FT%.
    V3,
    /// Counting FTM and 3PM with FG% only.
    V4,
}

impl TotalVariant {
    pub fn excluded(&self) -> [Category; 2] {
        match self {
            TotalVariant::V1 => [Category::ThreesMade, Category::FreeThrowPct],
            TotalVariant::V2 => [Category::ThreesMade, Category::FreeThrowsMade],
            TotalVariant::V3 => [Category::ThreePointPct, Category::FreeThrowsMade],
            TotalVariant::V4 => [Category::ThreePointPct, Category::FreeThrowPct],
        }
    }
}

/// One category's contribution to a player's categories value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryValue {
    pub category: Category,
    pub value: f64,
    /// Whether this value is part of the player's total.
    pub counted: bool,
}

/// Sum the counted entries of a breakdown.
pub fn total(breakdown: &[CategoryValue]) -> f64 {
    breakdown.iter().filter(|c| c.counted).map(|c| c.value).sum()
}
