// Fantasy points for points-format leagues.

use crate::config::PointsWeights;
use crate::stats::PlayerStatLine;

/// Per-game fantasy points: the dot product of the stat line and the weights.
///
/// Non-finite inputs propagate into the result unchanged.
pub fn fantasy_points(line: &PlayerStatLine, weights: &PointsWeights) -> f64 {
    line.points * weights.points
        + line.rebounds * weights.rebounds
        + line.assists * weights.assists
        + line.steals * weights.steals
        + line.blocks * weights.blocks
        + line.turnovers * weights.turnovers
        + line.fgm * weights.fgm
        + line.fga * weights.fga
        + line.ftm * weights.ftm
        + line.fta * weights.fta
        + line.fg3m * weights.fg3m
        + line.fg3a * weights.fg3a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{PositionGroup, PositionSet};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn line() -> PlayerStatLine {
        PlayerStatLine {
            id: "1".into(),
            name: "Test Guard".into(),
            positions: PositionSet::from_groups(&[PositionGroup::Guard]),
            minutes: 34.0,
            points: 25.0,
            rebounds: 5.0,
            assists: 7.0,
            steals: 1.5,
            blocks: 0.5,
            turnovers: 3.0,
            fgm: 9.0,
            fga: 19.0,
            ftm: 4.0,
            fta: 5.0,
            fg3m: 3.0,
            fg3a: 8.0,
        }
    }

    #[test]
    fn simple_points_ignore_shooting() {
        // 25 + 5 + 7 + 1.5 + 0.5 - 3 = 36
        let pts = fantasy_points(&line(), &PointsWeights::simple());
        assert!(approx_eq(pts, 36.0, 1e-10));
    }

    #[test]
    fn traditional_points_charge_for_misses() {
        // 25 + 5 + 14 + 6 + 2 - 6 + 18 - 19 + 4 - 5 = 44
        let pts = fantasy_points(&line(), &PointsWeights::traditional());
        assert!(approx_eq(pts, 44.0, 1e-10));
    }

    #[test]
    fn nan_propagates() {
        let mut l = line();
        l.rebounds = f64::NAN;
        assert!(fantasy_points(&l, &PointsWeights::simple()).is_nan());
    }

    #[test]
    fn monotone_in_positive_weights() {
        let base = fantasy_points(&line(), &PointsWeights::traditional());
        let bumps: [fn(&mut PlayerStatLine); 5] = [
            |l| l.points += 1.0,
            |l| l.rebounds += 1.0,
            |l| l.assists += 1.0,
            |l| l.steals += 1.0,
            |l| l.blocks += 1.0,
        ];
        for bump in bumps {
            let mut l = line();
            bump(&mut l);
            assert!(fantasy_points(&l, &PointsWeights::traditional()) >= base);
        }
    }
}
