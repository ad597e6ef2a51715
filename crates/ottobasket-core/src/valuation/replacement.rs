// Replacement levels per scored position.
//
// The replacement level at a position is the best value among players left
// out of the draft pool who are scored there: the player any team could pick
// up for free.

use crate::roster::PositionGroup;
use crate::valuation::draft_pool::DraftPool;
use crate::valuation::{ScoredPlayer, ValuationError};
use std::collections::BTreeMap;

/// Replacement level for every position group that has scored players.
pub type ReplacementBaselines = BTreeMap<PositionGroup, f64>;

/// Determine the replacement level for each scored position.
///
/// Groups with no scored players need no baseline and are absent from the
/// result. A group whose players were all drafted has no free-agent
/// alternative and is an error.
pub fn replacement_levels(
    players: &[ScoredPlayer],
    pool: &DraftPool,
) -> Result<ReplacementBaselines, ValuationError> {
    let mut levels = ReplacementBaselines::new();
    for player in pool.excluded(players) {
        let level = levels
            .entry(player.scored_position)
            .or_insert(f64::NEG_INFINITY);
        *level = level.max(player.production_value);
    }

    for group in PositionGroup::ALL {
        let assigned = players.iter().any(|p| p.scored_position == group);
        if assigned && !levels.contains_key(&group) {
            return Err(ValuationError::data(
                format!("replacement level for {group}"),
                "every player scored at this position is draftable",
            ));
        }
    }
    Ok(levels)
}

/// Value above the replacement level of the player's scored position.
pub fn points_above_replacement(
    player: &ScoredPlayer,
    levels: &ReplacementBaselines,
) -> Result<f64, ValuationError> {
    levels
        .get(&player.scored_position)
        .map(|level| player.production_value - level)
        .ok_or_else(|| {
            ValuationError::data(
                format!("replacement level for {}", player.scored_position),
                "missing baseline",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DraftStep, LeagueConfig};
    use crate::roster::PositionSet;
    use crate::stats::PlayerStatLine;
    use crate::valuation::draft_pool::select_draft_pool;

    fn scored(id: &str, group: PositionGroup, value: f64) -> ScoredPlayer {
        ScoredPlayer {
            line: PlayerStatLine {
                id: id.into(),
                name: format!("Player {id}"),
                positions: PositionSet::from_groups(&[group]),
                minutes: 0.0,
                points: 0.0,
                rebounds: 0.0,
                assists: 0.0,
                steals: 0.0,
                blocks: 0.0,
                turnovers: 0.0,
                fgm: 0.0,
                fga: 0.0,
                ftm: 0.0,
                fta: 0.0,
                fg3m: 0.0,
                fg3a: 0.0,
            },
            production_value: value,
            breakdown: Vec::new(),
            scored_position: group,
        }
    }

    fn util_league(slots: usize) -> LeagueConfig {
        LeagueConfig {
            name: "Test".into(),
            num_teams: 1,
            salary_cap: 100,
            roster_slots: slots,
            draft_steps: vec![DraftStep::new("UTIL", &[], slots)],
        }
    }

    #[test]
    fn best_excluded_player_sets_level() {
        let players = vec![
            scored("g1", PositionGroup::Guard, 40.0),
            scored("g2", PositionGroup::Guard, 12.0),
            scored("g3", PositionGroup::Guard, 8.0),
            scored("c1", PositionGroup::Center, 30.0),
            scored("c2", PositionGroup::Center, 15.0),
        ];
        let pool = select_draft_pool(&players, &util_league(2)).unwrap();
        let levels = replacement_levels(&players, &pool).unwrap();

        assert_eq!(levels[&PositionGroup::Guard], 12.0);
        assert_eq!(levels[&PositionGroup::Center], 15.0);
        assert!(!levels.contains_key(&PositionGroup::Forward));

        let par = points_above_replacement(&players[0], &levels).unwrap();
        assert_eq!(par, 28.0);
    }

    #[test]
    fn fully_drafted_position_is_error() {
        let players = vec![
            scored("c1", PositionGroup::Center, 30.0),
            scored("g1", PositionGroup::Guard, 10.0),
            scored("g2", PositionGroup::Guard, 5.0),
        ];
        let pool = select_draft_pool(&players, &util_league(1)).unwrap();
        let err = replacement_levels(&players, &pool).unwrap_err();
        assert!(err.to_string().contains("replacement level for C"));
    }
}
