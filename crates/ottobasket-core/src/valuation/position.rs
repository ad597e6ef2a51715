// Scored-position resolution.
//
// Each player is ranked within every position group they are eligible for
// and scored at the group where they rank best. A forward-center who is the
// 8th best center but 30th best forward is valued as a center.

use crate::roster::PositionGroup;
use crate::stats::PlayerStatLine;
use crate::valuation::ValuationError;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Ranks of one player within each group they are eligible for.
pub type GroupRanks = BTreeMap<PositionGroup, f64>;

/// Descending ranks with ties sharing the average of their positions.
///
/// `[10, 30, 20, 30]` ranks as `[4, 1.5, 3, 1.5]`.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start+1 ..= end share their mean
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Rank every player within each group they are eligible for. Players have
/// no entry for groups they cannot play.
pub fn rank_table(lines: &[PlayerStatLine], values: &[f64]) -> Vec<GroupRanks> {
    let mut table = vec![GroupRanks::new(); lines.len()];
    for group in PositionGroup::ALL {
        let members: Vec<usize> = (0..lines.len())
            .filter(|&i| lines[i].positions.contains(group))
            .collect();
        let member_values: Vec<f64> = members.iter().map(|&i| values[i]).collect();
        for (&i, rank) in members.iter().zip(average_ranks(&member_values)) {
            table[i].insert(group, rank);
        }
    }
    table
}

/// The group with the best (lowest) rank; ties go to the earlier group in
/// `PositionGroup::ALL`.
fn best_group(ranks: &GroupRanks) -> Option<PositionGroup> {
    let mut best: Option<(PositionGroup, f64)> = None;
    for (&group, &rank) in ranks {
        match best {
            Some((_, r)) if rank >= r => {}
            _ => best = Some((group, rank)),
        }
    }
    best.map(|(g, _)| g)
}

/// Resolve each player's scored position from their production values.
///
/// `values` is index-aligned with `lines`.
pub fn assign_positions(
    lines: &[PlayerStatLine],
    values: &[f64],
) -> Result<Vec<PositionGroup>, ValuationError> {
    if let Some(line) = lines.iter().find(|l| l.positions.is_empty()) {
        return Err(ValuationError::data(&line.name, "no position eligibility"));
    }
    rank_table(lines, values)
        .iter()
        .zip(lines)
        .map(|(ranks, line)| {
            best_group(ranks)
                .ok_or_else(|| ValuationError::data(&line.name, "no position eligibility"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::PositionSet;

    fn line(id: &str, positions: &str) -> PlayerStatLine {
        PlayerStatLine {
            id: id.into(),
            name: format!("Player {id}"),
            positions: PositionSet::parse(positions).unwrap(),
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
        }
    }

    #[test]
    fn average_ranks_share_ties() {
        assert_eq!(average_ranks(&[10.0, 30.0, 20.0, 30.0]), vec![4.0, 1.5, 3.0, 1.5]);
        assert_eq!(average_ranks(&[5.0, 5.0, 5.0]), vec![2.0, 2.0, 2.0]);
        assert!(average_ranks(&[]).is_empty());
    }

    #[test]
    fn single_eligibility_scores_there() {
        let lines = vec![line("1", "G"), line("2", "C")];
        let pos = assign_positions(&lines, &[10.0, 5.0]).unwrap();
        assert_eq!(pos, vec![PositionGroup::Guard, PositionGroup::Center]);
    }

    #[test]
    fn multi_eligible_player_takes_best_rank() {
        // The F/C is 3rd among forwards but 1st among centers.
        let lines = vec![
            line("fc", "F/C"),
            line("f1", "F"),
            line("f2", "F"),
            line("c1", "C"),
        ];
        let values = [20.0, 40.0, 30.0, 10.0];
        let table = rank_table(&lines, &values);
        assert_eq!(table[0][&PositionGroup::Forward], 3.0);
        assert_eq!(table[0][&PositionGroup::Center], 1.0);
        assert!(!table[1].contains_key(&PositionGroup::Center));

        let pos = assign_positions(&lines, &values).unwrap();
        assert_eq!(pos[0], PositionGroup::Center);
    }

    #[test]
    fn equal_ranks_prefer_center_then_forward() {
        // A lone player ranks first in every group they can play.
        let pos = assign_positions(&[line("fc", "F-C")], &[10.0]).unwrap();
        assert_eq!(pos, vec![PositionGroup::Center]);

        let pos = assign_positions(&[line("gf", "G-F")], &[10.0]).unwrap();
        assert_eq!(pos, vec![PositionGroup::Forward]);

        let pos = assign_positions(&[line("all", "G-F-C")], &[10.0]).unwrap();
        assert_eq!(pos, vec![PositionGroup::Center]);
    }

    #[test]
    fn eligibility_not_in_set_never_chosen() {
        let lines = vec![line("1", "G"), line("2", "G"), line("3", "F")];
        let pos = assign_positions(&lines, &[1.0, 2.0, 0.5]).unwrap();
        assert_eq!(pos[0], PositionGroup::Guard);
        assert_eq!(pos[2], PositionGroup::Forward);
    }

    #[test]
    fn empty_eligibility_is_error() {
        let lines = vec![line("1", "G"), line("2", "")];
        let err = assign_positions(&lines, &[1.0, 2.0]).unwrap_err();
        match err {
            ValuationError::Data { subject, .. } => assert_eq!(subject, "Player 2"),
            other => panic!("expected Data error, got {other:?}"),
        }
    }
}
