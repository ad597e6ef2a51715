// Draft-pool selection.
//
// Simulates how the league's rosters fill: each ordered step takes the best
// remaining players eligible for any of its positions until the step's
// league-wide quota is met. Everyone chosen is draftable; the rest are
// excluded and set replacement level.

use crate::config::{DraftStep, LeagueConfig};
use crate::valuation::{ScoredPlayer, ValuationError};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// The players one step selected, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSelection {
    pub label: String,
    pub quota: usize,
    pub player_ids: Vec<String>,
}

/// Draftable / excluded partition of the player table.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPool {
    pub steps: Vec<StepSelection>,
    draftable: HashSet<String>,
}

impl DraftPool {
    pub fn is_draftable(&self, player_id: &str) -> bool {
        self.draftable.contains(player_id)
    }

    pub fn draftable_count(&self) -> usize {
        self.draftable.len()
    }

    /// Players left out of every step, in input order.
    pub fn excluded<'a>(
        &'a self,
        players: &'a [ScoredPlayer],
    ) -> impl Iterator<Item = &'a ScoredPlayer> + 'a {
        players.iter().filter(move |p| !self.is_draftable(&p.line.id))
    }
}

fn step_accepts(step: &DraftStep, player: &ScoredPlayer) -> bool {
    step.is_unrestricted() || player.line.positions.intersects(&step.positions)
}

/// Run the league's draft steps over the scored players.
pub fn select_draft_pool(
    players: &[ScoredPlayer],
    league: &LeagueConfig,
) -> Result<DraftPool, ValuationError> {
    // Stable sort keeps input order among equal values.
    let mut order: Vec<&ScoredPlayer> = players.iter().collect();
    order.sort_by(|a, b| {
        b.production_value
            .partial_cmp(&a.production_value)
            .unwrap_or(Ordering::Equal)
    });

    let mut draftable: HashSet<String> = HashSet::new();
    let mut steps = Vec::with_capacity(league.draft_steps.len());

    for step in &league.draft_steps {
        let quota = step.slots * league.num_teams;
        let picked: Vec<String> = order
            .iter()
            .filter(|p| !draftable.contains(&p.line.id) && step_accepts(step, p))
            .take(quota)
            .map(|p| p.line.id.clone())
            .collect();
        if picked.len() < quota {
            return Err(ValuationError::data(
                format!("draft step {}", step.label),
                format!(
                    "needs {} players but only {} eligible remain",
                    quota,
                    picked.len()
                ),
            ));
        }
        debug!("draft step {}: selected {} players", step.label, picked.len());
        draftable.extend(picked.iter().cloned());
        steps.push(StepSelection {
            label: step.label.clone(),
            quota,
            player_ids: picked,
        });
    }

    Ok(DraftPool { steps, draftable })
}
