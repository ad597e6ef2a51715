// Auction dollar value conversion.
//
// Converts points above replacement into auction dollars. Every player with
// positive surplus is guaranteed $1; the rest of the league budget is spread
// in proportion to surplus, so the positive set's dollars sum to the budget.

use crate::valuation::ValuationError;

// ---------------------------------------------------------------------------
// AuctionValues struct
// ---------------------------------------------------------------------------

/// League-wide conversion factor from surplus to dollars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuctionValues {
    /// Total league budget (`num_teams * salary_cap`).
    pub budget: f64,
    /// Players with positive surplus.
    pub positive_count: usize,
    /// Sum of positive surplus.
    pub total_surplus: f64,
    /// Dollars per unit of surplus above the $1 floor.
    pub surplus_factor: f64,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute the surplus factor for a league.
///
/// `factor = (budget - positive_count) / total_surplus`
pub fn compute_auction_values(
    surpluses: &[f64],
    budget: f64,
) -> Result<AuctionValues, ValuationError> {
    let positive: Vec<f64> = surpluses.iter().copied().filter(|&s| s > 0.0).collect();
    let total_surplus: f64 = positive.iter().sum();
    if total_surplus <= 0.0 {
        return Err(ValuationError::data(
            "auction",
            "no player is above replacement level",
        ));
    }
    let positive_count = positive.len();
    if budget < positive_count as f64 {
        return Err(ValuationError::config(
            "league.salary_cap",
            format!(
                "budget {budget} cannot pay $1 to {positive_count} players above replacement"
            ),
        ));
    }
    Ok(AuctionValues {
        budget,
        positive_count,
        total_surplus,
        surplus_factor: (budget - positive_count as f64) / total_surplus,
    })
}

/// Dollar value for one player's surplus.
///
/// - Positive surplus: `round(surplus * factor + 1, 1)`
/// - Zero or negative surplus: `0`
pub fn player_dollar_value(surplus: f64, auction: &AuctionValues) -> f64 {
    if surplus > 0.0 {
        round_tenth(surplus * auction.surplus_factor + 1.0)
    } else {
        0.0
    }
}

/// Round to one decimal place.
pub fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
