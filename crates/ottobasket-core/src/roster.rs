// Position groups and position-eligibility sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Basketball position groups scored by the valuation engine.
///
/// The declaration order is also the tie-break priority: when a player ranks
/// equally well in two groups, the earlier group wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionGroup {
    #[serde(rename = "C")]
    Center,
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "G")]
    Guard,
}

impl PositionGroup {
    /// Every group, in tie-break priority order.
    pub const ALL: [PositionGroup; 3] = [
        PositionGroup::Center,
        PositionGroup::Forward,
        PositionGroup::Guard,
    ];

    /// Parse a single position token.
    ///
    /// Accepts the Ottoneu letters (`C`, `F`, `G`) as well as the traditional
    /// five-position abbreviations, which fold into their group.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(PositionGroup::Center),
            "F" | "SF" | "PF" => Some(PositionGroup::Forward),
            "G" | "PG" | "SG" => Some(PositionGroup::Guard),
            _ => None,
        }
    }

    /// Return the display string for this group.
    pub fn display_str(&self) -> &'static str {
        match self {
            PositionGroup::Center => "C",
            PositionGroup::Forward => "F",
            PositionGroup::Guard => "G",
        }
    }

    fn bit(self) -> u8 {
        match self {
            PositionGroup::Center => 0b001,
            PositionGroup::Forward => 0b010,
            PositionGroup::Guard => 0b100,
        }
    }
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// The set of position groups a player is eligible for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PositionSet(u8);

impl PositionSet {
    pub const EMPTY: PositionSet = PositionSet(0);

    pub fn from_groups(groups: &[PositionGroup]) -> Self {
        let mut set = PositionSet::EMPTY;
        for &g in groups {
            set.insert(g);
        }
        set
    }

    /// Parse an eligibility string such as `"G-F"`, `"F/C"` or `"PG,SG"`.
    ///
    /// Returns `None` if any token is not a recognised position. An empty
    /// string parses to the empty set.
    pub fn parse(s: &str) -> Option<Self> {
        let mut set = PositionSet::EMPTY;
        for token in s.split(|c: char| matches!(c, '-' | '/' | ',' | ' ')) {
            if token.is_empty() {
                continue;
            }
            set.insert(PositionGroup::from_str_pos(token)?);
        }
        Some(set)
    }

    pub fn insert(&mut self, group: PositionGroup) {
        self.0 |= group.bit();
    }

    pub fn contains(&self, group: PositionGroup) -> bool {
        self.0 & group.bit() != 0
    }

    /// Whether the player can fill at least one of `groups`.
    pub fn intersects(&self, groups: &[PositionGroup]) -> bool {
        groups.iter().any(|&g| self.contains(g))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the contained groups in priority order.
    pub fn iter(&self) -> impl Iterator<Item = PositionGroup> + '_ {
        PositionGroup::ALL.into_iter().filter(|&g| self.contains(g))
    }
}

impl fmt::Display for PositionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.iter().map(|g| g.display_str()).collect();
        f.write_str(&parts.join("/"))
    }
}
