// Per-100-possession projections and their conversion to per-game lines.
//
// Projection sources publish rate stats per 100 possessions. Turning them
// into a stat line needs a possession count, which comes from team pace and
// a minutes basis: `possessions = pace * minutes / 48`, and
// `stat = stat_100 * possessions / 100`.

use crate::roster::PositionSet;
use crate::stats::{PlayerStatLine, StatTableError};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Which playing-time figure a projection is scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinutesBasis {
    /// Current per-game minutes.
    Current,
    /// Per-game minutes when fully healthy.
    FullStrength,
    /// Total projected minutes over the rest of the season.
    RestOfSeason,
}

impl MinutesBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinutesBasis::Current => "current",
            MinutesBasis::FullStrength => "full_strength",
            MinutesBasis::RestOfSeason => "rest_of_season",
        }
    }
}

impl FromStr for MinutesBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(MinutesBasis::Current),
            "full_strength" | "fs" => Ok(MinutesBasis::FullStrength),
            "rest_of_season" | "ros" => Ok(MinutesBasis::RestOfSeason),
            other => Err(format!("{other} is not a valid minutes basis")),
        }
    }
}

/// One player's per-100-possession projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Per100Projection {
    pub id: String,
    pub name: String,
    pub positions: PositionSet,
    pub pace: f64,
    pub current_minutes: f64,
    pub full_strength_minutes: f64,
    pub rest_of_season_minutes: f64,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    pub fgm: f64,
    pub fga: f64,
    pub ftm: f64,
    pub fta: f64,
    pub fg3m: f64,
    pub fg3a: f64,
}

impl Per100Projection {
    fn minutes(&self, basis: MinutesBasis) -> f64 {
        match basis {
            MinutesBasis::Current => self.current_minutes,
            MinutesBasis::FullStrength => self.full_strength_minutes,
            MinutesBasis::RestOfSeason => self.rest_of_season_minutes,
        }
    }

    /// Scale the projection to a stat line for the given minutes basis.
    pub fn to_stat_line(&self, basis: MinutesBasis) -> PlayerStatLine {
        let minutes = self.minutes(basis);
        let scale = self.pace * minutes / 48.0 / 100.0;
        PlayerStatLine {
            id: self.id.clone(),
            name: self.name.clone(),
            positions: self.positions,
            minutes,
            points: self.points * scale,
            rebounds: self.rebounds * scale,
            assists: self.assists * scale,
            steals: self.steals * scale,
            blocks: self.blocks * scale,
            turnovers: self.turnovers * scale,
            fgm: self.fgm * scale,
            fga: self.fga * scale,
            ftm: self.ftm * scale,
            fta: self.fta * scale,
            fg3m: self.fg3m * scale,
            fg3a: self.fg3a * scale,
        }
    }
}

/// Convert every projection for one minutes basis.
pub fn to_stat_lines(projections: &[Per100Projection], basis: MinutesBasis) -> Vec<PlayerStatLine> {
    projections.iter().map(|p| p.to_stat_line(basis)).collect()
}

#[derive(Debug, Deserialize)]
struct RawProjectionRow {
    #[serde(alias = "nba_player_id")]
    player_id: String,
    player: String,
    #[serde(alias = "ottoneu_position")]
    position: String,
    pace: Option<f64>,
    #[serde(alias = "minutes")]
    current_min: Option<f64>,
    fs_min: Option<f64>,
    total_ros_minutes: Option<f64>,
    points_100: Option<f64>,
    rebounds_100: Option<f64>,
    assists_100: Option<f64>,
    steals_100: Option<f64>,
    blocks_100: Option<f64>,
    tov_100: Option<f64>,
    fgm_100: Option<f64>,
    fga_100: Option<f64>,
    ftm_100: Option<f64>,
    fta_100: Option<f64>,
    fg3m_100: Option<f64>,
    fg3a_100: Option<f64>,
}

pub(crate) fn load_projections_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<Per100Projection>, csv::Error> {
    let nan = |v: Option<f64>| v.unwrap_or(f64::NAN);
    let mut reader = csv::Reader::from_reader(rdr);
    let mut projections = Vec::new();
    for result in reader.deserialize::<RawProjectionRow>() {
        match result {
            Ok(raw) => {
                let name = raw.player.trim().to_string();
                let Some(positions) = PositionSet::parse(&raw.position) else {
                    warn!("skipping projection '{}': unknown position '{}'", name, raw.position);
                    continue;
                };
                projections.push(Per100Projection {
                    id: raw.player_id.trim().to_string(),
                    name,
                    positions,
                    pace: nan(raw.pace),
                    // Players without a minutes forecast are not expected to play.
                    current_minutes: raw.current_min.unwrap_or(0.0),
                    full_strength_minutes: raw.fs_min.unwrap_or(0.0),
                    rest_of_season_minutes: raw.total_ros_minutes.unwrap_or(0.0),
                    points: nan(raw.points_100),
                    rebounds: nan(raw.rebounds_100),
                    assists: nan(raw.assists_100),
                    steals: nan(raw.steals_100),
                    blocks: nan(raw.blocks_100),
                    turnovers: nan(raw.tov_100),
                    fgm: nan(raw.fgm_100),
                    fga: nan(raw.fga_100),
                    ftm: nan(raw.ftm_100),
                    fta: nan(raw.fta_100),
                    fg3m: nan(raw.fg3m_100),
                    fg3a: nan(raw.fg3a_100),
                });
            }
            Err(e) => {
                warn!("skipping malformed projection row: {}", e);
            }
        }
    }
    Ok(projections)
}

/// Load per-100 projections from a CSV file.
pub fn load_projections(path: &Path) -> Result<Vec<Per100Projection>, StatTableError> {
    let file = std::fs::File::open(path).map_err(|e| StatTableError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let projections = load_projections_from_reader(file).map_err(|e| StatTableError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if projections.is_empty() {
        return Err(StatTableError::Validation(
            "projection CSV produced zero valid rows".into(),
        ));
    }
    Ok(projections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
player_id,player,position,pace,current_min,fs_min,total_ros_minutes,points_100,rebounds_100,assists_100,steals_100,blocks_100,tov_100,fgm_100,fga_100,ftm_100,fta_100,fg3m_100,fg3a_100
1,Pace Setter,G,100,24,36,1200,40,10,12,2,1,4,15,30,6,7,5,12
2,Bench Big,C,96,,20,,30,20,4,1,3,3,12,20,6,10,0,0";

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn current_basis_scales_by_possessions() {
        let projections = load_projections_from_reader(CSV.as_bytes()).unwrap();
        let line = projections[0].to_stat_line(MinutesBasis::Current);
        // 100 pace * 24 min / 48 = 50 possessions -> half of the per-100 rate
        assert!(approx_eq(line.points, 20.0));
        assert!(approx_eq(line.fga, 15.0));
        assert!(approx_eq(line.minutes, 24.0));
    }

    #[test]
    fn full_strength_and_rest_of_season_bases() {
        let projections = load_projections_from_reader(CSV.as_bytes()).unwrap();
        let fs = projections[0].to_stat_line(MinutesBasis::FullStrength);
        assert!(approx_eq(fs.points, 30.0));

        // 1200 total minutes at pace 100 -> 2500 possessions -> 25x per-100
        let ros = projections[0].to_stat_line(MinutesBasis::RestOfSeason);
        assert!(approx_eq(ros.points, 1000.0));
    }

    #[test]
    fn missing_minutes_project_to_zero() {
        let projections = load_projections_from_reader(CSV.as_bytes()).unwrap();
        let line = projections[1].to_stat_line(MinutesBasis::Current);
        assert!(approx_eq(line.points, 0.0));
        assert!(approx_eq(line.rebounds, 0.0));
    }

    #[test]
    fn parses_basis_names() {
        assert_eq!("ros".parse::<MinutesBasis>(), Ok(MinutesBasis::RestOfSeason));
        assert_eq!(
            "Full_Strength".parse::<MinutesBasis>(),
            Ok(MinutesBasis::FullStrength)
        );
        assert!("weekly".parse::<MinutesBasis>().is_err());
    }
}
