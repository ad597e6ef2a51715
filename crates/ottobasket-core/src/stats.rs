// Per-game stat table and league standings loading.
//
// The stat table is one CSV row per player with per-game counting stats and a
// position-eligibility string. Standings tables hold one row of season totals
// per fantasy team and feed the SGP slope fit.

use crate::roster::PositionSet;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player's per-game statistics.
///
/// Missing cells load as NaN so the valuation engine can reject them with a
/// message naming the player, instead of treating them as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatLine {
    pub id: String,
    pub name: String,
    pub positions: PositionSet,
    /// Playing-time weight (minutes or projected minutes). Carried through
    /// for callers; not used by the valuation engine.
    pub minutes: f64,
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

impl PlayerStatLine {
    /// Name of the first non-finite counting stat, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        let fields: [(&'static str, f64); 12] = [
            ("points", self.points),
            ("rebounds", self.rebounds),
            ("assists", self.assists),
            ("steals", self.steals),
            ("blocks", self.blocks),
            ("turnovers", self.turnovers),
            ("fgm", self.fgm),
            ("fga", self.fga),
            ("ftm", self.ftm),
            ("fta", self.fta),
            ("fg3m", self.fg3m),
            ("fg3a", self.fg3a),
        ];
        fields
            .into_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| name)
    }
}

/// Season totals for one fantasy team in a league's standings.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamTotals {
    pub team: String,
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

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StatTableError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Stat table row. Column names follow the upstream per-game export, with
/// aliases for the longer spellings used by the year-to-date leaderboard.
/// Unknown columns are ignored by the csv deserializer.
#[derive(Debug, Deserialize)]
struct RawStatRow {
    #[serde(alias = "nba_player_id", alias = "id")]
    player_id: String,
    #[serde(alias = "name")]
    player: String,
    #[serde(alias = "ottoneu_position", alias = "pos")]
    position: String,
    #[serde(default)]
    minutes: Option<f64>,
    #[serde(alias = "pts_game", alias = "points")]
    pts: Option<f64>,
    #[serde(alias = "reb_game", alias = "rebounds")]
    reb: Option<f64>,
    #[serde(alias = "ast_game", alias = "assists")]
    ast: Option<f64>,
    #[serde(alias = "stl_game", alias = "steals")]
    stl: Option<f64>,
    #[serde(alias = "blk_game", alias = "blocks")]
    blk: Option<f64>,
    #[serde(alias = "tov_game", alias = "turnovers")]
    tov: Option<f64>,
    #[serde(alias = "fgm_game", alias = "field_goals_made")]
    fgm: Option<f64>,
    #[serde(alias = "fga_game", alias = "field_goal_attempts")]
    fga: Option<f64>,
    #[serde(alias = "ftm_game", alias = "free_throws_made")]
    ftm: Option<f64>,
    #[serde(alias = "fta_game", alias = "free_throw_attempts")]
    fta: Option<f64>,
    #[serde(alias = "fg3m_game", alias = "three_points_made")]
    fg3m: Option<f64>,
    #[serde(alias = "fg3a_game", alias = "three_point_attempts")]
    fg3a: Option<f64>,
}

/// Standings row. The Ottoneu standings page labels threes `3ptm`/`3pta`.
#[derive(Debug, Deserialize)]
struct RawTeamRow {
    team: String,
    pts: f64,
    reb: f64,
    ast: f64,
    stl: f64,
    blk: f64,
    tov: f64,
    fgm: f64,
    fga: f64,
    ftm: f64,
    #[serde(default)]
    fta: f64,
    #[serde(alias = "3ptm")]
    fg3m: f64,
    #[serde(alias = "3pta")]
    fg3a: f64,
}

fn or_nan(v: Option<f64>) -> f64 {
    v.unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

pub(crate) fn load_stat_lines_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<PlayerStatLine>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut lines = Vec::new();
    for result in reader.deserialize::<RawStatRow>() {
        match result {
            Ok(raw) => {
                let name = raw.player.trim().to_string();
                let Some(positions) = PositionSet::parse(&raw.position) else {
                    warn!("skipping player '{}': unknown position '{}'", name, raw.position);
                    continue;
                };
                lines.push(PlayerStatLine {
                    id: raw.player_id.trim().to_string(),
                    name,
                    positions,
                    minutes: raw.minutes.unwrap_or(0.0),
                    points: or_nan(raw.pts),
                    rebounds: or_nan(raw.reb),
                    assists: or_nan(raw.ast),
                    steals: or_nan(raw.stl),
                    blocks: or_nan(raw.blk),
                    turnovers: or_nan(raw.tov),
                    fgm: or_nan(raw.fgm),
                    fga: or_nan(raw.fga),
                    ftm: or_nan(raw.ftm),
                    fta: or_nan(raw.fta),
                    fg3m: or_nan(raw.fg3m),
                    fg3a: or_nan(raw.fg3a),
                });
            }
            Err(e) => {
                warn!("skipping malformed stat row: {}", e);
            }
        }
    }
    Ok(lines)
}

pub(crate) fn load_standings_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamTotals>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut teams = Vec::new();
    for result in reader.deserialize::<RawTeamRow>() {
        match result {
            Ok(raw) => teams.push(TeamTotals {
                team: raw.team.trim().to_string(),
                points: raw.pts,
                rebounds: raw.reb,
                assists: raw.ast,
                steals: raw.stl,
                blocks: raw.blk,
                turnovers: raw.tov,
                fgm: raw.fgm,
                fga: raw.fga,
                ftm: raw.ftm,
                fta: raw.fta,
                fg3m: raw.fg3m,
                fg3a: raw.fg3a,
            }),
            Err(e) => {
                warn!("skipping malformed standings row: {}", e);
            }
        }
    }
    Ok(teams)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject empty tables and duplicate player ids.
pub fn validate_stat_table(lines: &[PlayerStatLine]) -> Result<(), StatTableError> {
    if lines.is_empty() {
        return Err(StatTableError::Validation(
            "stat table produced zero valid rows".into(),
        ));
    }
    let mut seen: HashSet<&str> = HashSet::with_capacity(lines.len());
    for line in lines {
        if !seen.insert(line.id.as_str()) {
            return Err(StatTableError::Validation(format!(
                "duplicate player id '{}' ({})",
                line.id, line.name
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, StatTableError> {
    std::fs::File::open(path).map_err(|e| StatTableError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load and validate a per-game stat table from a CSV file.
pub fn load_stat_table(path: &Path) -> Result<Vec<PlayerStatLine>, StatTableError> {
    let lines = load_stat_lines_from_reader(open(path)?).map_err(|e| StatTableError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    validate_stat_table(&lines)?;
    Ok(lines)
}

/// Load one league's standings table from a CSV file.
pub fn load_standings(path: &Path) -> Result<Vec<TeamTotals>, StatTableError> {
    let teams = load_standings_from_reader(open(path)?).map_err(|e| StatTableError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if teams.len() < 2 {
        return Err(StatTableError::Validation(format!(
            "standings in {} need at least two teams, found {}",
            path.display(),
            teams.len()
        )));
    }
    Ok(teams)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::PositionGroup;

    #[test]
    fn stat_table_roundtrip() {
        let csv_data = "\
player_id,player,position,minutes,pts,reb,ast,stl,blk,tov,fgm,fga,ftm,fta,fg3m,fg3a
201939,Stephen Curry,G,32.5,26.4,4.5,5.1,0.9,0.4,3.0,8.5,18.2,4.4,4.8,4.8,11.7
203999,Nikola Jokic,C,34.6,26.4,12.4,9.0,1.4,0.9,3.0,10.2,17.9,5.2,6.3,0.8,2.3";

        let lines = load_stat_lines_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, "201939");
        assert_eq!(lines[0].name, "Stephen Curry");
        assert!(lines[0].positions.contains(PositionGroup::Guard));
        assert!((lines[0].fg3a - 11.7).abs() < f64::EPSILON);
        assert!((lines[1].rebounds - 12.4).abs() < f64::EPSILON);
        assert!(lines[1].first_non_finite().is_none());
    }

    #[test]
    fn long_column_names_accepted() {
        let csv_data = "\
nba_player_id,name,ottoneu_position,points,rebounds,assists,steals,blocks,turnovers,field_goals_made,field_goal_attempts,free_throws_made,free_throw_attempts,three_points_made,three_point_attempts,salary
1,A Player,G-F,20,5,4,1,0.5,2,7,15,3,4,2,6,$12";

        let lines = load_stat_lines_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].positions.len(), 2);
        assert!((lines[0].minutes - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_stat_becomes_nan() {
        let csv_data = "\
player_id,player,position,pts,reb,ast,stl,blk,tov,fgm,fga,ftm,fta,fg3m,fg3a
1,Gap Player,F,10,,2,1,1,1,4,9,2,2,0,0";

        let lines = load_stat_lines_from_reader(csv_data.as_bytes()).unwrap();
        assert!(lines[0].rebounds.is_nan());
        assert_eq!(lines[0].first_non_finite(), Some("rebounds"));
    }

    #[test]
    fn unknown_position_row_skipped() {
        let csv_data = "\
player_id,player,position,pts,reb,ast,stl,blk,tov,fgm,fga,ftm,fta,fg3m,fg3a
1,Good,G,10,2,2,1,1,1,4,9,2,2,0,0
2,Bad,QB,10,2,2,1,1,1,4,9,2,2,0,0";

        let lines = load_stat_lines_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Good");
    }

    #[test]
    fn duplicate_ids_rejected() {
        let csv_data = "\
player_id,player,position,pts,reb,ast,stl,blk,tov,fgm,fga,ftm,fta,fg3m,fg3a
1,One,G,10,2,2,1,1,1,4,9,2,2,0,0
1,Again,G,11,2,2,1,1,1,4,9,2,2,0,0";

        let lines = load_stat_lines_from_reader(csv_data.as_bytes()).unwrap();
        let err = validate_stat_table(&lines).unwrap_err();
        assert!(err.to_string().contains("duplicate player id '1'"));
    }

    #[test]
    fn empty_table_rejected() {
        assert!(matches!(
            validate_stat_table(&[]),
            Err(StatTableError::Validation(_))
        ));
    }

    #[test]
    fn standings_accept_ottoneu_three_point_headers() {
        let csv_data = "\
team,pts,reb,ast,stl,blk,tov,fgm,fga,ftm,3ptm,3pta
Alpha,9000,4000,2000,600,400,1200,3300,7000,1500,1000,2800
Beta,8500,4200,1900,650,380,1100,3100,6800,1400,900,2600";

        let teams = load_standings_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(teams.len(), 2);
        assert!((teams[0].fg3m - 1000.0).abs() < f64::EPSILON);
        assert!((teams[1].fta - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_stat_table_missing_file() {
        let err = load_stat_table(Path::new("/nonexistent/stats.csv")).unwrap_err();
        assert!(matches!(err, StatTableError::Io { .. }));
    }
}
