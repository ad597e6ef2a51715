// Configuration loading and parsing (league.toml, scoring.toml).

use crate::roster::PositionGroup;
use crate::valuation::category::{Category, TotalVariant};
use crate::valuation::{self, ValuationError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

impl From<ValuationError> for ConfigError {
    fn from(e: ValuationError) -> Self {
        match e {
            ValuationError::Configuration { field, message } => {
                ConfigError::ValidationError { field, message }
            }
            ValuationError::Data { subject, message } => ConfigError::ValidationError {
                field: subject,
                message,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub scoring: ScoringConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    /// Per-team auction budget. The league budget is `num_teams * salary_cap`.
    pub salary_cap: u32,
    /// Rosterable slots per team. Every draft step's slots must add up to this.
    pub roster_slots: usize,
    /// Draft-pool steps, filled in the listed order.
    pub draft_steps: Vec<DraftStep>,
}

impl LeagueConfig {
    /// Total spendable dollars across the league.
    pub fn budget(&self) -> f64 {
        self.num_teams as f64 * self.salary_cap as f64
    }

    /// Total rostered players across the league.
    pub fn total_slots(&self) -> usize {
        self.num_teams * self.roster_slots
    }
}

/// One draft-pool step: `slots` players per team drawn from those eligible at
/// any of `positions`. An empty position list accepts every player.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DraftStep {
    pub label: String,
    #[serde(default)]
    pub positions: Vec<PositionGroup>,
    pub slots: usize,
}

impl DraftStep {
    pub fn new(label: &str, positions: &[PositionGroup], slots: usize) -> Self {
        DraftStep {
            label: label.into(),
            positions: positions.to_vec(),
            slots,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.positions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// scoring.toml structs
// ---------------------------------------------------------------------------

/// Per-stat weights for a points league.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct PointsWeights {
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

impl PointsWeights {
    /// Ottoneu simple points: one point per counting stat, minus turnovers.
    pub fn simple() -> Self {
        PointsWeights {
            points: 1.0,
            rebounds: 1.0,
            assists: 1.0,
            steals: 1.0,
            blocks: 1.0,
            turnovers: -1.0,
            ..PointsWeights::default()
        }
    }

    /// Ottoneu traditional points, which charge for missed shots.
    pub fn traditional() -> Self {
        PointsWeights {
            points: 1.0,
            rebounds: 1.0,
            assists: 2.0,
            steals: 4.0,
            blocks: 4.0,
            turnovers: -2.0,
            fgm: 2.0,
            fga: -1.0,
            ftm: 1.0,
            fta: -1.0,
            ..PointsWeights::default()
        }
    }

    fn fields(&self) -> [(&'static str, f64); 12] {
        [
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
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMethod {
    ZScore,
    Sgp,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    pub method: CategoryMethod,
    pub categories: Vec<Category>,
    /// Categories shown in the breakdown but left out of the total.
    pub exclude: Vec<Category>,
    /// Shortcut for one of the historical alternative totals. When set, all
    /// eleven categories are computed and the variant picks the exclusions.
    pub variant: Option<TotalVariant>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        CategoriesConfig {
            method: CategoryMethod::Sgp,
            categories: Category::OTTONEU.to_vec(),
            exclude: Vec::new(),
            variant: None,
        }
    }
}

impl CategoriesConfig {
    /// Categories to compute for every player.
    pub fn computed(&self) -> Vec<Category> {
        match self.variant {
            Some(_) => Category::ALL.to_vec(),
            None => self.categories.clone(),
        }
    }

    /// Whether a category counts toward the total.
    pub fn is_counted(&self, category: Category) -> bool {
        if self.exclude.contains(&category) {
            return false;
        }
        match self.variant {
            Some(v) => !v.excluded().contains(&category),
            None => true,
        }
    }
}

/// Where to find SGP slope bundles and how far into the season we are.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SgpSource {
    /// JSON bundle for the current season.
    pub current: String,
    /// JSON bundle for the previous season, blended in early in the season.
    #[serde(default)]
    pub prior: Option<String>,
    #[serde(default)]
    pub current_week: u32,
    #[serde(default = "default_total_weeks")]
    pub total_weeks: u32,
}

fn default_total_weeks() -> u32 {
    22
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub simple_points: PointsWeights,
    pub traditional_points: PointsWeights,
    pub categories: CategoriesConfig,
    pub sgp: Option<SgpSource>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            simple_points: PointsWeights::simple(),
            traditional_points: PointsWeights::traditional(),
            categories: CategoriesConfig::default(),
            sgp: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/scoring.toml`, both relative to the given `base_dir`.
///
/// This does not copy defaults; prefer `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- scoring.toml (optional, Ottoneu defaults otherwise) ---
    let scoring_path = config_dir.join("scoring.toml");
    let scoring = if scoring_path.exists() {
        let scoring_text = read_file(&scoring_path)?;
        toml::from_str(&scoring_text).map_err(|e| ConfigError::ParseError {
            path: scoring_path.clone(),
            source: e,
        })?
    } else {
        ScoringConfig::default()
    };

    let config = Config {
        league: league_file.league,
        scoring,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "no league.toml/scoring.toml under {0}/config or {0}/defaults; \
                     pass --config-dir pointing at a directory that holds one",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load config relative to `base_dir`, copying defaults first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    valuation::check_league(&config.league)?;

    let scoring = &config.scoring;
    for (section, weights) in [
        ("simple_points", &scoring.simple_points),
        ("traditional_points", &scoring.traditional_points),
    ] {
        for (name, val) in weights.fields() {
            if !val.is_finite() {
                return Err(invalid(
                    &format!("{section}.{name}"),
                    format!("must be finite, got {val}"),
                ));
            }
        }
    }

    let cats = &scoring.categories;
    let computed = cats.computed();
    if computed.is_empty() {
        return Err(invalid("categories.categories", "must list at least one category"));
    }
    if !computed.iter().any(|&c| cats.is_counted(c)) {
        return Err(invalid("categories.exclude", "excludes every category"));
    }

    match (&scoring.sgp, cats.method) {
        (None, CategoryMethod::Sgp) => {
            return Err(invalid("sgp", "required when categories.method = \"sgp\""));
        }
        (Some(sgp), _) => {
            if sgp.total_weeks == 0 {
                return Err(invalid("sgp.total_weeks", "must be greater than 0"));
            }
            if sgp.current_week > sgp.total_weeks {
                return Err(invalid(
                    "sgp.current_week",
                    format!(
                        "must be at most total_weeks ({}), got {}",
                        sgp.total_weeks, sgp.current_week
                    ),
                ));
            }
        }
        (None, CategoryMethod::ZScore) => {}
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
