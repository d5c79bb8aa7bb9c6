//! Configuration loading and config-file resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`KHEL_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Levels 1 and 2 are applied by the binary (clap `env` arguments); this module
//! owns the TOML layer and the compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "KHEL_CONFIG";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "analysis.toml";

/// Bootstrap configuration loaded from TOML
///
/// Every field has a compiled default so an empty file (or no file at all)
/// yields a runnable service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Bind address for the HTTP server
    pub host: String,

    /// HTTP server port
    pub port: u16,

    /// Shared secret expected in the `x-internal-api-secret` header.
    /// Empty disables authentication.
    pub shared_secret: String,

    /// Backend endpoint receiving `{submissionId, score}` once per submission
    pub callback_url: Option<String>,

    /// Directory for temporary uploads (system temp dir if unset)
    pub temp_dir: Option<PathBuf>,

    /// Whole-session watchdog in seconds; 0 disables it
    pub session_timeout_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Engine tuning
    pub analysis: AnalysisConfig,

    /// Per-exercise raw-score ceiling overrides
    pub scoring: ScoringConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5731,
            shared_secret: String::new(),
            callback_url: None,
            temp_dir: None,
            session_timeout_secs: 600,
            logging: LoggingConfig::default(),
            analysis: AnalysisConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Engine tuning shared by every session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum landmark visibility for a frame to be used
    pub visibility_threshold: f64,
    /// Frames ignored before calibration is attempted
    pub settle_frames: u64,
    /// Post-settle frames allowed to resolve a calibration reference
    pub calibration_attempts: u32,
    /// Shuttle-run reference detector: "markers" or "lines"
    pub shuttle_calibration: String,
    /// Shuttle-run position estimator: "raw" or "linear_predictor"
    pub shuttle_estimator: String,
    /// Sprint start line (pixels)
    pub sprint_start_x: f64,
    /// Sprint finish line (pixels)
    pub sprint_finish_x: f64,
    /// Jump height (cm) at which a jump is reported as explosive
    pub explosive_jump_cm: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            settle_frames: 10,
            calibration_attempts: 30,
            shuttle_calibration: "markers".to_string(),
            shuttle_estimator: "raw".to_string(),
            sprint_start_x: 100.0,
            sprint_finish_x: 1200.0,
            explosive_jump_cm: 40.0,
        }
    }
}

/// Raw-score ceiling overrides, one per exercise
///
/// `None` keeps the ceiling compiled into the exercise catalogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub push_ups: Option<f64>,
    pub sit_ups: Option<f64>,
    pub high_knees: Option<f64>,
    pub vertical_jump: Option<f64>,
    pub shuttle_run: Option<f64>,
    pub sprint: Option<f64>,
}

impl ScoringConfig {
    fn entries(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("push_ups", self.push_ups),
            ("sit_ups", self.sit_ups),
            ("high_knees", self.high_knees),
            ("vertical_jump", self.vertical_jump),
            ("shuttle_run", self.shuttle_run),
            ("sprint", self.sprint),
        ]
    }
}

impl TomlConfig {
    /// Reject values that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        let a = &self.analysis;
        if !(0.0..=1.0).contains(&a.visibility_threshold) {
            return Err(Error::Config(format!(
                "analysis.visibility_threshold must be within [0, 1], got {}",
                a.visibility_threshold
            )));
        }
        if a.calibration_attempts == 0 {
            return Err(Error::Config(
                "analysis.calibration_attempts must be at least 1".to_string(),
            ));
        }
        if a.sprint_finish_x <= a.sprint_start_x {
            return Err(Error::Config(format!(
                "analysis.sprint_finish_x ({}) must lie beyond sprint_start_x ({})",
                a.sprint_finish_x, a.sprint_start_x
            )));
        }
        if !matches!(a.shuttle_calibration.as_str(), "markers" | "lines") {
            return Err(Error::Config(format!(
                "analysis.shuttle_calibration must be \"markers\" or \"lines\", got {:?}",
                a.shuttle_calibration
            )));
        }
        if !matches!(a.shuttle_estimator.as_str(), "raw" | "linear_predictor") {
            return Err(Error::Config(format!(
                "analysis.shuttle_estimator must be \"raw\" or \"linear_predictor\", got {:?}",
                a.shuttle_estimator
            )));
        }
        for (name, ceiling) in self.scoring.entries() {
            if let Some(value) = ceiling {
                if !(value > 0.0) {
                    return Err(Error::Config(format!(
                        "scoring.{} ceiling must be positive, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Load and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Locate the config file following the priority order
///
/// Returns `None` when no file exists; callers then run on compiled defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory, then system-wide
    let user_config = dirs::config_dir().map(|d| d.join("khel").join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/khel").join(CONFIG_FILE_NAME);
    if system_config.exists() {
        return Some(system_config);
    }

    debug!("No config file found, using compiled defaults");
    None
}

/// Resolve and load configuration, falling back to defaults when no file exists
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        None => Ok(TomlConfig::default()),
    }
}
