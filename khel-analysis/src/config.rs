//! Configuration resolution for khel-analysis
//!
//! Service-level values resolve with CLI → ENV → TOML → default priority.
//! Engine tuning comes from the `[analysis]` and `[scoring]` tables only.
//! The resolved `ServiceConfig` is passed explicitly into the app state and
//! the session orchestrator.

use khel_common::config::{AnalysisConfig, TomlConfig};
use khel_common::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::score::ScoreNormalizer;
use crate::tracking::EstimatorKind;

pub const HOST_ENV_VAR: &str = "KHEL_HOST";
pub const PORT_ENV_VAR: &str = "KHEL_PORT";
pub const SECRET_ENV_VAR: &str = "KHEL_SHARED_SECRET";
pub const CALLBACK_URL_ENV_VAR: &str = "KHEL_CALLBACK_URL";

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub shared_secret: Option<String>,
    pub callback_url: Option<String>,
}

/// How the shuttle-run references are found when the request supplies none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuttleCalibration {
    Markers,
    Lines,
}

impl FromStr for ShuttleCalibration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "markers" => Ok(ShuttleCalibration::Markers),
            "lines" => Ok(ShuttleCalibration::Lines),
            other => Err(Error::Config(format!("Unknown shuttle calibration {:?}", other))),
        }
    }
}

/// Engine tuning shared by every session
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Minimum landmark visibility for a frame to count
    pub visibility_threshold: f64,
    /// Leading frames ignored before calibration is attempted
    pub settle_frames: u64,
    /// Calibration attempts before the session fails
    pub calibration_attempts: u32,
    pub shuttle_calibration: ShuttleCalibration,
    pub shuttle_estimator: EstimatorKind,
    /// Sprint start line, pixels
    pub sprint_start_x: f64,
    /// Sprint finish line, pixels
    pub sprint_finish_x: f64,
    /// Jump height earning the "explosive" strength
    pub explosive_jump_cm: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            settle_frames: 10,
            calibration_attempts: 30,
            shuttle_calibration: ShuttleCalibration::Markers,
            shuttle_estimator: EstimatorKind::Raw,
            sprint_start_x: 100.0,
            sprint_finish_x: 1200.0,
            explosive_jump_cm: 40.0,
        }
    }
}

impl AnalysisSettings {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            visibility_threshold: config.visibility_threshold,
            settle_frames: config.settle_frames,
            calibration_attempts: config.calibration_attempts,
            shuttle_calibration: config.shuttle_calibration.parse()?,
            shuttle_estimator: config.shuttle_estimator.parse()?,
            sprint_start_x: config.sprint_start_x,
            sprint_finish_x: config.sprint_finish_x,
            explosive_jump_cm: config.explosive_jump_cm,
        })
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Empty disables authentication
    pub shared_secret: String,
    pub callback_url: Option<String>,
    /// Directory for spooled uploads, system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    /// Watchdog bound for one session, `None` when disabled
    pub session_timeout: Option<Duration>,
    pub log_level: String,
    pub analysis: AnalysisSettings,
    pub scoring: ScoreNormalizer,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let toml = TomlConfig::default();
        Self {
            host: toml.host,
            port: toml.port,
            shared_secret: toml.shared_secret,
            callback_url: toml.callback_url,
            temp_dir: toml.temp_dir,
            session_timeout: timeout_from_secs(toml.session_timeout_secs),
            log_level: toml.logging.level,
            analysis: AnalysisSettings::default(),
            scoring: ScoreNormalizer::default(),
        }
    }
}

impl ServiceConfig {
    /// Merge CLI flags, environment and the TOML file
    pub fn resolve(toml: &TomlConfig, cli: &CliOverrides) -> Result<Self> {
        let host = resolve_value("host", cli.host.clone(), HOST_ENV_VAR, Some(toml.host.clone()))?
            .unwrap_or_else(|| toml.host.clone());
        let port = resolve_value("port", cli.port, PORT_ENV_VAR, Some(toml.port))?
            .unwrap_or(toml.port);
        let shared_secret = resolve_value(
            "shared_secret",
            cli.shared_secret.clone(),
            SECRET_ENV_VAR,
            non_empty(&toml.shared_secret),
        )?
        .unwrap_or_default();
        let callback_url = resolve_value(
            "callback_url",
            cli.callback_url.clone(),
            CALLBACK_URL_ENV_VAR,
            toml.callback_url.as_deref().and_then(non_empty),
        )?;

        Ok(Self {
            host,
            port,
            shared_secret,
            callback_url,
            temp_dir: toml.temp_dir.clone(),
            session_timeout: timeout_from_secs(toml.session_timeout_secs),
            log_level: toml.logging.level.clone(),
            analysis: AnalysisSettings::from_config(&toml.analysis)?,
            scoring: ScoreNormalizer::from_config(&toml.scoring)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Resolve one setting from its tiers
///
/// **Priority:** CLI → ENV → TOML. Returns `None` if no tier supplies a value.
fn resolve_value<T>(name: &str, cli: Option<T>, env_var: &str, toml: Option<T>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let env = match std::env::var(env_var).ok().as_deref().and_then(non_empty) {
        Some(raw) => Some(raw.parse::<T>().map_err(|e| {
            Error::Config(format!("{} has invalid value {:?}: {}", env_var, raw, e))
        })?),
        None => None,
    };

    let mut sources = Vec::new();
    if cli.is_some() {
        sources.push("command line");
    }
    if env.is_some() {
        sources.push("environment");
    }
    if cli.is_some() && env.is_some() {
        warn!(
            "{} set in multiple sources: {}. Using command line (highest priority).",
            name,
            sources.join(", ")
        );
    }

    if let Some(value) = cli {
        info!("{} loaded from command line", name);
        return Ok(Some(value));
    }
    if let Some(value) = env {
        info!("{} loaded from environment variable {}", name, env_var);
        return Ok(Some(value));
    }
    Ok(toml)
}
