use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const INSTANCE_DIR_VAR: &str = "PORTFOLIO_INSTANCE_DIR";
pub const LOG_LEVEL_VAR: &str = "PORTFOLIO_LOG_LEVEL";
pub const INSTANCE_VAR: &str = "PORTFOLIO_INSTANCE";
pub const SAMPLES_VAR: &str = "PORTFOLIO_SAMPLES";
pub const SEED_VAR: &str = "PORTFOLIO_SEED";
pub const REPORT_VAR: &str = "PORTFOLIO_REPORT";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_INSTANCE: &str = "data/two_stocks.txt";
const DEFAULT_SAMPLES: usize = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable `{key}` has an invalid value `{value}`")]
    InvalidValue { key: &'static str, value: String },
    #[error("`{0}` must be greater than zero")]
    MustBePositive(&'static str),
}

/// Settings shared by everything that loads an instance.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProblemConfig {
    /// Directory that relative instance paths are resolved against.
    pub instance_dir: PathBuf,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        ProblemConfig {
            instance_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")),
            log_level: DEFAULT_LOG_LEVEL.into(),
        }
    }
}

impl ProblemConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ProblemConfig::default();
        ProblemConfig {
            instance_dir: lookup(INSTANCE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.instance_dir),
            log_level: lookup(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
        }
    }

    pub fn resolve_instance_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.instance_dir.join(path)
        }
    }

    /// Installs the global tracing subscriber. Call once, from a binary.
    pub fn init_tracing(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Settings of the baseline sampling run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BaselineConfig {
    #[serde(flatten)]
    pub problem: ProblemConfig,
    pub instance: PathBuf,
    pub samples: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub report: Option<PathBuf>,
}

impl BaselineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let samples = parse_var(&lookup, SAMPLES_VAR)?.unwrap_or(DEFAULT_SAMPLES);
        if samples == 0 {
            return Err(ConfigError::MustBePositive(SAMPLES_VAR));
        }

        Ok(BaselineConfig {
            problem: ProblemConfig::from_lookup(&lookup),
            instance: lookup(INSTANCE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTANCE)),
            samples,
            seed: parse_var(&lookup, SEED_VAR)?,
            report: lookup(REPORT_VAR).map(PathBuf::from),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
