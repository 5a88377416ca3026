use anyhow::{Context as AnyhowContext, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_PATH: &str = "inputs.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "cibs/auto_budget.csv";
pub const DEFAULT_CONFIG_FILE: &str = "ciri.toml";

/// File locations for one run. Built once at startup and passed to every
/// adapter that touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Optional bucket template; the built-in seed buckets apply when absent.
    pub buckets_path: Option<PathBuf>,
}

impl Default for RunPaths {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            buckets_path: None,
        }
    }
}

/// Path flags given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub buckets: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    buckets_path: Option<PathBuf>,
}

impl RunPaths {
    /// Resolve paths from defaults, then the config file, then CLI overrides.
    ///
    /// With no explicit config, `ciri.toml` in the working directory is used
    /// if present. Relative paths inside a config file are taken relative to
    /// the file's own directory.
    pub fn resolve(config: Option<&Path>, overrides: PathOverrides) -> Result<Self> {
        let implicit = Path::new(DEFAULT_CONFIG_FILE);
        let config = match config {
            Some(path) => Some(path),
            None if implicit.is_file() => Some(implicit),
            None => None,
        };

        let mut paths = match config {
            Some(path) => Self::from_config_file(path)?,
            None => Self::default(),
        };

        if let Some(input) = overrides.input {
            paths.input_path = input;
        }
        if let Some(output) = overrides.output {
            paths.output_path = output;
        }
        if overrides.buckets.is_some() {
            paths.buckets_path = overrides.buckets;
        }

        log::debug!(
            "resolved paths: input={} output={} buckets={}",
            paths.input_path.display(),
            paths.output_path.display(),
            paths
                .buckets_path
                .as_deref()
                .map_or_else(|| "<built-in>".to_string(), |p| p.display().to_string())
        );
        Ok(paths)
    }

    fn from_config_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let anchor = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

        let defaults = Self::default();
        Ok(Self {
            input_path: file.input_path.map_or(defaults.input_path, anchor),
            output_path: file.output_path.map_or(defaults.output_path, anchor),
            buckets_path: file.buckets_path.map(anchor),
        })
    }
}
