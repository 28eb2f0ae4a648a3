use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::algorithms::scc::SCCConfig;
use crate::error::ConfigError;

/// Capacity of the buffered reader used for edge files.
pub const READ_BUFFER_SIZE: usize = 1 << 20;

/// Number of components reported when neither the command line nor the config file says otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// How the final report is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `Leader: <id>, Size: <size>` lines, followed by `Finished` when fewer components exist than requested.
    #[default]
    Text,
    /// The full report serialized as YAML.
    Yaml,
}

/// A run configuration as read from a YAML file or collected from the command line.
///
/// Every field is optional so that partial configurations can be layered with
/// [`RunConfig::merge`]; [`RunConfig::resolve`] then checks that the required
/// values are present and fills in the defaults.
///
/// ```yaml
/// edges: data/web-Google.txt
/// vertex_count: 875714
/// top_k: 5
/// format: text
/// verify: false
/// progress: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub edges: Option<PathBuf>,
    pub vertex_count: Option<u64>,
    pub top_k: Option<usize>,
    pub format: Option<ReportFormat>,
    pub verify: Option<bool>,
    pub progress: Option<bool>,
}

/// A run configuration with every value decided.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub edges: PathBuf,
    pub scc: SCCConfig,
    pub top_k: usize,
    pub format: ReportFormat,
    pub progress: bool,
}

impl RunConfig {
    /// Reads a configuration from a YAML file.
    ///
    /// A relative `edges` path is taken relative to the directory holding the
    /// config file, so a config and its edge list can move together.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.display().to_string(),
            error,
        })?;
        let mut config = Self::from_yaml_str(&text, &path.display().to_string())?;

        if let (Some(edges), Some(base)) = (config.edges.as_mut(), path.parent()) {
            if edges.is_relative() {
                *edges = base.join(&*edges);
            }
        }
        Ok(config)
    }

    /// Parses a configuration from YAML text. `origin` only names the text in errors.
    pub fn from_yaml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|error| ConfigError::Parse {
            path: origin.to_string(),
            error,
        })
    }

    /// Layers `overrides` on top of `self`; values present in `overrides` win.
    pub fn merge(self, overrides: RunConfig) -> RunConfig {
        RunConfig {
            edges: overrides.edges.or(self.edges),
            vertex_count: overrides.vertex_count.or(self.vertex_count),
            top_k: overrides.top_k.or(self.top_k),
            format: overrides.format.or(self.format),
            verify: overrides.verify.or(self.verify),
            progress: overrides.progress.or(self.progress),
        }
    }

    /// Checks that `edges` and `vertex_count` are set and fills every other
    /// value with its default.
    ///
    /// # Errors
    /// [`ConfigError::Missing`] names the first required value that is unset.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let edges = self.edges.ok_or(ConfigError::Missing("edges"))?;
        let vertex_count = self.vertex_count.ok_or(ConfigError::Missing("vertex_count"))?;

        Ok(ResolvedConfig {
            edges,
            scc: SCCConfig {
                vertex_count,
                verify: self.verify.unwrap_or(false),
            },
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            format: self.format.unwrap_or_default(),
            progress: self.progress.unwrap_or(true),
        })
    }
}
