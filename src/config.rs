use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::Level;

const DEFAULT_CONFIG: &str = "navhist.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Launch the system handler on navigation instead of only logging it.
    pub open_externally: bool,
    /// Addresses recorded before the first frame is drawn.
    pub start: Vec<String>,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_externally: true,
            start: Vec::new(),
            log_file: PathBuf::from("navhist.log"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `explicit` if given, else `navhist.toml` from the working
    /// directory when it exists, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG).exists() => Self::load(Path::new(DEFAULT_CONFIG)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Parsing config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .with_context(|| format!("Invalid log level {}", self.log_level))
    }
}
