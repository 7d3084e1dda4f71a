use std::{fs, path::Path};

use serde_derive::Deserialize;

use crate::{codec::HeaderStrategy, HuffmanError};

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub header: HeaderStrategy,
    /// Print sizes, ratio and timings after each run.
    pub report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header: HeaderStrategy::FrequencyTable,
            report: true,
        }
    }
}

impl Config {
    pub fn new(path: &Path) -> Result<Self, HuffmanError> {
        let content =
            fs::read_to_string(path).map_err(|e| HuffmanError::MissingConfigurationFile {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, HuffmanError> {
        toml::from_str(content).map_err(HuffmanError::InvalidConfig)
    }
}
