use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

///
/// Engine configuration. Everything is optional; an empty file yields an engine
/// with no expressions, no comparison tracks and no exclusions.
///
/// ```toml
/// expressions = ["gnomad.AF", "gnomad.ID"]
/// comparisons = ["hapmap"]
/// dbsnp = "dbsnp"
/// require_allele_match = true
/// exclude = ["Coverage"]
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// `resource.field` expressions copied from comparison resources
    pub expressions: Vec<String>,
    /// resources used as boolean overlap flags, flagged under their own name
    pub comparisons: Vec<String>,
    /// resource used to fill the ID field (and the `DB` flag)
    pub dbsnp: Option<String>,
    /// match alleles before copying any expression value, whatever its cardinality
    pub require_allele_match: bool,
    /// annotator names to drop
    pub exclude: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl FromStr for AnnotatorConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl TryFrom<&Path> for AnnotatorConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        toml_str.parse()
    }
}
