use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{EnvError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Rendering knobs. Loadable from a JSON file; every field is optional there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Spaces per tree level in text output.
    pub indent: usize,
    /// Render through the environment wrapper; `false` shows defaults.
    pub wrap: bool,
    /// Key name to JSON value, applied where the sample injects its values.
    pub overrides: BTreeMap<String, Value>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { format: OutputFormat::Text, indent: 2, wrap: true, overrides: BTreeMap::new() }
    }
}

impl RenderOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EnvError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
