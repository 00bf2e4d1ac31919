//! YAML description of a single child to run.
//!
//! ```yaml
//! executable_path: /usr/bin/tr
//! args: ["a-z", "A-Z"]
//! ```

use crate::validation::{validate_arguments, validate_executable};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Program and arguments for one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub executable_path: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ExecutionConfig {
    pub fn new<I>(executable_path: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            executable_path: executable_path.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::load_from_string(&content)
    }

    /// Load configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        let config: ExecutionConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_executable(&self.executable_path).context("Invalid executable_path")?;
        validate_arguments(&self.args).context("Invalid args")?;
        Ok(())
    }
}
