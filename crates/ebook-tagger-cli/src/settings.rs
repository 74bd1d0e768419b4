// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI settings file

use anyhow::{Context, Result};
use ebook_tagger_core::ConvertConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upload size limit, in MiB
pub const MAX_FILE_SIZE_MB: u64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_megabytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_megabytes: MAX_FILE_SIZE_MB,
        }
    }
}

impl UploadLimits {
    pub fn max_bytes(&self) -> u64 {
        self.max_megabytes.saturating_mul(1024 * 1024)
    }
}

/// Contents of the `--config` TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub upload: UploadLimits,
    pub convert: ConvertConfig,
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("invalid settings")
    }

    /// Settings from `path`, or the defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }
}
