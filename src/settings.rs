//! The `.plgInfo` YAML settings file.
//!
//! ```yaml
//! Author: Someone
//! Version:
//!   Major: 1
//!   Minor: 0
//!   Revision: 2
//! Title: My plugin
//! Summary: One line
//! Description: Longer text
//! Targets: [0x000EE000]
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::metadata::{Metadata, Version};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("couldn't open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawVersion {
    #[serde(default)]
    pub major: u32,
    #[serde(default)]
    pub minor: u32,
    #[serde(default)]
    pub revision: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSettings {
    #[serde(default)]
    pub version: Option<RawVersion>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub targets: Vec<u32>,
}

impl RawSettings {
    pub fn from_str(s: &str) -> Result<Self, serde_yaml::Error> {
        if s.trim().is_empty() {
            return Ok(RawSettings::default());
        }
        serde_yaml::from_str(s)
    }
}

impl From<RawVersion> for Version {
    fn from(raw: RawVersion) -> Self {
        Version::new(raw.major, raw.minor, raw.revision)
    }
}

impl From<RawSettings> for Metadata {
    fn from(raw: RawSettings) -> Self {
        Metadata {
            version: raw.version.map(Version::from).unwrap_or_default(),
            author: raw.author,
            title: raw.title,
            summary: raw.summary,
            description: raw.description,
            targets: raw.targets,
        }
    }
}

impl TryFrom<&str> for Metadata {
    type Error = SettingsError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Ok(Metadata::from(RawSettings::from_str(s)?))
    }
}

pub fn load(path: &Path) -> Result<Metadata, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Metadata::try_from(text.as_str())
}
