use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ResampleError, Result};
use crate::resolution::{BucketLabel, Resolution};

/// Settings for a single resample call; any field left out of a TOML file takes its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleOptions {
    pub resolution: Resolution,
    pub destination: Option<PathBuf>,
    pub geo_output: bool,
    pub label: BucketLabel,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::Daily,
            destination: None,
            geo_output: true,
            label: BucketLabel::Start,
        }
    }
}

impl ResampleOptions {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ResampleError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_geo_output(mut self, geo_output: bool) -> Self {
        self.geo_output = geo_output;
        self
    }

    pub fn with_label(mut self, label: BucketLabel) -> Self {
        self.label = label;
        self
    }
}
