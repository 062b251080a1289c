//! Task variants and aggregation configuration.
//!
//! A configuration is built once, validated up front, and passed by reference
//! into every aggregation call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, OptionExt, Result};

/// Resolution used by the published TTE and HMP splits.
pub const DEFAULT_RESOLUTION: u8 = 9;

/// Finest resolution supported by H3.
const MAX_RESOLUTION: u8 = 15;

/// Downstream task a corpus is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskVariant {
    /// Travel-time estimation: records carry the trip duration.
    Estimation,
    /// Human mobility prediction: records carry a prefix/suffix split.
    Prediction,
    /// Plain cell sequences, no derived fields.
    Raw,
}

impl TaskVariant {
    /// Dataset version identifier for this variant.
    pub fn version_id(&self) -> &'static str {
        match self {
            TaskVariant::Estimation => "TTE",
            TaskVariant::Prediction => "HMP",
            TaskVariant::Raw => "all",
        }
    }

    /// Resolution used when the caller does not pass one.
    pub fn default_resolution(&self) -> Option<u8> {
        match self {
            TaskVariant::Estimation | TaskVariant::Prediction => Some(DEFAULT_RESOLUTION),
            TaskVariant::Raw => None,
        }
    }
}

impl fmt::Display for TaskVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskVariant::Estimation => "Estimation",
            TaskVariant::Prediction => "Prediction",
            TaskVariant::Raw => "Raw",
        };
        f.write_str(name)
    }
}

impl FromStr for TaskVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tte" | "estimation" => Ok(TaskVariant::Estimation),
            "hmp" | "prediction" => Ok(TaskVariant::Prediction),
            "all" | "raw" => Ok(TaskVariant::Raw),
            _ => Err(Error::UnknownVariant(s.to_string())),
        }
    }
}

/// Validated configuration for one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub variant: TaskVariant,
    /// H3 resolution (0..=15)
    pub resolution: u8,
}

impl AggregationConfig {
    /// Create a configuration, falling back to the variant's default resolution.
    ///
    /// Fails when the variant has no default and `resolution` is `None`, or when
    /// the resolution is outside the grid's range.
    ///
    /// # Example
    /// ```
    /// use hextrail::{AggregationConfig, TaskVariant};
    ///
    /// let config = AggregationConfig::new(TaskVariant::Prediction, None).unwrap();
    /// assert_eq!(config.resolution, 9);
    /// assert!(AggregationConfig::new(TaskVariant::Raw, None).is_err());
    /// ```
    pub fn new(variant: TaskVariant, resolution: Option<u8>) -> Result<Self> {
        let resolution = resolution
            .or_else(|| variant.default_resolution())
            .ok_or_missing_resolution(variant)?;

        if resolution > MAX_RESOLUTION {
            return Err(Error::InvalidResolution(resolution));
        }

        Ok(Self {
            variant,
            resolution,
        })
    }

    /// Create a configuration from a dataset version identifier (`TTE`, `HMP`, `all`).
    pub fn from_version(version: &str, resolution: Option<u8>) -> Result<Self> {
        Self::new(version.parse()?, resolution)
    }
}
