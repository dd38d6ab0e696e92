//! Driver configuration.
//!
//! Per-instance parameters for one potentiometer. Values can come from a
//! JSON provisioning payload or a compact postcard blob in flash; both
//! paths validate before handing a config back.

use serde::{Deserialize, Serialize};

use crate::device::Variant;
use crate::driver::ShutdownMode;
use crate::error::ConfigError;

/// Short instance name used as the log prefix.
pub type Label = heapless::String<16>;

/// Build a label from `name`, truncating at capacity.
pub fn label(name: &str) -> Label {
    let mut label = Label::new();
    for c in name.chars() {
        if label.push(c).is_err() {
            break;
        }
    }
    label
}

/// Configuration for one AD5220 instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotConfig {
    /// Log prefix, e.g. "gain" or "pot1".
    pub label: Label,
    /// Resistance between A and B at the top tap, in ohms.
    /// Nominal grade or a measured value for a calibrated part.
    pub full_scale_ohms: u32,
    /// What `close()` does with the wiper and lines.
    pub shutdown: ShutdownMode,
}

impl Default for PotConfig {
    fn default() -> Self {
        Self::for_variant(Variant::K10)
    }
}

impl PotConfig {
    /// Nominal config for a resistance grade.
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            label: label("ad5220"),
            full_scale_ohms: variant.full_scale_ohms(),
            shutdown: ShutdownMode::Restore,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.full_scale_ohms == 0 {
            return Err(ConfigError::ValidationFailed(
                "full_scale_ohms must be non-zero",
            ));
        }
        if self.label.is_empty() {
            return Err(ConfigError::ValidationFailed("label must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate a JSON provisioning payload.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|_| ConfigError::Encode)
    }

    /// Encode as a postcard blob for persistent storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Encode)
    }

    /// Decode and validate a stored postcard blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }
}
