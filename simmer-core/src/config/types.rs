//! Configuration type definitions
//!
//! These types hold the tunables of the planner and the input limits applied
//! to every item. Configuration can be embedded as TOML text.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default grouping threshold (°C)
pub const DEFAULT_GROUP_THRESHOLD_C: i16 = 10;

/// Default rest between two phases (minutes)
pub const DEFAULT_REST_GAP_MIN: u16 = 2;

/// Errors from configuration loading and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML text could not be parsed into a config
    Parse,
    /// Parsed values are inconsistent (e.g. min above max)
    Invalid,
}

/// Input limits for session items
///
/// Out-of-range values are never rejected; they are pulled back into range
/// when an item is created or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemLimits {
    /// Lowest accepted temperature (°C)
    pub min_temp_c: i16,
    /// Highest accepted temperature (°C)
    pub max_temp_c: i16,
    /// Used for non-finite or too-low temperatures (°C)
    pub default_temp_c: i16,
    /// Shortest accepted cook time (minutes)
    pub min_time_min: u16,
    /// Longest accepted cook time (minutes)
    pub max_time_min: u16,
    /// Used for non-finite cook times (minutes)
    pub default_time_min: u16,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            min_temp_c: 80,
            max_temp_c: 260,
            default_temp_c: 180,
            min_time_min: 1,
            max_time_min: 120,
            default_time_min: 10,
        }
    }
}

impl ItemLimits {
    /// Sanitize a raw temperature from an entry form
    ///
    /// Non-finite values and values below the floor fall back to the
    /// default temperature; values above the ceiling are clamped to it.
    pub fn clamp_temperature(&self, raw_c: f32) -> i16 {
        if !raw_c.is_finite() || raw_c < self.min_temp_c as f32 {
            return self.default_temp_c;
        }
        if raw_c > self.max_temp_c as f32 {
            return self.max_temp_c;
        }
        round_positive(raw_c).clamp(self.min_temp_c as i32, self.max_temp_c as i32) as i16
    }

    /// Sanitize a raw cook time from an entry form
    pub fn clamp_time(&self, raw_min: f32) -> u16 {
        if !raw_min.is_finite() {
            return self.default_time_min;
        }
        if raw_min < self.min_time_min as f32 {
            return self.min_time_min;
        }
        if raw_min > self.max_time_min as f32 {
            return self.max_time_min;
        }
        round_positive(raw_min).clamp(self.min_time_min as i32, self.max_time_min as i32) as u16
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let temps_ok = self.min_temp_c > 0
            && self.min_temp_c < self.max_temp_c
            && (self.min_temp_c..=self.max_temp_c).contains(&self.default_temp_c);
        let times_ok = self.min_time_min > 0
            && self.min_time_min < self.max_time_min
            && (self.min_time_min..=self.max_time_min).contains(&self.default_time_min);

        if temps_ok && times_ok {
            Ok(())
        } else {
            Err(ConfigError::Invalid)
        }
    }
}

/// Round a non-negative float half-up without `libm`
fn round_positive(value: f32) -> i32 {
    (value + 0.5) as i32
}

/// Planner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CookingConfig {
    /// Item input limits
    pub limits: ItemLimits,
    /// Max distance from a cluster's running average to join it (°C)
    pub group_threshold_c: i16,
    /// Rest inserted after every phase except the last (minutes)
    pub rest_gap_min: u16,
}

impl Default for CookingConfig {
    fn default() -> Self {
        Self {
            limits: ItemLimits::default(),
            group_threshold_c: DEFAULT_GROUP_THRESHOLD_C,
            rest_gap_min: DEFAULT_REST_GAP_MIN,
        }
    }
}

impl CookingConfig {
    /// Check that the configured values are consistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_threshold_c < 0 {
            return Err(ConfigError::Invalid);
        }
        self.limits.validate()
    }

    /// Parse and validate a config from TOML text
    ///
    /// Missing keys take their default values.
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: CookingConfig = toml::from_str(text).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}
