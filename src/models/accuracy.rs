//! Accuracy configuration: which dataset variant to read per level.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AdminLevel;
use crate::error::{LookupError, Result};

/// Accuracy value used for every required level when no config is given
pub const DEFAULT_ACCURACY: i64 = 1;

/// Per-level accuracy values as supplied by a caller.
///
/// Missing keys are only an error for levels the called lookup needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amphoe: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tambon: Option<i64>,
}

impl AccuracyConfig {
    /// Same accuracy value for all three levels
    pub fn uniform(accuracy: i64) -> Self {
        Self {
            province: Some(accuracy),
            amphoe: Some(accuracy),
            tambon: Some(accuracy),
        }
    }

    pub fn get(&self, level: AdminLevel) -> Option<i64> {
        match level {
            AdminLevel::Province => self.province,
            AdminLevel::Amphoe => self.amphoe,
            AdminLevel::Tambon => self.tambon,
        }
    }

    pub fn set(&mut self, level: AdminLevel, accuracy: i64) {
        match level {
            AdminLevel::Province => self.province = Some(accuracy),
            AdminLevel::Amphoe => self.amphoe = Some(accuracy),
            AdminLevel::Tambon => self.tambon = Some(accuracy),
        }
    }

    /// Fill keys absent here from `defaults`
    pub fn or(self, defaults: &AccuracyConfig) -> Self {
        Self {
            province: self.province.or(defaults.province),
            amphoe: self.amphoe.or(defaults.amphoe),
            tambon: self.tambon.or(defaults.tambon),
        }
    }

    /// Check that every level from the province down to `depth` has a value.
    ///
    /// Sign is not checked; a value without a backing dataset fails later
    /// with `DatasetNotFound`.
    pub fn resolve(&self, depth: AdminLevel) -> Result<ResolvedAccuracy> {
        let mut resolved = ResolvedAccuracy {
            depth,
            values: [DEFAULT_ACCURACY; 3],
        };
        for level in depth.chain() {
            let value = self.get(*level).ok_or_else(|| {
                LookupError::InvalidAccuracyConfig(format!("missing key '{}'", level))
            })?;
            resolved.values[level_index(*level)] = value;
        }
        Ok(resolved)
    }

    /// Parse untyped input for a lookup down to `depth`.
    ///
    /// The value must be an object. Only the keys that lookup needs are
    /// read, and each must hold a whole number (`1` or `1.0`). Other keys
    /// are ignored whatever they hold. A missing needed key is left unset
    /// for `resolve` to report.
    pub fn from_json(value: &Value, depth: AdminLevel) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            LookupError::InvalidAccuracyConfig("expected an object".to_string())
        })?;

        let mut config = Self::default();
        for level in depth.chain() {
            let Some(raw) = object.get(level.field_name()) else {
                continue;
            };
            config.set(*level, whole_number(*level, raw)?);
        }
        Ok(config)
    }
}

fn whole_number(level: AdminLevel, raw: &Value) -> Result<i64> {
    if let Some(accuracy) = raw.as_i64() {
        return Ok(accuracy);
    }
    let number = raw.as_f64().ok_or_else(|| {
        LookupError::InvalidAccuracyConfig(format!(
            "key '{}' must be a number, got {}",
            level, raw
        ))
    })?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    let in_range = number >= i64::MIN as f64 && number < i64::MAX as f64;
    if number.fract() != 0.0 || !in_range {
        return Err(LookupError::InvalidAccuracyConfig(format!(
            "key '{}' must be a whole number, got {}",
            level, raw
        )));
    }
    Ok(number as i64)
}

/// Accuracy values checked against a lookup depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAccuracy {
    depth: AdminLevel,
    values: [i64; 3],
}

impl ResolvedAccuracy {
    /// Defaults for every level up to `depth`
    pub fn defaults(depth: AdminLevel) -> Self {
        Self {
            depth,
            values: [DEFAULT_ACCURACY; 3],
        }
    }

    pub fn depth(&self) -> AdminLevel {
        self.depth
    }

    /// Accuracy for `level`. Levels deeper than the resolved depth report the default.
    pub fn get(&self, level: AdminLevel) -> i64 {
        self.values[level_index(level)]
    }
}

fn level_index(level: AdminLevel) -> usize {
    usize::from(level.number() - 1)
}
