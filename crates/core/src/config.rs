//! Enhancement configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by every component.
///
/// A page snapshot may carry its own copy under `config`; missing fields fall
/// back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Maximum sparklines drawn per timer tick
    pub sparkline_batch_size: usize,
    /// Delay between sparkline ticks in milliseconds
    pub sparkline_interval_ms: u64,
    /// Rows selected when a comparison block is set up
    pub compare_default_rows: usize,
    /// Prefix shown before tooltip values on comparison charts
    pub value_prefix: String,
    /// Accessibility description of the comparison x-axis
    pub x_axis_description: String,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            sparkline_batch_size: 20,
            sparkline_interval_ms: 1500,
            compare_default_rows: 5,
            value_prefix: "$".to_string(),
            x_axis_description: "Months".to_string(),
        }
    }
}

impl EnhanceConfig {
    /// Reject values that would stall the sparkline loop
    pub fn validate(&self) -> Result<()> {
        if self.sparkline_batch_size == 0 {
            return Err(Error::ConfigError(
                "sparkline_batch_size must be greater than 0".to_string(),
            ));
        }
        if self.sparkline_interval_ms == 0 {
            return Err(Error::ConfigError(
                "sparkline_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sparkline_interval(&self) -> Duration {
        Duration::from_millis(self.sparkline_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnhanceConfig::default();
        assert_eq!(config.sparkline_batch_size, 20);
        assert_eq!(config.sparkline_interval(), Duration::from_millis(1500));
        assert_eq!(config.compare_default_rows, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EnhanceConfig =
            serde_json::from_str(r#"{"sparkline_batch_size": 3}"#).unwrap();
        assert_eq!(config.sparkline_batch_size, 3);
        assert_eq!(config.value_prefix, "$");
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = EnhanceConfig {
            sparkline_batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EnhanceConfig {
            sparkline_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
