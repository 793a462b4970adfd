//! Driver configuration.

use crate::calibration::CalibrationProfile;
use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};

/// Default number of `GLB_STATE` reads Stop performs before giving up.
pub const DEFAULT_POLL_LIMIT: u32 = 100;

/// What Stop does when the chip never reports idle within the poll budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollExhaustion {
    /// Enter standby, then fail with [`ProtocolError::PollTimeout`].
    #[default]
    Report,
    /// Enter standby, log a warning and report success.
    Ignore,
}

/// Configuration for one [`Aw8624`](crate::Aw8624) instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Maximum `GLB_STATE` reads during Stop. Must be at least 1.
    pub poll_limit: u32,

    pub poll_exhaustion: PollExhaustion,

    pub calibration: CalibrationProfile,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_limit: DEFAULT_POLL_LIMIT,
            poll_exhaustion: PollExhaustion::default(),
            calibration: CalibrationProfile::default(),
        }
    }
}

impl DriverConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> DriverConfigBuilder {
        DriverConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `poll_limit` is zero or the calibration profile is
    /// invalid.
    pub fn validate(&self) -> ProtocolResult<()> {
        if self.poll_limit == 0 {
            return Err(ProtocolError::invalid_configuration(
                "poll_limit must be at least 1",
            ));
        }
        self.calibration.validate()
    }
}

/// Builder for `DriverConfig`.
#[derive(Debug, Default)]
pub struct DriverConfigBuilder {
    config: DriverConfig,
}

impl DriverConfigBuilder {
    #[must_use]
    pub fn poll_limit(mut self, limit: u32) -> Self {
        self.config.poll_limit = limit;
        self
    }

    #[must_use]
    pub fn poll_exhaustion(mut self, policy: PollExhaustion) -> Self {
        self.config.poll_exhaustion = policy;
        self
    }

    #[must_use]
    pub fn calibration(mut self, calibration: CalibrationProfile) -> Self {
        self.config.calibration = calibration;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> ProtocolResult<DriverConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.poll_limit, 100);
        assert_eq!(config.poll_exhaustion, PollExhaustion::Report);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() -> ProtocolResult<()> {
        let config = DriverConfig::builder()
            .poll_limit(5)
            .poll_exhaustion(PollExhaustion::Ignore)
            .build()?;
        assert_eq!(config.poll_limit, 5);
        assert_eq!(config.poll_exhaustion, PollExhaustion::Ignore);
        Ok(())
    }

    #[test]
    fn test_zero_poll_limit_rejected() {
        let result = DriverConfig::builder().poll_limit(0).build();
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_builder_propagates_calibration_errors() {
        let calibration = CalibrationProfile {
            f0_pre: 0,
            ..CalibrationProfile::default()
        };
        let result = DriverConfig::builder().calibration(calibration).build();
        assert!(matches!(result, Err(ProtocolError::InvalidCalibration(_))));
    }

    #[test]
    fn test_policy_serde_names() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&PollExhaustion::Ignore)?, "\"ignore\"");
        let config: DriverConfig =
            serde_json::from_str(r#"{ "poll_limit": 10, "poll_exhaustion": "report" }"#)?;
        assert_eq!(config.poll_limit, 10);
        Ok(())
    }
}
