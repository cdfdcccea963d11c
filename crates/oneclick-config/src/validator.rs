//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::HostConfig;

/// Ten years.
const MAX_RETENTION_HOURS: u64 = 87_600;

/// One week.
const MAX_SWEEP_INTERVAL_MINUTES: u64 = 10_080;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting the first invalid field.
    pub fn validate(config: &HostConfig) -> Result<(), ConfigError> {
        Self::validate_vendor(config)?;
        Self::validate_logging(config)?;
        Self::validate_detect(config)?;
        Ok(())
    }

    fn validate_vendor(config: &HostConfig) -> Result<(), ConfigError> {
        let vendor = &config.vendor;
        if !vendor.base_url.starts_with("http://") && !vendor.base_url.starts_with("https://") {
            return Err(invalid(
                "vendor.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        for (field, path) in [
            ("vendor.login_path", &vendor.login_path),
            ("vendor.call_path", &vendor.call_path),
        ] {
            if !path.starts_with('/') {
                return Err(invalid(field, "path must start with '/'"));
            }
        }

        if vendor.timeout_seconds == 0 {
            return Err(invalid(
                "vendor.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }
        Ok(())
    }

    fn validate_logging(config: &HostConfig) -> Result<(), ConfigError> {
        if config.logging.max_entries == 0 {
            return Err(invalid(
                "logging.max_entries",
                "max_entries must be greater than 0",
            ));
        }
        if config.logging.retention_hours > MAX_RETENTION_HOURS {
            return Err(invalid(
                "logging.retention_hours",
                &format!("retention_hours must be at most {}", MAX_RETENTION_HOURS),
            ));
        }
        if config.logging.sweep_interval_minutes == 0 {
            return Err(invalid(
                "logging.sweep_interval_minutes",
                "sweep_interval_minutes must be greater than 0",
            ));
        }
        if config.logging.sweep_interval_minutes > MAX_SWEEP_INTERVAL_MINUTES {
            return Err(invalid(
                "logging.sweep_interval_minutes",
                &format!(
                    "sweep_interval_minutes must be at most {}",
                    MAX_SWEEP_INTERVAL_MINUTES
                ),
            ));
        }
        Ok(())
    }

    fn validate_detect(config: &HostConfig) -> Result<(), ConfigError> {
        if config.detect.max_pending_mutations == 0 {
            return Err(invalid(
                "detect.max_pending_mutations",
                "max_pending_mutations must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}
