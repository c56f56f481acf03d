//! Worker configuration from environment variables.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Idle-retry delay and in-flight poll granularity. Always positive.
    pub job_check_interval: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `JOB_CHECK_INTERVAL`: seconds between job checks (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let seconds: f64 = std::env::var("JOB_CHECK_INTERVAL")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("JOB_CHECK_INTERVAL", "must be a number"))?;

        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ConfigError::Invalid(
                "JOB_CHECK_INTERVAL",
                "must be a positive number of seconds",
            ));
        }

        Ok(Self {
            job_check_interval: Duration::from_secs_f64(seconds),
        })
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            job_check_interval: Duration::from_secs(10),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
