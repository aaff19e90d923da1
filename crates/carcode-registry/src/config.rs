//! Registry configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// What to do with a stored record when its artifact cannot be generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationFailurePolicy {
    /// Keep the record and report the failure
    #[default]
    Retain,
    /// Delete the record and its uploaded image before reporting the failure
    Compensate,
}

impl FromStr for GenerationFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "compensate" => Ok(Self::Compensate),
            other => Err(format!(
                "unknown generation failure policy '{}': expected 'retain' or 'compensate'",
                other
            )),
        }
    }
}

/// Directories and limits used by a [`crate::Registry`]
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Where uploaded vehicle images are written
    pub upload_dir: PathBuf,

    /// Where generated barcodes and QR codes are written
    pub code_dir: PathBuf,

    /// Upper bound for any single store or filesystem call
    pub operation_timeout: Duration,

    pub on_generation_failure: GenerationFailurePolicy,
}

impl RegistryConfig {
    /// Load configuration from environment variables
    ///
    /// Reads UPLOAD_DIR, CODE_DIR, OPERATION_TIMEOUT_SECONDS and
    /// GENERATION_FAILURE_POLICY, falling back to the defaults.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        Ok(Self {
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            code_dir: std::env::var("CODE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.code_dir),
            operation_timeout: match std::env::var("OPERATION_TIMEOUT_SECONDS") {
                Ok(value) => Duration::from_secs(
                    value
                        .parse()
                        .map_err(|_| "Invalid OPERATION_TIMEOUT_SECONDS value".to_string())?,
                ),
                Err(_) => defaults.operation_timeout,
            },
            on_generation_failure: match std::env::var("GENERATION_FAILURE_POLICY") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.on_generation_failure,
            },
        })
    }

    /// Configuration rooted in a single base directory
    pub fn with_base_dir(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            upload_dir: base.join("uploads"),
            code_dir: base.join("codes"),
            ..Self::default()
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/uploads"),
            code_dir: PathBuf::from("static/codes"),
            operation_timeout: Duration::from_secs(10),
            on_generation_failure: GenerationFailurePolicy::Retain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("retain".parse::<GenerationFailurePolicy>(), Ok(GenerationFailurePolicy::Retain));
        assert_eq!(" Compensate".parse::<GenerationFailurePolicy>(), Ok(GenerationFailurePolicy::Compensate));
        assert!("rollback".parse::<GenerationFailurePolicy>().is_err());
    }

    #[test]
    fn test_with_base_dir() {
        let config = RegistryConfig::with_base_dir("/tmp/carcode");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/carcode/uploads"));
        assert_eq!(config.code_dir, PathBuf::from("/tmp/carcode/codes"));
        assert_eq!(config.operation_timeout, Duration::from_secs(10));
    }
}
