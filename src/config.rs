use crate::error::{Error, Result};
use std::env;

/// Grace window for simultaneous ticketing on domestic-like journeys.
pub const DEFAULT_DOMESTIC_GRACE_MINUTES: i64 = 30;

/// Configuration for the reissue-engine CLI and validators.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output format: "human" (default) or "json"
    pub output_format: String,

    /// Log level or filter directive (default: "info")
    pub log_level: String,

    /// Minutes after the latest booking still counted as simultaneous
    /// ticketing on domestic, transborder and Canadian foreign domestic
    /// journeys
    pub domestic_grace_minutes: i64,

    /// Validate every fare usage individually (2012 advance purchase rules)
    pub adv_res_2012: bool,
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Config {
            output_format: "human".to_string(),
            log_level: "info".to_string(),
            domestic_grace_minutes: DEFAULT_DOMESTIC_GRACE_MINUTES,
            adv_res_2012: false,
        }
    }

    /// Get output format
    pub fn get_output_format(&self) -> &str {
        &self.output_format
    }

    /// Set output format ("human" or "json")
    pub fn set_output_format(&mut self, format: String) {
        self.output_format = format;
    }

    /// Get log level
    pub fn get_log_level(&self) -> &str {
        &self.log_level
    }

    /// Set log level
    pub fn set_log_level(&mut self, level: String) {
        self.log_level = level;
    }

    pub fn domestic_grace_minutes(&self) -> i64 {
        self.domestic_grace_minutes
    }

    pub fn set_domestic_grace_minutes(&mut self, minutes: i64) {
        self.domestic_grace_minutes = minutes;
    }

    pub fn adv_res_2012(&self) -> bool {
        self.adv_res_2012
    }

    pub fn set_adv_res_2012(&mut self, enabled: bool) {
        self.adv_res_2012 = enabled;
    }

    /// Load config from environment variables
    ///
    /// Environment variables:
    /// - `REISSUE_ENGINE_OUTPUT_FORMAT`: "human" or "json"
    /// - `REISSUE_ENGINE_LOG_LEVEL`: log level
    /// - `REISSUE_ENGINE_DOMESTIC_GRACE_MINUTES`: non-negative minutes
    /// - `REISSUE_ENGINE_ADV_RES_2012`: "true"/"false" or "1"/"0"
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::new();

        if let Some(format) = lookup("REISSUE_ENGINE_OUTPUT_FORMAT") {
            config.set_output_format(parse_output_format(&format)?);
        }

        if let Some(level) = lookup("REISSUE_ENGINE_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(minutes) = lookup("REISSUE_ENGINE_DOMESTIC_GRACE_MINUTES") {
            config.domestic_grace_minutes = minutes
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|m| *m >= 0)
                .ok_or_else(|| {
                    Error::Config(format!("REISSUE_ENGINE_DOMESTIC_GRACE_MINUTES: invalid value '{}'", minutes))
                })?;
        }

        if let Some(flag) = lookup("REISSUE_ENGINE_ADV_RES_2012") {
            config.adv_res_2012 = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(Error::Config(format!(
                        "REISSUE_ENGINE_ADV_RES_2012: invalid value '{}'",
                        flag
                    )))
                }
            };
        }

        Ok(config)
    }
}

/// Accepts "human" or "json", case-insensitively.
pub fn parse_output_format(format: &str) -> Result<String> {
    match format.trim().to_ascii_lowercase().as_str() {
        f @ ("human" | "json") => Ok(f.to_string()),
        other => Err(Error::Config(format!("unknown output format '{}'", other))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
