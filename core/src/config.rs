//! Timer configuration persistence
//!
//! `TimerConfig` lives in lapwatch-types so consumers can share it without
//! pulling in confy. Loading and storing is implemented here.

use std::path::{Path, PathBuf};

use lapwatch_types::TimerConfig;

use crate::error::ConfigError;

const APP_NAME: &str = "lapwatch";
const CONFIG_NAME: &str = "timer";

pub trait TimerConfigExt: Sized {
    /// Load from the platform config directory, creating defaults if missing
    fn load() -> Result<Self, ConfigError>;
    /// Load, falling back to defaults on any error
    fn load_or_default() -> Self;
    /// Load from an explicit TOML file
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn from_toml(text: &str) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn path() -> Result<PathBuf, ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl TimerConfigExt for TimerConfig {
    fn load() -> Result<Self, ConfigError> {
        let config: TimerConfig = confy::load(APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(%err, "Using default timer configuration");
            Self::default()
        })
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: TimerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;
        confy::store(APP_NAME, CONFIG_NAME, self.clone()).map_err(ConfigError::Save)
    }

    fn path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.continue_counting_when_stopped && !self.allow_resume_after_stop {
            return Err(ConfigError::Invalid {
                field: "continue_counting_when_stopped",
                reason: "has no effect unless allow_resume_after_stop is set".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lapwatch_types::DEFAULT_UPDATE_INTERVAL_MS;

    #[test]
    fn parses_partial_toml() {
        let config = TimerConfig::from_toml(
            r#"
            allow_resume_after_stop = true
            update_interval_ms = 250
            "#,
        )
        .unwrap();
        assert!(config.allow_resume_after_stop);
        assert_eq!(config.update_interval_ms, 250);
        assert!(!config.stop_on_subtimers_finish);
    }

    #[test]
    fn empty_file_is_default() {
        let config = TimerConfig::from_toml("").unwrap();
        assert_eq!(config, TimerConfig::default());
        assert_eq!(config.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS);
    }

    #[test]
    fn counting_stopped_time_requires_resume_after_stop() {
        let err = TimerConfig::from_toml("continue_counting_when_stopped = true").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "continue_counting_when_stopped",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = TimerConfig::from_toml("tick_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/nonexistent/lapwatch/timer.toml");
        let err = TimerConfig::load_from(path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { path: p, .. } if p == path));
    }
}
