//! Engine configuration.
//!
//! The configuration is supplied at construction time. It can be built in
//! code or loaded from a JSON file; every field has a serde default so a
//! partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EngineError};

/// Longest accepted focus or break countdown (24 hours).
pub const MAX_COUNTDOWN_SECONDS: u32 = 24 * 60 * 60;

/// Longest accepted closed-eye threshold in seconds.
pub const MAX_THRESHOLD_SECONDS: f64 = 60.0;

/// Shortest break suggested for a focus block, in minutes.
const MIN_BREAK_MINUTES: u32 = 5;

fn default_threshold_seconds() -> f64 {
    1.0
}

fn default_alert_sound_id() -> String {
    "bell".to_string()
}

// ============================================================================
// Policy enums
// ============================================================================

/// How a raised alert is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertClearPolicy {
    /// Only an explicit acknowledgment clears the alert
    #[default]
    RequireAcknowledgment,
    /// An open-eyes sample also clears the alert
    ClearOnOpen,
}

/// What the user is doing while monitored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringContext {
    #[default]
    Driving,
    Study,
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Configuration for the monitoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Continuous closed-eye time that raises an alert
    #[serde(default = "default_threshold_seconds")]
    pub closed_eye_threshold_seconds: f64,

    /// Focus countdown length; `None` disables the pomodoro timer
    #[serde(default)]
    pub focus_total_seconds: Option<u32>,

    /// Break countdown length; derived from the focus length when `None`
    #[serde(default)]
    pub break_total_seconds: Option<u32>,

    #[serde(default)]
    pub alert_clear_policy: AlertClearPolicy,

    #[serde(default)]
    pub context: MonitoringContext,

    /// Catalog id of the study alert sound
    #[serde(default = "default_alert_sound_id")]
    pub alert_sound_id: String,

    /// User-imported sound used when `alert_sound_id` is `custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_sound_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            closed_eye_threshold_seconds: default_threshold_seconds(),
            focus_total_seconds: None,
            break_total_seconds: None,
            alert_clear_policy: AlertClearPolicy::default(),
            context: MonitoringContext::default(),
            alert_sound_id: default_alert_sound_id(),
            custom_sound_path: None,
        }
    }
}

impl EngineConfig {
    /// Creates a study configuration with a focus block of `focus_minutes`.
    #[must_use]
    pub fn study(focus_minutes: u32) -> Self {
        Self {
            focus_total_seconds: Some(focus_minutes.saturating_mul(60)),
            context: MonitoringContext::Study,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_threshold_seconds(mut self, seconds: f64) -> Self {
        self.closed_eye_threshold_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_focus_seconds(mut self, seconds: Option<u32>) -> Self {
        self.focus_total_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_break_seconds(mut self, seconds: Option<u32>) -> Self {
        self.break_total_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_alert_clear_policy(mut self, policy: AlertClearPolicy) -> Self {
        self.alert_clear_policy = policy;
        self
    }

    /// Returns the closed-eye threshold as a [`Duration`].
    ///
    /// Call [`validate`](Self::validate) first; invalid values map to zero.
    pub fn threshold(&self) -> Duration {
        Duration::try_from_secs_f64(self.closed_eye_threshold_seconds).unwrap_or(Duration::ZERO)
    }

    /// Returns the focus countdown length, if the pomodoro timer is enabled.
    pub fn focus_seconds(&self) -> Option<u32> {
        self.focus_total_seconds.filter(|&s| s > 0)
    }

    /// Returns the break length, deriving it from the focus length if unset.
    pub fn break_seconds(&self) -> Option<u32> {
        match self.break_total_seconds {
            Some(seconds) => Some(seconds).filter(|&s| s > 0),
            None => self
                .focus_seconds()
                .map(|focus| break_minutes_for(focus / 60) * 60),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        let threshold = self.closed_eye_threshold_seconds;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > MAX_THRESHOLD_SECONDS {
            return Err(EngineError::InvalidConfig(format!(
                "closed-eye threshold must be in (0, {MAX_THRESHOLD_SECONDS}] seconds, got {threshold}"
            )));
        }
        for (name, value) in [
            ("focus", self.focus_total_seconds),
            ("break", self.break_total_seconds),
        ] {
            if let Some(seconds) = value {
                if seconds > MAX_COUNTDOWN_SECONDS {
                    return Err(EngineError::InvalidConfig(format!(
                        "{name} duration must be at most {MAX_COUNTDOWN_SECONDS} seconds, got {seconds}"
                    )));
                }
            }
        }
        if self.alert_sound_id.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "alert sound id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("eyeguard").join("config.json"))
    }
}

/// Suggested break length in minutes for a focus block of `focus_minutes`.
///
/// Scales at roughly two minutes of break per seven of focus, never below
/// five minutes.
pub fn break_minutes_for(focus_minutes: u32) -> u32 {
    let raw = 0.2857 * f64::from(focus_minutes) - 2.14;
    let floored = raw.floor();
    if floored <= f64::from(MIN_BREAK_MINUTES) {
        MIN_BREAK_MINUTES
    } else {
        floored as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod engine_config_tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = EngineConfig::default();
            assert_eq!(config.closed_eye_threshold_seconds, 1.0);
            assert_eq!(config.focus_total_seconds, None);
            assert_eq!(config.break_total_seconds, None);
            assert_eq!(config.alert_clear_policy, AlertClearPolicy::RequireAcknowledgment);
            assert_eq!(config.context, MonitoringContext::Driving);
            assert_eq!(config.alert_sound_id, "bell");
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_study_config() {
            let config = EngineConfig::study(25);
            assert_eq!(config.focus_seconds(), Some(1500));
            assert_eq!(config.context, MonitoringContext::Study);
        }

        #[test]
        fn test_threshold_duration() {
            let config = EngineConfig::default().with_threshold_seconds(2.5);
            assert_eq!(config.threshold(), Duration::from_millis(2500));
        }

        #[test]
        fn test_zero_focus_disables_timer() {
            let config = EngineConfig::default().with_focus_seconds(Some(0));
            assert_eq!(config.focus_seconds(), None);
            assert_eq!(config.break_seconds(), None);
        }

        #[test]
        fn test_explicit_break_wins() {
            let config = EngineConfig::default()
                .with_focus_seconds(Some(5))
                .with_break_seconds(Some(3));
            assert_eq!(config.break_seconds(), Some(3));
        }

        #[test]
        fn test_break_derived_from_focus() {
            let config = EngineConfig::study(45);
            assert_eq!(config.break_seconds(), Some(10 * 60));
        }

        #[test]
        fn test_validate_threshold_bounds() {
            for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 61.0] {
                let config = EngineConfig::default().with_threshold_seconds(bad);
                assert!(config.validate().is_err(), "threshold {bad} should be rejected");
            }
            let config = EngineConfig::default().with_threshold_seconds(60.0);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_validate_countdown_bounds() {
            let config = EngineConfig::default().with_focus_seconds(Some(MAX_COUNTDOWN_SECONDS + 1));
            assert!(config.validate().is_err());

            let config = EngineConfig::default().with_break_seconds(Some(MAX_COUNTDOWN_SECONDS + 1));
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_validate_empty_sound_id() {
            let config = EngineConfig {
                alert_sound_id: "  ".to_string(),
                ..EngineConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_partial_json_uses_defaults() {
            let config: EngineConfig =
                serde_json::from_str(r#"{"focus_total_seconds": 1500, "context": "study"}"#)
                    .unwrap();
            assert_eq!(config.closed_eye_threshold_seconds, 1.0);
            assert_eq!(config.focus_total_seconds, Some(1500));
            assert_eq!(config.context, MonitoringContext::Study);
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(
                &path,
                r#"{"closed_eye_threshold_seconds": 2.0, "alert_clear_policy": "clear_on_open"}"#,
            )
            .unwrap();

            let config = EngineConfig::from_file(&path).unwrap();
            assert_eq!(config.closed_eye_threshold_seconds, 2.0);
            assert_eq!(config.alert_clear_policy, AlertClearPolicy::ClearOnOpen);
        }

        #[test]
        fn test_from_file_missing() {
            let dir = tempfile::tempdir().unwrap();
            let result = EngineConfig::from_file(&dir.path().join("missing.json"));
            assert!(matches!(result, Err(ConfigError::Io { .. })));
        }

        #[test]
        fn test_from_file_malformed() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, "{not json").unwrap();
            let result = EngineConfig::from_file(&path);
            assert!(matches!(result, Err(ConfigError::Parse { .. })));
        }

        #[test]
        fn test_from_file_invalid_values() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, r#"{"closed_eye_threshold_seconds": 0}"#).unwrap();
            let result = EngineConfig::from_file(&path);
            assert!(matches!(result, Err(ConfigError::Invalid(_))));
        }
    }

    mod break_minutes_tests {
        use super::*;

        #[test]
        fn test_minimum_five_minutes() {
            assert_eq!(break_minutes_for(0), 5);
            assert_eq!(break_minutes_for(25), 5);
        }

        #[test]
        fn test_scales_with_focus() {
            // 0.2857 * 45 - 2.14 = 10.7165
            assert_eq!(break_minutes_for(45), 10);
            // 0.2857 * 60 - 2.14 = 15.002
            assert_eq!(break_minutes_for(60), 15);
        }
    }
}
