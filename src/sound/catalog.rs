//! Built-in alert sound catalog.
//!
//! Study sessions use the sound the user picked; driving always uses the
//! alarm. Bundled sounds are WAV files looked up by name in a sound
//! directory.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::SoundError;
use crate::config::{EngineConfig, MonitoringContext};

/// Id that selects the user-imported sound.
pub const CUSTOM_SOUND_ID: &str = "custom";

/// A sound shipped with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSound {
    pub id: &'static str,
    pub title: &'static str,
    pub file_name: &'static str,
}

impl AlertSound {
    const fn new(id: &'static str, title: &'static str, file_name: &'static str) -> Self {
        Self {
            id,
            title,
            file_name,
        }
    }

    /// Location of this sound inside `sound_dir`.
    pub fn path_in(&self, sound_dir: &Path) -> PathBuf {
        sound_dir.join(format!("{}.wav", self.file_name))
    }
}

/// Sounds offered for study sessions, first entry is the default.
pub const STUDY_SOUNDS: [AlertSound; 3] = [
    AlertSound::new("bell", "Soft Bell", "study_bell"),
    AlertSound::new("chime", "Chime", "study_chime"),
    AlertSound::new("pulse", "Pulse", "study_pulse"),
];

/// Alarm used while driving.
pub const DRIVING_ALARM: AlertSound = AlertSound::new("alarm", "Alarm", "alarm");

/// Looks up a study sound by id.
pub fn find_study_sound(id: &str) -> Option<&'static AlertSound> {
    STUDY_SOUNDS.iter().find(|s| s.id == id)
}

/// Default study sound.
pub fn default_study_sound() -> &'static AlertSound {
    &STUDY_SOUNDS[0]
}

/// Default directory holding the bundled WAV files.
pub fn default_sound_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("eyeguard").join("sounds"))
}

// ============================================================================
// SoundSource
// ============================================================================

/// The sound the alert player should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A catalog sound
    Bundled(AlertSound),
    /// A user-imported file
    Custom(PathBuf),
}

impl SoundSource {
    /// Picks the alert sound for `config`.
    ///
    /// Unknown ids, and the custom id without a file, fall back to the
    /// default study sound.
    pub fn for_config(config: &EngineConfig) -> Self {
        if config.context == MonitoringContext::Driving {
            return Self::Bundled(DRIVING_ALARM);
        }

        let id = config.alert_sound_id.as_str();
        if id == CUSTOM_SOUND_ID {
            return match &config.custom_sound_path {
                Some(path) => Self::Custom(path.clone()),
                None => {
                    warn!("Custom alert sound selected but no file imported; using default");
                    Self::Bundled(*default_study_sound())
                }
            };
        }

        match find_study_sound(id) {
            Some(sound) => Self::Bundled(*sound),
            None => {
                warn!("Unknown alert sound '{}'; using default", id);
                Self::Bundled(*default_study_sound())
            }
        }
    }

    /// Display name of the source.
    pub fn title(&self) -> String {
        match self {
            Self::Bundled(sound) => sound.title.to_string(),
            Self::Custom(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Custom".to_string()),
        }
    }

    /// Resolves the file to play.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist.
    pub fn resolve(&self, sound_dir: &Path) -> Result<PathBuf, SoundError> {
        let path = match self {
            Self::Bundled(sound) => sound.path_in(sound_dir),
            Self::Custom(path) => path.clone(),
        };
        if !path.is_file() {
            return Err(SoundError::FileNotFound(path.display().to_string()));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn study_config(id: &str) -> EngineConfig {
        EngineConfig {
            alert_sound_id: id.to_string(),
            ..EngineConfig::study(25)
        }
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_study_sounds() {
            let ids: Vec<_> = STUDY_SOUNDS.iter().map(|s| s.id).collect();
            assert_eq!(ids, vec!["bell", "chime", "pulse"]);
            assert_eq!(default_study_sound().title, "Soft Bell");
        }

        #[test]
        fn test_find_study_sound() {
            assert_eq!(find_study_sound("chime").map(|s| s.file_name), Some("study_chime"));
            assert!(find_study_sound("alarm").is_none());
        }

        #[test]
        fn test_path_in() {
            let path = DRIVING_ALARM.path_in(Path::new("/sounds"));
            assert_eq!(path, PathBuf::from("/sounds/alarm.wav"));
        }
    }

    mod source_tests {
        use super::*;

        #[test]
        fn test_driving_always_uses_alarm() {
            let config = EngineConfig {
                alert_sound_id: "chime".to_string(),
                ..EngineConfig::default()
            };
            assert_eq!(SoundSource::for_config(&config), SoundSource::Bundled(DRIVING_ALARM));
        }

        #[test]
        fn test_study_uses_selected_sound() {
            let source = SoundSource::for_config(&study_config("pulse"));
            assert_eq!(source.title(), "Pulse");
        }

        #[test]
        fn test_unknown_id_falls_back() {
            let source = SoundSource::for_config(&study_config("siren"));
            assert_eq!(source, SoundSource::Bundled(STUDY_SOUNDS[0]));
        }

        #[test]
        fn test_custom_sound() {
            let mut config = study_config(CUSTOM_SOUND_ID);
            assert_eq!(
                SoundSource::for_config(&config),
                SoundSource::Bundled(STUDY_SOUNDS[0])
            );

            config.custom_sound_path = Some(PathBuf::from("/music/wake.wav"));
            let source = SoundSource::for_config(&config);
            assert_eq!(source, SoundSource::Custom(PathBuf::from("/music/wake.wav")));
            assert_eq!(source.title(), "wake.wav");
        }

        #[test]
        fn test_resolve_existing_file() {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("study_bell.wav"), b"RIFF").unwrap();

            let source = SoundSource::Bundled(STUDY_SOUNDS[0]);
            assert_eq!(
                source.resolve(dir.path()).unwrap(),
                dir.path().join("study_bell.wav")
            );
        }

        #[test]
        fn test_resolve_missing_file() {
            let dir = TempDir::new().unwrap();
            let err = SoundSource::Bundled(DRIVING_ALARM)
                .resolve(dir.path())
                .unwrap_err();
            assert!(err.is_file_error());
        }
    }
}
