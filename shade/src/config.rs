use crate::HOME_DIR;
use crate::modifier::ModifierKey;
use crate::space::SpaceMask;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "shade.json";
pub const MIN_PERMISSION_POLL_INTERVAL_MS: u64 = 100;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// What happened while loading a configuration, reported once logging is up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNotice {
    Defaults(PathBuf),
    Loaded(PathBuf),
    PollIntervalRaised { requested: u64 },
}

impl Display for ConfigNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigNotice::Defaults(path) => {
                write!(f, "no configuration found at {}, using defaults", path.display())
            }
            ConfigNotice::Loaded(path) => write!(f, "loaded configuration from {}", path.display()),
            ConfigNotice::PollIntervalRaised { requested } => write!(
                f,
                "permission_poll_interval_ms {requested} is too low, using {MIN_PERMISSION_POLL_INTERVAL_MS}"
            ),
        }
    }
}

impl ConfigNotice {
    pub fn log(&self) {
        match self {
            ConfigNotice::Defaults(_) | ConfigNotice::Loaded(_) => tracing::info!("{self}"),
            ConfigNotice::PollIntervalRaised { .. } => tracing::warn!("{self}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct ShadeConfig {
    /// Modifier key which shows the desktop overview while held (default: Option)
    pub trigger_modifier: ModifierKey,
    /// How often to re-check the accessibility permission, in milliseconds (default: 1000)
    pub permission_poll_interval_ms: u64,
    /// Which Spaces to consider when resolving the Space of a window (default: All)
    pub space_mask: SpaceMask,
    /// Include windows which are not on screen (default: false)
    pub include_offscreen_windows: bool,
    /// Show the overview in an overlay window rather than only logging it (default: true)
    pub overlay: bool,
    /// Write logs to shade.log in the local data directory (default: false)
    pub log_to_file: bool,
}

impl Default for ShadeConfig {
    fn default() -> Self {
        Self {
            trigger_modifier: ModifierKey::Option,
            permission_poll_interval_ms: 1000,
            space_mask: SpaceMask::All,
            include_offscreen_windows: false,
            overlay: true,
            log_to_file: false,
        }
    }
}

impl ShadeConfig {
    pub fn default_path() -> PathBuf {
        HOME_DIR.join(CONFIG_FILE_NAME)
    }

    /// Loads the configuration at `path`, falling back to defaults when the
    /// file does not exist. The returned notices are for the caller to log
    /// once tracing is set up.
    pub fn load(path: &Path) -> Result<(Self, Vec<ConfigNotice>), ConfigError> {
        if !path.is_file() {
            return Ok((Self::default(), vec![ConfigNotice::Defaults(path.to_path_buf())]));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut notices = vec![ConfigNotice::Loaded(path.to_path_buf())];
        notices.extend(config.sanitise());

        Ok((config, notices))
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Raises out of range values to their minimum
    pub fn sanitise(&mut self) -> Vec<ConfigNotice> {
        let mut notices = vec![];

        if self.permission_poll_interval_ms < MIN_PERMISSION_POLL_INTERVAL_MS {
            notices.push(ConfigNotice::PollIntervalRaised {
                requested: self.permission_poll_interval_ms,
            });
            self.permission_poll_interval_ms = MIN_PERMISSION_POLL_INTERVAL_MS;
        }

        notices
    }

    pub fn permission_poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.permission_poll_interval_ms
                .max(MIN_PERMISSION_POLL_INTERVAL_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = ShadeConfig::from_json("{}").expect("Should parse");
        assert_eq!(config, ShadeConfig::default());
    }

    #[test]
    fn overrides_individual_fields() {
        let config = ShadeConfig::from_json(
            r#"{
                "trigger_modifier": "Command",
                "space_mask": "Current",
                "overlay": false
            }"#,
        )
        .expect("Should parse");

        assert_eq!(config.trigger_modifier, ModifierKey::Command);
        assert_eq!(config.space_mask, SpaceMask::Current);
        assert!(!config.overlay);
        assert_eq!(config.permission_poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn clamps_poll_interval() {
        let mut config = ShadeConfig::from_json(r#"{ "permission_poll_interval_ms": 5 }"#)
            .expect("Should parse");

        assert_eq!(
            config.permission_poll_interval(),
            Duration::from_millis(MIN_PERMISSION_POLL_INTERVAL_MS)
        );
        assert_eq!(
            config.sanitise(),
            vec![ConfigNotice::PollIntervalRaised { requested: 5 }]
        );
        assert_eq!(
            config.permission_poll_interval_ms,
            MIN_PERMISSION_POLL_INTERVAL_MS
        );
        assert!(config.sanitise().is_empty());
    }

    #[test]
    fn load_returns_notices_instead_of_logging() {
        let path = std::env::temp_dir().join(format!("shade-clamped-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "permission_poll_interval_ms": 5 }"#)
            .expect("Should write fixture");

        let loaded = ShadeConfig::load(&path);
        std::fs::remove_file(&path).expect("Should clean up fixture");
        let (config, notices) = loaded.expect("Should parse");

        assert_eq!(
            config.permission_poll_interval_ms,
            MIN_PERMISSION_POLL_INTERVAL_MS
        );
        assert_eq!(
            notices,
            vec![
                ConfigNotice::Loaded(path.clone()),
                ConfigNotice::PollIntervalRaised { requested: 5 },
            ]
        );
        assert_eq!(
            notices[1].to_string(),
            "permission_poll_interval_ms 5 is too low, using 100"
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(ShadeConfig::from_json(r#"{ "border_width": 8 }"#).is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("shade-config-that-does-not-exist.json");
        let (config, notices) = ShadeConfig::load(&path).expect("Should fall back");

        assert_eq!(config, ShadeConfig::default());
        assert_eq!(notices, vec![ConfigNotice::Defaults(path)]);
    }

    #[test]
    fn reports_the_path_of_invalid_files() {
        let path = std::env::temp_dir().join(format!("shade-invalid-{}.json", std::process::id()));
        std::fs::write(&path, "{ \"overlay\": 1 }").expect("Should write fixture");

        let error = ShadeConfig::load(&path).expect_err("Should fail to parse");
        std::fs::remove_file(&path).expect("Should clean up fixture");

        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().contains("shade-invalid-"));
    }
}
