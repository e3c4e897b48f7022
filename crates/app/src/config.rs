use control::{BindingTable, KeyMap, UnknownKey};
use serde::{Deserialize, Serialize};
use simcore::{DriveParams, ParamsError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "DRIVE_DEMO_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid drive parameters: {0}")]
    Params(#[from] ParamsError),
    #[error("invalid key bindings: {0}")]
    Bindings(#[from] UnknownKey),
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Everything the demo window can be tuned with. Missing fields take their
/// defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub params: DriveParams,
    pub publish_interval_ms: u64,
    /// Front wheel angle drawn at full steering deflection (rad)
    pub wheel_visual_angle: f64,
    /// Length of the path trail and speed history (s)
    pub history_seconds: f64,
    /// Replaces the default arrows + letters layout when present
    pub bindings: Option<Vec<BindingTable>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            params: DriveParams::default(),
            publish_interval_ms: 100,
            wheel_visual_angle: 0.5,
            history_seconds: 10.0,
            bindings: None,
        }
    }
}

impl AppConfig {
    /// Config path from the first CLI argument, else from `DRIVE_DEMO_CONFIG`.
    pub fn locate() -> Option<PathBuf> {
        std::env::args_os()
            .nth(1)
            .or_else(|| std::env::var_os(CONFIG_ENV))
            .map(PathBuf::from)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        self.keymap()?;
        if !self.wheel_visual_angle.is_finite() || self.wheel_visual_angle.abs() > std::f64::consts::FRAC_PI_2 {
            return Err(ConfigError::OutOfRange {
                field: "wheel_visual_angle",
                value: self.wheel_visual_angle,
            });
        }
        if !(self.history_seconds.is_finite() && self.history_seconds > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "history_seconds",
                value: self.history_seconds,
            });
        }
        Ok(())
    }

    pub fn keymap(&self) -> Result<KeyMap, UnknownKey> {
        match &self.bindings {
            Some(tables) => KeyMap::from_tables(tables),
            None => Ok(KeyMap::default()),
        }
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Key;
    use simcore::Control;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_nested_params_override() {
        let config = AppConfig::from_json(r#"{ "publish_interval_ms": 250, "params": { "turn_rate": 3.0 } }"#).unwrap();
        assert_eq!(config.publish_interval(), Duration::from_millis(250));
        assert_eq!(config.params.turn_rate, 3.0);
        assert_eq!(config.params.max_speed, DriveParams::default().max_speed);
    }

    #[test]
    fn test_custom_bindings() {
        let config = AppConfig::from_json(
            r#"{ "bindings": [ { "I": "throttle", "K": "brake" }, { "ArrowUp": "throttle" } ] }"#,
        )
        .unwrap();
        let keymap = config.keymap().unwrap();
        assert_eq!(keymap.control_for(Key::I), Some(Control::Throttle));
        assert_eq!(keymap.control_for(Key::ArrowUp), Some(Control::Throttle));
        assert_eq!(keymap.control_for(Key::W), None);
    }

    #[test]
    fn test_unknown_control_name_is_parse_error() {
        let err = AppConfig::from_json(r#"{ "bindings": [ { "W": "nitro" } ] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let err = AppConfig::from_json(r#"{ "bindings": [ { "Hyper": "left" } ] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Bindings(_)));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let err = AppConfig::from_json(r#"{ "params": { "max_speed": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Params(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/drive-demo.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/drive-demo.json"));
    }
}
