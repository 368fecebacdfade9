use crate::error::Result as TrackerResult;
use crate::tracker_error;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Интервал опроса по умолчанию, секунды
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub tracking: TrackingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackingConfig {
    pub poll_interval_secs: f64,
    pub detection_method: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Каталог с историей; по умолчанию ~/.local/share/apptime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub state_file: String,
    pub export_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            detection_method: "auto".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            state_file: "saved.bin".to_string(),
            export_file: "saved.json".to_string(),
        }
    }
}

impl Config {
    /// Значения по умолчанию -> TOML-файл (если есть) -> переменные APPTIME_*
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("APPTIME_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(tracker_error!(invalid_config, "Неверный уровень логирования: {}", self.logging.level)),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => return Err(tracker_error!(invalid_config, "Неверный формат логирования: {}", self.logging.format)),
        }

        validate_poll_interval(self.tracking.poll_interval_secs)?;

        match self.tracking.detection_method.as_str() {
            "auto" | "kdotool" | "xdotool" | "wmctrl" | "sway" => {}
            _ => {
                return Err(tracker_error!(
                    invalid_config,
                    "Неверный метод детекции окон: {}",
                    self.tracking.detection_method
                ))
            }
        }

        if self.storage.state_file.is_empty() || self.storage.export_file.is_empty() {
            return Err(tracker_error!(invalid_config, "Имена файлов истории не могут быть пустыми"));
        }

        if self.storage.state_file == self.storage.export_file {
            return Err(tracker_error!(
                invalid_config,
                "state_file и export_file должны различаться: {}",
                self.storage.state_file
            ));
        }

        Ok(())
    }
}

fn validate_poll_interval(secs: f64) -> TrackerResult<f64> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(tracker_error!(
            invalid_config,
            "poll_interval_secs должно быть положительным числом, получено {}",
            secs
        ));
    }
    Ok(secs)
}

/// Разбор `--interval` из командной строки
pub fn parse_poll_interval(raw: &str) -> TrackerResult<f64> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| tracker_error!(invalid_config, "Интервал опроса должен быть числом: '{}'", raw))?;
    validate_poll_interval(secs)
}
