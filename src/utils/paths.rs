use crate::config::StorageConfig;
use std::path::PathBuf;

/// Имя каталога с данными внутри стандартного каталога пользователя
const APP_DIR_NAME: &str = "apptime";

/// Разрешённые пути хранения истории
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub data_dir: PathBuf,
    pub state_file: PathBuf,
    pub export_file: PathBuf,
}

impl StoragePaths {
    pub fn resolve(storage: &StorageConfig) -> Self {
        let data_dir = storage
            .data_dir
            .clone()
            .unwrap_or_else(default_data_dir);

        Self {
            state_file: data_dir.join(&storage.state_file),
            export_file: data_dir.join(&storage.export_file),
            data_dir,
        }
    }
}

/// ~/.local/share/apptime, либо текущий каталог, если стандартный не определён
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}
