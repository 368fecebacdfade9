use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Неверная конфигурация: {0}")]
    InvalidConfiguration(String),

    #[error("Нарушен инвариант таймера: {0}")]
    TimerInvariantViolation(String),

    #[error("Сохранённое состояние не найдено: {}", .0.display())]
    PersistenceMissing(PathBuf),

    #[error("Некорректная метка времени: {0}")]
    MalformedTimestamp(String),

    #[error("Повреждённый файл состояния: {0}")]
    CorruptState(String),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка бинарной сериализации: {0}")]
    Encode(#[from] bincode::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl TrackerError {
    pub fn timer_invariant<T>(msg: impl Into<String>) -> Result<T> {
        Err(TrackerError::TimerInvariantViolation(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! tracker_error {
    (invalid_config, $($arg:tt)*) => {
        $crate::error::TrackerError::InvalidConfiguration(format!($($arg)*))
    };
    (malformed_timestamp, $($arg:tt)*) => {
        $crate::error::TrackerError::MalformedTimestamp(format!($($arg)*))
    };
    (corrupt_state, $($arg:tt)*) => {
        $crate::error::TrackerError::CorruptState(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::TrackerError::ServiceUnavailable(format!($($arg)*))
    };
}
