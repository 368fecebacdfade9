use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Разделитель сегментов в заголовке окна: "описание - приложение"
pub const SEGMENT_SEPARATOR: &str = " - ";

/// Информация об окне, полученная от бэкенда детекции
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
}

impl WindowInfo {
    pub fn new(title: String) -> Self {
        Self {
            title,
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: String) -> Self {
        self.class = class;
        self
    }

    /// Идентичность окна строится только из заголовка, класс служит для логов
    pub fn identity(&self) -> WindowIdentity {
        WindowIdentity::new(self.title.clone())
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

/// Сырая строка, идентифицирующая окно в фокусе.
///
/// Сравнение всегда идёт по исходной строке; разбор на приложение и
/// описание выполняется только при формировании завершённого интервала.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowIdentity(String);

impl WindowIdentity {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Разбирает заголовок на (приложение, описание).
    ///
    /// Приложение - последний сегмент, описание - все предыдущие сегменты,
    /// склеенные обратно через " - ".
    pub fn split(&self) -> (String, String) {
        // Большинство заголовков содержит не более 4 сегментов - обходимся без аллокации
        let mut segments: SmallVec<[&str; 4]> = self.0.split(SEGMENT_SEPARATOR).collect();
        let application = segments.pop().unwrap_or_default().to_string();
        let description = segments.join(SEGMENT_SEPARATOR);
        (application, description)
    }
}

impl PartialEq<str> for WindowIdentity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl From<&str> for WindowIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for WindowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}
