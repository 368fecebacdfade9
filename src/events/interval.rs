use crate::error::Result;
use crate::tracker_error;
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Формат человекочитаемых меток времени (JSON-экспорт, `report --since`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Запись о затраченном времени, хранимая в UsageStore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub seconds: u64,
}

/// Завершённый интервал фокуса, привязанный к паре (приложение, описание)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedInterval {
    pub application: String,
    pub description: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub seconds: u64,
}

impl CompletedInterval {
    /// Полное прошедшее время в секундах (включая дни), округлённое вниз.
    /// Шумные часы не дают отрицательной длительности.
    pub fn elapsed_seconds(start: DateTime<Local>, end: DateTime<Local>) -> u64 {
        end.signed_duration_since(start).num_seconds().max(0) as u64
    }

    pub fn entry(&self) -> TimeEntry {
        TimeEntry {
            start: self.start,
            end: self.end,
            seconds: self.seconds,
        }
    }
}

impl fmt::Display for CompletedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}s ({} -> {})",
            self.application,
            self.description,
            self.seconds,
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )
    }
}

pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Разбирает локальную метку времени вида `YYYY-MM-DD HH:MM:SS`.
///
/// Несуществующие и неоднозначные моменты (переход на летнее время) отклоняются.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| tracker_error!(malformed_timestamp, "'{}': {}", raw, e))?;

    match Local.from_local_datetime(&naive) {
        LocalResult::Single(at) => Ok(at),
        LocalResult::Ambiguous(_, _) => Err(tracker_error!(
            malformed_timestamp,
            "'{}' неоднозначна в локальном часовом поясе",
            raw
        )),
        LocalResult::None => Err(tracker_error!(
            malformed_timestamp,
            "'{}' не существует в локальном часовом поясе",
            raw
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use chrono::Duration;

    #[test]
    fn test_elapsed_seconds_floors() {
        let start = parse_timestamp("2024-03-01 10:00:00").unwrap();
        let end = start + Duration::milliseconds(2_999);
        assert_eq!(CompletedInterval::elapsed_seconds(start, end), 2);
    }

    #[test]
    fn test_elapsed_seconds_counts_days() {
        let start = parse_timestamp("2024-03-01 10:00:00").unwrap();
        let end = start + Duration::days(1) + Duration::seconds(5);
        assert_eq!(CompletedInterval::elapsed_seconds(start, end), 86_405);
    }

    #[test]
    fn test_elapsed_seconds_never_negative() {
        let start = parse_timestamp("2024-03-01 10:00:00").unwrap();
        let end = start - Duration::milliseconds(300);
        assert_eq!(CompletedInterval::elapsed_seconds(start, end), 0);
    }

    #[test]
    fn test_parse_timestamp_roundtrips_format() {
        let at = parse_timestamp("2024-03-01 10:15:30").unwrap();
        assert_eq!(format_timestamp(&at), "2024-03-01 10:15:30");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("вчера").unwrap_err();
        assert!(matches!(err, TrackerError::MalformedTimestamp(_)));

        let err = parse_timestamp("2024-02-30 10:00:00").unwrap_err();
        assert!(matches!(err, TrackerError::MalformedTimestamp(_)));
    }
}
