use crate::error::{Result, TrackerError};
use crate::events::{CompletedInterval, WindowIdentity};
use chrono::{DateTime, Local};

/// Один непрерывный сеанс фокуса на конкретном окне.
///
/// Старт откладывается до второго подряд наблюдения того же окна,
/// поэтому `start` может быть не выставлен на протяжении первого интервала опроса.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    identity: WindowIdentity,
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
}

impl IntervalTimer {
    pub fn new(identity: WindowIdentity) -> Self {
        Self {
            identity,
            start: None,
            end: None,
        }
    }

    pub fn identity(&self) -> &WindowIdentity {
        &self.identity
    }

    pub fn start(&mut self, at: DateTime<Local>) -> Result<()> {
        if self.start.is_some() && self.end.is_none() {
            return TrackerError::timer_invariant(format!(
                "таймер для {} уже запущен",
                self.identity
            ));
        }
        self.start = Some(at);
        self.end = None;
        Ok(())
    }

    pub fn end(&mut self, at: DateTime<Local>) -> Result<()> {
        if self.start.is_none() {
            return TrackerError::timer_invariant(format!(
                "таймер для {} остановлен без запуска",
                self.identity
            ));
        }
        self.end = Some(at);
        Ok(())
    }

    /// Преобразует таймер в завершённый интервал. Нулевая длительность допустима.
    pub fn into_completed(self) -> Result<CompletedInterval> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return TrackerError::timer_invariant(format!(
                "у таймера для {} нет начала или конца",
                self.identity
            ));
        };

        let (application, description) = self.identity.split();
        Ok(CompletedInterval {
            application,
            description,
            start,
            end,
            seconds: CompletedInterval::elapsed_seconds(start, end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::interval::parse_timestamp;
    use chrono::Duration;

    fn timer() -> IntervalTimer {
        IntervalTimer::new(WindowIdentity::from("notes.md - Editor"))
    }

    #[test]
    fn test_start_end_convert() {
        let t0 = parse_timestamp("2024-05-10 09:00:00").unwrap();
        let mut timer = timer();
        timer.start(t0).unwrap();
        timer.end(t0 + Duration::seconds(90)).unwrap();

        let interval = timer.into_completed().unwrap();
        assert_eq!(interval.application, "Editor");
        assert_eq!(interval.description, "notes.md");
        assert_eq!(interval.seconds, 90);
        assert_eq!(interval.start, t0);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let t0 = parse_timestamp("2024-05-10 09:00:00").unwrap();
        let mut timer = timer();
        timer.start(t0).unwrap();
        let err = timer.start(t0).unwrap_err();
        assert!(matches!(err, TrackerError::TimerInvariantViolation(_)));
    }

    #[test]
    fn test_restart_after_end_is_allowed() {
        let t0 = parse_timestamp("2024-05-10 09:00:00").unwrap();
        let mut timer = timer();
        timer.start(t0).unwrap();
        timer.end(t0 + Duration::seconds(1)).unwrap();
        assert!(timer.start(t0 + Duration::seconds(2)).is_ok());
    }

    #[test]
    fn test_end_without_start_is_rejected() {
        let t0 = parse_timestamp("2024-05-10 09:00:00").unwrap();
        let mut timer = timer();
        let err = timer.end(t0).unwrap_err();
        assert!(matches!(err, TrackerError::TimerInvariantViolation(_)));
    }

    #[test]
    fn test_convert_without_end_is_rejected() {
        let t0 = parse_timestamp("2024-05-10 09:00:00").unwrap();
        let mut timer = timer();
        timer.start(t0).unwrap();
        let err = timer.into_completed().unwrap_err();
        assert!(matches!(err, TrackerError::TimerInvariantViolation(_)));
    }

    #[test]
    fn test_zero_duration_is_still_emitted() {
        let t0 = parse_timestamp("2024-05-10 09:00:00").unwrap();
        let mut timer = timer();
        timer.start(t0).unwrap();
        timer.end(t0 + Duration::milliseconds(400)).unwrap();
        assert_eq!(timer.into_completed().unwrap().seconds, 0);
    }
}
