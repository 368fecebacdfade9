//! FocusTracker: state machine over polling samples
//!
//! Turns a sequence of window identities sampled at a fixed cadence into
//! completed intervals. A window seen for a single poll (alt-tab flicker) is
//! never credited: the timer only starts once the same identity is seen on
//! two consecutive polls.
//!
//! This module knows nothing about persistence. Emitted intervals are handed
//! back to the caller, who appends them to a UsageStore.

use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{CompletedInterval, WindowIdentity};
use crate::services::clock::{Clock, SystemClock};
use crate::services::interval_timer::IntervalTimer;
use std::mem;
use tracing::{debug, info};

/// Фаза автомата (для логов и тестов)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Idle,
    Armed,
    Running,
    Closed,
}

#[derive(Debug)]
enum FocusState {
    /// Ещё не было ни одного сэмпла
    Idle,
    /// Окно замечено один раз, таймер не запущен
    Armed(IntervalTimer),
    /// Окно замечено повторно, таймер идёт
    Running(IntervalTimer),
    /// Финальный опрос выполнен, дальнейшие опросы игнорируются
    Closed,
}

pub struct FocusTracker<C: Clock = SystemClock> {
    state: FocusState,
    clock: C,
}

impl FocusTracker<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for FocusTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FocusTracker<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: FocusState::Idle,
            clock,
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        match self.state {
            FocusState::Idle => TrackerPhase::Idle,
            FocusState::Armed(_) => TrackerPhase::Armed,
            FocusState::Running(_) => TrackerPhase::Running,
            FocusState::Closed => TrackerPhase::Closed,
        }
    }

    pub fn current_identity(&self) -> Option<&WindowIdentity> {
        match &self.state {
            FocusState::Armed(timer) | FocusState::Running(timer) => Some(timer.identity()),
            FocusState::Idle | FocusState::Closed => None,
        }
    }

    /// Обрабатывает очередной сэмпл. Возвращает не более одного завершённого интервала.
    ///
    /// `closing = true` передаётся ровно один раз при остановке: открытый сеанс
    /// закрывается, после чего трекер становится инертным.
    pub fn poll(&mut self, sample: &str, closing: bool) -> Result<Option<CompletedInterval>> {
        let state = mem::replace(&mut self.state, FocusState::Closed);

        let (next, emitted) = match state {
            FocusState::Closed => {
                debug_if_enabled!("Трекер уже закрыт, сэмпл {:?} проигнорирован", sample);
                (FocusState::Closed, None)
            }
            FocusState::Idle if closing => (FocusState::Closed, None),
            FocusState::Idle => {
                debug!("Первое окно: \"{}\"", sample);
                (Self::arm(sample), None)
            }
            FocusState::Armed(timer) if closing => {
                debug_if_enabled!("Закрытие до старта таймера для {}", timer.identity());
                (FocusState::Closed, None)
            }
            FocusState::Armed(mut timer) if *timer.identity() == *sample => {
                timer.start(self.clock.now())?;
                debug!("Запуск таймера для {}", timer.identity());
                (FocusState::Running(timer), None)
            }
            FocusState::Armed(timer) => {
                // Окно продержалось меньше одного интервала опроса - не учитываем
                debug!("Мерцание окна {} отброшено", timer.identity());
                (Self::arm(sample), None)
            }
            FocusState::Running(timer) if !closing && *timer.identity() == *sample => {
                (FocusState::Running(timer), None)
            }
            FocusState::Running(mut timer) => {
                timer.end(self.clock.now())?;
                let interval = timer.into_completed()?;
                info!("Завершён интервал: {}", interval);

                let next = if closing {
                    FocusState::Closed
                } else {
                    Self::arm(sample)
                };
                (next, Some(interval))
            }
        };

        self.state = next;
        Ok(emitted)
    }

    fn arm(sample: &str) -> FocusState {
        FocusState::Armed(IntervalTimer::new(WindowIdentity::from(sample)))
    }
}
