use crate::debug_if_enabled;
use crate::error::Result;
use crate::services::clock::Clock;
use crate::services::focus_tracker::FocusTracker;
use crate::services::usage_store::UsageStore;
use crate::services::window_source::WindowSource;
use std::future::Future;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

/// Итоги одного прогона цикла
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub polls: u64,
    pub intervals: u64,
}

/// Цикл "сэмпл -> опрос -> пауза" до срабатывания `shutdown`.
///
/// Отмена не теряет открытый сеанс: после сигнала выполняется один финальный
/// опрос с `closing = true`, его интервал тоже попадает в хранилище.
pub async fn run_until<C, F>(
    source: &mut dyn WindowSource,
    tracker: &mut FocusTracker<C>,
    store: &mut UsageStore,
    period: Duration,
    shutdown: F,
) -> Result<LoopStats>
where
    C: Clock,
    F: Future<Output = ()>,
{
    let mut stats = LoopStats::default();
    let mut ticker = interval(period);
    // После долгой паузы (сон ноутбука) не догоняем пропущенные тики пачкой
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Отслеживание запущено, интервал опроса: {:?}", period);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Получен сигнал завершения, закрываем текущий сеанс");
                break;
            }
            _ = ticker.tick() => {
                let identity = source.current_identity().await;
                stats.polls += 1;
                debug_if_enabled!("Опрос #{}: \"{}\"", stats.polls, identity);

                if let Some(interval) = tracker.poll(&identity, false)? {
                    store.append(interval);
                    stats.intervals += 1;
                }
            }
        }
    }

    if let Some(open) = tracker.current_identity() {
        debug_if_enabled!("Финальный опрос, открытый сеанс {} ({:?})", open, tracker.phase());
    }

    let identity = source.current_identity().await;
    stats.polls += 1;
    if let Some(interval) = tracker.poll(&identity, true)? {
        store.append(interval);
        stats.intervals += 1;
    }

    info!(
        "Отслеживание остановлено: {} опросов, {} интервалов",
        stats.polls, stats.intervals
    );
    Ok(stats)
}
