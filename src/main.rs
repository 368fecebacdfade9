use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::{parse_poll_interval, Config, LoggingConfig};
use events::interval::parse_timestamp;
use services::reporter::{self, format_duration, UsageTotal};
use services::tracking_loop::run_until;
use services::{create_window_source, FocusTracker, UsageStore};
use utils::StoragePaths;

#[derive(Parser, Debug)]
#[command(name = "apptime", version)]
#[command(about = "Учёт времени, проведённого в активных окнах приложений")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "apptime.toml", global = true)]
    config: String,

    /// Режим сухого запуска (эмуляция окон, история не сохраняется)
    #[arg(long, global = true)]
    dry_run: bool,

    /// Уровень логирования (перекрывает конфигурацию)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Интервал опроса в секундах
    #[arg(short, long, value_parser = parse_poll_interval, global = true)]
    interval: Option<f64>,

    /// Каталог с историей
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Отслеживать активные окна до Ctrl+C (по умолчанию)
    Track,
    /// Показать сводку по сохранённой истории
    Report {
        /// Учитывать только записи, начавшиеся не раньше "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        since: Option<String>,

        /// Разбивка по описаниям для одного приложения
        #[arg(long, conflicts_with = "since")]
        app: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации и переопределения из командной строки
    let mut config = Config::load(&args.config)?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(interval) = args.interval {
        config.tracking.poll_interval_secs = interval;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = Some(data_dir);
    }
    config.validate()?;

    // Инициализация системы логирования
    init_tracing(&config.logging)?;

    info!("Запуск apptime v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let paths = StoragePaths::resolve(&config.storage);

    match args.command.unwrap_or(Command::Track) {
        Command::Track => track(&config, &paths, args.dry_run).await,
        Command::Report { since, app } => report(&paths, since.as_deref(), app.as_deref()),
    }
}

async fn track(config: &Config, paths: &StoragePaths, dry_run: bool) -> Result<()> {
    if dry_run {
        warn!("Режим сухого запуска - окна эмулируются, история не сохраняется");
    }

    let mut store = UsageStore::load(&paths.state_file)
        .with_context(|| format!("Не удалось загрузить историю из {}", paths.state_file.display()))?;
    let mut source = create_window_source(config, dry_run)?;
    let mut tracker = FocusTracker::new();

    let period = Duration::try_from_secs_f64(config.tracking.poll_interval_secs)
        .context("Недопустимый интервал опроса")?;

    info!("Все компоненты инициализированы");

    let outcome = run_until(source.as_mut(), &mut tracker, &mut store, period, shutdown_signal()).await;
    if let Err(e) = &outcome {
        error!("Цикл отслеживания прерван: {}", e);
    }

    // Сохраняем даже после ошибки цикла, чтобы не потерять накопленное
    if dry_run {
        info!("Dry-run: сохранение пропущено ({} интервалов)", store.interval_count());
    } else {
        store
            .save(paths)
            .with_context(|| format!("Не удалось сохранить историю в {}", paths.data_dir.display()))?;
    }

    outcome.context("Отслеживание завершилось с ошибкой")?;

    let summary = reporter::summarize(&store);
    info!("Всего учтено: {}", format_duration(store.total_seconds()));
    if let Some(top) = summary.first() {
        info!("Больше всего времени: {}", top);
    }
    print_summary(&summary);

    info!("apptime завершил работу");
    Ok(())
}

fn report(paths: &StoragePaths, since: Option<&str>, app: Option<&str>) -> Result<()> {
    let store = UsageStore::load(&paths.state_file)
        .with_context(|| format!("Не удалось загрузить историю из {}", paths.state_file.display()))?;

    if let Some(app) = app {
        match reporter::breakdown(&store, app) {
            Some(parts) => print_summary(&parts),
            None => warn!("Приложение '{}' не найдено в истории", app),
        }
        return Ok(());
    }

    let summary = match since {
        Some(raw) => reporter::summarize_since(&store, parse_timestamp(raw)?),
        None => reporter::summarize(&store),
    };
    print_summary(&summary);
    Ok(())
}

/// Упорядоченный список (приложение, секунды)
fn print_summary(totals: &[UsageTotal]) {
    if totals.is_empty() {
        println!("История пуста");
        return;
    }

    for (rank, total) in totals.iter().enumerate() {
        let name = if total.name.is_empty() { "<без названия>" } else { total.name.as_str() };
        println!(
            "{:>3}. {:<40} {:>8}s  {}",
            rank + 1,
            name,
            total.seconds,
            format_duration(total.seconds)
        );
    }
}

/// Ctrl+C или SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Не удалось подписаться на SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Получен сигнал завершения (Ctrl+C)"),
        _ = terminate => info!("Получен сигнал завершения (SIGTERM)"),
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    let registry = tracing_subscriber::registry().with(filter);

    // Логи идут в stderr, сводка - в stdout
    match logging.format.as_str() {
        "full" => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
