use crate::error::Result;
use crate::events::WindowInfo;
use crate::tracker_error;
use std::process::Command;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::kdotool::KdotoolDetector;
use super::r#trait::WindowSource;
use super::sway::SwayDetector;
use super::wmctrl::WmctrlDetector;
use super::xdotool::XdotoolDetector;

/// Пауза перед повторной детекцией, если ни один метод не работает
const REDETECT_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DesktopEnvironment {
    KDE,
    GNOME,
    X11Generic,
    WaylandGeneric,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkingMethod {
    Kdotool,
    Xdotool,
    Wmctrl,
    Sway,
}

impl WorkingMethod {
    fn from_config(name: &str) -> Result<Option<Self>> {
        match name {
            "auto" => Ok(None),
            "kdotool" => Ok(Some(Self::Kdotool)),
            "xdotool" => Ok(Some(Self::Xdotool)),
            "wmctrl" => Ok(Some(Self::Wmctrl)),
            "sway" => Ok(Some(Self::Sway)),
            other => Err(tracker_error!(invalid_config, "Неизвестный метод детекции окон: {}", other)),
        }
    }
}

pub struct RealWindowSource {
    desktop_env: DesktopEnvironment,
    forced_method: Option<WorkingMethod>,
    working_method: Option<WorkingMethod>,
    retry_after: Option<Instant>,
    last_window: Option<WindowInfo>,

    // Детекторы утилит
    kdotool: KdotoolDetector,
    xdotool: XdotoolDetector,
    wmctrl: WmctrlDetector,
    sway: SwayDetector,
}

impl RealWindowSource {
    pub fn new(detection_method: &str) -> Result<Self> {
        info!("Инициализация RealWindowSource");

        let desktop_env = Self::detect_desktop_environment();
        info!("Обнаружена среда рабочего стола: {:?}", desktop_env);

        Ok(Self {
            desktop_env,
            forced_method: WorkingMethod::from_config(detection_method)?,
            working_method: None,
            retry_after: None,
            last_window: None,
            kdotool: KdotoolDetector::new(),
            xdotool: XdotoolDetector::new(),
            wmctrl: WmctrlDetector::new(),
            sway: SwayDetector::new(),
        })
    }

    fn detect_desktop_environment() -> DesktopEnvironment {
        if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
            match desktop.to_lowercase().as_str() {
                d if d.contains("kde") => return DesktopEnvironment::KDE,
                d if d.contains("gnome") => return DesktopEnvironment::GNOME,
                _ => {}
            }
        }

        if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
            match session.as_str() {
                "wayland" => return DesktopEnvironment::WaylandGeneric,
                "x11" => return DesktopEnvironment::X11Generic,
                _ => {}
            }
        }

        if let Ok(output) = Command::new("pgrep").arg("-f").arg("kwin").output() {
            if !output.stdout.is_empty() {
                return DesktopEnvironment::KDE;
            }
        }

        if let Ok(output) = Command::new("pgrep").arg("-f").arg("gnome-shell").output() {
            if !output.stdout.is_empty() {
                return DesktopEnvironment::GNOME;
            }
        }

        DesktopEnvironment::Unknown
    }

    /// Порядок перебора методов для текущей среды
    fn candidates(&self) -> Vec<WorkingMethod> {
        if let Some(method) = self.forced_method {
            return vec![method];
        }

        match self.desktop_env {
            DesktopEnvironment::KDE => vec![WorkingMethod::Kdotool, WorkingMethod::Xdotool, WorkingMethod::Wmctrl],
            DesktopEnvironment::GNOME | DesktopEnvironment::X11Generic => {
                vec![WorkingMethod::Xdotool, WorkingMethod::Wmctrl]
            }
            DesktopEnvironment::WaylandGeneric => vec![WorkingMethod::Sway, WorkingMethod::Kdotool],
            DesktopEnvironment::Unknown => vec![
                WorkingMethod::Kdotool,
                WorkingMethod::Xdotool,
                WorkingMethod::Wmctrl,
                WorkingMethod::Sway,
            ],
        }
    }

    async fn detect_working_method(&mut self) -> Result<WorkingMethod> {
        info!("Определяем рабочий метод детекции окон...");

        for method in self.candidates() {
            if self.test_method(method).await.is_ok() {
                info!("Используем {:?}", method);
                self.working_method = Some(method);
                return Ok(method);
            }
            debug!("Метод {:?} не отвечает", method);
        }

        Err(tracker_error!(service_unavailable, "Ни один метод детекции окон не работает"))
    }

    async fn test_method(&self, method: WorkingMethod) -> Result<()> {
        match method {
            WorkingMethod::Kdotool => self.kdotool.test().await,
            WorkingMethod::Xdotool => self.xdotool.test().await,
            WorkingMethod::Wmctrl => self.wmctrl.test().await,
            WorkingMethod::Sway => self.sway.test().await,
        }
    }

    async fn get_window_by_method(&self, method: WorkingMethod) -> Result<WindowInfo> {
        match method {
            WorkingMethod::Kdotool => self.kdotool.get_active_window().await,
            WorkingMethod::Xdotool => self.xdotool.get_active_window().await,
            WorkingMethod::Wmctrl => self.wmctrl.get_active_window().await,
            WorkingMethod::Sway => self.sway.get_active_window().await,
        }
    }

    async fn sample(&mut self) -> Result<WindowInfo> {
        let method = match self.working_method {
            Some(method) => method,
            None => self.detect_working_method().await?,
        };

        match self.get_window_by_method(method).await {
            Ok(window) => Ok(window),
            Err(e) => {
                warn!("Рабочий метод {:?} перестал работать: {}. Переопределяем...", method, e);
                self.working_method = None;
                let method = self.detect_working_method().await?;
                self.get_window_by_method(method).await
            }
        }
    }
}

#[async_trait::async_trait]
impl WindowSource for RealWindowSource {
    async fn current_identity(&mut self) -> String {
        if let Some(retry_after) = self.retry_after {
            if Instant::now() < retry_after {
                return String::new();
            }
            self.retry_after = None;
        }

        match self.sample().await {
            Ok(window) => {
                if self.last_window.as_ref() != Some(&window) {
                    debug!("Смена активного окна на: {}", window);
                }
                let identity = window.identity().as_str().to_string();
                self.last_window = Some(window);
                identity
            }
            Err(e) => {
                error!("{}. Приостанавливаем детекцию на {} секунд", e, REDETECT_BACKOFF.as_secs());
                self.retry_after = Some(Instant::now() + REDETECT_BACKOFF);
                self.last_window = None;
                String::new()
            }
        }
    }
}

impl Drop for RealWindowSource {
    fn drop(&mut self) {
        info!("RealWindowSource завершает работу");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_config() {
        assert_eq!(WorkingMethod::from_config("auto").unwrap(), None);
        assert_eq!(WorkingMethod::from_config("sway").unwrap(), Some(WorkingMethod::Sway));
        assert!(WorkingMethod::from_config("dbus").is_err());
    }

    #[test]
    fn test_forced_method_is_the_only_candidate() {
        let source = RealWindowSource::new("wmctrl").unwrap();
        assert_eq!(source.candidates(), vec![WorkingMethod::Wmctrl]);
    }
}
