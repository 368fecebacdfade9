use crate::error::{Result, TrackerError};
use crate::events::WindowInfo;
use std::process::Command;
use tracing::debug;

pub struct XdotoolDetector;

impl XdotoolDetector {
    pub fn new() -> Self {
        Self
    }

    pub async fn test(&self) -> Result<()> {
        let output = Command::new("xdotool").args(["getactivewindow", "getwindowname"]).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(TrackerError::Internal("xdotool failed".to_string()))
        }
    }

    pub async fn get_active_window(&self) -> Result<WindowInfo> {
        debug!("Попытка получить активное окно через xdotool");
        let output = Command::new("xdotool")
            .args(["getactivewindow", "getwindowname"])
            .output()
            .map_err(|e| {
                debug!("xdotool не найден или не работает: {}", e);
                TrackerError::Internal(format!("xdotool не найден: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("xdotool вернул ошибку: {}", stderr);
            return Err(TrackerError::Internal(format!("xdotool вернул ошибку: {}", stderr)));
        }

        let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("xdotool получил заголовок окна: '{}'", title);

        let class = match Command::new("xdotool")
            .args(["getactivewindow", "getwindowclassname"])
            .output()
        {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
            Err(_) => {
                debug!("Не удалось получить класс окна");
                "Unknown".to_string()
            }
        };

        Ok(WindowInfo::new(title).with_class(class))
    }
}
