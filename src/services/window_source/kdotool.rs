use crate::error::{Result, TrackerError};
use crate::events::WindowInfo;
use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

pub struct KdotoolDetector;

fn build_env_overrides() -> HashMap<String, String> {
    let mut env_vars = HashMap::new();

    // Под sudo kdotool должен ходить в сессионную шину исходного пользователя
    if std::env::var("USER").unwrap_or_default() == "root" {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if let Ok(output) = Command::new("id").args(["-u", sudo_user.as_str()]).output() {
                if let Ok(uid_str) = String::from_utf8(output.stdout) {
                    let uid = uid_str.trim();
                    let user_runtime_dir = format!("/run/user/{}", uid);
                    let dbus_address = format!("unix:path={}/bus", user_runtime_dir);

                    debug!("Подставляем переменные окружения для пользователя {}: uid={}", sudo_user, uid);
                    env_vars.insert("DBUS_SESSION_BUS_ADDRESS".to_string(), dbus_address);
                    env_vars.insert("XDG_RUNTIME_DIR".to_string(), user_runtime_dir);
                    env_vars.insert("USER".to_string(), sudo_user);
                }
            }
        }
    }

    if let Ok(display_var) = std::env::var("DISPLAY") {
        env_vars.insert("DISPLAY".to_string(), display_var);
    }

    env_vars
}

impl KdotoolDetector {
    pub fn new() -> Self {
        Self
    }

    fn create_command(args: &[&str]) -> Command {
        let mut cmd = if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            let mut cmd = Command::new("sudo");
            cmd.args(["-E", "-u", sudo_user.as_str(), "kdotool"]);
            cmd.args(args);
            cmd
        } else {
            let mut cmd = Command::new("kdotool");
            cmd.args(args);
            cmd
        };

        for (key, value) in build_env_overrides() {
            cmd.env(key, value);
        }

        cmd
    }

    fn run(args: &[&str]) -> Result<String> {
        let output = Self::create_command(args).output()?;
        if !output.status.success() {
            debug!("kdotool {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
            return Err(TrackerError::Internal(format!("kdotool {} failed", args[0])));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn test(&self) -> Result<()> {
        debug!("=== Тестируем kdotool ===");
        let window_id = Self::run(&["getactivewindow"])?;
        Self::run(&["getwindowname", window_id.as_str()])?;
        debug!("=== kdotool работает ===");
        Ok(())
    }

    pub async fn get_active_window(&self) -> Result<WindowInfo> {
        let window_id = Self::run(&["getactivewindow"])?;

        // Пустое название - нормальная ситуация (рабочий стол в фокусе)
        let title = Self::run(&["getwindowname", window_id.as_str()])?;
        Ok(WindowInfo::new(title).with_class("KDE".to_string()))
    }
}
