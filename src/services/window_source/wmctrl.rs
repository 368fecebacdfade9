use crate::error::{Result, TrackerError};
use crate::events::WindowInfo;
use std::process::Command;

pub struct WmctrlDetector;

impl WmctrlDetector {
    pub fn new() -> Self {
        Self
    }

    pub async fn test(&self) -> Result<()> {
        let output = Command::new("wmctrl").args(["-l"]).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(TrackerError::Internal("wmctrl failed".to_string()))
        }
    }

    pub async fn get_active_window(&self) -> Result<WindowInfo> {
        // `xprop -root _NET_ACTIVE_WINDOW` даёт id окна в фокусе, wmctrl -l - список с заголовками
        let active = Command::new("xprop")
            .args(["-root", "_NET_ACTIVE_WINDOW"])
            .output()
            .map_err(|e| TrackerError::Internal(format!("xprop не найден: {}", e)))?;
        let active_id = parse_active_window_id(&String::from_utf8_lossy(&active.stdout))
            .ok_or_else(|| TrackerError::Internal("Активное окно не найдено".to_string()))?;

        let output = Command::new("wmctrl")
            .args(["-l"])
            .output()
            .map_err(|e| TrackerError::Internal(format!("wmctrl не найден: {}", e)))?;

        if !output.status.success() {
            return Err(TrackerError::Internal("wmctrl вернул ошибку".to_string()));
        }

        find_title(&String::from_utf8_lossy(&output.stdout), active_id)
            .map(WindowInfo::new)
            .ok_or_else(|| TrackerError::Internal("Активное окно не найдено".to_string()))
    }
}

/// `_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00007`
fn parse_active_window_id(xprop: &str) -> Option<u64> {
    let hex = xprop.rsplit("# ").next()?.trim();
    u64::from_str_radix(hex.trim_start_matches("0x"), 16).ok()
}

/// Строка wmctrl -l: `0x03a00007  0 host Заголовок окна`
fn find_title(listing: &str, window_id: u64) -> Option<String> {
    listing.lines().find_map(|line| {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let id = u64::from_str_radix(parts.first()?.trim_start_matches("0x"), 16).ok()?;
        (id == window_id).then(|| parts.get(3..).map(|rest| rest.join(" ")).unwrap_or_default())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_active_window_id() {
        assert_eq!(
            parse_active_window_id("_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00007\n"),
            Some(0x3a00007)
        );
        assert_eq!(parse_active_window_id("garbage"), None);
    }

    #[test]
    fn test_find_title_matches_padded_ids() {
        let listing = "0x02200003  0 host Terminal\n0x03a00007  0 host notes.md - Editor\n";
        assert_eq!(find_title(listing, 0x3a00007).as_deref(), Some("notes.md - Editor"));
        assert_eq!(find_title(listing, 0x1), None);
    }
}
