use crate::error::{Result, TrackerError};
use crate::events::WindowInfo;
use std::process::Command;

pub struct SwayDetector;

impl SwayDetector {
    pub fn new() -> Self {
        Self
    }

    pub async fn test(&self) -> Result<()> {
        let output = Command::new("swaymsg").args(["-t", "get_tree"]).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(TrackerError::Internal("sway failed".to_string()))
        }
    }

    pub async fn get_active_window(&self) -> Result<WindowInfo> {
        let output = Command::new("swaymsg")
            .args(["-t", "get_tree"])
            .output()
            .map_err(|e| TrackerError::Internal(format!("swaymsg не найден: {}", e)))?;

        if !output.status.success() {
            return Err(TrackerError::Internal("swaymsg вернул ошибку".to_string()));
        }

        let tree: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        find_focused(&tree)
            .ok_or_else(|| TrackerError::Internal("Активное окно в Sway не найдено".to_string()))
    }
}

/// Обход дерева swaymsg в поисках узла с `"focused": true`
fn find_focused(node: &serde_json::Value) -> Option<WindowInfo> {
    if node["focused"].as_bool() == Some(true) {
        let title = node["name"].as_str().unwrap_or_default().to_string();
        let class = node["app_id"]
            .as_str()
            .or_else(|| node["window_properties"]["class"].as_str())
            .unwrap_or_default()
            .to_string();
        return Some(WindowInfo::new(title).with_class(class));
    }

    ["nodes", "floating_nodes"]
        .iter()
        .filter_map(|key| node[*key].as_array())
        .flatten()
        .find_map(find_focused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_focused_in_nested_tree() {
        let tree = json!({
            "name": "root",
            "focused": false,
            "nodes": [{
                "name": "workspace",
                "focused": false,
                "nodes": [],
                "floating_nodes": [{
                    "name": "draft - Mail",
                    "focused": true,
                    "app_id": "thunderbird"
                }]
            }]
        });

        let window = find_focused(&tree).unwrap();
        assert_eq!(window.title, "draft - Mail");
        assert_eq!(window.class, "thunderbird");
    }

    #[test]
    fn test_find_focused_none() {
        let tree = json!({"name": "root", "focused": false, "nodes": []});
        assert!(find_focused(&tree).is_none());
    }
}
