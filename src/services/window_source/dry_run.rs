use super::r#trait::WindowSource;
use tracing::info;

/// Сценарий по умолчанию: (заголовок, сколько опросов окно держит фокус)
const DEFAULT_SCRIPT: &[(&str, usize)] = &[
    ("main.rs - apptime - Visual Studio Code", 4),
    ("Новое сообщение - Telegram", 1),
    ("main.rs - apptime - Visual Studio Code", 3),
    ("Inbox - Mozilla Firefox", 5),
    ("zsh - Terminal", 3),
    ("", 2),
];

/// Эмуляция окон для dry-run режима: проигрывает сценарий по кругу
pub struct DryRunSource {
    script: Vec<(String, usize)>,
    position: usize,
    remaining: usize,
}

impl DryRunSource {
    pub fn new(script: Vec<(String, usize)>) -> Self {
        let script: Vec<(String, usize)> = script.into_iter().filter(|(_, polls)| *polls > 0).collect();
        let remaining = script.first().map(|(_, polls)| *polls).unwrap_or(0);
        Self {
            script,
            position: 0,
            remaining,
        }
    }
}

impl Default for DryRunSource {
    fn default() -> Self {
        Self::new(
            DEFAULT_SCRIPT
                .iter()
                .map(|(title, polls)| (title.to_string(), *polls))
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl WindowSource for DryRunSource {
    async fn current_identity(&mut self) -> String {
        if self.script.is_empty() {
            return String::new();
        }

        if self.remaining == 0 {
            self.position = (self.position + 1) % self.script.len();
            self.remaining = self.script[self.position].1;
            info!("Dry-run: эмулируем смену окна на: \"{}\"", self.script[self.position].0);
        }

        self.remaining -= 1;
        self.script[self.position].0.clone()
    }
}
