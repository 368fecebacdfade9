use crate::events::TimeEntry;
use crate::services::usage_store::UsageStore;
use chrono::{DateTime, Local};
use std::fmt;

/// Суммарное время по одному ключу (приложению или описанию)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageTotal {
    pub name: String,
    pub seconds: u64,
}

impl UsageTotal {
    fn new(name: &str, seconds: u64) -> Self {
        Self {
            name: name.to_string(),
            seconds,
        }
    }
}

impl fmt::Display for UsageTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}s ({})", self.name, self.seconds, format_duration(self.seconds))
    }
}

/// Время по приложениям, по убыванию. При равенстве сохраняется порядок хранилища.
pub fn summarize(store: &UsageStore) -> Vec<UsageTotal> {
    summarize_filtered(store, |_| true)
}

/// Как `summarize`, но учитывает только записи, начавшиеся не раньше `since`
pub fn summarize_since(store: &UsageStore, since: DateTime<Local>) -> Vec<UsageTotal> {
    summarize_filtered(store, |entry| entry.start >= since)
}

fn summarize_filtered<F>(store: &UsageStore, keep: F) -> Vec<UsageTotal>
where
    F: Fn(&TimeEntry) -> bool,
{
    let totals = store
        .applications()
        .map(|(app, descs)| {
            let seconds = descs
                .values()
                .flatten()
                .filter(|entry| keep(*entry))
                .map(|entry| entry.seconds)
                .sum();
            UsageTotal::new(app, seconds)
        })
        .collect();

    ranked(totals)
}

/// Разбивка времени приложения по описаниям; `None`, если приложение не встречалось
pub fn breakdown(store: &UsageStore, application: &str) -> Option<Vec<UsageTotal>> {
    let descs = store.descriptions(application)?;
    let totals = descs
        .iter()
        .map(|(desc, entries)| UsageTotal::new(desc, entries.iter().map(|e| e.seconds).sum()))
        .collect();
    Some(ranked(totals))
}

fn ranked(mut totals: Vec<UsageTotal>) -> Vec<UsageTotal> {
    // sort_by стабилен - равные суммы остаются в порядке вставки
    totals.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    totals
}

/// Человекочитаемая длительность: 45s, 2m 05s, 1h 02m
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {:02}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {:02}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::interval::parse_timestamp;
    use crate::events::CompletedInterval;
    use chrono::Duration;

    fn push(store: &mut UsageStore, app: &str, desc: &str, start: &str, seconds: u64) {
        let start = parse_timestamp(start).unwrap();
        store.append(CompletedInterval {
            application: app.to_string(),
            description: desc.to_string(),
            start,
            end: start + Duration::seconds(seconds as i64),
            seconds,
        });
    }

    fn scenario() -> UsageStore {
        let mut store = UsageStore::new();
        push(&mut store, "Editor", "file.txt", "2024-02-01 09:00:00", 120);
        push(&mut store, "Browser", "", "2024-02-01 09:02:00", 45);
        push(&mut store, "Browser", "", "2024-02-01 09:03:00", 30);
        store
    }

    #[test]
    fn test_summarize_scenario() {
        let summary = summarize(&scenario());
        assert_eq!(
            summary,
            vec![UsageTotal::new("Editor", 120), UsageTotal::new("Browser", 75)]
        );
    }

    #[test]
    fn test_summary_sorted_and_sum_preserving() {
        let mut store = scenario();
        push(&mut store, "Terminal", "zsh", "2024-02-01 09:04:00", 300);
        push(&mut store, "Editor", "other.txt", "2024-02-01 09:10:00", 7);
        push(&mut store, "Mail", "", "2024-02-01 09:11:00", 0);

        let summary = summarize(&store);
        for pair in summary.windows(2) {
            assert!(pair[0].seconds >= pair[1].seconds);
        }
        let reported: u64 = summary.iter().map(|t| t.seconds).sum();
        assert_eq!(reported, store.total_seconds());
        assert_eq!(summary.len(), 4);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut store = UsageStore::new();
        push(&mut store, "Zeta", "", "2024-02-01 09:00:00", 10);
        push(&mut store, "Alpha", "", "2024-02-01 09:01:00", 10);
        push(&mut store, "Mid", "", "2024-02-01 09:02:00", 10);

        let names: Vec<String> = summarize(&store).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_empty_store_summary() {
        assert!(summarize(&UsageStore::new()).is_empty());
    }

    #[test]
    fn test_summarize_since_filters_by_start() {
        let store = scenario();
        let since = parse_timestamp("2024-02-01 09:02:30").unwrap();
        let summary = summarize_since(&store, since);

        assert_eq!(
            summary,
            vec![UsageTotal::new("Browser", 30), UsageTotal::new("Editor", 0)]
        );
    }

    #[test]
    fn test_breakdown_per_description() {
        let mut store = scenario();
        push(&mut store, "Editor", "notes.md", "2024-02-01 09:20:00", 600);

        let parts = breakdown(&store, "Editor").unwrap();
        assert_eq!(
            parts,
            vec![UsageTotal::new("notes.md", 600), UsageTotal::new("file.txt", 120)]
        );
        assert!(breakdown(&store, "Nope").is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(125), "2m 05s");
        assert_eq!(format_duration(3_720), "1h 02m");
        assert_eq!(format_duration(90_000), "25h 00m");
    }
}
