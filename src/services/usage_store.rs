use crate::error::{Result, TrackerError};
use crate::events::interval::format_timestamp;
use crate::events::{CompletedInterval, TimeEntry};
use crate::tracker_error;
use crate::utils::paths::StoragePaths;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Версия формата бинарного файла состояния
const STATE_FORMAT_VERSION: u32 = 1;

pub type DescriptionLog = IndexMap<String, Vec<TimeEntry>>;

/// Накопленная история: приложение -> описание -> записи в хронологическом порядке.
///
/// Порядок ключей совпадает с порядком первого появления, записи только дописываются.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStore {
    apps: IndexMap<String, DescriptionLog>,
}

#[derive(Serialize, Deserialize)]
struct StateEnvelope {
    version: u32,
    store: UsageStore,
}

/// Представление записи для JSON-экспорта
#[derive(Serialize)]
struct ExportEntry {
    start: String,
    end: String,
    seconds: u64,
}

impl UsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, interval: CompletedInterval) {
        let entry = interval.entry();
        self.apps
            .entry(interval.application)
            .or_default()
            .entry(interval.description)
            .or_default()
            .push(entry);
    }

    pub fn applications(&self) -> impl Iterator<Item = (&str, &DescriptionLog)> {
        self.apps.iter().map(|(app, descs)| (app.as_str(), descs))
    }

    pub fn descriptions(&self, application: &str) -> Option<&DescriptionLog> {
        self.apps.get(application)
    }

    pub fn entries(&self, application: &str, description: &str) -> &[TimeEntry] {
        self.apps
            .get(application)
            .and_then(|descs| descs.get(description))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn interval_count(&self) -> usize {
        self.apps
            .values()
            .flat_map(|descs| descs.values())
            .map(Vec::len)
            .sum()
    }

    pub fn total_seconds(&self) -> u64 {
        self.apps
            .values()
            .flat_map(|descs| descs.values())
            .flatten()
            .map(|entry| entry.seconds)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.interval_count() == 0
    }

    /// Загружает состояние; отсутствие файла означает пустую историю
    pub fn load(path: &Path) -> Result<Self> {
        match Self::read_state(path) {
            Err(TrackerError::PersistenceMissing(path)) => {
                info!("Сохранённая история не найдена ({}), начинаем с нуля", path.display());
                Ok(Self::new())
            }
            result => result,
        }
    }

    fn read_state(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TrackerError::PersistenceMissing(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: StateEnvelope = bincode::deserialize(&bytes)?;
        if envelope.version != STATE_FORMAT_VERSION {
            return Err(tracker_error!(
                corrupt_state,
                "{}: неизвестная версия формата {}",
                path.display(),
                envelope.version
            ));
        }

        info!(
            "История загружена из {}: {} приложений, {} интервалов",
            path.display(),
            envelope.store.apps.len(),
            envelope.store.interval_count()
        );
        Ok(envelope.store)
    }

    /// Сохраняет бинарное состояние и JSON-экспорт для ручного анализа
    pub fn save(&self, paths: &StoragePaths) -> Result<()> {
        fs::create_dir_all(&paths.data_dir)?;

        let envelope = StateEnvelope {
            version: STATE_FORMAT_VERSION,
            store: self.clone(),
        };
        fs::write(&paths.state_file, bincode::serialize(&envelope)?)?;
        debug!("Бинарное состояние записано в {}", paths.state_file.display());

        fs::write(&paths.export_file, self.to_json()?)?;
        debug!("JSON-экспорт записан в {}", paths.export_file.display());

        info!(
            "История сохранена: {} интервалов в {}",
            self.interval_count(),
            paths.data_dir.display()
        );
        Ok(())
    }

    /// JSON вида `{приложение: {описание: [{start, end, seconds}]}}`
    pub fn to_json(&self) -> Result<String> {
        let export: IndexMap<&str, IndexMap<&str, Vec<ExportEntry>>> = self
            .apps
            .iter()
            .map(|(app, descs)| {
                let descs = descs
                    .iter()
                    .map(|(desc, entries)| {
                        let entries = entries
                            .iter()
                            .map(|entry| ExportEntry {
                                start: format_timestamp(&entry.start),
                                end: format_timestamp(&entry.end),
                                seconds: entry.seconds,
                            })
                            .collect();
                        (desc.as_str(), entries)
                    })
                    .collect();
                (app.as_str(), descs)
            })
            .collect();

        Ok(serde_json::to_string_pretty(&export)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::interval::parse_timestamp;
    use chrono::Duration;
    use tempfile::TempDir;

    fn interval(app: &str, desc: &str, start: &str, seconds: i64) -> CompletedInterval {
        let start = parse_timestamp(start).unwrap();
        let end = start + Duration::seconds(seconds);
        CompletedInterval {
            application: app.to_string(),
            description: desc.to_string(),
            start,
            end,
            seconds: seconds as u64,
        }
    }

    fn sample_store() -> UsageStore {
        let mut store = UsageStore::new();
        store.append(interval("Editor", "file.txt", "2024-01-02 10:00:00", 120));
        store.append(interval("Browser", "", "2024-01-02 10:02:00", 45));
        store.append(interval("Browser", "", "2024-01-02 10:05:00", 30));
        store.append(interval("Editor", "other.txt", "2024-01-02 10:06:00", 10));
        store
    }

    fn paths(dir: &TempDir) -> StoragePaths {
        StoragePaths {
            data_dir: dir.path().join("data"),
            state_file: dir.path().join("data/saved.bin"),
            export_file: dir.path().join("data/saved.json"),
        }
    }

    #[test]
    fn test_append_creates_nested_entries() {
        let store = sample_store();

        let apps: Vec<&str> = store.applications().map(|(app, _)| app).collect();
        assert_eq!(apps, vec!["Editor", "Browser"]);
        assert_eq!(store.entries("Browser", "").len(), 2);
        assert_eq!(store.entries("Editor", "file.txt")[0].seconds, 120);
        assert!(store.entries("Missing", "").is_empty());
        assert_eq!(store.interval_count(), 4);
        assert_eq!(store.total_seconds(), 205);
    }

    #[test]
    fn test_entries_keep_chronological_order() {
        let store = sample_store();
        let entries = store.entries("Browser", "");
        assert!(entries[0].start < entries[1].start);
    }

    #[test]
    fn test_load_missing_file_gives_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = UsageStore::load(&dir.path().join("nope.bin")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        let store = sample_store();

        store.save(&paths).unwrap();
        let loaded = UsageStore::load(&paths.state_file).unwrap();
        assert_eq!(loaded, store);

        let empty = UsageStore::new();
        empty.save(&paths).unwrap();
        assert_eq!(UsageStore::load(&paths.state_file).unwrap(), empty);
    }

    #[test]
    fn test_loaded_store_keeps_appending() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        sample_store().save(&paths).unwrap();

        let mut store = UsageStore::load(&paths.state_file).unwrap();
        store.append(interval("Browser", "", "2024-01-03 09:00:00", 5));

        let entries = store.entries("Browser", "");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].seconds, 5);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.bin");
        let envelope = StateEnvelope {
            version: STATE_FORMAT_VERSION + 1,
            store: sample_store(),
        };
        fs::write(&path, bincode::serialize(&envelope).unwrap()).unwrap();

        let err = UsageStore::load(&path).unwrap_err();
        assert!(matches!(err, TrackerError::CorruptState(_)));
    }

    #[test]
    fn test_garbage_state_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.bin");
        fs::write(&path, b"\x01").unwrap();
        assert!(UsageStore::load(&path).is_err());
    }

    #[test]
    fn test_json_export_shape() {
        let store = sample_store();
        let json: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();

        let entry = &json["Editor"]["file.txt"][0];
        assert_eq!(entry["start"], "2024-01-02 10:00:00");
        assert_eq!(entry["end"], "2024-01-02 10:02:00");
        assert_eq!(entry["seconds"], 120);
        assert_eq!(json["Browser"][""].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_save_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        sample_store().save(&paths).unwrap();

        assert!(paths.state_file.exists());
        let json = fs::read_to_string(&paths.export_file).unwrap();
        assert!(json.contains("\"Editor\""));
    }
}
