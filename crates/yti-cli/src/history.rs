use crate::config::ConfigPaths;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use yti_core::StandupEntry;

const MAX_HISTORY_ENTRIES: usize = 200;
pub const DEFAULT_RECENT_LIMIT: usize = 7;
const MIN_RECENT_LIMIT: usize = 1;
const MAX_RECENT_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history io error: {0}")]
    Io(#[from] io::Error),
    #[error("history encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only standup store: one markdown artifact per entry plus a single
/// newest-first JSON history file, capped at a fixed entry count.
#[derive(Debug)]
pub struct HistoryStore {
    history_path: PathBuf,
    standups_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(paths: &ConfigPaths, export_dir: &str) -> Self {
        Self {
            history_path: paths.history_path.clone(),
            standups_dir: resolve_export_dir(paths, export_dir),
        }
    }

    /// Write the entry's markdown artifact and prepend the entry to the
    /// history. Returns the markdown path.
    pub fn save(&self, entry: &StandupEntry) -> Result<PathBuf, HistoryError> {
        fs::create_dir_all(&self.standups_dir)?;
        let markdown_path = self.standups_dir.join(&entry.markdown_file_name);
        fs::write(&markdown_path, &entry.markdown_content)?;

        let mut entries = self.read_all();
        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY_ENTRIES);
        self.write_all(&entries)?;
        Ok(markdown_path)
    }

    /// The `limit` most recent entries, newest first. `limit` is clamped.
    pub fn recent(&self, limit: usize) -> Vec<StandupEntry> {
        let mut entries = self.read_all();
        entries.truncate(clamp_limit(limit));
        entries
    }

    // A missing or malformed history file reads as empty rather than
    // erroring; the next save rewrites it wholesale.
    fn read_all(&self) -> Vec<StandupEntry> {
        let Ok(content) = fs::read_to_string(&self.history_path) else {
            return Vec::new();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    fn write_all(&self, entries: &[StandupEntry]) -> Result<(), HistoryError> {
        let mut content = serde_json::to_string_pretty(entries)?;
        content.push('\n');
        write_atomic(&self.history_path, content.as_bytes())
    }
}

pub fn clamp_limit(requested: usize) -> usize {
    requested.clamp(MIN_RECENT_LIMIT, MAX_RECENT_LIMIT)
}

fn resolve_export_dir(paths: &ConfigPaths, export_dir: &str) -> PathBuf {
    let trimmed = export_dir.trim();
    if trimmed.is_empty() {
        return paths.standups_dir.clone();
    }
    let path = PathBuf::from(trimmed);
    if path.is_absolute() {
        path
    } else {
        paths.base_dir.join(path)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), HistoryError> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("history path missing parent directory"))?;
    fs::create_dir_all(parent)?;
    let tmp_path = parent.join("history.json.tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_RECENT_LIMIT, HistoryStore, clamp_limit};
    use crate::config::ConfigPaths;
    use std::fs;
    use yti_core::{StandupEntry, StandupSections};

    fn entry(id: &str, date_iso: &str) -> StandupEntry {
        StandupEntry {
            id: id.to_string(),
            date_iso: date_iso.to_string(),
            display_name: "Ada".to_string(),
            raw_transcript: "raw".to_string(),
            formatted_text: "Ada\n\nY:\n\n* None\n\nT:\n\n* None\n\nI:\n\n* None\n".to_string(),
            markdown_content: format!("# Daily Standup - {date_iso}\n\nAda\n"),
            markdown_file_name: format!("{date_iso}_yti.md"),
            sections: StandupSections {
                impediments: vec!["None".to_string()],
                ..Default::default()
            },
            created_at: format!("{date_iso}T09:00:00Z"),
        }
    }

    fn store(temp: &tempfile::TempDir) -> (ConfigPaths, HistoryStore) {
        let paths = ConfigPaths::from_base(temp.path().join("yti"));
        let store = HistoryStore::new(&paths, "");
        (paths, store)
    }

    #[test]
    fn save_writes_markdown_and_history() {
        let temp = tempfile::tempdir().unwrap();
        let (paths, store) = store(&temp);

        let markdown_path = store.save(&entry("a", "2024-01-15")).unwrap();
        assert_eq!(markdown_path, paths.standups_dir.join("2024-01-15_yti.md"));
        let markdown = fs::read_to_string(&markdown_path).unwrap();
        assert!(markdown.starts_with("# Daily Standup - 2024-01-15"));

        let entries = store.recent(DEFAULT_RECENT_LIMIT);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a");
    }

    #[test]
    fn history_is_newest_first() {
        let temp = tempfile::tempdir().unwrap();
        let (_paths, store) = store(&temp);

        store.save(&entry("a", "2024-01-14")).unwrap();
        store.save(&entry("b", "2024-01-15")).unwrap();

        let entries = store.recent(DEFAULT_RECENT_LIMIT);
        assert_eq!(entries[0].id, "b");
        assert_eq!(entries[1].id, "a");
    }

    #[test]
    fn history_round_trips_camel_case_fields() {
        let temp = tempfile::tempdir().unwrap();
        let (paths, store) = store(&temp);

        store.save(&entry("a", "2024-01-15")).unwrap();
        let raw = fs::read_to_string(&paths.history_path).unwrap();
        assert!(raw.contains("\"dateISO\""));
        assert!(raw.contains("\"markdownFileName\""));
        assert!(raw.contains("\"createdAt\""));
    }

    #[test]
    fn corrupt_history_reads_as_empty() {
        let temp = tempfile::tempdir().unwrap();
        let (paths, store) = store(&temp);

        fs::create_dir_all(&paths.base_dir).unwrap();
        fs::write(&paths.history_path, "not json at all").unwrap();
        assert!(store.recent(DEFAULT_RECENT_LIMIT).is_empty());

        store.save(&entry("a", "2024-01-15")).unwrap();
        assert_eq!(store.recent(DEFAULT_RECENT_LIMIT).len(), 1);
    }

    #[test]
    fn history_caps_entry_count() {
        let temp = tempfile::tempdir().unwrap();
        let (_paths, store) = store(&temp);

        for i in 0..205 {
            store.save(&entry(&format!("id-{i}"), "2024-01-15")).unwrap();
        }
        let entries = store.recent(50);
        assert_eq!(entries[0].id, "id-204");
        assert_eq!(store.read_all().len(), 200);
    }

    #[test]
    fn recent_clamps_limit() {
        let temp = tempfile::tempdir().unwrap();
        let (_paths, store) = store(&temp);

        for i in 0..5 {
            store.save(&entry(&format!("id-{i}"), "2024-01-15")).unwrap();
        }
        // Zero clamps up to one entry, oversized requests clamp to the max.
        assert_eq!(store.recent(0).len(), 1);
        assert_eq!(store.recent(1000).len(), 5);
    }

    #[test]
    fn clamp_limit_bounds() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(7), 7);
        assert_eq!(clamp_limit(1000), 50);
    }

    #[test]
    fn export_dir_override_is_used() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::from_base(temp.path().join("yti"));
        let store = HistoryStore::new(&paths, "exports");

        let markdown_path = store.save(&entry("a", "2024-01-15")).unwrap();
        assert_eq!(
            markdown_path,
            paths.base_dir.join("exports").join("2024-01-15_yti.md")
        );
    }
}
