//! Append-only record storage for the mood log and favorite cities.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    marker::PhantomData,
    path::PathBuf,
};

pub trait RecordStore<R>: Send + Sync {
    fn append(&self, record: &R) -> Result<()>;
    fn list_all(&self) -> Result<Vec<R>>;
}

/// Flat file with one JSON record per line.
#[derive(Debug, Clone)]
pub struct FlatFileStore<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R> FlatFileStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _record: PhantomData }
    }
}

impl<R> RecordStore<R> for FlatFileStore<R>
where
    R: Serialize + DeserializeOwned,
{
    fn append(&self, record: &R) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let mut line = serde_json::to_string(record).context("Failed to serialize record")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open data file: {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to write data file: {}", self.path.display()))?;

        tracing::debug!("Appended record to {}", self.path.display());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<R>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read data file: {}", self.path.display()))?;

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).with_context(|| {
                    format!("Malformed record at {}:{}", self.path.display(), idx + 1)
                })
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct MemoryStore<R> {
    records: Mutex<Vec<R>>,
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self { records: Mutex::new(Vec::new()) }
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RecordStore<R> for MemoryStore<R>
where
    R: Clone + Send,
{
    fn append(&self, record: &R) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<R>> {
        Ok(self.records.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FavoriteCity;
    use chrono::{TimeZone, Utc};

    fn favorite(city: &str) -> FavoriteCity {
        FavoriteCity {
            city: city.to_string(),
            added_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store: FlatFileStore<FavoriteCity> = FlatFileStore::new(dir.path().join("none.jsonl"));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn appended_records_come_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path().join("nested/favorites.jsonl"));

        store.append(&favorite("Oslo")).unwrap();
        store.append(&favorite("Lima")).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all, vec![favorite("Oslo"), favorite("Lima")]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.jsonl");
        let line = serde_json::to_string(&favorite("Rome")).unwrap();
        fs::write(&path, format!("\n{line}\n\n")).unwrap();

        let store: FlatFileStore<FavoriteCity> = FlatFileStore::new(&path);
        assert_eq!(store.list_all().unwrap(), vec![favorite("Rome")]);
    }

    #[test]
    fn malformed_line_names_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.jsonl");
        let line = serde_json::to_string(&favorite("Rome")).unwrap();
        fs::write(&path, format!("{line}\nnot json\n")).unwrap();

        let store: FlatFileStore<FavoriteCity> = FlatFileStore::new(&path);
        let err = store.list_all().unwrap_err();
        assert!(err.to_string().contains("favorites.jsonl:2"));
    }

    #[test]
    fn memory_store_keeps_records() {
        let store = MemoryStore::new();
        store.append(&favorite("Kyiv")).unwrap();
        assert_eq!(store.list_all().unwrap(), vec![favorite("Kyiv")]);
    }
}
