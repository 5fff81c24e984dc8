use crate::date::DateKey;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub date: DateKey,
    /// 0 = Monday, cached when the entry was written.
    pub weekday: u32,
    pub text: String,
}

/// Notes keyed by calendar date. At most one entry exists per date; an
/// entry whose text is empty counts as absent and is dropped by
/// [`NoteStore::compact`].
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    entries: Vec<NoteEntry>,
    index: HashMap<DateKey, usize>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct NoteFile {
    #[serde(default)]
    dates: Vec<StoredEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    day: u32,
    month: u32,
    year: i32,
    #[serde(default)]
    weekday: u32,
    #[serde(default)]
    text: String,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a persisted note file. Malformed input degrades to an empty
    /// store, and entries naming an impossible date are skipped.
    pub fn load(bytes: &[u8]) -> Self {
        let file: NoteFile = match serde_yaml::from_slice(bytes) {
            Ok(file) => file,
            Err(err) => {
                warn!("ignoring malformed note data: {}", err);
                return Self::new();
            }
        };
        let mut store = Self::new();
        for stored in file.dates {
            match DateKey::new(stored.year, stored.month, stored.day) {
                Ok(date) => store.set_text(date, stored.text),
                Err(err) => warn!("skipping stored note: {}", err),
            }
        }
        info!("loaded {} notes", store.len());
        store
    }

    /// Serializes the entries in their current order. Call
    /// [`NoteStore::compact`] first for canonical output.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let file = NoteFile {
            dates: self
                .entries
                .iter()
                .map(|entry| StoredEntry {
                    day: entry.date.day(),
                    month: entry.date.month(),
                    year: entry.date.year(),
                    weekday: entry.weekday,
                    text: entry.text.clone(),
                })
                .collect(),
        };
        let text = serde_yaml::to_string(&file).context("serializing notes")?;
        Ok(text.into_bytes())
    }

    pub fn get_text(&self, date: DateKey) -> &str {
        self.index
            .get(&date)
            .map(|&idx| self.entries[idx].text.as_str())
            .unwrap_or_default()
    }

    pub fn set_text(&mut self, date: DateKey, text: impl Into<String>) {
        let text = text.into();
        if let Some(&idx) = self.index.get(&date) {
            self.entries[idx].text = text;
            return;
        }
        self.index.insert(date, self.entries.len());
        self.entries.push(NoteEntry {
            date,
            weekday: date.weekday(),
            text,
        });
    }

    /// Drops empty notes and sorts the rest by date.
    pub fn compact(&mut self) {
        self.entries.retain(|entry| !entry.text.is_empty());
        self.entries.sort_by_key(|entry| entry.date);
        self.reindex();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &NoteEntry> {
        self.entries.iter()
    }

    /// Non-empty notes dated within `from..=to` (either bound optional), in
    /// date order.
    pub fn notes_between(&self, from: Option<DateKey>, to: Option<DateKey>) -> Vec<&NoteEntry> {
        let mut notes: Vec<&NoteEntry> = self
            .entries
            .iter()
            .filter(|entry| !entry.text.is_empty())
            .filter(|entry| from.map_or(true, |from| entry.date >= from))
            .filter(|entry| to.map_or(true, |to| entry.date <= to))
            .collect();
        notes.sort_by_key(|entry| entry.date);
        notes
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.date, idx))
            .collect();
    }
}

impl PartialEq for NoteStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for NoteStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::new(y, m, d).unwrap()
    }

    #[test]
    fn absent_dates_read_as_empty() {
        let store = NoteStore::new();
        assert_eq!(store.get_text(date(2024, 3, 15)), "");
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = NoteStore::new();
        store.set_text(date(2024, 3, 15), "x");
        assert_eq!(store.get_text(date(2024, 3, 15)), "x");
        store.set_text(date(2024, 3, 15), "y");
        assert_eq!(store.get_text(date(2024, 3, 15)), "y");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn new_entries_cache_the_weekday() {
        let mut store = NoteStore::new();
        store.set_text(date(2024, 3, 17), "sunday");
        let entry = store.entries().next().unwrap();
        assert_eq!(entry.weekday, 6);
    }

    #[test]
    fn clearing_keeps_entry_until_compaction() {
        let mut store = NoteStore::new();
        store.set_text(date(2024, 3, 15), "x");
        store.set_text(date(2024, 3, 16), "y");
        store.set_text(date(2024, 3, 15), "");
        assert_eq!(store.len(), 2);
        store.compact();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_text(date(2024, 3, 15)), "");
        assert_eq!(store.get_text(date(2024, 3, 16)), "y");
    }

    #[test]
    fn compaction_sorts_by_date_and_is_idempotent() {
        let mut store = NoteStore::new();
        store.set_text(date(2024, 12, 1), "c");
        store.set_text(date(2023, 12, 31), "a");
        store.set_text(date(2024, 1, 31), "b");
        store.set_text(date(2024, 2, 1), "");
        store.compact();
        let order: Vec<String> = store.entries().map(|e| e.date.to_string()).collect();
        assert_eq!(order, vec!["2023-12-31", "2024-01-31", "2024-12-01"]);

        let once = store.clone();
        store.compact();
        assert_eq!(store, once);
        assert_eq!(store.get_text(date(2024, 1, 31)), "b");
    }

    #[test]
    fn serialized_form_lists_every_field() {
        let mut store = NoteStore::new();
        store.set_text(date(2024, 3, 15), "Dentist\nbring card");
        let text = String::from_utf8(store.serialize().unwrap()).unwrap();
        assert!(text.contains("day: 15"));
        assert!(text.contains("month: 3"));
        assert!(text.contains("year: 2024"));
        assert!(text.contains("weekday: 4"));

        let reloaded = NoteStore::load(text.as_bytes());
        assert_eq!(reloaded, store);
    }

    #[test]
    fn malformed_input_loads_empty() {
        assert!(NoteStore::load(b"dates: [ {day: ").is_empty());
        assert!(NoteStore::load(b"- just\n- a list\n").is_empty());
        assert!(NoteStore::load(b"").is_empty());
    }

    #[test]
    fn load_skips_impossible_dates_and_merges_duplicates() {
        let data = "\
dates:
- {day: 30, month: 2, year: 2024, weekday: 0, text: bogus}
- {day: 1, month: 3, year: 2024, weekday: 3, text: first}
- {day: 1, month: 3, year: 2024, weekday: 4, text: second}
";
        let store = NoteStore::load(data.as_bytes());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_text(date(2024, 3, 1)), "second");
        assert_eq!(store.entries().next().unwrap().weekday, 4);
    }

    #[test]
    fn notes_between_filters_and_orders() {
        let mut store = NoteStore::new();
        store.set_text(date(2024, 5, 1), "may");
        store.set_text(date(2024, 3, 1), "march");
        store.set_text(date(2024, 4, 1), "");
        store.set_text(date(2024, 1, 1), "january");
        let texts: Vec<&str> = store
            .notes_between(Some(date(2024, 2, 1)), None)
            .into_iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts, vec!["march", "may"]);
        assert_eq!(store.notes_between(None, Some(date(2024, 1, 1))).len(), 1);
    }
}
