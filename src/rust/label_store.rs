use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, Result};
use crate::label::Label;
use crate::storage::write_atomically;

/// The most recent user-assigned label per email, with running counts.
///
/// `count_ham` and `count_spam` always equal the number of entries holding each
/// label. Absence of an entry means the email is unlabeled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelStore {
    labels: BTreeMap<usize, Label>,
    #[serde(default)]
    count_ham: usize,
    #[serde(default)]
    count_spam: usize,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store from `path`, or starts empty if the file does not exist.
    ///
    /// Counts that disagree with the stored entries are recomputed.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No label store at {:?}, starting with no labels", path);
                return Ok(Self::new());
            }
            Err(e) => return Err(LabelerError::persistence(path, e)),
        };

        let mut store: LabelStore =
            serde_json::from_slice(&bytes).map_err(|e| LabelerError::persistence(path, e))?;

        if !store.is_consistent() {
            log::warn!(
                "Label counts in {:?} (ham: {}, spam: {}) do not match the {} stored labels; recounting",
                path,
                store.count_ham,
                store.count_spam,
                store.labels.len()
            );
            store.recount();
        }

        log::info!(
            "Loaded {} labels ({} ham, {} spam) from {:?}",
            store.labels.len(),
            store.count_ham,
            store.count_spam,
            path
        );
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| LabelerError::persistence(path, e))?;
        write_atomically(path, &bytes).map_err(|e| LabelerError::persistence(path, e))
    }

    pub fn get(&self, id: usize) -> Option<Label> {
        self.labels.get(&id).copied()
    }

    /// `(count_ham, count_spam)`
    pub fn counts(&self) -> (usize, usize) {
        (self.count_ham, self.count_spam)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Label)> + '_ {
        self.labels.iter().map(|(&id, &label)| (id, label))
    }

    /// Records `label` for `id` and returns the label it replaced.
    pub(crate) fn set(&mut self, id: usize, label: Label) -> Option<Label> {
        let previous = self.labels.insert(id, label);
        match previous {
            Some(old) if old == label => {}
            Some(old) => {
                *self.count_mut(old) -= 1;
                *self.count_mut(label) += 1;
            }
            None => *self.count_mut(label) += 1,
        }
        previous
    }

    /// Puts back the entry that a [`set`](Self::set) call replaced.
    pub(crate) fn restore(&mut self, id: usize, previous: Option<Label>) {
        match previous {
            Some(label) => {
                self.set(id, label);
            }
            None => {
                if let Some(current) = self.labels.remove(&id) {
                    *self.count_mut(current) -= 1;
                }
            }
        }
    }

    fn count_mut(&mut self, label: Label) -> &mut usize {
        match label {
            Label::Ham => &mut self.count_ham,
            Label::Spam => &mut self.count_spam,
        }
    }

    fn is_consistent(&self) -> bool {
        let ham = self.labels.values().filter(|&&l| l == Label::Ham).count();
        ham == self.count_ham && self.labels.len() - ham == self.count_spam
    }

    fn recount(&mut self) {
        self.count_ham = self.labels.values().filter(|&&l| l == Label::Ham).count();
        self.count_spam = self.labels.len() - self.count_ham;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(store: &LabelStore) {
        let (ham, spam) = store.counts();
        assert_eq!(ham + spam, store.len());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_first_label_increments_count() {
        let mut store = LabelStore::new();
        assert_eq!(store.set(3, Label::Spam), None);
        assert_eq!(store.get(3), Some(Label::Spam));
        assert_eq!(store.counts(), (0, 1));
        assert_invariant(&store);
    }

    #[test]
    fn test_same_label_is_not_double_counted() {
        let mut store = LabelStore::new();
        store.set(1, Label::Ham);
        assert_eq!(store.set(1, Label::Ham), Some(Label::Ham));
        assert_eq!(store.counts(), (1, 0));
        assert_invariant(&store);
    }

    #[test]
    fn test_changing_label_moves_count() {
        let mut store = LabelStore::new();
        store.set(1, Label::Ham);
        store.set(2, Label::Ham);
        store.set(1, Label::Spam);
        assert_eq!(store.counts(), (1, 1));
        assert_invariant(&store);
    }

    #[test]
    fn test_restore_undoes_set() {
        let mut store = LabelStore::new();
        store.set(1, Label::Ham);
        let before = store.clone();

        let previous = store.set(1, Label::Spam);
        store.restore(1, previous);
        assert_eq!(store, before);

        let previous = store.set(9, Label::Spam);
        store.restore(9, previous);
        assert_eq!(store, before);
        assert_eq!(store.get(9), None);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LabelStore::load(&dir.path().join("labels.json")).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.counts(), (0, 0));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");

        let mut store = LabelStore::new();
        store.set(0, Label::Spam);
        store.set(7, Label::Ham);
        store.save(&path).unwrap();

        let loaded = LabelStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_repairs_inconsistent_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(
            &path,
            r#"{"labels": {"0": "spam", "1": "ham", "2": "spam"}, "count_ham": 5, "count_spam": 0}"#,
        )
        .unwrap();

        let store = LabelStore::load(&path).unwrap();
        assert_eq!(store.counts(), (1, 2));
        assert_invariant(&store);
    }

    #[test]
    fn test_load_recounts_when_counts_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, r#"{"labels": {"0": "spam", "4": "ham", "5": "spam"}}"#).unwrap();

        let store = LabelStore::load(&path).unwrap();
        assert_eq!(store.counts(), (1, 2));
        assert_eq!(store.get(0), Some(Label::Spam));
        assert_invariant(&store);
    }

    #[test]
    fn test_unreadable_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(LabelStore::load(&path), Err(LabelerError::Persistence { .. })));
    }
}
