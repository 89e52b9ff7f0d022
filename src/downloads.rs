//! In-flight and completed download bookkeeping.
//!
//! Keys are full model names (`base:variant`). A key that failed stays in
//! `downloading` (marked failed) until its delayed restore clears it, so the
//! card cannot be clicked while its failure label is showing.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadTracker {
    downloading: BTreeSet<String>,
    failed: BTreeSet<String>,
    /// Backend order, deduplicated.
    downloaded: Vec<String>,
}

impl DownloadTracker {
    /// Mark `key` in flight. Returns `false` when the key is already
    /// downloading or downloaded.
    pub fn start(&mut self, key: &str) -> bool {
        if self.is_busy(key) {
            return false;
        }
        self.downloading.insert(key.to_owned());
        true
    }

    /// Move `key` from in flight to downloaded.
    pub fn complete(&mut self, key: &str) {
        self.downloading.remove(key);
        self.failed.remove(key);
        if !self.is_downloaded(key) {
            self.downloaded.push(key.to_owned());
        }
    }

    pub fn fail(&mut self, key: &str) {
        if self.downloading.contains(key) {
            self.failed.insert(key.to_owned());
        }
    }

    /// Drop any transient state for `key`.
    pub fn clear(&mut self, key: &str) {
        self.downloading.remove(key);
        self.failed.remove(key);
    }

    /// Replace the downloaded set with the backend's authoritative list.
    pub fn replace_downloaded<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.downloaded.clear();
        for name in names {
            let name = name.into();
            if !self.downloaded.contains(&name) {
                self.downloaded.push(name);
            }
        }
    }

    #[must_use]
    pub fn is_downloading(&self, key: &str) -> bool {
        self.downloading.contains(key)
    }

    #[must_use]
    pub fn is_failed(&self, key: &str) -> bool {
        self.failed.contains(key)
    }

    #[must_use]
    pub fn is_downloaded(&self, key: &str) -> bool {
        self.downloaded.iter().any(|name| name == key)
    }

    /// The card for `key` must not accept clicks.
    #[must_use]
    pub fn is_busy(&self, key: &str) -> bool {
        self.is_downloading(key) || self.is_downloaded(key)
    }

    #[must_use]
    pub fn downloaded(&self) -> &[String] {
        &self.downloaded
    }

    pub fn downloading(&self) -> impl Iterator<Item = &str> {
        self.downloading.iter().map(String::as_str)
    }
}
