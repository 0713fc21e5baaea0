// Champion directory: resolves typed (partial) names to canonical names.
//
// The directory is an immutable snapshot behind a lock. Refresh builds a new
// snapshot and swaps it in whole, so readers see either the old map or the
// new one, never a mix.

pub mod refresh;
pub mod store;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Local};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors and status
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no data directory available for the champion cache")]
    NoDataDir,

    #[error("champion cache I/O failed for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("champion list refresh failed: {0}")]
    Refresh(String),
}

/// Observable state of the directory, shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryStatus {
    /// Serving the names loaded from the local cache (or nothing).
    Local,
    Updating,
    Updated {
        version: String,
        at: DateTime<Local>,
    },
    UpdateFailed,
}

impl fmt::Display for DirectoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryStatus::Local => f.write_str("local/cached"),
            DirectoryStatus::Updating => f.write_str("updating"),
            DirectoryStatus::Updated { version, at } => {
                write!(f, "updated ({version}) at {}", at.format("%H:%M"))
            }
            DirectoryStatus::UpdateFailed => f.write_str("update failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// DirectorySnapshot
// ---------------------------------------------------------------------------

/// An immutable name index.
#[derive(Debug, Default)]
pub struct DirectorySnapshot {
    /// Canonical names in source order, deduplicated case-insensitively.
    names: Vec<String>,
    /// Normalized keys in insertion order, pointing into `names`.
    keys: Vec<(String, usize)>,
    exact_lower: HashMap<String, usize>,
    /// Lowercased keys with spaces removed. Checked only after `exact_lower`.
    exact_compact: HashMap<String, usize>,
}

impl DirectorySnapshot {
    pub fn build<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut snapshot = DirectorySnapshot::default();
        let mut seen = HashSet::new();

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || !seen.insert(name.to_lowercase()) {
                continue;
            }
            let idx = snapshot.names.len();
            snapshot.names.push(name.to_string());

            let (lower, compact) = normalize(name);
            snapshot.exact_lower.entry(lower.clone()).or_insert(idx);
            snapshot.exact_compact.entry(compact.clone()).or_insert(idx);
            if compact != lower {
                snapshot.keys.push((compact, idx));
            }
            snapshot.keys.push((lower, idx));
        }

        snapshot
    }

    /// Resolve `query` to a canonical name.
    ///
    /// Tries an exact lowercase match, then an exact match with spaces
    /// removed, then the first key (in insertion order) that starts with the
    /// query. Empty queries never match.
    pub fn resolve(&self, query: &str) -> Option<&str> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let (lower, compact) = normalize(query);

        let idx = self
            .exact_lower
            .get(&lower)
            .or_else(|| self.exact_compact.get(&compact))
            .copied()
            .or_else(|| {
                self.keys
                    .iter()
                    .find(|(key, _)| key.starts_with(&lower) || key.starts_with(&compact))
                    .map(|(_, idx)| *idx)
            })?;
        Some(&self.names[idx])
    }

    /// Up to `limit` names whose keys start with `prefix`, in insertion
    /// order.
    pub fn complete(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }
        let (lower, compact) = normalize(prefix);

        let mut picked = Vec::new();
        for (key, idx) in &self.keys {
            if picked.len() == limit {
                break;
            }
            if (key.starts_with(&lower) || key.starts_with(&compact)) && !picked.contains(idx) {
                picked.push(*idx);
            }
        }
        picked.into_iter().map(|idx| self.names[idx].clone()).collect()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Order names so the ones a local backend can answer come first.
///
/// Prefix resolution and suggestions take the first match in snapshot order,
/// so `local` wins over the wider champion list for shared prefixes.
pub fn local_first(local: &[String], others: &[String]) -> Vec<String> {
    local.iter().chain(others).cloned().collect()
}

/// Lowercased name and the same with spaces removed.
fn normalize(name: &str) -> (String, String) {
    let lower = name.to_lowercase();
    let compact = lower.replace(' ', "");
    (lower, compact)
}

// ---------------------------------------------------------------------------
// ChampionDirectory
// ---------------------------------------------------------------------------

/// Shared handle to the current directory snapshot. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ChampionDirectory {
    current: Arc<RwLock<Arc<DirectorySnapshot>>>,
}

impl ChampionDirectory {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ChampionDirectory {
            current: Arc::new(RwLock::new(Arc::new(DirectorySnapshot::build(names)))),
        }
    }

    /// The snapshot in effect right now. Holding it does not block refresh.
    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Replace the whole directory with `names`.
    pub fn replace<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = Arc::new(DirectorySnapshot::build(names));
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    pub fn resolve(&self, query: &str) -> Option<String> {
        self.snapshot().resolve(query).map(str::to_string)
    }

    pub fn complete(&self, prefix: &str, limit: usize) -> Vec<String> {
        self.snapshot().complete(prefix, limit)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
