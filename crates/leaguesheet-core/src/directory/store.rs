// On-disk champion list: newline-delimited display names in the per-user
// data directory, seeded from a bundled bootstrap file on first run.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::DirectoryError;
use crate::config::copy_new;

/// Parse a newline-delimited name list. Names are trimmed; blank lines are
/// skipped.
pub fn parse_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_names(path: &Path) -> Result<Vec<String>, DirectoryError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(parse_names(&text))
}

/// Overwrite `path` with `names`, one per line.
///
/// The list is written to a temporary file in the same directory and then
/// renamed over the target, so a reader never sees a half-written file.
pub fn save_names(path: &Path, names: &[String]) -> Result<(), DirectoryError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    for name in names {
        writeln!(tmp, "{name}").map_err(|e| io_error(tmp.path(), e))?;
    }
    tmp.as_file().sync_all().map_err(|e| io_error(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

/// Create the cache directory and copy the bootstrap list in if no cache
/// file exists yet. Returns whether the bootstrap was copied.
pub fn prepare_cache(cache_path: &Path, bootstrap_path: &Path) -> Result<bool, DirectoryError> {
    if let Some(dir) = cache_path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }
    if cache_path.exists() || !bootstrap_path.is_file() {
        return Ok(false);
    }
    copy_new(bootstrap_path, cache_path).map_err(DirectoryError::Refresh)
}

/// Names available at startup, without touching the network.
///
/// Every failure (no data directory, uncreatable directory, missing cache
/// and bootstrap) is logged and yields an empty list.
pub fn load_startup(cache_path: Option<&Path>, bootstrap_path: &Path) -> Vec<String> {
    let Some(cache_path) = cache_path else {
        warn!("{}", DirectoryError::NoDataDir);
        return Vec::new();
    };

    match prepare_cache(cache_path, bootstrap_path) {
        Ok(true) => info!(
            "Seeded champion cache {} from {}",
            cache_path.display(),
            bootstrap_path.display()
        ),
        Ok(false) => {}
        Err(e) => warn!("Could not prepare champion cache: {}", e),
    }

    match load_names(cache_path) {
        Ok(names) => {
            info!("Loaded {} champion names from {}", names.len(), cache_path.display());
            names
        }
        Err(e) => {
            warn!("No local champion list: {}", e);
            Vec::new()
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> DirectoryError {
    DirectoryError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
