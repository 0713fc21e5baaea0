// Background refresh of the champion directory from the remote list.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{local_first, store, ChampionDirectory, DirectoryError, DirectoryStatus};
use crate::source::remote::DataDragonApi;

/// Fetch the latest champion list and swap it into `directory`.
///
/// Status moves to `Updating`, then to `Updated` or `UpdateFailed`. The
/// cache file is rewritten before the swap; a failed write is logged and the
/// in-memory swap still happens. `extra` names (the local sheet's ids) are
/// placed ahead of the remote names so they keep resolving and win shared
/// prefixes.
///
/// Returns the version that was loaded.
pub async fn refresh(
    directory: &ChampionDirectory,
    api: &DataDragonApi,
    cache_path: Option<&Path>,
    extra: &[String],
    status: &watch::Sender<DirectoryStatus>,
) -> Result<String, DirectoryError> {
    status.send_replace(DirectoryStatus::Updating);

    let fetched = async {
        let version = api.latest_version().await?;
        let entries = api.champion_list(&version).await?;
        Ok::<_, crate::source::LookupError>((version, entries))
    }
    .await;

    let (version, entries) = match fetched {
        Ok(ok) => ok,
        Err(e) => {
            status.send_replace(DirectoryStatus::UpdateFailed);
            return Err(DirectoryError::Refresh(e.to_string()));
        }
    };

    if entries.is_empty() {
        status.send_replace(DirectoryStatus::UpdateFailed);
        return Err(DirectoryError::Refresh(format!(
            "champion list for {version} is empty"
        )));
    }

    let names: Vec<String> = entries.into_iter().map(|entry| entry.name).collect();

    if let Some(path) = cache_path {
        if let Err(e) = store::save_names(path, &names) {
            warn!("Could not write champion cache: {}", e);
        }
    }

    let count = names.len();
    directory.replace(local_first(extra, &names));
    info!("Champion directory refreshed: {} names (version {})", count, version);

    status.send_replace(DirectoryStatus::Updated {
        version: version.clone(),
        at: Local::now(),
    });
    Ok(version)
}

/// Run [`refresh`] on its own task. The UI observes progress through the
/// status channel only.
pub fn spawn_refresh(
    directory: ChampionDirectory,
    api: DataDragonApi,
    cache_path: Option<PathBuf>,
    extra: Vec<String>,
    status: watch::Sender<DirectoryStatus>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = refresh(&directory, &api, cache_path.as_deref(), &extra, &status).await {
            error!("{}", e);
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
