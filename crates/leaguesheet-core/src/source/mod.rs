// Ability data sources: the bundled CSV sheet and the remote JSON API.
//
// Both implement `AbilitySource`. The backend is picked once from config at
// startup and shared by every lookup worker.

pub mod http;
pub mod remote;
pub mod sheet;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::champion::{ChampionRecord, ViewMode};
use crate::config::{Backend, Config};
use http::{FetchError, HttpFetch, ReqwestFetch};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a lookup produced no record.
///
/// Callers treat every variant as "not found"; the variants exist so the
/// cause can be logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no champion matches `{0}`")]
    NotFound(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<FetchError> for LookupError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Malformed { .. } => LookupError::Malformed(err.to_string()),
            other => LookupError::Fetch(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// AbilitySource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AbilitySource: Send + Sync {
    /// Fetch the four ability slots of the champion named `canonical_id`.
    async fn fetch_abilities(
        &self,
        canonical_id: &str,
        view_mode: ViewMode,
    ) -> Result<ChampionRecord, LookupError>;

    /// Labels of the value columns, in slot order.
    fn columns(&self) -> Vec<String>;

    /// Champion names the backend knows without a network round trip. These
    /// are added to the directory so every row of a local table resolves.
    fn local_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Build the HTTP fetcher described by the remote section of `config`.
pub fn http_from_config(config: &Config) -> Result<Arc<dyn HttpFetch>, FetchError> {
    let timeout = Duration::from_secs(config.source.remote.timeout_secs);
    Ok(Arc::new(ReqwestFetch::new(timeout)?))
}

/// Build the backend selected in `config`.
pub fn from_config(
    config: &Config,
    http: Arc<dyn HttpFetch>,
) -> Arc<dyn AbilitySource> {
    match config.source.backend {
        Backend::Csv => Arc::new(sheet::CsvSource::load(Path::new(&config.source.csv_path))),
        Backend::Remote => {
            let api = remote::DataDragonApi::new(http, config.source.remote.clone());
            Arc::new(remote::RemoteSource::new(
                api,
                config.source.remote.fetch_icons,
            ))
        }
    }
}
