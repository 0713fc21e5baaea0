// LeagueSheet entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the ability source
// 4. Load the champion directory from the local cache
// 5. Spawn the background directory refresh
// 6. Start the lookup dispatcher
// 7. Register the show/hide shortcut
// 8. Run the TUI until the user quits
// 9. Cleanup on exit

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use leaguesheet_core::config;
use leaguesheet_core::directory::{self, refresh, store, ChampionDirectory, DirectoryStatus};
use leaguesheet_core::dispatcher::LookupDispatcher;
use leaguesheet_core::hotkey;
use leaguesheet_core::source::{self, remote::DataDragonApi};

use leaguesheet_tui::protocol::{self, UiUpdate};
use leaguesheet_tui::tui::{self, ViewState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("LeagueSheet starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: backend={:?}, {} workers",
        config.source.backend, config.dispatcher.workers
    );

    // 3. Build the ability source
    let http = source::http_from_config(&config).context("failed to build HTTP client")?;
    let ability_source = source::from_config(&config, http.clone());
    let columns = ability_source.columns();
    let local_names = ability_source.local_names();

    // 4. Load the champion directory (never touches the network)
    let cache_path = config.cache_path();
    let cached = store::load_startup(
        cache_path.as_deref(),
        Path::new(&config.directory.bootstrap_path),
    );
    let directory = ChampionDirectory::new(directory::local_first(&local_names, &cached));
    info!("Champion directory ready with {} names", directory.len());

    // 5. Spawn the background refresh
    let (status_tx, status_rx) = watch::channel(DirectoryStatus::Local);
    let refresh_handle = if config.directory.refresh_on_start {
        let api = DataDragonApi::new(http, config.source.remote.clone());
        Some(refresh::spawn_refresh(
            directory.clone(),
            api,
            cache_path.clone(),
            local_names,
            status_tx,
        ))
    } else {
        drop(status_tx);
        None
    };

    // 6. Start the lookup dispatcher
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let dispatcher = LookupDispatcher::start(
        config.dispatcher.workers,
        ability_source,
        directory.clone(),
        ui_tx.clone(),
        UiUpdate::LookupFinished,
    );

    // 7. Register the show/hide shortcut. The callback only posts a message.
    let mut listener = hotkey::platform_listener();
    let hotkey_status = hotkey::register_from_config(
        &config.hotkey,
        listener.as_mut(),
        protocol::toggle_callback(ui_tx.clone()),
    );
    info!("Shortcut: {}", hotkey_status);
    drop(ui_tx);

    // 8. Run the TUI (blocks until the user quits)
    let view_state = ViewState::new(directory, columns, hotkey_status);
    if let Err(e) = tui::run(ui_rx, status_rx, &dispatcher, view_state).await {
        warn!("TUI error: {}", e);
    }

    // 9. Cleanup: stop the listener and the workers, each with a bounded wait.
    let unregister = tokio::task::spawn_blocking(move || listener.unregister());
    if tokio::time::timeout(Duration::from_secs(1), unregister).await.is_err() {
        warn!("Shortcut listener did not stop in time");
    }

    if tokio::time::timeout(Duration::from_secs(2), dispatcher.join())
        .await
        .is_err()
    {
        warn!("Lookup workers still busy at exit");
    }

    if let Some(handle) = refresh_handle {
        handle.abort();
    }

    info!("LeagueSheet shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("leaguesheet.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("leaguesheet=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
