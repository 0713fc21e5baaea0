// Configuration loading and parsing (config/leaguesheet.toml).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

/// Name of the configuration file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "leaguesheet.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub directory: DirectoryConfig,
    pub dispatcher: DispatcherConfig,
    pub hotkey: HotkeyConfig,
}

/// Which backend answers ability lookups. Fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Csv,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub backend: Backend,
    pub csv_path: String,
    pub remote: RemoteConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            backend: Backend::Csv,
            csv_path: "data/champions.csv".into(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Remote API endpoints. Placeholders in braces are substituted per request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub versions_url: String,
    /// Must contain `{version}`.
    pub champion_list_url: String,
    /// Must contain `{version}` and `{key}`.
    pub champion_detail_url: String,
    /// Must contain `{version}`, `{kind}` and `{image}`.
    pub image_url: String,
    pub timeout_secs: u64,
    pub fetch_icons: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            versions_url: "https://ddragon.leagueoflegends.com/api/versions.json".into(),
            champion_list_url:
                "https://ddragon.leagueoflegends.com/cdn/{version}/data/en_US/champion.json".into(),
            champion_detail_url:
                "https://ddragon.leagueoflegends.com/cdn/{version}/data/en_US/champion/{key}.json"
                    .into(),
            image_url: "https://ddragon.leagueoflegends.com/cdn/{version}/img/{kind}/{image}"
                .into(),
            timeout_secs: 5,
            fetch_icons: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// File name of the champion list inside the per-user data directory.
    pub cache_file: String,
    /// Bundled list copied into the data directory on first run.
    pub bootstrap_path: String,
    /// Overrides the platform data directory when set.
    pub data_dir: Option<String>,
    pub refresh_on_start: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        DirectoryConfig {
            cache_file: "champions.txt".into(),
            bootstrap_path: "defaults/champions.txt".into(),
            data_dir: None,
            refresh_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig { workers: 4 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub enabled: bool,
    pub shortcut: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        HotkeyConfig {
            enabled: true,
            shortcut: "ctrl+alt+l".into(),
        }
    }
}

impl Config {
    /// The per-user directory holding the champion cache file.
    ///
    /// Returns `None` when no override is configured and the platform has no
    /// home directory to derive one from.
    pub fn data_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.directory.data_dir {
            return Some(PathBuf::from(dir));
        }
        ProjectDirs::from("", "", "leaguesheet").map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn cache_path(&self) -> Option<PathBuf> {
        self.data_dir()
            .map(|dir| dir.join(&self.directory.cache_file))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/leaguesheet.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Only `.toml` files are copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }

        let target = config_dir.join(file_name);
        if copy_new(&path, &target).map_err(|message| ConfigError::DefaultsCopyError { message })? {
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Copy `from` to `to` unless `to` already exists. Returns whether a copy
/// happened.
pub(crate) fn copy_new(from: &Path, to: &Path) -> Result<bool, String> {
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
    {
        Ok(mut dest) => {
            let content =
                std::fs::read(from).map_err(|e| format!("failed to read {}: {e}", from.display()))?;
            std::io::Write::write_all(&mut dest, &content)
                .map_err(|e| format!("failed to write {}: {e}", to.display()))?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(format!("failed to create {}: {e}", to.display())),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.dispatcher.workers == 0 {
        return Err(ConfigError::ValidationError {
            field: "dispatcher.workers".into(),
            message: "must be greater than 0".into(),
        });
    }

    let remote = &config.source.remote;
    if remote.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "source.remote.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let templates: [(&str, &str, &[&str]); 3] = [
        (
            "source.remote.champion_list_url",
            remote.champion_list_url.as_str(),
            &["{version}"][..],
        ),
        (
            "source.remote.champion_detail_url",
            remote.champion_detail_url.as_str(),
            &["{version}", "{key}"][..],
        ),
        (
            "source.remote.image_url",
            remote.image_url.as_str(),
            &["{version}", "{kind}", "{image}"][..],
        ),
    ];
    for (field, template, placeholders) in templates {
        for placeholder in placeholders {
            if !template.contains(placeholder) {
                return Err(ConfigError::ValidationError {
                    field: field.to_string(),
                    message: format!("missing placeholder {placeholder}"),
                });
            }
        }
    }

    if config.source.backend == Backend::Csv && config.source.csv_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "source.csv_path".into(),
            message: "must not be empty for the csv backend".into(),
        });
    }

    if config.directory.cache_file.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "directory.cache_file".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FULL_CONFIG: &str = r#"
[source]
backend = "remote"
csv_path = "data/champions.csv"

[source.remote]
versions_url = "http://localhost/versions.json"
champion_list_url = "http://localhost/{version}/champion.json"
champion_detail_url = "http://localhost/{version}/champion/{key}.json"
image_url = "http://localhost/{version}/img/{kind}/{image}"
timeout_secs = 3
fetch_icons = false

[directory]
cache_file = "names.txt"
bootstrap_path = "defaults/champions.txt"
data_dir = "/tmp/leaguesheet-test"
refresh_on_start = false

[dispatcher]
workers = 2

[hotkey]
enabled = false
shortcut = "ctrl+shift+k"
"#;

    fn write_config(dir: &Path, text: &str) {
        let config_dir = dir.join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILE), text).unwrap();
    }

    #[test]
    fn load_full_config() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), FULL_CONFIG);

        let config = load_config_from(tmp.path()).expect("should load valid config");
        assert_eq!(config.source.backend, Backend::Remote);
        assert_eq!(config.source.remote.timeout_secs, 3);
        assert!(!config.source.remote.fetch_icons);
        assert_eq!(config.directory.cache_file, "names.txt");
        assert!(!config.directory.refresh_on_start);
        assert_eq!(config.dispatcher.workers, 2);
        assert!(!config.hotkey.enabled);
        assert_eq!(config.hotkey.shortcut, "ctrl+shift+k");
        assert_eq!(
            config.cache_path(),
            Some(PathBuf::from("/tmp/leaguesheet-test/names.txt"))
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "");

        let config = load_config_from(tmp.path()).expect("defaults should validate");
        assert_eq!(config.source.backend, Backend::Csv);
        assert_eq!(config.source.csv_path, "data/champions.csv");
        assert_eq!(config.dispatcher.workers, 4);
        assert_eq!(config.source.remote.timeout_secs, 5);
        assert_eq!(config.hotkey.shortcut, "ctrl+alt+l");
        assert!(config.directory.refresh_on_start);
    }

    #[test]
    fn rejects_zero_workers() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[dispatcher]\nworkers = 0\n");

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "dispatcher.workers");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[source.remote]\ntimeout_secs = 0\n");

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "source.remote.timeout_secs");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(
            tmp.path(),
            "[source.remote]\nchampion_detail_url = \"http://localhost/{version}/ahri.json\"\n",
        );

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, message } => {
                assert_eq!(field, "source.remote.champion_detail_url");
                assert!(message.contains("{key}"));
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn unknown_backend_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[source]\nbackend = \"sqlite\"\n");

        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => {
                assert!(path.ends_with(CONFIG_FILE));
            }
            other => panic!("expected ParseError, got: {other}"),
        }
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config_from(tmp.path()).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with(CONFIG_FILE));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn ensure_config_files_copies_only_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults_dir = tmp.path().join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), FULL_CONFIG).unwrap();
        fs::write(defaults_dir.join("champions.txt"), "Ahri\n").unwrap();
        fs::write(defaults_dir.join("leaguesheet.toml.example"), "").unwrap();

        let copied = ensure_config_files(tmp.path()).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.path().join("config").join(CONFIG_FILE).exists());
        assert!(!tmp.path().join("config/champions.txt").exists());
        assert!(!tmp.path().join("config/leaguesheet.toml.example").exists());
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults_dir = tmp.path().join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), FULL_CONFIG).unwrap();
        write_config(tmp.path(), "# custom\n");

        let copied = ensure_config_files(tmp.path()).expect("should succeed");
        assert!(copied.is_empty());

        let content = fs::read_to_string(tmp.path().join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ensure_config_files(tmp.path()).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
    }
}
