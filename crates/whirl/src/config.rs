use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use spindle::protocol::SOCKET_PATH;
use spindle::{Palette, PaletteName, SpinTiming, Swatch, WheelError};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_ENTRIES: &[&str] = &[
    "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Heidi",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_entries")]
    pub entries: Vec<String>,
    #[serde(default)]
    pub palette: PaletteName,
    #[serde(default)]
    pub colors: Vec<Swatch>,
    #[serde(default)]
    pub spin: SpinTiming,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

fn default_entries() -> Vec<String> {
    DEFAULT_ENTRIES.iter().map(|s| s.to_string()).collect()
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(SOCKET_PATH)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entries: default_entries(),
            palette: PaletteName::default(),
            colors: Vec::new(),
            spin: SpinTiming::default(),
            frame_interval_ms: default_frame_interval_ms(),
            socket_path: default_socket_path(),
        }
    }
}

impl Config {
    pub fn palette(&self) -> Palette {
        Palette::resolve(self.palette, &self.colors)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spin.validate()?;
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::FrameInterval);
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] WheelError),
    #[error("Invalid config: frame_interval_ms must be at least 1")]
    FrameInterval,
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "whirl", "whirl").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("WHIRL")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        log::info!(
            "No config at {}, using the built-in wheel (`whirl --init` writes one)",
            path.display()
        );
        return Config::default();
    }

    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

/// Writes the bundled config to the user's config path unless a file is
/// already there.
pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    write_default_config_to(&path)?;
    Ok(path)
}

/// Returns whether a new file was written.
pub fn write_default_config_to(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, DEFAULT_CONFIG)?;
    Ok(true)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
