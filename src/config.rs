use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use derive_deref::{Deref, DerefMut};
use directories::{BaseDirs, UserDirs};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tui::{Action, KeyBindings, ThemeName};

/// Key binding scope; one per page plus bindings active everywhere
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Global,
    Home,
    About,
    Missense,
    Table,
}

const CONFIG: &str = include_str!("../.config/config.json5");

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/";
const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 5000;
const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 300;
const DEFAULT_DESKTOP_BREAKPOINT: u16 = 100;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// Extra key bindings per page, as written in the config file
#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize)]
pub struct KeyBindingOverrides(pub HashMap<Mode, HashMap<String, Action>>);

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default = "default_notification_timeout_ms")]
    pub notification_timeout_ms: u64,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default = "default_desktop_breakpoint")]
    pub desktop_breakpoint: u16,
    #[serde(default)]
    pub theme: ThemeName,
    #[serde(default)]
    pub keybindings: KeyBindingOverrides,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_notification_timeout_ms() -> u64 {
    DEFAULT_NOTIFICATION_TIMEOUT_MS
}

fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_MS
}

fn default_desktop_breakpoint() -> u16 {
    DEFAULT_DESKTOP_BREAKPOINT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config: AppConfig {
                data_dir: get_data_dir(),
                config_dir: get_config_dir(),
            },
            server_url: default_server_url(),
            download_dir: None,
            notification_timeout_ms: DEFAULT_NOTIFICATION_TIMEOUT_MS,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            desktop_breakpoint: DEFAULT_DESKTOP_BREAKPOINT,
            theme: ThemeName::default(),
            keybindings: KeyBindingOverrides::default(),
        }
    }
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Layer the embedded defaults, then the user file
    ///
    /// An explicit `config_path` must exist; otherwise
    /// `~/.biomutate-config.json5` is read when present. Nested tables such
    /// as `keybindings` merge with the defaults key by key.
    pub fn from_path(config_path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().into_owned())?
            .set_default("config_dir", config_dir.to_string_lossy().into_owned())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        builder = match config_path {
            Some(path) => builder.add_source(
                config::File::from(expand_tilde(path))
                    .format(config::FileFormat::Json5)
                    .required(true),
            ),
            None => builder.add_source(
                config::File::from(default_home_config_path())
                    .format(config::FileFormat::Json5)
                    .required(false),
            ),
        };

        let cfg: Self = builder.build()?.try_deserialize()?;
        if url_looks_invalid(&cfg.server_url) {
            return Err(config::ConfigError::Message(format!(
                "server_url must start with http:// or https://, got '{}'",
                cfg.server_url
            )));
        }
        Ok(cfg)
    }

    /// Built-in bindings with the global and then the page overrides applied
    ///
    /// Unparseable keys are skipped and logged, as are actions an override
    /// left without any key.
    pub fn keybindings_for(&self, mode: Mode) -> KeyBindings {
        let mut bindings = KeyBindings::default();
        let mut scopes = vec![Mode::Global];
        if mode != Mode::Global {
            scopes.push(mode);
        }
        for scope in scopes {
            if let Some(overrides) = self.keybindings.get(&scope) {
                for message in bindings.apply_overrides(overrides) {
                    warn!(?scope, "{message}");
                }
            }
        }
        for message in bindings.validate() {
            warn!(?mode, "{message}");
        }
        bindings
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }

    /// Configured download directory, else the user's download folder, else
    /// the working directory
    pub fn download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return expand_tilde(dir);
        }
        UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn url_looks_invalid(url: &str) -> bool {
    !(url.starts_with("http://") || url.starts_with("https://"))
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', &base.home_dir().to_string_lossy(), 1));
            }
        }
    }
    path.to_path_buf()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".biomutate-config.json5");
    }
    PathBuf::from(".biomutate-config.json5")
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".config")
    }
}
