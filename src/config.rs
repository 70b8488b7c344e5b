use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::post::LoadableMode;
use crate::projection::PostViewMode;

const DEFAULT_ENV_PREFIX: &str = "THREADVIEW";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewConfig {
    #[serde(default)]
    pub mode: PostViewMode,
    #[serde(default = "default_thread_mode")]
    pub thread_mode: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mode: PostViewMode::default(),
            thread_mode: default_thread_mode(),
        }
    }
}

impl ViewConfig {
    /// Mode assumed for thread files that do not declare one.
    pub fn default_loadable_mode(&self) -> LoadableMode {
        if self.thread_mode {
            LoadableMode::Thread
        } else {
            LoadableMode::Catalog
        }
    }
}

fn default_thread_mode() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        let from_file = read_config_file(path)?;
        cfg = merge_config(cfg, from_file);
    } else if let Some(default_path) = default_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, prefix)?;

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    base.view.mode = other.view.mode;
    base.view.thread_mode = other.view.thread_mode;
    if !other.log.level.trim().is_empty() {
        base.log.level = other.log.level;
    }
    base
}

fn apply_env(cfg: &mut Config, prefix: &str) -> Result<()> {
    let mut map: HashMap<String, (String, String)> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, (key, value));
        }
    }

    for (key, (var, value)) in map {
        apply_env_value(cfg, &key, value).with_context(|| format!("config: invalid {var}"))?;
    }
    Ok(())
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) -> Result<()> {
    match key {
        "view.mode" => {
            cfg.view.mode = match value.trim().to_ascii_lowercase().as_str() {
                "list" => PostViewMode::List,
                "card" => PostViewMode::Card,
                other => bail!("unknown view mode {other:?}, expected list or card"),
            };
        }
        "view.thread_mode" => {
            cfg.view.thread_mode = matches!(value.as_str(), "1" | "true" | "TRUE" | "True");
        }
        "log.level" => {
            if !value.trim().is_empty() {
                cfg.log.level = value;
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("threadview").join("config.yaml"))
}
