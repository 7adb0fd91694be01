//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$READBRAIN_CONFIG` environment variable
//! 2. `config.toml` in the platform config dir (`~/.config/readbrain/` on Linux)
//! 3. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
}

/// Where notes are read from and where the snapshot goes.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory holding one subdirectory per book.
    pub books_dir: PathBuf,
    /// Snapshot document rewritten on every build.
    pub output: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            books_dir: PathBuf::from("books"),
            output: PathBuf::from("site/public/graph-data.json"),
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(p) if p.exists() => load_from(&p),
        _ => Ok(Config::default()),
    }
}

fn load_from(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("READBRAIN_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::ProjectDirs::from("dev", "readbrain", "readbrain")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Show the active config path (for `readbrain config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
