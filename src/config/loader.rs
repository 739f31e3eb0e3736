use std::fs;
use std::path::{Path, PathBuf};

use super::core::LintfoldConfig;
use crate::errors::{LintError, Result};

pub const CONFIG_FILE_NAME: &str = ".lintfold.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse config from a TOML string
pub fn parse_config(contents: &str) -> Result<LintfoldConfig> {
    toml::from_str::<LintfoldConfig>(contents)
        .map_err(|e| LintError::config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e)))
}

/// Load a specific config file. Unlike [`load_config`] every problem is an error.
pub fn load_config_from_path(path: &Path) -> Result<LintfoldConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| LintError::io_with_path(e.to_string(), path))?;
    parse_config(&contents).map_err(|e| match e {
        LintError::Config { message, .. } => LintError::config_with_path(message, path),
        other => other,
    })
}

/// Try one candidate path; `None` when missing or broken (broken files are logged)
fn try_load_config_from_path(config_path: &Path) -> Option<LintfoldConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Generate directory ancestors up to a depth limit, starting with `start` itself
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.lintfold.toml`.
pub fn load_config_from(start: &Path) -> LintfoldConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            LintfoldConfig::default()
        })
}

/// Load configuration starting from the current directory.
pub fn load_config() -> LintfoldConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(&dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            LintfoldConfig::default()
        }
    }
}
