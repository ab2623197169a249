//! Workspace configuration parsed from environment variables.

use std::collections::HashMap;
use std::env::VarError;
use std::path::PathBuf;

use crate::consts::{DEFAULT_MAX_ICON_BYTES, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::geometry::{Rect, Viewport};

pub const DEFAULT_STORE_PATH: &str = "workspace-store.json";

const ENV_VARS: [&str; 4] =
    ["WORKSPACE_STORE_PATH", "WORKSPACE_VIEWPORT", "WORKSPACE_RESERVOIR", "WORKSPACE_MAX_ICON_BYTES"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    /// JSON key/value file holding the layout record and launcher settings.
    pub store_path: PathBuf,
    pub viewport: Viewport,
    /// Reservoir rectangle known before the host reports one.
    pub reservoir: Option<Rect>,
    pub max_icon_bytes: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            viewport: Viewport::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            reservoir: None,
            max_icon_bytes: DEFAULT_MAX_ICON_BYTES,
        }
    }
}

impl WorkspaceConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `WORKSPACE_STORE_PATH`: default `workspace-store.json`
    /// - `WORKSPACE_VIEWPORT`: `WIDTHxHEIGHT`, default `1280x800`
    /// - `WORKSPACE_RESERVOIR`: `LEFT,TOP,RIGHT,BOTTOM`, unset by default
    /// - `WORKSPACE_MAX_ICON_BYTES`: default 2 MiB
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but malformed
    /// or not valid UTF-8.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for var in ENV_VARS {
            if let Some(value) = env_value(var, std::env::var(var))? {
                values.insert(var, value);
            }
        }
        Self::from_lookup(|key| values.get(key).cloned())
    }

    /// Build config from an arbitrary key lookup (the environment in production).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup("WORKSPACE_STORE_PATH").filter(|p| !p.trim().is_empty()) {
            config.store_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup("WORKSPACE_VIEWPORT") {
            config.viewport = parse_viewport(&raw)?;
        }
        if let Some(raw) = lookup("WORKSPACE_RESERVOIR") {
            config.reservoir = Some(parse_rect(&raw)?);
        }
        if let Some(raw) = lookup("WORKSPACE_MAX_ICON_BYTES") {
            config.max_icon_bytes = raw.trim().parse::<usize>().map_err(|e| ConfigError::Invalid {
                var: "WORKSPACE_MAX_ICON_BYTES",
                reason: e.to_string(),
            })?;
        }
        Ok(config)
    }
}

/// Unset is `None`; a value that is not UTF-8 is an error, not "unset".
fn env_value(var: &'static str, value: Result<String, VarError>) -> Result<Option<String>, ConfigError> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => {
            Err(ConfigError::Invalid { var, reason: format!("not valid UTF-8: {}", raw.to_string_lossy()) })
        }
    }
}

fn parse_viewport(raw: &str) -> Result<Viewport, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { var: "WORKSPACE_VIEWPORT", reason };
    let (w, h) = raw
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| invalid(format!("expected WIDTHxHEIGHT, got '{raw}'")))?;
    let width = parse_dimension(w).map_err(invalid)?;
    let height = parse_dimension(h).map_err(invalid)?;
    Ok(Viewport::new(width, height))
}

fn parse_dimension(raw: &str) -> Result<f64, String> {
    let value = raw.trim().parse::<f64>().map_err(|e| format!("'{raw}': {e}"))?;
    if value.is_finite() && value > 0.0 { Ok(value) } else { Err(format!("'{raw}' must be a positive number")) }
}

fn parse_rect(raw: &str) -> Result<Rect, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { var: "WORKSPACE_RESERVOIR", reason };
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{}': {e}", p.trim())))
        .collect::<Result<Vec<f64>, String>>()
        .map_err(invalid)?;
    let [left, top, right, bottom] = parts[..] else {
        return Err(invalid(format!("expected LEFT,TOP,RIGHT,BOTTOM, got '{raw}'")));
    };
    if right < left || bottom < top {
        return Err(invalid(format!("edges out of order in '{raw}'")));
    }
    Ok(Rect::new(left, top, right, bottom))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
