//! Launcher: outbound open-link and local-launch collaborators.
//!
//! DESIGN
//! ======
//! The engine only ever talks to the [`Launcher`] trait and treats every
//! call as fire-and-forget. [`SystemLauncher`] is the desktop implementation:
//! links go to the platform opener, local launches spawn the executable whose
//! path is kept in the key/value store.
//!
//! TRADE-OFFS
//! ==========
//! Spawned processes are not awaited. A launch "succeeds" once the process
//! starts; whatever it does afterwards is outside the workspace.

#[cfg(test)]
#[path = "launcher_test.rs"]
mod launcher_test;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use crate::consts::LOCAL_PATH_KEY;
use crate::persistence::KvStore;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    /// No usable local-launch path is configured; the user has to pick one.
    #[error("no local launch path configured")]
    NeedsConfiguration,
    /// The collaborator failed; the string is the raw reason.
    #[error("{0}")]
    Failed(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// External collaborator for actions the engine cannot perform itself.
#[async_trait::async_trait]
pub trait Launcher: Send + Sync {
    /// Open `url` in the system browser.
    async fn open_link(&self, url: &str) -> Result<(), LaunchError>;

    /// Start the local application behind `target`.
    ///
    /// # Errors
    ///
    /// [`LaunchError::NeedsConfiguration`] when no valid path is configured.
    async fn launch_local(&self, target: &str) -> Result<(), LaunchError>;

    async fn configured_local_path(&self) -> Option<String>;

    async fn set_configured_local_path(&self, path: &str) -> Result<(), LaunchError>;

    async fn auto_detect_local_path(&self) -> Option<String>;
}

// =============================================================================
// SYSTEM LAUNCHER
// =============================================================================

/// Desktop launcher backed by platform commands and a key/value store.
pub struct SystemLauncher<S> {
    store: S,
    candidates: Vec<PathBuf>,
}

impl<S: KvStore> SystemLauncher<S> {
    /// Launcher that auto-detects from the platform's usual install locations.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_candidates(store, default_candidates())
    }

    /// Launcher that auto-detects from an explicit candidate list, in order.
    #[must_use]
    pub fn with_candidates(store: S, candidates: Vec<PathBuf>) -> Self {
        Self { store, candidates }
    }

    fn stored_path(&self) -> Option<String> {
        match self.store.get(LOCAL_PATH_KEY) {
            Ok(path) => path.filter(|p| !p.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "local launch path unreadable");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: KvStore> Launcher for SystemLauncher<S> {
    async fn open_link(&self, url: &str) -> Result<(), LaunchError> {
        let mut command = opener_command(url);
        let _child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::Failed(format!("cannot open browser: {e}")))?;
        info!(%url, "link opened");
        Ok(())
    }

    async fn launch_local(&self, target: &str) -> Result<(), LaunchError> {
        let path = self.stored_path().ok_or(LaunchError::NeedsConfiguration)?;
        let _child = Command::new(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::Failed(format!("cannot start {path}: {e}")))?;
        info!(%target, %path, "local application launched");
        Ok(())
    }

    async fn configured_local_path(&self) -> Option<String> {
        self.stored_path()
    }

    async fn set_configured_local_path(&self, path: &str) -> Result<(), LaunchError> {
        self.store
            .set(LOCAL_PATH_KEY, path)
            .map_err(|e| LaunchError::Failed(format!("cannot save path: {e}")))?;
        info!(%path, "local launch path saved");
        Ok(())
    }

    async fn auto_detect_local_path(&self) -> Option<String> {
        let found = self.candidates.iter().find(|p| is_file(p))?;
        info!(path = %found.display(), "local launch path detected");
        Some(found.to_string_lossy().into_owned())
    }
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file())
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}

/// Well-known Typora install locations for the current platform.
#[must_use]
pub fn default_candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if cfg!(target_os = "windows") {
        out.push(PathBuf::from(r"C:\Program Files\Typora\Typora.exe"));
        out.push(PathBuf::from(r"C:\Program Files (x86)\Typora\Typora.exe"));
        if let Some(profile) = std::env::var_os("USERPROFILE") {
            out.push(PathBuf::from(profile).join(r"AppData\Local\Programs\Typora\Typora.exe"));
        }
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            out.push(PathBuf::from(local).join(r"Typora\Typora.exe"));
        }
    } else if cfg!(target_os = "macos") {
        out.push(PathBuf::from("/Applications/Typora.app/Contents/MacOS/Typora"));
    } else {
        out.push(PathBuf::from("/usr/bin/typora"));
        out.push(PathBuf::from("/usr/local/bin/typora"));
        out.push(PathBuf::from("/snap/bin/typora"));
        out.push(PathBuf::from("/opt/typora/Typora"));
    }
    out
}
