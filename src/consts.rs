//! Shared constants for the workspace engine.

// ── Persistence ─────────────────────────────────────────────────

/// Namespace key of the persisted layout record.
pub const LAYOUT_KEY: &str = "alpha-workspace-layout";

/// Store key holding the configured local-launch executable path.
pub const LOCAL_PATH_KEY: &str = "local_launch_path";

// ── Notifications ───────────────────────────────────────────────

/// Lifetime of a toast, measured from its creation.
pub const TOAST_TTL_MS: u64 = 3000;

// ── Surface ─────────────────────────────────────────────────────

/// Viewport width used before the host reports a real size.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

/// Viewport height used before the host reports a real size.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// Largest accepted icon upload, in bytes.
pub const DEFAULT_MAX_ICON_BYTES: usize = 2 * 1024 * 1024;
