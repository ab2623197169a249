//! Card model: launchable entities placed on the workspace surface.
//!
//! A card is either a network link (opened in the system browser) or a local
//! launch target (an executable resolved through the configured path). The
//! kind is derived from the action string when a card is created so callers
//! never have to classify actions themselves.

#[cfg(test)]
#[path = "card_test.rs"]
mod card_test;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::geometry::Point;

/// Stable, never-reused card identifier.
pub type CardId = String;

// =============================================================================
// ERRORS
// =============================================================================

/// A user-supplied value was rejected before any state changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("icon is too large: {size} bytes (max {max})")]
    IconTooLarge { size: usize, max: usize },
}

// =============================================================================
// KIND
// =============================================================================

/// How a card's action is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// `action` is a URL handed to the system browser.
    NetworkLink,
    /// `action` is an opaque local launch target.
    LocalLaunch,
}

impl CardKind {
    /// `NetworkLink` iff the action starts with a URL scheme (`scheme://`).
    #[must_use]
    pub fn infer(action: &str) -> Self {
        if has_url_scheme(action) { Self::NetworkLink } else { Self::LocalLaunch }
    }
}

/// RFC 3986 scheme (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`) followed by `://`.
fn has_url_scheme(action: &str) -> bool {
    let Some((scheme, _)) = action.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// =============================================================================
// ICON
// =============================================================================

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Opaque handle to an image resource owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(String);

impl IconRef {
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Validate uploaded image bytes and derive a content-addressed handle.
    ///
    /// The host keeps the blob; the engine only stores `sha256:<hex>`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the upload is empty or exceeds `max_bytes`.
    pub fn from_upload(bytes: &[u8], max_bytes: usize) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::MissingField("icon"));
        }
        if bytes.len() > max_bytes {
            return Err(ValidationError::IconTooLarge { size: bytes.len(), max: max_bytes });
        }
        let digest = Sha256::digest(bytes);
        let mut handle = String::with_capacity(7 + digest.len() * 2);
        handle.push_str("sha256:");
        for b in digest {
            handle.push(char::from(HEX_DIGITS[usize::from(b >> 4)]));
            handle.push(char::from(HEX_DIGITS[usize::from(b & 0x0f)]));
        }
        Ok(Self(handle))
    }
}

// =============================================================================
// CARD
// =============================================================================

/// A launcher icon and its placement on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub icon: IconRef,
    pub kind: CardKind,
    /// URL for network links, opaque launch target for local launches.
    pub action: String,
    /// Top-left corner in absolute surface pixels. Unbounded.
    pub position: Point,
    /// `true` while the card lives in the reservoir instead of the surface.
    pub contained: bool,
}

impl Card {
    /// Build a card on the main surface, inferring its kind from `action`.
    #[must_use]
    pub fn new(
        id: impl Into<CardId>,
        name: impl Into<String>,
        action: impl Into<String>,
        icon: IconRef,
        position: Point,
    ) -> Self {
        let action = action.into();
        Self {
            id: id.into(),
            name: name.into(),
            icon,
            kind: CardKind::infer(&action),
            action,
            position,
            contained: false,
        }
    }

    /// Same card, starting inside the reservoir.
    #[must_use]
    pub fn in_reservoir(mut self) -> Self {
        self.contained = true;
        self
    }
}
