//! The built-in card set shipped with a fresh workspace.

#[cfg(test)]
#[path = "defaults_test.rs"]
mod defaults_test;

use std::collections::HashMap;

use crate::card::{Card, CardId, IconRef};
use crate::geometry::Point;

/// Launch target resolved by the launcher to the configured local executable.
pub const TYPORA_TARGET: &str = "launch_typora";

/// Cards present on first start, in display order.
///
/// The first three sit on the main surface; the last two start inside the
/// reservoir.
#[must_use]
pub fn default_cards() -> Vec<Card> {
    vec![
        Card::new("drawio", "draw.io", "https://app.diagrams.net/", IconRef::new("asset:drawio.png"), Point::new(300.0, 200.0)),
        Card::new("typora", "typora", TYPORA_TARGET, IconRef::new("asset:typora.png"), Point::new(500.0, 200.0)),
        Card::new("gemini", "gemini", "https://gemini.google.com/", IconRef::new("asset:gemini.png"), Point::new(400.0, 350.0)),
        Card::new(
            "aistudio",
            "AI Studio",
            "https://aistudio.google.com/",
            IconRef::new("asset:aistudio.png"),
            Point::new(300.0, 500.0),
        )
        .in_reservoir(),
        Card::new(
            "notebooklm",
            "NotebookLM",
            "https://notebooklm.google.com/",
            IconRef::new("asset:notebooklm.png"),
            Point::new(500.0, 500.0),
        )
        .in_reservoir(),
    ]
}

/// Default position of every built-in card, keyed by id.
#[must_use]
pub fn default_positions() -> HashMap<CardId, Point> {
    default_cards().into_iter().map(|card| (card.id, card.position)).collect()
}
