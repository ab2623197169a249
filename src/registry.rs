//! Card registry: the canonical, ordered card collection.
//!
//! DESIGN
//! ======
//! The registry is the single source of truth for card placement. It is only
//! mutated by whole operations (`add`, `commit_move`, `reset_to_defaults`),
//! and each of them rewrites the persisted layout before returning. Live drag
//! positions never pass through here; see [`crate::drag`].

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;

use tracing::{debug, error, info};

use crate::card::{Card, CardId, IconRef, ValidationError};
use crate::geometry::{Point, Viewport};
use crate::persistence::{KvStore, LayoutPersistence};

pub struct CardRegistry<S> {
    cards: Vec<Card>,
    viewport: Viewport,
    persistence: LayoutPersistence<S>,
}

impl<S: KvStore> CardRegistry<S> {
    /// Wrap an existing collection without touching the store.
    #[must_use]
    pub fn new(cards: Vec<Card>, viewport: Viewport, persistence: LayoutPersistence<S>) -> Self {
        Self { cards, viewport, persistence }
    }

    /// Build the registry from the saved layout reconciled with `seed`.
    #[must_use]
    pub fn load(seed: Vec<Card>, viewport: Viewport, persistence: LayoutPersistence<S>) -> Self {
        let cards = persistence.load(seed);
        info!(count = cards.len(), "card registry loaded");
        Self::new(cards, viewport, persistence)
    }

    // --- Queries ---

    /// All cards in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Card] {
        &self.cards
    }

    /// Cards on the main surface.
    #[must_use]
    pub fn list_visible(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| !c.contained).collect()
    }

    /// Cards inside the reservoir.
    #[must_use]
    pub fn list_contained(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.contained).collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[must_use]
    pub fn persistence(&self) -> &LayoutPersistence<S> {
        &self.persistence
    }

    // --- Mutations ---

    /// Create a card centered in the viewport and persist the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if the name, action, or icon
    /// is missing or blank. Nothing changes in that case.
    pub fn add(&mut self, name: &str, action: &str, icon: Option<IconRef>) -> Result<CardId, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let action = action.trim();
        if action.is_empty() {
            return Err(ValidationError::MissingField("action"));
        }
        let icon = icon.filter(|icon| !icon.is_empty()).ok_or(ValidationError::MissingField("icon"))?;

        let id = self.fresh_id();
        let card = Card::new(id.clone(), name, action, icon, self.viewport.center());
        info!(card_id = %id, kind = ?card.kind, "card added");
        self.cards.push(card);
        self.persist();
        Ok(id)
    }

    /// Commit a finished move. Unknown ids are ignored.
    ///
    /// Returns `true` when a card was updated.
    pub fn commit_move(&mut self, id: &str, position: Point, contained: bool) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            debug!(card_id = %id, "commit for unknown card ignored");
            return false;
        };
        card.position = position;
        card.contained = contained;
        info!(card_id = %id, x = position.x, y = position.y, contained, "card move committed");
        self.persist();
        true
    }

    /// Put every card back on the surface: known ids at their default
    /// position, everything else centered in the viewport.
    pub fn reset_to_defaults(&mut self, defaults: &HashMap<CardId, Point>) {
        let center = self.viewport.center();
        for card in &mut self.cards {
            card.position = defaults.get(&card.id).copied().unwrap_or(center);
            card.contained = false;
        }
        info!(count = self.cards.len(), "layout reset to defaults");
        self.persist();
    }

    fn fresh_id(&self) -> CardId {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.cards) {
            error!(error = %e, "layout save failed");
        }
    }
}
