//! Drag session: the pointer gesture state machine.
//!
//! A gesture runs from pointer-down on a card to pointer-up (or abandonment).
//! While it is live, the dragged card's on-screen position is an ephemeral
//! presentation override derived from the session; the registry is only
//! touched once, when the caller commits the [`DragOutcome`] returned by
//! [`DragController::release`].
//!
//! The `DragState` value itself is the exclusivity lock: a press while a
//! session is live is ignored, so there is never more than one.
//!
//! A gesture that moved the card leaves a one-shot click-suppression token
//! for that card, which swallows the activate event the platform emits right
//! after the pointer is released.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::card::CardId;
use crate::geometry::Point;

/// A live drag of one card.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Card being dragged.
    pub card_id: CardId,
    /// Pointer minus card position at press time. Fixed for the session.
    pub pointer_offset: Point,
    /// Pointer position at press time.
    pub press_pointer: Point,
    /// Most recent pointer sample.
    pub last_pointer: Point,
    /// Set once any sample differs from the press position.
    pub moved: bool,
}

impl DragSession {
    /// Where the card is drawn for the latest pointer sample.
    #[must_use]
    pub fn candidate_position(&self) -> Point {
        self.last_pointer - self.pointer_offset
    }

    fn sample(&mut self, pointer: Point) {
        self.last_pointer = pointer;
        if pointer != self.press_pointer {
            self.moved = true;
        }
    }
}

/// Gesture state.
#[derive(Debug, Clone, Default)]
pub enum DragState {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// A card is being dragged.
    Dragging(DragSession),
}

/// Result of ending a session, to be reconciled into the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    pub card_id: CardId,
    /// Final card position: last pointer sample minus the press offset.
    pub position: Point,
    /// Pointer position the containment test runs against.
    pub release_point: Point,
    pub moved: bool,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
    suppress_click: Option<CardId>,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Start dragging `card_id`, currently drawn at `card_position`.
    ///
    /// Returns `false` (and changes nothing) if a session is already live.
    pub fn press(&mut self, card_id: &str, card_position: Point, pointer: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.suppress_click = None;
        self.state = DragState::Dragging(DragSession {
            card_id: card_id.to_owned(),
            pointer_offset: pointer - card_position,
            press_pointer: pointer,
            last_pointer: pointer,
            moved: false,
        });
        true
    }

    /// Feed a pointer sample. Returns the dragged card and its new
    /// presentation position, or `None` when idle.
    pub fn move_to(&mut self, pointer: Point) -> Option<(&str, Point)> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        session.sample(pointer);
        Some((session.card_id.as_str(), session.candidate_position()))
    }

    /// End the session and return to `Idle`.
    ///
    /// `pointer` is the release sample; `None` (pointer lost, session
    /// detached) falls back to the last known sample. Returns `None` when no
    /// session was live.
    pub fn release(&mut self, pointer: Option<Point>) -> Option<DragOutcome> {
        let DragState::Dragging(mut session) = std::mem::take(&mut self.state) else {
            return None;
        };
        if let Some(pointer) = pointer {
            session.sample(pointer);
        }
        if session.moved {
            self.suppress_click = Some(session.card_id.clone());
        }
        Some(DragOutcome {
            position: session.candidate_position(),
            release_point: session.last_pointer,
            moved: session.moved,
            card_id: session.card_id,
        })
    }

    /// Drop a live session without producing an outcome.
    pub fn discard(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Presentation override for `card_id` while it is being dragged.
    #[must_use]
    pub fn presentation_position(&self, card_id: &str) -> Option<Point> {
        self.session()
            .filter(|s| s.card_id == card_id)
            .map(DragSession::candidate_position)
    }

    /// Consume the click-suppression token. Returns `true` when the activate
    /// event for `card_id` must be swallowed.
    ///
    /// Any activate consumes the token, so a stale token never outlives the
    /// next click.
    pub fn take_click_suppression(&mut self, card_id: &str) -> bool {
        self.suppress_click.take().is_some_and(|id| id == card_id)
    }
}
