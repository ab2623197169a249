//! Reservoir containment: is a release point inside the reservoir control?
//!
//! The reservoir's on-screen rectangle moves whenever the host relayouts
//! (window resize, menu expanded or collapsed), so it is read through a
//! [`ReservoirProbe`] at the moment of release rather than remembered.

#[cfg(test)]
#[path = "containment_test.rs"]
mod containment_test;

use std::sync::{Arc, Mutex, PoisonError};

use crate::geometry::{Point, Rect};

/// Point-in-rectangle test against the reservoir's current bounds.
///
/// Edges are inclusive. A missing rectangle (reservoir not mounted) never
/// contains anything.
#[must_use]
pub fn is_contained(point: Point, reservoir: Option<Rect>) -> bool {
    reservoir.is_some_and(|rect| rect.contains(point))
}

/// Live source of the reservoir control's screen rectangle.
pub trait ReservoirProbe: Send + Sync {
    /// Current bounds, or `None` when the reservoir is not on screen.
    fn reservoir_rect(&self) -> Option<Rect>;
}

/// Host-updated reservoir bounds shared between the host and the engine.
///
/// Clones share the same slot, so the host keeps one handle to report layout
/// changes while the engine holds another to probe at release.
#[derive(Debug, Clone, Default)]
pub struct ReservoirBounds {
    inner: Arc<Mutex<Option<Rect>>>,
}

impl ReservoirBounds {
    #[must_use]
    pub fn new(rect: Option<Rect>) -> Self {
        Self { inner: Arc::new(Mutex::new(rect)) }
    }

    /// Record the reservoir's latest on-screen rectangle.
    pub fn set(&self, rect: Rect) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(rect);
    }

    /// Mark the reservoir as not mounted.
    pub fn clear(&self) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn get(&self) -> Option<Rect> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReservoirProbe for ReservoirBounds {
    fn reservoir_rect(&self) -> Option<Rect> {
        self.get()
    }
}
