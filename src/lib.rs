//! Positioning engine for the Alpha workspace launcher surface.
//!
//! The surface shows launcher cards that can be dragged around or dropped
//! into the reservoir, a collection area that hides them from the main view.
//! This crate owns the card collection, the drag gesture, the drop-target
//! test, layout persistence and transient notifications. The host (a desktop
//! shell or the `alpha-workspace replay` command) feeds it pointer events and
//! redraws from the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Event entry points tying everything together |
//! | [`registry`] | Canonical card collection and its mutations |
//! | [`drag`] | Pointer gesture state machine and click suppression |
//! | [`containment`] | Reservoir hit test and the reservoir probe |
//! | [`persistence`] | Key/value stores and the layout record |
//! | [`toast`] | Self-expiring notification queue |
//! | [`launcher`] | Open-link and local-launch collaborators |
//! | [`card`] | Card, icon and validation types |
//! | [`defaults`] | Built-in card set |
//! | [`geometry`] | Points, rectangles, viewport |
//! | [`config`] | Environment configuration |
//! | [`replay`] | JSON-lines host event driver |
//! | [`consts`] | Storage keys and fixed limits |

pub mod card;
pub mod config;
pub mod consts;
pub mod containment;
pub mod defaults;
pub mod drag;
pub mod engine;
pub mod geometry;
pub mod launcher;
pub mod persistence;
pub mod registry;
pub mod replay;
pub mod toast;
