//! Workspace engine: wires pointer input, the registry, and collaborators.
//!
//! DESIGN
//! ======
//! The engine is driven by one event at a time from the host (pointer,
//! activate, form submissions). Pointer handlers are synchronous and return
//! [`Action`]s describing what the host must redraw. Collaborator calls are
//! spawned on the tokio runtime and report back only through the
//! notification queue (and, for a missing local path, the configuration
//! prompt), so gesture handling never waits on them.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::card::{Card, CardId, CardKind, IconRef, ValidationError};
use crate::consts::DEFAULT_MAX_ICON_BYTES;
use crate::containment::{ReservoirProbe, is_contained};
use crate::defaults::default_positions;
use crate::drag::DragController;
use crate::geometry::{Point, Viewport};
use crate::launcher::{LaunchError, Launcher};
use crate::persistence::KvStore;
use crate::registry::CardRegistry;
use crate::toast::{NotificationQueue, Severity};

/// Redraw instructions returned from input handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// The dragged card is drawn at a new position; the registry is unchanged.
    PresentationMoved { id: CardId, position: Point },
    /// A move was committed to the registry and persisted.
    CardCommitted { id: CardId, position: Point, contained: bool },
    /// The presentation override is gone; redraw from the registry.
    RenderNeeded,
}

/// What happened to an activate (click/tap) event.
#[derive(Debug)]
pub enum Activation {
    /// No such card.
    Unknown,
    /// Swallowed because it ended a drag gesture.
    Suppressed,
    /// The launch was handed to the collaborator.
    Dispatched(JoinHandle<()>),
    /// No async runtime is available to run the collaborator call.
    Unavailable,
}

/// Pending "configure the local path" request raised by a failed launch.
type ConfigPrompt = Arc<Mutex<Option<String>>>;

pub struct Engine<S> {
    registry: CardRegistry<S>,
    drag: DragController,
    toasts: NotificationQueue,
    launcher: Arc<dyn Launcher>,
    probe: Box<dyn ReservoirProbe>,
    config_prompt: ConfigPrompt,
    default_positions: HashMap<CardId, Point>,
    max_icon_bytes: usize,
}

impl<S: KvStore> Engine<S> {
    #[must_use]
    pub fn new(registry: CardRegistry<S>, launcher: Arc<dyn Launcher>, probe: Box<dyn ReservoirProbe>) -> Self {
        Self {
            registry,
            drag: DragController::new(),
            toasts: NotificationQueue::new(),
            launcher,
            probe,
            config_prompt: Arc::new(Mutex::new(None)),
            default_positions: default_positions(),
            max_icon_bytes: DEFAULT_MAX_ICON_BYTES,
        }
    }

    /// Replace the positions `reset_layout` restores.
    #[must_use]
    pub fn with_default_positions(mut self, positions: HashMap<CardId, Point>) -> Self {
        self.default_positions = positions;
        self
    }

    #[must_use]
    pub fn with_max_icon_bytes(mut self, max_icon_bytes: usize) -> Self {
        self.max_icon_bytes = max_icon_bytes;
        self
    }

    // --- Queries ---

    #[must_use]
    pub fn registry(&self) -> &CardRegistry<S> {
        &self.registry
    }

    #[must_use]
    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    #[must_use]
    pub fn toasts(&self) -> &NotificationQueue {
        &self.toasts
    }

    /// Where the host should draw `id`: the drag override if it is being
    /// dragged, its committed position otherwise.
    #[must_use]
    pub fn presented_position(&self, id: &str) -> Option<Point> {
        self.drag
            .presentation_position(id)
            .or_else(|| self.registry.get(id).map(|c| c.position))
    }

    /// Launch target waiting for a local path, if a launch asked for one.
    #[must_use]
    pub fn pending_configuration(&self) -> Option<String> {
        self.config_prompt.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Dismiss the configuration prompt without configuring anything.
    pub fn cancel_configuration(&self) {
        self.config_prompt.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.registry.set_viewport(viewport);
    }

    // --- Pointer input ---

    /// Pointer pressed over card `id`.
    pub fn on_pointer_down(&mut self, id: &str, pointer: Point) -> Vec<Action> {
        if self.drag.is_dragging() {
            debug!(card_id = %id, "press ignored; drag already in progress");
            return Vec::new();
        }
        let Some(card) = self.registry.get(id) else {
            debug!(card_id = %id, "press on unknown card ignored");
            return Vec::new();
        };
        self.drag.press(id, card.position, pointer);
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, pointer: Point) -> Vec<Action> {
        match self.drag.move_to(pointer) {
            Some((id, position)) => vec![Action::PresentationMoved { id: id.to_owned(), position }],
            None => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, pointer: Point) -> Vec<Action> {
        self.finish_drag(Some(pointer))
    }

    /// Pointer lost or released outside any tracked surface. Resolves the
    /// session from the last known sample.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        if let Some(session) = self.drag.session() {
            warn!(card_id = %session.card_id, "drag abandoned; committing last sample");
        }
        self.finish_drag(None)
    }

    fn finish_drag(&mut self, pointer: Option<Point>) -> Vec<Action> {
        let Some(outcome) = self.drag.release(pointer) else {
            return Vec::new();
        };

        let contained = is_contained(outcome.release_point, self.probe.reservoir_rect());
        if !self.registry.commit_move(&outcome.card_id, outcome.position, contained) {
            return vec![Action::RenderNeeded];
        }
        if contained {
            let name = self.registry.get(&outcome.card_id).map_or("card", |c| c.name.as_str());
            self.toasts.push(format!("{name} added to reservoir"), Severity::Success);
        }
        vec![
            Action::CardCommitted { id: outcome.card_id, position: outcome.position, contained },
            Action::RenderNeeded,
        ]
    }

    // --- Activation ---

    /// Click/tap on card `id`.
    pub fn on_activate(&mut self, id: &str) -> Activation {
        if self.drag.take_click_suppression(id) {
            debug!(card_id = %id, "activate suppressed after drag");
            return Activation::Suppressed;
        }
        let Some(card) = self.registry.get(id).cloned() else {
            return Activation::Unknown;
        };
        let launcher = Arc::clone(&self.launcher);
        let toasts = self.toasts.clone();
        match card.kind {
            CardKind::NetworkLink => self.dispatch(async move {
                if let Err(e) = launcher.open_link(&card.action).await {
                    warn!(card_id = %card.id, error = %e, "open link failed");
                    toasts.push(format!("open failed: {e}"), Severity::Error);
                }
            }),
            CardKind::LocalLaunch => {
                let prompt = Arc::clone(&self.config_prompt);
                self.dispatch(async move { launch_local(&*launcher, &card, &toasts, &prompt).await })
            }
        }
    }

    fn dispatch<F>(&self, task: F) -> Activation
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Activation::Dispatched(handle.spawn(task)),
            Err(e) => {
                error!(error = %e, "no async runtime for collaborator call");
                self.toasts.push("action unavailable", Severity::Error);
                Activation::Unavailable
            }
        }
    }

    // --- Forms ---

    /// Validate an uploaded icon and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or oversize upload, after
    /// queueing an error toast.
    pub fn upload_icon(&self, bytes: &[u8]) -> Result<IconRef, ValidationError> {
        IconRef::from_upload(bytes, self.max_icon_bytes).inspect_err(|e| {
            self.toasts.push(e.to_string(), Severity::Error);
        })
    }

    /// Add a user card.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a missing field, after queueing an
    /// error toast. The registry is unchanged in that case.
    pub fn add_card(&mut self, name: &str, action: &str, icon: Option<IconRef>) -> Result<CardId, ValidationError> {
        match self.registry.add(name, action, icon) {
            Ok(id) => {
                self.toasts.push(format!("{} added", name.trim()), Severity::Success);
                Ok(id)
            }
            Err(e) => {
                self.toasts.push(e.to_string(), Severity::Error);
                Err(e)
            }
        }
    }

    /// Move every card back to its default place on the surface.
    pub fn reset_layout(&mut self) -> Vec<Action> {
        if let Some(session) = self.drag.discard() {
            debug!(card_id = %session.card_id, "live drag discarded by reset");
        }
        self.registry.reset_to_defaults(&self.default_positions);
        self.toasts.push("layout reset", Severity::Info);
        vec![Action::RenderNeeded]
    }

    /// Save a local-launch path typed by the user, then retry the launch
    /// that asked for it.
    ///
    /// Surrounding whitespace and one pair of double quotes are stripped.
    /// Returns `None` when the path is rejected or no runtime is available.
    pub fn configure_local_path(&mut self, raw: &str) -> Option<JoinHandle<()>> {
        let path = normalize_path(raw);
        if path.is_empty() {
            self.toasts.push(ValidationError::MissingField("path").to_string(), Severity::Error);
            return None;
        }
        let target = self.pending_configuration();
        let launcher = Arc::clone(&self.launcher);
        let toasts = self.toasts.clone();
        let prompt = Arc::clone(&self.config_prompt);
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "no async runtime for path configuration");
                return None;
            }
        };
        Some(handle.spawn(async move {
            if let Err(e) = launcher.set_configured_local_path(&path).await {
                warn!(error = %e, "saving local launch path failed");
                toasts.push(format!("save failed: {e}"), Severity::Error);
                return;
            }
            prompt.lock().unwrap_or_else(PoisonError::into_inner).take();
            toasts.push("path saved", Severity::Success);
            if let Some(target) = target {
                if let Err(e) = launcher.launch_local(&target).await {
                    warn!(%target, error = %e, "launch after configuration failed");
                    toasts.push(format!("launch failed: {e}. Check that the path is correct."), Severity::Error);
                }
            }
        }))
    }

    /// Start-up work: when no local path is configured, try to detect one.
    pub fn bootstrap(&self) -> Option<JoinHandle<()>> {
        let launcher = Arc::clone(&self.launcher);
        let toasts = self.toasts.clone();
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "no async runtime for bootstrap");
                return None;
            }
        };
        Some(handle.spawn(async move {
            if launcher.configured_local_path().await.is_some() {
                return;
            }
            let Some(path) = launcher.auto_detect_local_path().await else {
                info!("no local launch path detected");
                return;
            };
            match launcher.set_configured_local_path(&path).await {
                Ok(()) => {
                    toasts.push(format!("detected local launch path: {path}"), Severity::Info);
                }
                Err(e) => warn!(%path, error = %e, "storing detected path failed"),
            }
        }))
    }

    /// Cards on the surface with the drag override applied.
    #[must_use]
    pub fn visible_cards(&self) -> Vec<Card> {
        self.registry
            .list_visible()
            .into_iter()
            .map(|card| {
                let mut card = card.clone();
                if let Some(position) = self.drag.presentation_position(&card.id) {
                    card.position = position;
                }
                card
            })
            .collect()
    }
}

async fn launch_local(launcher: &dyn Launcher, card: &Card, toasts: &NotificationQueue, prompt: &ConfigPrompt) {
    match launcher.launch_local(&card.action).await {
        Ok(()) => {}
        Err(LaunchError::NeedsConfiguration) => {
            info!(card_id = %card.id, "local launch needs a configured path");
            *prompt.lock().unwrap_or_else(PoisonError::into_inner) = Some(card.action.clone());
            toasts.push(format!("set the path for {} first", card.name), Severity::Info);
        }
        Err(e) => {
            warn!(card_id = %card.id, error = %e, "local launch failed");
            toasts.push(format!("launch failed: {e}"), Severity::Error);
        }
    }
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_owned()
}
