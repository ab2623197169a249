#![allow(clippy::float_cmp)]

use super::*;
use crate::card::CardKind;
use crate::defaults::{default_cards, default_positions};
use crate::persistence::{LayoutEntry, MemoryStore};

// =============================================================
// Helpers
// =============================================================

fn registry() -> (CardRegistry<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let registry =
        CardRegistry::new(default_cards(), Viewport::new(800.0, 600.0), LayoutPersistence::new(store.clone()));
    (registry, store)
}

fn saved_entries(store: &MemoryStore) -> Vec<LayoutEntry> {
    let raw = store.get(crate::consts::LAYOUT_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn icon() -> Option<IconRef> {
    Some(IconRef::new("sha256:feed"))
}

// =============================================================
// Queries
// =============================================================

#[test]
fn list_preserves_insertion_order() {
    let (reg, _) = registry();
    let ids: Vec<&str> = reg.list().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["drawio", "typora", "gemini", "aistudio", "notebooklm"]);
}

#[test]
fn visible_and_contained_partition_the_collection() {
    let (reg, _) = registry();
    let visible: Vec<&str> = reg.list_visible().iter().map(|c| c.id.as_str()).collect();
    let contained: Vec<&str> = reg.list_contained().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["drawio", "typora", "gemini"]);
    assert_eq!(contained, vec!["aistudio", "notebooklm"]);
    assert_eq!(visible.len() + contained.len(), reg.len());
}

#[test]
fn new_does_not_write_store() {
    let (_reg, store) = registry();
    assert!(store.get(crate::consts::LAYOUT_KEY).unwrap().is_none());
}

// =============================================================
// add
// =============================================================

#[test]
fn add_creates_centered_visible_card_and_persists() {
    let (mut reg, store) = registry();
    let id = reg.add("notes", "launch_notes", icon()).unwrap();

    let card = reg.get(&id).unwrap();
    assert_eq!(card.position, Point::new(400.0, 300.0));
    assert!(!card.contained);
    assert_eq!(card.kind, CardKind::LocalLaunch);
    assert_eq!(reg.list().last().unwrap().id, id);

    let saved = saved_entries(&store);
    assert_eq!(saved.len(), 6);
    assert_eq!(saved[5].id, id);
}

#[test]
fn add_infers_network_link_from_scheme() {
    let (mut reg, _) = registry();
    let id = reg.add("docs", "https://docs.rs", icon()).unwrap();
    assert_eq!(reg.get(&id).unwrap().kind, CardKind::NetworkLink);
}

#[test]
fn add_generates_distinct_ids() {
    let (mut reg, _) = registry();
    let a = reg.add("a", "https://a.test", icon()).unwrap();
    let b = reg.add("a", "https://a.test", icon()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn add_with_empty_name_fails_and_leaves_registry_unchanged() {
    let (mut reg, store) = registry();
    assert_eq!(reg.add("", "https://x.test", icon()), Err(ValidationError::MissingField("name")));
    assert_eq!(reg.add("   ", "https://x.test", icon()), Err(ValidationError::MissingField("name")));
    assert_eq!(reg.len(), 5);
    assert!(store.get(crate::consts::LAYOUT_KEY).unwrap().is_none());
}

#[test]
fn add_with_empty_action_fails() {
    let (mut reg, _) = registry();
    assert_eq!(reg.add("x", " ", icon()), Err(ValidationError::MissingField("action")));
    assert_eq!(reg.len(), 5);
}

#[test]
fn add_with_missing_icon_fails() {
    let (mut reg, _) = registry();
    assert_eq!(reg.add("x", "https://x.test", None), Err(ValidationError::MissingField("icon")));
    assert_eq!(reg.add("x", "https://x.test", Some(IconRef::new(""))), Err(ValidationError::MissingField("icon")));
    assert_eq!(reg.len(), 5);
}

#[test]
fn add_uses_current_viewport() {
    let (mut reg, _) = registry();
    reg.set_viewport(Viewport::new(1000.0, 200.0));
    let id = reg.add("x", "https://x.test", icon()).unwrap();
    assert_eq!(reg.get(&id).unwrap().position, Point::new(500.0, 100.0));
}

// =============================================================
// commit_move
// =============================================================

#[test]
fn commit_move_updates_position_and_containment() {
    let (mut reg, store) = registry();
    assert!(reg.commit_move("drawio", Point::new(440.0, 250.0), true));

    let card = reg.get("drawio").unwrap();
    assert_eq!(card.position, Point::new(440.0, 250.0));
    assert!(card.contained);

    let saved = saved_entries(&store);
    assert_eq!(saved[0].position, Point::new(440.0, 250.0));
    assert!(saved[0].in_bucket);
}

#[test]
fn commit_move_accepts_off_screen_positions() {
    let (mut reg, _) = registry();
    assert!(reg.commit_move("gemini", Point::new(-900.0, 12_000.0), false));
    assert_eq!(reg.get("gemini").unwrap().position, Point::new(-900.0, 12_000.0));
}

#[test]
fn commit_move_unknown_id_is_noop() {
    let (mut reg, store) = registry();
    let before = reg.list().to_vec();
    assert!(!reg.commit_move("nope", Point::new(1.0, 1.0), true));
    assert_eq!(reg.list(), before.as_slice());
    assert!(store.get(crate::consts::LAYOUT_KEY).unwrap().is_none());
}

// =============================================================
// reset_to_defaults
// =============================================================

#[test]
fn reset_restores_defaults_and_centers_user_cards() {
    let (mut reg, store) = registry();
    let user = reg.add("notes", "launch_notes", icon()).unwrap();
    reg.commit_move("drawio", Point::new(1.0, 1.0), true);
    reg.commit_move(&user, Point::new(5.0, 5.0), true);

    reg.reset_to_defaults(&default_positions());

    for card in reg.list() {
        assert!(!card.contained, "{} should be on the surface", card.id);
    }
    assert_eq!(reg.get("drawio").unwrap().position, Point::new(300.0, 200.0));
    assert_eq!(reg.get("aistudio").unwrap().position, Point::new(300.0, 500.0));
    assert_eq!(reg.get(&user).unwrap().position, Point::new(400.0, 300.0));

    assert!(saved_entries(&store).iter().all(|e| !e.in_bucket));
}

#[test]
fn reset_with_empty_map_centers_everything() {
    let (mut reg, _) = registry();
    reg.reset_to_defaults(&HashMap::new());
    assert!(reg.list().iter().all(|c| c.position == Point::new(400.0, 300.0) && !c.contained));
}

// =============================================================
// load
// =============================================================

#[test]
fn load_reconciles_saved_layout() {
    let store = MemoryStore::new();
    {
        let mut reg =
            CardRegistry::new(default_cards(), Viewport::default(), LayoutPersistence::new(store.clone()));
        reg.commit_move("typora", Point::new(7.0, 8.0), true);
        reg.add("notes", "launch_notes", icon()).unwrap();
    }

    let reg = CardRegistry::load(default_cards(), Viewport::default(), LayoutPersistence::new(store));
    assert_eq!(reg.len(), 6);
    let typora = reg.get("typora").unwrap();
    assert_eq!(typora.position, Point::new(7.0, 8.0));
    assert!(typora.contained);
    assert_eq!(reg.list().last().unwrap().name, "notes");
}
