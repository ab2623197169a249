use super::*;

// =============================================================
// CardKind inference
// =============================================================

#[test]
fn https_action_is_network_link() {
    assert_eq!(CardKind::infer("https://app.diagrams.net/"), CardKind::NetworkLink);
}

#[test]
fn custom_scheme_is_network_link() {
    assert_eq!(CardKind::infer("obsidian://open?vault=notes"), CardKind::NetworkLink);
    assert_eq!(CardKind::infer("git+ssh://host/repo"), CardKind::NetworkLink);
}

#[test]
fn plain_identifier_is_local_launch() {
    assert_eq!(CardKind::infer("launch_typora"), CardKind::LocalLaunch);
}

#[test]
fn windows_path_is_local_launch() {
    assert_eq!(CardKind::infer(r"C:\Program Files\Typora\Typora.exe"), CardKind::LocalLaunch);
}

#[test]
fn malformed_scheme_is_local_launch() {
    assert_eq!(CardKind::infer("://missing-scheme"), CardKind::LocalLaunch);
    assert_eq!(CardKind::infer("1http://digits-first"), CardKind::LocalLaunch);
    assert_eq!(CardKind::infer("has space://x"), CardKind::LocalLaunch);
}

// =============================================================
// IconRef
// =============================================================

#[test]
fn icon_from_upload_is_content_addressed() {
    let a = IconRef::from_upload(b"png-bytes", 1024).unwrap();
    let b = IconRef::from_upload(b"png-bytes", 1024).unwrap();
    let c = IconRef::from_upload(b"other-bytes", 1024).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.as_str().starts_with("sha256:"));
    assert_eq!(a.as_str().len(), "sha256:".len() + 64);
}

#[test]
fn icon_from_upload_rejects_empty() {
    assert_eq!(IconRef::from_upload(&[], 1024), Err(ValidationError::MissingField("icon")));
}

#[test]
fn icon_from_upload_rejects_oversize() {
    let bytes = vec![0u8; 2049];
    assert_eq!(
        IconRef::from_upload(&bytes, 2048),
        Err(ValidationError::IconTooLarge { size: 2049, max: 2048 })
    );
}

#[test]
fn icon_at_limit_is_accepted() {
    let bytes = vec![7u8; 2048];
    assert!(IconRef::from_upload(&bytes, 2048).is_ok());
}

#[test]
fn blank_icon_counts_as_empty() {
    assert!(IconRef::new("  ").is_empty());
    assert!(!IconRef::new("asset:drawio.png").is_empty());
}

// =============================================================
// Card
// =============================================================

#[test]
fn new_card_infers_kind_and_starts_visible() {
    let card = Card::new("gemini", "gemini", "https://gemini.google.com/", IconRef::new("g"), Point::new(1.0, 2.0));
    assert_eq!(card.kind, CardKind::NetworkLink);
    assert!(!card.contained);
    assert_eq!(card.position, Point::new(1.0, 2.0));
}

#[test]
fn in_reservoir_marks_contained() {
    let card = Card::new("x", "x", "launch_x", IconRef::new("i"), Point::default()).in_reservoir();
    assert!(card.contained);
    assert_eq!(card.kind, CardKind::LocalLaunch);
}

#[test]
fn validation_error_messages() {
    assert_eq!(ValidationError::MissingField("name").to_string(), "missing required field: name");
    assert_eq!(
        ValidationError::IconTooLarge { size: 10, max: 5 }.to_string(),
        "icon is too large: 10 bytes (max 5)"
    );
}
