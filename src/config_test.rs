#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = WorkspaceConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, WorkspaceConfig::default());
    assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
    assert_eq!(cfg.viewport, Viewport::new(1280.0, 800.0));
    assert!(cfg.reservoir.is_none());
    assert_eq!(cfg.max_icon_bytes, DEFAULT_MAX_ICON_BYTES);
}

#[test]
fn parses_all_overrides() {
    let cfg = WorkspaceConfig::from_lookup(lookup_from(&[
        ("WORKSPACE_STORE_PATH", " /tmp/ws.json "),
        ("WORKSPACE_VIEWPORT", "1920x1080"),
        ("WORKSPACE_RESERVOIR", "400, 240, 480, 300"),
        ("WORKSPACE_MAX_ICON_BYTES", "4096"),
    ]))
    .unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/ws.json"));
    assert_eq!(cfg.viewport, Viewport::new(1920.0, 1080.0));
    assert_eq!(cfg.reservoir, Some(Rect::new(400.0, 240.0, 480.0, 300.0)));
    assert_eq!(cfg.max_icon_bytes, 4096);
}

#[test]
fn blank_store_path_keeps_default() {
    let cfg = WorkspaceConfig::from_lookup(lookup_from(&[("WORKSPACE_STORE_PATH", "  ")])).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
}

#[test]
fn malformed_viewport_errors() {
    let err = WorkspaceConfig::from_lookup(lookup_from(&[("WORKSPACE_VIEWPORT", "wide")])).unwrap_err();
    assert!(err.to_string().starts_with("invalid WORKSPACE_VIEWPORT"));
}

#[test]
fn non_positive_viewport_errors() {
    let err = WorkspaceConfig::from_lookup(lookup_from(&[("WORKSPACE_VIEWPORT", "0x600")])).unwrap_err();
    assert!(err.to_string().contains("positive"));
}

#[test]
fn reservoir_needs_four_numbers() {
    let err = WorkspaceConfig::from_lookup(lookup_from(&[("WORKSPACE_RESERVOIR", "1,2,3")])).unwrap_err();
    assert!(err.to_string().contains("LEFT,TOP,RIGHT,BOTTOM"));
}

#[test]
fn reservoir_edges_must_be_ordered() {
    let err = WorkspaceConfig::from_lookup(lookup_from(&[("WORKSPACE_RESERVOIR", "10,10,5,20")])).unwrap_err();
    assert!(err.to_string().contains("out of order"));
}

#[test]
fn bad_icon_limit_errors() {
    let err = WorkspaceConfig::from_lookup(lookup_from(&[("WORKSPACE_MAX_ICON_BYTES", "-1")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "WORKSPACE_MAX_ICON_BYTES", .. }));
}

#[test]
fn from_env_reads_process_environment() {
    // SAFETY: this is the only test in the crate that touches WORKSPACE_* vars.
    unsafe {
        std::env::set_var("WORKSPACE_VIEWPORT", "640x480");
    }
    let cfg = WorkspaceConfig::from_env().unwrap();
    assert_eq!(cfg.viewport, Viewport::new(640.0, 480.0));
    unsafe {
        std::env::remove_var("WORKSPACE_VIEWPORT");
    }
}

#[test]
fn unset_variable_reads_as_none() {
    assert_eq!(env_value("WORKSPACE_VIEWPORT", Err(VarError::NotPresent)).unwrap(), None);
}

#[test]
fn non_utf8_variable_is_an_error() {
    let raw = std::ffi::OsString::from("640x480");
    let err = env_value("WORKSPACE_VIEWPORT", Err(VarError::NotUnicode(raw))).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "WORKSPACE_VIEWPORT", .. }));
    assert!(err.to_string().contains("not valid UTF-8"));
}
