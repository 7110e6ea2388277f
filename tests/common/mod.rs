//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::path::PathBuf;

use brlkeys::keytable::{
    parse_key_table_yaml, Command, KeyEvent, KeyTable, KeyTableDefinition, KeyTableState,
};

/// A small display: two dot keys, a space bar, an advance key and a row of
/// routing keys, with a describe context reachable through a chord
pub const TEST_TABLE_YAML: &str = r#"
title: Test display
keys:
  Dot1: 0
  Dot2: 1
  Space: 2
  Advance: 3
  Select: 4
groups:
  RoutingKey: 1
contexts:
  - id: 0
    name: default
    hotkeys:
      - key: Advance
        press: FWINRT
        release: LNDN
    bindings:
      - keys: "!Select"
        command: HOME
      - keys: "!RoutingKey"
        command: ROUTE
      - keys: "Select+!RoutingKey"
        command: CUTBEGIN+1
      - keys: "Select+Space"
        command: CONTEXT+5
    keyboard:
      Dot1: dot1
      Dot2: dot2
      Space: space
  - id: 5
    name: describe
    temporary: true
    bindings:
      - keys: "!RoutingKey"
        command: DESCCHAR
"#;

pub fn test_definition() -> KeyTableDefinition {
    parse_key_table_yaml(TEST_TABLE_YAML).expect("test table should parse")
}

pub fn test_table() -> KeyTable {
    test_definition().instantiate()
}

/// Send events in order, collecting the final state and every command
pub fn send(table: &mut KeyTable, events: &[KeyEvent]) -> (KeyTableState, Vec<Command>) {
    let mut queue = Vec::new();
    let mut state = KeyTableState::Unbound;
    for event in events {
        state = table.process_key_event(*event, &mut queue);
    }
    (state, queue)
}

/// Write `content` to `name` inside a fresh temporary directory
pub fn write_temp_file(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write temp file");
    (dir, path)
}
