//! Key table files
//!
//! Parses YAML (or JSON) key table files into compiled key contexts. A key
//! table names the keys of a device, names its key sets, and lists the
//! bindings, hotkeys and keyboard functions of every context:
//!
//! ```yaml
//! title: Example display
//! keys:
//!   Dot1: 0
//!   Space: 8
//! groups:
//!   RoutingKey: 1
//! contexts:
//!   - id: 0
//!     name: default
//!     bindings:
//!       - keys: "Space+!Dot1"
//!         command: LNUP
//!       - keys: "!RoutingKey"
//!         command: ROUTE
//!     hotkeys:
//!       - key: Advance
//!         press: FWINRT
//!     keyboard:
//!       Dot1: dot1
//!       Space: space
//! ```
//!
//! In a combination, `!` marks the immediate key (the one pressed last);
//! every other key is a modifier. A key set name stands for any key of the
//! set; `RoutingKey.3` names one key of a set and is only valid for hotkeys.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::binding::{BindingFlags, HotkeyRule, KeyBinding};
use super::command::{Block, Command};
use super::context::{ContextId, KeyContext};
use super::keyboard::{KeyboardFunction, KeyboardMap};
use super::table::KeyTable;
use super::types::{KeyCombination, KeyGroup, KeyValue, MAX_MODIFIERS_PER_COMBINATION};

/// Root structure of a key table file
#[derive(Debug, Deserialize)]
pub struct KeyTableConfig {
    #[serde(default)]
    pub title: Option<String>,
    /// Named keys of the device, by code
    #[serde(default)]
    pub keys: BTreeMap<String, u8>,
    /// Named key sets, by group
    #[serde(default)]
    pub groups: BTreeMap<String, u8>,
    pub contexts: Vec<ContextConfig>,
}

/// One context entry from a key table file
#[derive(Debug, Deserialize)]
pub struct ContextConfig {
    pub id: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
    #[serde(default)]
    pub hotkeys: Vec<HotkeyConfig>,
    #[serde(default)]
    pub keyboard: Option<BTreeMap<String, KeyboardFunction>>,
    /// Keyboard functions implied whenever a dot is typed
    #[serde(default)]
    pub superimpose: Vec<KeyboardFunction>,
}

/// A single binding entry
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub keys: String,
    pub command: String,
}

/// A single hotkey entry
#[derive(Debug, Deserialize)]
pub struct HotkeyConfig {
    pub key: String,
    #[serde(default)]
    pub press: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
}

/// A compiled key table, ready to be instantiated for each device
#[derive(Debug, Clone)]
pub struct KeyTableDefinition {
    pub title: Option<String>,
    pub contexts: Vec<KeyContext>,
}

impl KeyTableDefinition {
    /// Create the live key table for one device
    pub fn instantiate(&self) -> KeyTable {
        KeyTable::new(self.contexts.clone())
    }

    pub fn context(&self, id: ContextId) -> Option<&KeyContext> {
        self.contexts.iter().find(|ctx| ctx.id == id)
    }
}

/// Load a key table file; `.json` files are read as JSON, anything else as YAML
pub fn load_key_table_file(path: &Path) -> Result<KeyTableDefinition, KeyTableError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| KeyTableError::IoError(e.to_string()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_key_table_json(&content)
    } else {
        parse_key_table_yaml(&content)
    }
}

/// Parse a key table from a YAML string
pub fn parse_key_table_yaml(yaml: &str) -> Result<KeyTableDefinition, KeyTableError> {
    let config: KeyTableConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeyTableError::ParseError(e.to_string()))?;
    compile_key_table(config)
}

/// Parse a key table from a JSON string
pub fn parse_key_table_json(json: &str) -> Result<KeyTableDefinition, KeyTableError> {
    let config: KeyTableConfig =
        serde_json::from_str(json).map_err(|e| KeyTableError::ParseError(e.to_string()))?;
    compile_key_table(config)
}

/// Resolve names, validate, and build the contexts of a key table
pub fn compile_key_table(config: KeyTableConfig) -> Result<KeyTableDefinition, KeyTableError> {
    let names = KeyNames::new(&config)?;
    let mut seen = HashSet::new();
    let mut contexts = Vec::with_capacity(config.contexts.len());

    for entry in &config.contexts {
        if !seen.insert(entry.id) {
            return Err(KeyTableError::InvalidContext(format!(
                "Context {} defined twice",
                entry.id
            )));
        }
        contexts.push(compile_context(entry, &names)?);
    }

    Ok(KeyTableDefinition {
        title: config.title,
        contexts,
    })
}

fn compile_context(entry: &ContextConfig, names: &KeyNames) -> Result<KeyContext, KeyTableError> {
    let id = ContextId(entry.id);

    let mut combinations = HashSet::new();
    let mut bindings = Vec::with_capacity(entry.bindings.len());
    for binding in &entry.bindings {
        let combination = names.parse_combination(&binding.keys)?;
        let command = parse_command(&binding.command)?;

        if !combinations.insert(combination.clone()) {
            return Err(KeyTableError::DuplicateBinding(format!(
                "{} in context {}",
                binding.keys, id
            )));
        }

        let mut flags = BindingFlags::NONE;
        if command.block_kind() != Some(Block::Basic) && combination.has_wildcard() {
            flags = flags | BindingFlags::ADJUST;
        }
        bindings.push(KeyBinding::new(combination, command).with_flags(flags));
    }

    let mut hotkey_keys = HashSet::new();
    let mut hotkeys = Vec::with_capacity(entry.hotkeys.len());
    for hotkey in &entry.hotkeys {
        let key = names.parse_hotkey(&hotkey.key)?;
        if !hotkey_keys.insert(key) {
            return Err(KeyTableError::DuplicateBinding(format!(
                "hotkey {} in context {}",
                hotkey.key, id
            )));
        }
        let press = parse_optional_command(hotkey.press.as_deref())?;
        let release = parse_optional_command(hotkey.release.as_deref())?;
        hotkeys.push(HotkeyRule::new(key, press, release));
    }

    let mut context = KeyContext::new(id)
        .temporary(entry.temporary)
        .with_bindings(bindings)
        .with_hotkeys(hotkeys);
    if let Some(name) = &entry.name {
        context = context.named(name.clone());
    }

    if let Some(functions) = &entry.keyboard {
        let mut keyboard = KeyboardMap::new();
        for (name, function) in functions {
            keyboard.assign(names.named_key(name)?, *function);
        }
        let superimposed = entry
            .superimpose
            .iter()
            .fold(0, |bits, function| bits | function.bits());
        context = context.with_keyboard(keyboard, superimposed);
    }

    Ok(context)
}

/// Key and key set names of one table, matched case-insensitively
struct KeyNames {
    keys: HashMap<String, u8>,
    groups: HashMap<String, u8>,
}

impl KeyNames {
    fn new(config: &KeyTableConfig) -> Result<Self, KeyTableError> {
        let keys = config
            .keys
            .iter()
            .map(|(name, code)| (name.to_lowercase(), *code))
            .collect();

        let mut groups = HashMap::with_capacity(config.groups.len());
        for (name, group) in &config.groups {
            if !KeyGroup(*group).is_wildcardable() {
                return Err(KeyTableError::InvalidKey(format!(
                    "Key set {} cannot use group 0",
                    name
                )));
            }
            groups.insert(name.to_lowercase(), *group);
        }

        Ok(Self { keys, groups })
    }

    fn named_key(&self, name: &str) -> Result<u8, KeyTableError> {
        self.keys
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| KeyTableError::InvalidKey(format!("Unknown key: {}", name)))
    }

    /// Resolve a key or key set name as used in a combination
    fn combination_key(&self, name: &str) -> Result<KeyValue, KeyTableError> {
        let lower = name.trim().to_lowercase();
        if let Some(code) = self.keys.get(&lower) {
            return Ok(KeyValue::new(0, *code));
        }
        if let Some(group) = self.groups.get(&lower) {
            return Ok(KeyValue::any_in(*group));
        }
        if lower.contains('.') {
            return Err(KeyTableError::InvalidKey(format!(
                "Key set members cannot be bound individually: {}",
                name
            )));
        }
        Err(KeyTableError::InvalidKey(format!("Unknown key: {}", name)))
    }

    /// Parse a combination like `Space+Dot1+!Dot4`
    fn parse_combination(&self, keys: &str) -> Result<KeyCombination, KeyTableError> {
        let mut modifiers = Vec::new();
        let mut immediate = None;

        for part in keys.split('+') {
            let part = part.trim();
            if part.is_empty() {
                return Err(KeyTableError::InvalidKey(format!(
                    "Empty key in combination: {}",
                    keys
                )));
            }

            if let Some(name) = part.strip_prefix('!') {
                if immediate.is_some() {
                    return Err(KeyTableError::InvalidKey(format!(
                        "Multiple immediate keys in combination: {}",
                        keys
                    )));
                }
                immediate = Some(self.combination_key(name)?);
            } else {
                modifiers.push(self.combination_key(part)?);
            }
        }

        if modifiers.len() > MAX_MODIFIERS_PER_COMBINATION {
            return Err(KeyTableError::TooManyModifiers(keys.to_string()));
        }

        let combination = KeyCombination::new(modifiers, immediate);
        let mut distinct = HashSet::new();
        for key in combination.keys() {
            if key.code.exact().is_some() && !distinct.insert(*key) {
                return Err(KeyTableError::InvalidKey(format!(
                    "Key used twice in combination: {}",
                    keys
                )));
            }
        }

        Ok(combination)
    }

    /// Resolve a hotkey: a named key or one member of a key set
    fn parse_hotkey(&self, name: &str) -> Result<KeyValue, KeyTableError> {
        let trimmed = name.trim();
        if let Some((set, member)) = trimmed.split_once('.') {
            let group = self
                .groups
                .get(&set.to_lowercase())
                .ok_or_else(|| KeyTableError::InvalidKey(format!("Unknown key set: {}", set)))?;
            let code: u8 = member
                .parse()
                .map_err(|_| KeyTableError::InvalidKey(format!("Invalid key number: {}", name)))?;
            return Ok(KeyValue::new(*group, code));
        }

        if self.groups.contains_key(&trimmed.to_lowercase()) {
            return Err(KeyTableError::InvalidKey(format!(
                "Hotkeys need a single key, not a key set: {}",
                name
            )));
        }

        Ok(KeyValue::new(0, self.named_key(trimmed)?))
    }
}

/// Parse a command name string into a Command
fn parse_command(command: &str) -> Result<Command, KeyTableError> {
    Command::from_str(command).map_err(|_| KeyTableError::InvalidCommand(command.to_string()))
}

fn parse_optional_command(command: Option<&str>) -> Result<Command, KeyTableError> {
    command.map_or(Ok(Command::NOOP), parse_command)
}

/// Errors that can occur when loading key tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyTableError {
    IoError(String),
    ParseError(String),
    InvalidKey(String),
    InvalidCommand(String),
    InvalidContext(String),
    DuplicateBinding(String),
    TooManyModifiers(String),
}

impl std::fmt::Display for KeyTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyTableError::IoError(e) => write!(f, "IO error: {}", e),
            KeyTableError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeyTableError::InvalidKey(k) => write!(f, "Invalid key: {}", k),
            KeyTableError::InvalidCommand(c) => write!(f, "Invalid command: {}", c),
            KeyTableError::InvalidContext(c) => write!(f, "Invalid context: {}", c),
            KeyTableError::DuplicateBinding(b) => write!(f, "Duplicate binding: {}", b),
            KeyTableError::TooManyModifiers(k) => write!(
                f,
                "More than {} modifiers in combination: {}",
                MAX_MODIFIERS_PER_COMBINATION, k
            ),
        }
    }
}

impl std::error::Error for KeyTableError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytable::command::BasicCommand;

    const TABLE: &str = r#"
title: Test display
keys:
  Dot1: 0
  Dot2: 1
  Space: 8
  Advance: 9
groups:
  RoutingKey: 1
contexts:
  - id: 0
    name: default
    bindings:
      - keys: "!Dot1"
        command: LNUP
      - keys: "Space+!Dot2"
        command: LNDN
      - keys: "!RoutingKey"
        command: ROUTE
    hotkeys:
      - key: Advance
        press: FWINRT
      - key: RoutingKey.0
        release: HOME
    keyboard:
      Dot1: dot1
      Dot2: dot2
      Space: space
    superimpose: [dot7]
  - id: 3
    temporary: true
"#;

    #[test]
    fn test_parse_yaml() {
        let table = parse_key_table_yaml(TABLE).unwrap();
        assert_eq!(table.title.as_deref(), Some("Test display"));
        assert_eq!(table.contexts.len(), 2);

        let ctx = table.context(ContextId::DEFAULT).unwrap();
        assert_eq!(ctx.name.as_deref(), Some("default"));
        assert_eq!(ctx.hotkeys().len(), 2);
        assert_eq!(ctx.keyboard().map(|k| k.len()), Some(3));
        assert_eq!(ctx.superimposed(), 0x40);
        assert!(table.context(ContextId(3)).unwrap().is_temporary());
    }

    #[test]
    fn test_immediate_key_and_modifiers() {
        let table = parse_key_table_yaml(TABLE).unwrap();
        let ctx = table.context(ContextId::DEFAULT).unwrap();

        let target = KeyCombination::new(vec![KeyValue::new(0, 8)], Some(KeyValue::new(0, 1)));
        let binding = ctx.find_binding(&target).unwrap();
        assert_eq!(binding.command, Some(Command::basic(BasicCommand::LineDown)));
        assert!(!binding.adjusts());
    }

    #[test]
    fn test_key_set_block_command_adjusts() {
        let table = parse_key_table_yaml(TABLE).unwrap();
        let ctx = table.context(ContextId::DEFAULT).unwrap();

        let target = KeyCombination::new(vec![], Some(KeyValue::any_in(1)));
        let binding = ctx.find_binding(&target).unwrap();
        assert!(binding.adjusts());
    }

    #[test]
    fn test_hotkey_defaults_to_noop() {
        let table = parse_key_table_yaml(TABLE).unwrap();
        let ctx = table.context(ContextId::DEFAULT).unwrap();

        let advance = ctx.find_hotkey(&KeyValue::new(0, 9)).unwrap();
        assert_eq!(advance.release, Command::NOOP);
        let routing = ctx.find_hotkey(&KeyValue::new(1, 0)).unwrap();
        assert_eq!(routing.press, Command::NOOP);
        assert_eq!(routing.release, Command::basic(BasicCommand::Home));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let yaml = r#"
keys: { Dot1: 0 }
contexts:
  - id: 0
    bindings:
      - keys: "!Dot9"
        command: LNUP
"#;
        assert!(matches!(
            parse_key_table_yaml(yaml),
            Err(KeyTableError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let yaml = r#"
keys: { Dot1: 0 }
contexts:
  - id: 0
    bindings:
      - keys: "!Dot1"
        command: FLY
"#;
        assert_eq!(
            parse_key_table_yaml(yaml).unwrap_err(),
            KeyTableError::InvalidCommand("FLY".to_string())
        );
    }

    #[test]
    fn test_duplicate_binding_is_rejected() {
        let yaml = r#"
keys: { Dot1: 0, Dot2: 1 }
contexts:
  - id: 0
    bindings:
      - keys: "Dot2+!Dot1"
        command: LNUP
      - keys: "dot2 + !dot1"
        command: LNDN
"#;
        assert!(matches!(
            parse_key_table_yaml(yaml),
            Err(KeyTableError::DuplicateBinding(_))
        ));
    }

    #[test]
    fn test_duplicate_context_is_rejected() {
        let yaml = r#"
contexts:
  - id: 1
  - id: 1
"#;
        assert!(matches!(
            parse_key_table_yaml(yaml),
            Err(KeyTableError::InvalidContext(_))
        ));
    }

    #[test]
    fn test_key_set_member_cannot_be_bound() {
        let yaml = r#"
groups: { RoutingKey: 1 }
contexts:
  - id: 0
    bindings:
      - keys: "!RoutingKey.4"
        command: HOME
"#;
        assert!(matches!(
            parse_key_table_yaml(yaml),
            Err(KeyTableError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_group_zero_key_set_is_rejected() {
        let yaml = r#"
groups: { Broken: 0 }
contexts: []
"#;
        assert!(matches!(
            parse_key_table_yaml(yaml),
            Err(KeyTableError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_two_immediate_keys_are_rejected() {
        let yaml = r#"
keys: { Dot1: 0, Dot2: 1 }
contexts:
  - id: 0
    bindings:
      - keys: "!Dot1+!Dot2"
        command: LNUP
"#;
        assert!(parse_key_table_yaml(yaml).is_err());
    }

    #[test]
    fn test_too_many_modifiers() {
        let keys: Vec<String> = (0..=MAX_MODIFIERS_PER_COMBINATION)
            .map(|i| format!("K{}", i))
            .collect();
        let key_defs: Vec<String> = keys
            .iter()
            .enumerate()
            .map(|(i, name)| format!("  {}: {}", name, i))
            .collect();
        let yaml = format!(
            "keys:\n{}\ncontexts:\n  - id: 0\n    bindings:\n      - keys: \"{}\"\n        command: HOME\n",
            key_defs.join("\n"),
            keys.join("+")
        );

        assert!(matches!(
            parse_key_table_yaml(&yaml),
            Err(KeyTableError::TooManyModifiers(_))
        ));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "keys": { "Dot1": 0 },
            "contexts": [
                { "id": 0, "bindings": [ { "keys": "!Dot1", "command": "TOP" } ] }
            ]
        }"#;
        let table = parse_key_table_json(json).unwrap();
        assert_eq!(table.contexts[0].bindings().len(), 1);
    }

    #[test]
    fn test_error_display() {
        let error = KeyTableError::InvalidCommand("FLY".to_string());
        assert_eq!(error.to_string(), "Invalid command: FLY");
    }
}
