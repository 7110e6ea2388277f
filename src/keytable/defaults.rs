//! Default key table
//!
//! The default table ships embedded in the binary. A device can get its own
//! table from the user's config directory, which replaces the default.

use std::path::{Path, PathBuf};

use super::binding::{BindingFlags, HotkeyRule, KeyBinding};
use super::command::{BasicCommand, Block, Command};
use super::config::{load_key_table_file, parse_key_table_yaml, KeyTableDefinition};
use super::context::{ContextId, KeyContext};
use super::keyboard::{KeyboardFunction, KeyboardMap};
use super::types::{KeyCombination, KeyValue};

/// Default key table YAML embedded at compile time
const DEFAULT_KEY_TABLE_YAML: &str = include_str!("../../keytable.yaml");

/// Get the embedded default key table YAML
pub fn get_default_key_table_yaml() -> &'static str {
    DEFAULT_KEY_TABLE_YAML
}

/// Get the user's key table path for a device
///
/// Returns `~/.config/brlkeys/keytables/<device>.yaml` on Unix
pub fn get_user_key_table_path(device: &str) -> Option<PathBuf> {
    crate::config_paths::key_table_file(device)
}

/// The embedded default key table, or the hardcoded one if it fails to parse
pub fn load_default_key_table() -> KeyTableDefinition {
    match parse_key_table_yaml(DEFAULT_KEY_TABLE_YAML) {
        Ok(table) => {
            tracing::info!(
                "Loaded embedded default key table ({} contexts)",
                table.contexts.len()
            );
            table
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded key table: {}, using hardcoded defaults",
                e
            );
            KeyTableDefinition {
                title: None,
                contexts: default_contexts(),
            }
        }
    }
}

/// Load the key table for a device
///
/// Loading order (the first one found wins):
/// 1. An explicit file, when given
/// 2. User table at ~/.config/brlkeys/keytables/<device>.yaml (or .json)
/// 3. Embedded default key table
///
/// A user table that fails to load is reported and skipped; an explicit
/// file that fails to load is an error.
pub fn load_key_table(
    device: &str,
    explicit: Option<&Path>,
) -> Result<KeyTableDefinition, super::config::KeyTableError> {
    if let Some(path) = explicit {
        let table = load_key_table_file(path)?;
        tracing::info!("Loaded key table from {}", path.display());
        return Ok(table);
    }

    if let Some(user_path) = get_user_key_table_path(device) {
        if user_path.exists() {
            match load_key_table_file(&user_path) {
                Ok(table) => {
                    tracing::info!(
                        "Loaded key table for {} from {}",
                        device,
                        user_path.display()
                    );
                    return Ok(table);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load key table from {}: {}",
                        user_path.display(),
                        e
                    );
                }
            }
        }
    }

    Ok(load_default_key_table())
}

/// Hardcoded fallback contexts
///
/// A reduced version of the embedded table: line and window navigation,
/// routing keys and the braille keyboard.
pub fn default_contexts() -> Vec<KeyContext> {
    let up = KeyValue::new(0, 11);
    let down = KeyValue::new(0, 12);
    let routing = KeyValue::any_in(1);

    let bindings = vec![
        bind(&[], up, Command::basic(BasicCommand::LineUp)),
        bind(&[], down, Command::basic(BasicCommand::LineDown)),
        bind(&[], routing, Command::block(Block::Route, 0)).with_flags(BindingFlags::ADJUST),
    ];

    let hotkeys = vec![
        HotkeyRule::new(
            KeyValue::new(0, 9),
            Command::basic(BasicCommand::FullWindowLeft),
            Command::NOOP,
        ),
        HotkeyRule::new(
            KeyValue::new(0, 10),
            Command::basic(BasicCommand::FullWindowRight),
            Command::NOOP,
        ),
    ];

    let dots = [
        KeyboardFunction::Dot1,
        KeyboardFunction::Dot2,
        KeyboardFunction::Dot3,
        KeyboardFunction::Dot4,
        KeyboardFunction::Dot5,
        KeyboardFunction::Dot6,
        KeyboardFunction::Dot7,
        KeyboardFunction::Dot8,
    ];
    let keyboard: KeyboardMap = (0u8..)
        .zip(dots)
        .chain(std::iter::once((8, KeyboardFunction::Space)))
        .collect();

    vec![KeyContext::new(ContextId::DEFAULT)
        .named("default")
        .with_bindings(bindings)
        .with_hotkeys(hotkeys)
        .with_keyboard(keyboard, 0)]
}

/// Helper to create a binding
fn bind(modifiers: &[KeyValue], immediate: KeyValue, command: Command) -> KeyBinding {
    KeyBinding::new(
        KeyCombination::new(modifiers.to_vec(), Some(immediate)),
        command,
    )
}
