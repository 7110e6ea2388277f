//! Braille display key tables
//!
//! This module turns raw key events from a braille display into commands:
//! - Key tables bind combinations of held keys to commands, per context
//! - Hotkeys fire on their own press or release, ignoring other keys
//! - Key sets (routing keys and the like) bind as a whole, passing the
//!   position of the key that was pressed on to the command
//! - Contexts can emulate a braille keyboard from dot and space keys
//!
//! # Architecture
//!
//! ```text
//! KeyEvent → KeyTable::process_key_event() → Command → CommandQueue
//! ```
//!
//! # Loading Key Tables
//!
//! ```ignore
//! // Load from the embedded default table
//! let mut table = load_default_key_table().instantiate();
//!
//! // Or from a YAML file
//! let mut table = load_key_table_file(Path::new("device.yaml"))?.instantiate();
//!
//! let mut queue = Vec::new();
//! table.process_key_event(KeyEvent::press(0, 11), &mut queue);
//! ```

mod binding;
mod command;
mod config;
mod context;
mod defaults;
mod keyboard;
mod pressed;
mod table;
mod types;

pub use binding::{BindingFlags, HotkeyRule, KeyBinding};
pub use command::{BasicCommand, Block, Command, CommandFlags};
pub use config::{
    compile_key_table, load_key_table_file, parse_key_table_json, parse_key_table_yaml,
    KeyTableConfig, KeyTableDefinition, KeyTableError,
};
pub use context::{ContextId, KeyContext};
pub use defaults::{
    default_contexts, get_default_key_table_yaml, get_user_key_table_path, load_default_key_table,
    load_key_table,
};
pub use keyboard::{KeyboardFunction, KeyboardMap};
pub use pressed::{CapacityError, PressedKeys, PRESSED_KEYS_CAPACITY};
pub use table::{CommandQueue, KeyEvent, KeyTable, KeyTableState};
pub use types::{KeyCode, KeyCombination, KeyGroup, KeyValue, MAX_MODIFIERS_PER_COMBINATION};
