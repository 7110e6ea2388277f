//! brlkeys - braille display key tables
//!
//! This crate translates the key presses and releases of a braille display
//! into braille commands, driven by per-device key tables.

pub mod cli;
pub mod config_paths;
pub mod keytable;
pub mod tracing;

// Re-export commonly used types
pub use keytable::{
    Command, CommandQueue, ContextId, KeyContext, KeyEvent, KeyTable, KeyTableDefinition,
    KeyTableError, KeyTableState, KeyValue,
};
