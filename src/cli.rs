//! Command-line interface for the key table tool
//!
//! Supports:
//! - Loading the default, per-device or an explicit key table
//! - Printing a summary of the loaded table
//! - Replaying a script of key events through the table

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::keytable::{ContextId, KeyEvent, KeyTable, KeyTableDefinition, KeyValue};

/// Braille display key table tool
#[derive(Parser, Debug)]
#[command(
    name = "brlkeys",
    version,
    about = "Load braille display key tables and replay key events through them"
)]
pub struct CliArgs {
    /// Event script to replay, one `press|release <group> <code> [context]` per line
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Key table file (YAML, or JSON by extension)
    #[arg(short = 't', long, value_name = "FILE")]
    pub table: Option<PathBuf>,

    /// Device whose table is looked up in the config directory
    #[arg(short = 'd', long, default_value = "generic")]
    pub device: String,

    /// Log every key event at debug level
    #[arg(long)]
    pub log_events: bool,

    /// Also write logs to the config directory
    #[arg(long)]
    pub log_file: bool,
}

/// Errors in an event script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    UnknownAction { line: usize, action: String },
    MissingField { line: usize, field: &'static str },
    InvalidNumber { line: usize, value: String },
    TrailingInput { line: usize },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownAction { line, action } => {
                write!(f, "line {}: unknown action '{}'", line, action)
            }
            ScriptError::MissingField { line, field } => {
                write!(f, "line {}: missing {}", line, field)
            }
            ScriptError::InvalidNumber { line, value } => {
                write!(f, "line {}: invalid number '{}'", line, value)
            }
            ScriptError::TrailingInput { line } => write!(f, "line {}: unexpected input", line),
        }
    }
}

impl std::error::Error for ScriptError {}

/// Parse one script line; blank lines and `#` comments yield `None`
///
/// `line` is the 1-indexed line number used in errors.
pub fn parse_event_line(text: &str, line: usize) -> Result<Option<KeyEvent>, ScriptError> {
    let text = text.split('#').next().unwrap_or_default().trim();
    if text.is_empty() {
        return Ok(None);
    }

    let mut fields = text.split_whitespace();
    let action = fields.next().unwrap_or_default();
    let press = match action.to_lowercase().as_str() {
        "press" | "p" => true,
        "release" | "r" => false,
        _ => {
            return Err(ScriptError::UnknownAction {
                line,
                action: action.to_string(),
            })
        }
    };

    let group = number(fields.next(), line, "group")?;
    let code = number(fields.next(), line, "code")?;
    let context = match fields.next() {
        Some(value) => ContextId(number(Some(value), line, "context")?),
        None => ContextId::DEFAULT,
    };
    if fields.next().is_some() {
        return Err(ScriptError::TrailingInput { line });
    }

    Ok(Some(KeyEvent {
        context,
        key: KeyValue::new(group, code),
        press,
    }))
}

fn number(value: Option<&str>, line: usize, field: &'static str) -> Result<u8, ScriptError> {
    let value = value.ok_or(ScriptError::MissingField { line, field })?;
    value.parse().map_err(|_| ScriptError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

/// Parse a whole event script
pub fn parse_event_script(script: &str) -> Result<Vec<KeyEvent>, ScriptError> {
    let mut events = Vec::new();
    for (index, text) in script.lines().enumerate() {
        if let Some(event) = parse_event_line(text, index + 1)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Describe a loaded key table
pub fn summarize(definition: &KeyTableDefinition) -> String {
    let mut summary = format!(
        "{}: {} context(s)",
        definition.title.as_deref().unwrap_or("Untitled key table"),
        definition.contexts.len()
    );

    for context in &definition.contexts {
        let real = context
            .bindings()
            .iter()
            .filter(|binding| !binding.is_incomplete())
            .count();
        summary.push_str(&format!(
            "\n  context {} ({}): {} binding(s), {} hotkey(s){}{}",
            context.id,
            context.name.as_deref().unwrap_or("unnamed"),
            real,
            context.hotkeys().len(),
            if context.keyboard().is_some() {
                ", keyboard"
            } else {
                ""
            },
            if context.is_temporary() {
                ", temporary"
            } else {
                ""
            },
        ));
    }

    summary
}

/// Run events through a key table, writing one line per event
pub fn replay<W: Write>(table: &mut KeyTable, events: &[KeyEvent], out: &mut W) -> io::Result<()> {
    for event in events {
        let mut queue = Vec::new();
        let state = table.process_key_event(*event, &mut queue);

        let commands: Vec<String> = queue.iter().map(|command| command.to_string()).collect();
        writeln!(
            out,
            "{} -> {:?} [{}] ctx:{}",
            event,
            state,
            commands.join(", "),
            table.current_context()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytable::load_default_key_table;

    #[test]
    fn test_parse_press_and_release() {
        assert_eq!(
            parse_event_line("press 0 11", 1).unwrap(),
            Some(KeyEvent::press(0, 11))
        );
        assert_eq!(
            parse_event_line("  R 1 4  ", 2).unwrap(),
            Some(KeyEvent::release(1, 4))
        );
    }

    #[test]
    fn test_parse_with_context() {
        assert_eq!(
            parse_event_line("press 0 12 1", 1).unwrap(),
            Some(KeyEvent::press(0, 12).in_context(ContextId::MENU))
        );
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_event_line("", 1).unwrap(), None);
        assert_eq!(parse_event_line("   # only a comment", 1).unwrap(), None);
        assert_eq!(
            parse_event_line("press 0 1 # trailing comment", 1).unwrap(),
            Some(KeyEvent::press(0, 1))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_event_line("tap 0 1", 3).unwrap_err(),
            ScriptError::UnknownAction {
                line: 3,
                action: "tap".to_string()
            }
        );
        assert_eq!(
            parse_event_line("press 0", 4).unwrap_err(),
            ScriptError::MissingField {
                line: 4,
                field: "code"
            }
        );
        assert_eq!(
            parse_event_line("press 0 300", 5).unwrap_err(),
            ScriptError::InvalidNumber {
                line: 5,
                value: "300".to_string()
            }
        );
        assert_eq!(
            parse_event_line("press 0 1 0 9", 6).unwrap_err(),
            ScriptError::TrailingInput { line: 6 }
        );
    }

    #[test]
    fn test_script_reports_line_numbers() {
        let script = "press 0 11\n\nrelease 0 x\n";
        assert_eq!(
            parse_event_script(script).unwrap_err().to_string(),
            "line 3: invalid number 'x'"
        );
    }

    #[test]
    fn test_replay_writes_one_line_per_event() {
        let mut table = load_default_key_table().instantiate();
        let events = parse_event_script("press 0 11\nrelease 0 11\n").unwrap();

        let mut out = Vec::new();
        replay(&mut table, &events, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Key Press: Ctx:0 Set:0 Key:11 -> Command"));
        assert!(lines[0].contains("LNUP"));
        assert!(lines[1].contains("[NOOP]"));
    }

    #[test]
    fn test_summary_lists_contexts() {
        let summary = summarize(&load_default_key_table());
        assert!(summary.starts_with("Generic braille display: 3 context(s)"));
        assert!(summary.contains("context 0 (default)"));
        assert!(summary.contains(", keyboard"));
        assert!(summary.contains("context 4 (describe): 1 binding(s), 0 hotkey(s), temporary"));
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["brlkeys", "-t", "table.yaml", "--log-events", "events.txt"]);
        assert_eq!(args.table, Some(PathBuf::from("table.yaml")));
        assert_eq!(args.script, Some(PathBuf::from("events.txt")));
        assert_eq!(args.device, "generic");
        assert!(args.log_events);
        assert!(!args.log_file);
    }
}
