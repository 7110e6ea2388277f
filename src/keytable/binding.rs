//! Key bindings and hotkeys as stored in a key context

use std::cmp::Ordering;

use super::command::Command;
use super::types::{KeyCombination, KeyValue};

/// Binding flags as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BindingFlags(u8);

impl BindingFlags {
    pub const NONE: BindingFlags = BindingFlags(0);
    /// Add the code of the pressed key-set key to the command's argument
    pub const ADJUST: BindingFlags = BindingFlags(0b0001);

    #[inline]
    pub const fn contains(self, other: BindingFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for BindingFlags {
    type Output = BindingFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        BindingFlags(self.0 | rhs.0)
    }
}

/// A key combination bound to a command
///
/// A binding without a command is a placeholder for the prefix of a longer
/// combination: it tells the table that more keys are expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub combination: KeyCombination,
    pub command: Option<Command>,
    pub flags: BindingFlags,
}

impl KeyBinding {
    /// Bind a combination to a command
    pub fn new(combination: KeyCombination, command: Command) -> Self {
        Self {
            combination,
            command: Some(command),
            flags: BindingFlags::NONE,
        }
    }

    /// A placeholder for an incomplete combination
    pub fn incomplete(combination: KeyCombination) -> Self {
        Self {
            combination,
            command: None,
            flags: BindingFlags::NONE,
        }
    }

    /// Add flags to this binding (builder pattern)
    pub fn with_flags(mut self, flags: BindingFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    pub fn is_incomplete(&self) -> bool {
        self.command.is_none()
    }

    pub fn adjusts(&self) -> bool {
        self.flags.contains(BindingFlags::ADJUST)
    }

    /// Ordering used for sorting and searching bindings
    pub fn compare(&self, other: &KeyBinding) -> Ordering {
        self.combination.cmp(&other.combination)
    }
}

/// A single key bound independently of the other keys held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyRule {
    pub key: KeyValue,
    pub press: Command,
    pub release: Command,
}

impl HotkeyRule {
    pub fn new(key: KeyValue, press: Command, release: Command) -> Self {
        Self {
            key,
            press,
            release,
        }
    }

    /// The command for a press or a release of the key
    pub fn command(&self, press: bool) -> Command {
        if press {
            self.press
        } else {
            self.release
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytable::command::BasicCommand;

    #[test]
    fn test_binding_flags() {
        let binding = KeyBinding::new(
            KeyCombination::new(vec![], Some(KeyValue::any_in(1))),
            Command::NOOP,
        )
        .with_flags(BindingFlags::ADJUST);
        assert!(binding.adjusts());
        assert!(!binding.is_incomplete());
    }

    #[test]
    fn test_incomplete_binding_has_no_command() {
        let binding = KeyBinding::incomplete(KeyCombination::new(vec![KeyValue::new(0, 1)], None));
        assert!(binding.is_incomplete());
        assert!(binding.flags.is_empty());
    }

    #[test]
    fn test_hotkey_command_by_direction() {
        let hotkey = HotkeyRule::new(
            KeyValue::new(0, 3),
            Command::basic(BasicCommand::FullWindowRight),
            Command::NOOP,
        );
        assert_eq!(hotkey.command(true), Command::basic(BasicCommand::FullWindowRight));
        assert_eq!(hotkey.command(false), Command::NOOP);
    }
}
