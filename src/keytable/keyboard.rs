//! Braille keyboard emulation
//!
//! Some contexts let the display's keys act as a braille keyboard: each key
//! is assigned a keyboard function (a dot, the space bar, or a character
//! modifier) and the keys held together compose a `PASSDOTS` command.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::command::{Block, Command, CommandFlags};
use super::types::KeyValue;

/// What a key does when the keyboard is emulated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardFunction {
    Dot1,
    Dot2,
    Dot3,
    Dot4,
    Dot5,
    Dot6,
    Dot7,
    Dot8,
    Space,
    Shift,
    Uppercase,
    Control,
    Meta,
}

impl KeyboardFunction {
    /// The command bits this function contributes
    ///
    /// Dots land in the argument, character modifiers in the flags, and the
    /// space bar contributes nothing.
    pub const fn bits(self) -> u32 {
        match self {
            KeyboardFunction::Dot1 => 0x01,
            KeyboardFunction::Dot2 => 0x02,
            KeyboardFunction::Dot3 => 0x04,
            KeyboardFunction::Dot4 => 0x08,
            KeyboardFunction::Dot5 => 0x10,
            KeyboardFunction::Dot6 => 0x20,
            KeyboardFunction::Dot7 => 0x40,
            KeyboardFunction::Dot8 => 0x80,
            KeyboardFunction::Space => 0,
            KeyboardFunction::Shift => CommandFlags::CHAR_SHIFT.bits(),
            KeyboardFunction::Uppercase => CommandFlags::CHAR_UPPER.bits(),
            KeyboardFunction::Control => CommandFlags::CHAR_CONTROL.bits(),
            KeyboardFunction::Meta => CommandFlags::CHAR_META.bits(),
        }
    }
}

impl fmt::Display for KeyboardFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyboardFunction::Dot1 => "dot1",
            KeyboardFunction::Dot2 => "dot2",
            KeyboardFunction::Dot3 => "dot3",
            KeyboardFunction::Dot4 => "dot4",
            KeyboardFunction::Dot5 => "dot5",
            KeyboardFunction::Dot6 => "dot6",
            KeyboardFunction::Dot7 => "dot7",
            KeyboardFunction::Dot8 => "dot8",
            KeyboardFunction::Space => "space",
            KeyboardFunction::Shift => "shift",
            KeyboardFunction::Uppercase => "uppercase",
            KeyboardFunction::Control => "control",
            KeyboardFunction::Meta => "meta",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for KeyboardFunction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dot1" => Ok(KeyboardFunction::Dot1),
            "dot2" => Ok(KeyboardFunction::Dot2),
            "dot3" => Ok(KeyboardFunction::Dot3),
            "dot4" => Ok(KeyboardFunction::Dot4),
            "dot5" => Ok(KeyboardFunction::Dot5),
            "dot6" => Ok(KeyboardFunction::Dot6),
            "dot7" => Ok(KeyboardFunction::Dot7),
            "dot8" => Ok(KeyboardFunction::Dot8),
            "space" => Ok(KeyboardFunction::Space),
            "shift" => Ok(KeyboardFunction::Shift),
            "uppercase" | "upper" => Ok(KeyboardFunction::Uppercase),
            "control" | "ctrl" => Ok(KeyboardFunction::Control),
            "meta" => Ok(KeyboardFunction::Meta),
            _ => Err(()),
        }
    }
}

/// Keyboard functions of the named keys of a context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardMap {
    functions: HashMap<u8, KeyboardFunction>,
}

impl KeyboardMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a function to a named key
    pub fn assign(&mut self, code: u8, function: KeyboardFunction) {
        self.functions.insert(code, function);
    }

    pub fn function(&self, code: u8) -> Option<KeyboardFunction> {
        self.functions.get(&code).copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Compose the keyboard command for the keys currently held
    ///
    /// Every key must be a named key with a keyboard function. The keys must
    /// make up either dots or the space bar; with `chords` set, dots typed
    /// together with space yield a chord instead.
    pub fn compose(
        &self,
        pressed: &[KeyValue],
        superimposed: u32,
        chords: bool,
    ) -> Option<Command> {
        let mut bits = Command::block(Block::PassDots, 0).bits();
        let mut dot_pressed = false;
        let mut space_pressed = false;

        for key in pressed {
            if key.group.is_wildcardable() {
                return None;
            }
            let function = self.function(key.code.exact()?)?;
            let bit = function.bits();
            bits |= bit;

            if bit == 0 {
                space_pressed = true;
            } else if bit & Command::DOTS_MASK as u32 != 0 {
                dot_pressed = true;
            }
        }

        if dot_pressed {
            bits |= superimposed;
        }

        if chords && space_pressed {
            bits |= Command::DOTC as u32;
        } else if dot_pressed == space_pressed {
            return None;
        }

        Some(Command::from_bits(bits))
    }
}

impl FromIterator<(u8, KeyboardFunction)> for KeyboardMap {
    fn from_iter<I: IntoIterator<Item = (u8, KeyboardFunction)>>(iter: I) -> Self {
        Self {
            functions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOT1: u8 = 10;
    const DOT2: u8 = 11;
    const SPACE: u8 = 20;
    const SHIFT: u8 = 21;
    const UNMAPPED: u8 = 30;

    fn map() -> KeyboardMap {
        [
            (DOT1, KeyboardFunction::Dot1),
            (DOT2, KeyboardFunction::Dot2),
            (SPACE, KeyboardFunction::Space),
            (SHIFT, KeyboardFunction::Shift),
        ]
        .into_iter()
        .collect()
    }

    fn keys(codes: &[u8]) -> Vec<KeyValue> {
        codes.iter().map(|&code| KeyValue::new(0, code)).collect()
    }

    #[test]
    fn test_dots_compose_passdots() {
        let command = map().compose(&keys(&[DOT1, DOT2]), 0, false).unwrap();
        assert_eq!(command.block_kind(), Some(Block::PassDots));
        assert_eq!(command.arg(), 0x03);
    }

    #[test]
    fn test_space_alone_is_blank_cell() {
        let command = map().compose(&keys(&[SPACE]), 0, false).unwrap();
        assert_eq!(command.arg(), 0);
        assert_eq!(command.block_kind(), Some(Block::PassDots));
    }

    #[test]
    fn test_dots_with_space_need_chord_request() {
        assert_eq!(map().compose(&keys(&[DOT1, SPACE]), 0, false), None);

        let chord = map().compose(&keys(&[DOT1, SPACE]), 0, true).unwrap();
        assert_eq!(chord.arg(), 0x01 | Command::DOTC);
    }

    #[test]
    fn test_modifier_alone_is_rejected() {
        assert_eq!(map().compose(&keys(&[SHIFT]), 0, false), None);
    }

    #[test]
    fn test_modifier_sets_character_flag() {
        let command = map().compose(&keys(&[DOT1, SHIFT]), 0, false).unwrap();
        assert!(command.flags().contains(CommandFlags::CHAR_SHIFT));
        assert_eq!(command.arg(), 0x01);
    }

    #[test]
    fn test_superimposed_bits_need_a_dot() {
        let dots = map().compose(&keys(&[DOT2]), 0x40, false).unwrap();
        assert_eq!(dots.arg(), 0x42);

        let space = map().compose(&keys(&[SPACE]), 0x40, false).unwrap();
        assert_eq!(space.arg(), 0);
    }

    #[test]
    fn test_unmapped_or_key_set_key_fails() {
        assert_eq!(map().compose(&keys(&[DOT1, UNMAPPED]), 0, false), None);
        assert_eq!(
            map().compose(&[KeyValue::new(0, DOT1), KeyValue::new(1, DOT1)], 0, false),
            None
        );
    }

    #[test]
    fn test_function_names_round_trip() {
        for name in ["dot1", "dot8", "space", "shift", "uppercase", "control", "meta"] {
            let function: KeyboardFunction = name.parse().unwrap();
            assert_eq!(function.to_string(), name);
        }
    }
}
