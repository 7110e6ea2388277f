//! Key contexts: the binding tables of one mode of key interpretation
//!
//! A context owns its bindings and hotkeys sorted under the canonical
//! combination ordering so that both can be binary searched.

use std::fmt;

use super::binding::{HotkeyRule, KeyBinding};
use super::keyboard::KeyboardMap;
use super::types::{KeyCombination, KeyValue, MAX_MODIFIERS_PER_COMBINATION};

/// Identifier of a key context
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(pub u8);

impl ContextId {
    /// The base context; passed with a key event it means "the current one"
    pub const DEFAULT: ContextId = ContextId(0);
    /// Menu navigation
    pub const MENU: ContextId = ContextId(1);
    /// Evaluate the persistent context's keyboard with chords allowed
    pub const CHORDS: ContextId = ContextId(2);
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One mode of key interpretation
#[derive(Debug, Clone, Default)]
pub struct KeyContext {
    pub id: ContextId,
    pub name: Option<String>,
    bindings: Vec<KeyBinding>,
    hotkeys: Vec<HotkeyRule>,
    keyboard: Option<KeyboardMap>,
    superimposed: u32,
    temporary: bool,
}

impl KeyContext {
    pub fn new(id: ContextId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Name this context (builder pattern)
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark this context as temporary: switching to it lasts one key press
    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    /// Install the bindings of this context
    ///
    /// Combinations are canonicalized and a placeholder is added for every
    /// partial set of modifiers that leads to a binding. When two bindings
    /// share a combination the first one wins.
    pub fn with_bindings(mut self, bindings: Vec<KeyBinding>) -> Self {
        let mut table: Vec<KeyBinding> = bindings
            .into_iter()
            .map(|mut binding| {
                binding.combination = binding.combination.canonical();
                binding
            })
            .collect();

        let placeholders: Vec<KeyBinding> =
            table.iter().flat_map(incomplete_prefixes).collect();
        table.extend(placeholders);

        // Stable sort keeps declaration order among equal combinations, with
        // real bindings ahead of placeholders.
        table.sort_by(|a, b| {
            a.compare(b)
                .then_with(|| a.is_incomplete().cmp(&b.is_incomplete()))
        });
        table.dedup_by(|later, earlier| {
            let duplicate = later.combination == earlier.combination;
            if duplicate && !later.is_incomplete() {
                tracing::warn!(
                    context = %self.id,
                    combination = %later.combination,
                    "Duplicate key binding ignored"
                );
            }
            duplicate
        });

        self.bindings = table;
        self
    }

    /// Install the hotkeys of this context; the first rule for a key wins
    pub fn with_hotkeys(mut self, mut hotkeys: Vec<HotkeyRule>) -> Self {
        hotkeys.sort_by_key(|hotkey| hotkey.key);
        hotkeys.dedup_by_key(|hotkey| hotkey.key);
        self.hotkeys = hotkeys;
        self
    }

    /// Enable keyboard emulation in this context
    pub fn with_keyboard(mut self, keyboard: KeyboardMap, superimposed: u32) -> Self {
        self.keyboard = Some(keyboard);
        self.superimposed = superimposed;
        self
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    pub fn hotkeys(&self) -> &[HotkeyRule] {
        &self.hotkeys
    }

    pub fn keyboard(&self) -> Option<&KeyboardMap> {
        self.keyboard.as_ref()
    }

    /// Bits implied whenever a dot is typed on the emulated keyboard
    pub fn superimposed(&self) -> u32 {
        self.superimposed
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Look up the hotkey for a key
    pub fn find_hotkey(&self, key: &KeyValue) -> Option<&HotkeyRule> {
        self.hotkeys
            .binary_search_by(|hotkey| hotkey.key.cmp(key))
            .ok()
            .map(|index| &self.hotkeys[index])
    }

    /// Look up the binding for a canonical combination
    pub fn find_binding(&self, target: &KeyCombination) -> Option<&KeyBinding> {
        self.bindings
            .binary_search_by(|binding| binding.combination.cmp(target))
            .ok()
            .map(|index| &self.bindings[index])
    }
}

/// Placeholders for every partial set of a binding's modifiers
fn incomplete_prefixes(binding: &KeyBinding) -> Vec<KeyBinding> {
    let modifiers = &binding.combination.modifiers;
    let count = modifiers.len();
    if count == 0 || count > MAX_MODIFIERS_PER_COMBINATION {
        return Vec::new();
    }

    let all = (1u32 << count) - 1;
    (1..=all)
        .filter(|&mask| mask != all || binding.combination.immediate.is_some())
        .map(|mask| {
            let subset = modifiers
                .iter()
                .enumerate()
                .filter(|(index, _)| mask & (1 << index) != 0)
                .map(|(_, key)| *key)
                .collect();
            KeyBinding::incomplete(KeyCombination::new(subset, None))
        })
        .collect()
}
