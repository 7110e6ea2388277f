//! Core types for the key table: KeyGroup, KeyCode, KeyValue, KeyCombination

use std::cmp::Ordering;
use std::fmt;

/// Most keys that can be held as modifiers of one combination
pub const MAX_MODIFIERS_PER_COMBINATION: usize = 10;

/// A logical group of keys on a device
///
/// Group 0 holds the device's named keys. Every other group is a key set
/// (routing keys, status keys, ...) where the code is a position within the
/// set, so bindings refer to such a group as a whole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyGroup(pub u8);

impl KeyGroup {
    /// Whether keys of this group match bindings by group alone
    #[inline]
    pub const fn is_wildcardable(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for KeyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The code of a key within its group
///
/// `AnyInGroup` orders after every exact code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyCode {
    Exact(u8),
    AnyInGroup,
}

impl KeyCode {
    /// The exact code, if this is not a wildcard
    #[inline]
    pub const fn exact(self) -> Option<u8> {
        match self {
            KeyCode::Exact(code) => Some(code),
            KeyCode::AnyInGroup => None,
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Exact(code) => write!(f, "{}", code),
            KeyCode::AnyInGroup => write!(f, "*"),
        }
    }
}

/// One physical key, scoped by its group
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyValue {
    pub group: KeyGroup,
    pub code: KeyCode,
}

impl KeyValue {
    /// A key with an exact code
    pub const fn new(group: u8, code: u8) -> Self {
        Self {
            group: KeyGroup(group),
            code: KeyCode::Exact(code),
        }
    }

    /// Any key of the given group
    pub const fn any_in(group: u8) -> Self {
        Self {
            group: KeyGroup(group),
            code: KeyCode::AnyInGroup,
        }
    }

    /// Form used when searching bindings: wildcardable groups lose their code
    #[inline]
    pub const fn canonical(self) -> Self {
        if self.group.is_wildcardable() {
            Self {
                group: self.group,
                code: KeyCode::AnyInGroup,
            }
        } else {
            self
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.code)
    }
}

/// The trigger pattern of one binding
///
/// Modifiers are kept sorted so that combinations compare as sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    pub modifiers: Vec<KeyValue>,
    pub immediate: Option<KeyValue>,
}

impl KeyCombination {
    /// Build a combination, sorting the modifiers
    pub fn new(mut modifiers: Vec<KeyValue>, immediate: Option<KeyValue>) -> Self {
        modifiers.sort();
        Self {
            modifiers,
            immediate,
        }
    }

    /// Canonical form of this combination, as used for searching
    pub fn canonical(&self) -> Self {
        Self::new(
            self.modifiers.iter().map(|key| key.canonical()).collect(),
            self.immediate.map(KeyValue::canonical),
        )
    }

    /// All keys of the combination, modifiers first
    pub fn keys(&self) -> impl Iterator<Item = &KeyValue> {
        self.modifiers.iter().chain(self.immediate.iter())
    }

    /// Whether any key of the combination stands for a whole group
    pub fn has_wildcard(&self) -> bool {
        self.keys().any(|key| key.code == KeyCode::AnyInGroup)
    }
}

impl PartialOrd for KeyCombination {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyCombination {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.immediate, &other.immediate) {
            (Some(a), Some(b)) => {
                let result = a.cmp(b);
                if result != Ordering::Equal {
                    return result;
                }
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => {}
        }

        self.modifiers
            .len()
            .cmp(&other.modifiers.len())
            .then_with(|| self.modifiers.cmp(&other.modifiers))
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.modifiers.iter().map(|k| k.to_string()).collect();
        if let Some(immediate) = self.immediate {
            parts.push(format!("!{}", immediate));
        }
        write!(f, "{}", parts.join("+"))
    }
}
