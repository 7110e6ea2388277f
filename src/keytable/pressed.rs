//! The set of keys currently held down

use std::fmt;

use super::types::KeyValue;

/// Most keys tracked as held at the same time
pub const PRESSED_KEYS_CAPACITY: usize = 16;

/// Returned when a key cannot be tracked because too many are held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    pub key: KeyValue,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot track key {}: {} keys already held",
            self.key, PRESSED_KEYS_CAPACITY
        )
    }
}

impl std::error::Error for CapacityError {}

/// Held keys, sorted and without duplicates
#[derive(Debug, Clone)]
pub struct PressedKeys {
    keys: Vec<KeyValue>,
    capacity: usize,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::with_capacity(PRESSED_KEYS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Locate a key by exact equality
    ///
    /// `Err` carries the position where the key would be inserted.
    pub fn find(&self, key: &KeyValue) -> Result<usize, usize> {
        self.keys.binary_search(key)
    }

    /// Insert a key at the position returned by [`PressedKeys::find`]
    pub fn insert(&mut self, position: usize, key: KeyValue) -> Result<(), CapacityError> {
        if self.is_full() {
            return Err(CapacityError { key });
        }
        debug_assert!(position <= self.keys.len());
        self.keys.insert(position, key);
        Ok(())
    }

    pub fn remove(&mut self, position: usize) -> KeyValue {
        self.keys.remove(position)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.capacity
    }

    pub fn as_slice(&self) -> &[KeyValue] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.keys.iter()
    }
}

impl Default for PressedKeys {
    fn default() -> Self {
        Self::new()
    }
}
