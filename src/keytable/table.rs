//! The live key table of one device
//!
//! A [`KeyTable`] turns every key press and release into at most a couple of
//! commands for the braille command queue. It tracks which keys are held,
//! which command the held keys currently stand for, and which context the
//! next key event is interpreted in.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use super::command::{Command, CommandFlags};
use super::context::{ContextId, KeyContext};
use super::pressed::PressedKeys;
use super::types::{KeyCombination, KeyValue, MAX_MODIFIERS_PER_COMBINATION};

/// How a key event was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTableState {
    /// No binding applies to the keys held
    Unbound,
    /// The key is a hotkey
    Hotkey,
    /// The keys held start a combination; more keys are expected
    Modifiers,
    /// The keys held are bound to a command
    Command,
}

/// A key going down or up on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Context to interpret the key in; [`ContextId::DEFAULT`] means the
    /// table's current context
    pub context: ContextId,
    pub key: KeyValue,
    pub press: bool,
}

impl KeyEvent {
    pub const fn press(group: u8, code: u8) -> Self {
        Self {
            context: ContextId::DEFAULT,
            key: KeyValue::new(group, code),
            press: true,
        }
    }

    pub const fn release(group: u8, code: u8) -> Self {
        Self {
            context: ContextId::DEFAULT,
            key: KeyValue::new(group, code),
            press: false,
        }
    }

    /// Interpret the key in a specific context (builder pattern)
    pub const fn in_context(mut self, context: ContextId) -> Self {
        self.context = context;
        self
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.press { "Press" } else { "Release" };
        write!(
            f,
            "Key {}: Ctx:{} Set:{} Key:{}",
            action, self.context, self.key.group, self.key.code
        )
    }
}

/// Receiver of the commands a key table resolves
///
/// Returns whether the command was accepted.
pub trait CommandQueue {
    fn enqueue(&mut self, command: Command) -> bool;
}

impl CommandQueue for Vec<Command> {
    fn enqueue(&mut self, command: Command) -> bool {
        self.push(command);
        true
    }
}

impl CommandQueue for VecDeque<Command> {
    fn enqueue(&mut self, command: Command) -> bool {
        self.push_back(command);
        true
    }
}

/// A command found for the keys held
#[derive(Debug, Clone, Copy)]
struct Match {
    command: Command,
    adjust: bool,
}

/// Outcome of resolving a key press
#[derive(Debug, Clone, Copy, Default)]
struct Resolution {
    found: Option<Match>,
    /// Found by the most specific lookup: the pressed key as immediate key
    immediate: bool,
    /// A placeholder binding was hit along the way
    incomplete: bool,
}

/// Key interpretation state of one device
#[derive(Debug, Clone)]
pub struct KeyTable {
    contexts: HashMap<ContextId, KeyContext>,
    current_context: ContextId,
    persistent_context: ContextId,
    pressed: PressedKeys,
    /// The bare command the held keys stand for
    active: Option<Command>,
    active_is_immediate: bool,
    log_key_events: bool,
}

impl KeyTable {
    /// Create a table from compiled contexts; the first context with an id wins
    pub fn new(contexts: Vec<KeyContext>) -> Self {
        let mut by_id = HashMap::with_capacity(contexts.len());
        for context in contexts {
            by_id.entry(context.id).or_insert(context);
        }

        Self {
            contexts: by_id,
            current_context: ContextId::DEFAULT,
            persistent_context: ContextId::DEFAULT,
            pressed: PressedKeys::new(),
            active: None,
            active_is_immediate: false,
            log_key_events: false,
        }
    }

    /// Log every key event at debug level from now on
    pub fn enable_event_logging(&mut self) {
        self.log_key_events = true;
    }

    pub fn is_logging_key_events(&self) -> bool {
        self.log_key_events
    }

    pub fn context(&self, id: ContextId) -> Option<&KeyContext> {
        self.contexts.get(&id)
    }

    pub fn current_context(&self) -> ContextId {
        self.current_context
    }

    pub fn persistent_context(&self) -> ContextId {
        self.persistent_context
    }

    pub fn pressed_keys(&self) -> &[KeyValue] {
        self.pressed.as_slice()
    }

    /// The command currently held, without flags or argument adjustment
    pub fn active_command(&self) -> Option<Command> {
        self.active
    }

    /// Process one key transition, forwarding resolved commands to `queue`
    pub fn process_key_event(
        &mut self,
        event: KeyEvent,
        queue: &mut dyn CommandQueue,
    ) -> KeyTableState {
        let key = event.key;
        let context = if event.context == ContextId::DEFAULT {
            self.current_context
        } else {
            event.context
        };
        if event.press {
            self.current_context = self.persistent_context;
        }

        let mut state = KeyTableState::Unbound;
        let mut dispatched = None;

        let hotkey = self
            .context(context)
            .and_then(|ctx| ctx.find_hotkey(&key))
            .copied();

        if let Some(hotkey) = hotkey {
            let command = hotkey.command(event.press);
            if command != Command::NOOP {
                self.process_command(command, queue);
                dispatched = Some(command);
            }
            state = KeyTableState::Hotkey;
        } else {
            let position = match self.pressed.find(&key) {
                Ok(position) => {
                    self.pressed.remove(position);
                    position
                }
                Err(position) => position,
            };

            if event.press {
                let resolution = match self.pressed.insert(position, key) {
                    Ok(()) => self.resolve(context, key, position),
                    Err(error) => {
                        tracing::warn!("{}", error);
                        Resolution::default()
                    }
                };

                match resolution.found {
                    None => {
                        if resolution.incomplete {
                            state = KeyTableState::Modifiers;
                        }

                        if self.active.take().is_some() {
                            self.process_command(Command::NOOP, queue);
                            dispatched = Some(Command::NOOP);
                        }
                    }
                    Some(found) => {
                        if self.active != Some(found.command) {
                            self.active = Some(found.command);
                            self.active_is_immediate = resolution.immediate;

                            let command = self.prepare(found, resolution.immediate);
                            self.process_command(command, queue);
                            dispatched = Some(command);
                        }

                        state = KeyTableState::Command;
                    }
                }
            } else if let Some(active) = self.active.take() {
                let command = if self.active_is_immediate {
                    Command::NOOP
                } else {
                    active
                };
                self.process_command(command, queue);
                dispatched = Some(command);
            }
        }

        if self.log_key_events {
            tracing::debug!("{}", describe_event(event.in_context(context), dispatched));
        }

        state
    }

    /// Find the command for a key that was just pressed
    ///
    /// The key is already in the pressed set at `position`.
    fn resolve(&self, context: ContextId, key: KeyValue, position: usize) -> Resolution {
        let mut incomplete = false;

        if let Some(found) = self.find_binding(context, Some((key, position)), &mut incomplete) {
            return Resolution {
                found: Some(found),
                immediate: true,
                incomplete,
            };
        }

        if let Some(found) = self.find_binding(context, None, &mut incomplete) {
            return Resolution {
                found: Some(found),
                immediate: false,
                incomplete,
            };
        }

        if let Some(command) = self.keyboard_command(context) {
            return Resolution {
                found: Some(Match {
                    command,
                    adjust: false,
                }),
                immediate: false,
                incomplete,
            };
        }

        if context != ContextId::DEFAULT {
            let fallback = ContextId::DEFAULT;

            if let Some(found) = self.find_binding(fallback, Some((key, position)), &mut incomplete)
            {
                return Resolution {
                    found: Some(found),
                    immediate: true,
                    incomplete,
                };
            }

            if let Some(found) = self.find_binding(fallback, None, &mut incomplete) {
                return Resolution {
                    found: Some(found),
                    immediate: false,
                    incomplete,
                };
            }
        }

        Resolution {
            found: None,
            immediate: false,
            incomplete,
        }
    }

    /// Search a context for the combination formed by the held keys
    ///
    /// With an immediate key, the key at its position in the pressed set is
    /// left out of the modifiers. Hitting a placeholder sets `incomplete`.
    fn find_binding(
        &self,
        context: ContextId,
        immediate: Option<(KeyValue, usize)>,
        incomplete: &mut bool,
    ) -> Option<Match> {
        let ctx = self.context(context)?;
        let excluded = immediate.map(|(_, position)| position);

        let modifiers: Vec<KeyValue> = self
            .pressed
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != excluded)
            .map(|(_, key)| key.canonical())
            .collect();
        if modifiers.len() > MAX_MODIFIERS_PER_COMBINATION {
            return None;
        }

        let target = KeyCombination::new(modifiers, immediate.map(|(key, _)| key.canonical()));
        let binding = ctx.find_binding(&target)?;

        match binding.command {
            Some(command) => Some(Match {
                command,
                adjust: binding.adjusts(),
            }),
            None => {
                *incomplete = true;
                None
            }
        }
    }

    /// Compose a braille keyboard command from the held keys
    fn keyboard_command(&self, context: ContextId) -> Option<Command> {
        let chords = context == ContextId::CHORDS;
        let context = if chords {
            self.persistent_context
        } else {
            context
        };

        let ctx = self.context(context)?;
        ctx.keyboard()?
            .compose(self.pressed.as_slice(), ctx.superimposed(), chords)
    }

    /// Apply argument adjustment and repeat flags to a found command
    fn prepare(&self, found: Match, immediate: bool) -> Command {
        let mut command = found.command;

        if found.adjust {
            let offset = self
                .pressed
                .iter()
                .find(|key| key.group.is_wildcardable())
                .and_then(|key| key.code.exact());
            if let Some(offset) = offset {
                command = command.offset(u16::from(offset));
            }
        }

        if immediate {
            command.with_flags(CommandFlags::REPEAT_INITIAL | CommandFlags::REPEAT_DELAY)
        } else {
            command.with_flags(CommandFlags::REPEAT_DELAY)
        }
    }

    /// Forward a command, applying context switches locally
    fn process_command(&mut self, command: Command, queue: &mut dyn CommandQueue) -> bool {
        let command = if command.is_context_switch() {
            if !command.is_delayed() {
                self.switch_context(command.arg());
            }
            Command::NOOP
        } else {
            command
        };

        queue.enqueue(command)
    }

    fn switch_context(&mut self, arg: u16) {
        let Ok(id) = u8::try_from(arg) else {
            tracing::debug!("Context switch to unknown context {}", arg);
            return;
        };
        let target = ContextId(id);

        match self.contexts.get(&target) {
            Some(ctx) => {
                self.current_context = target;
                if !ctx.is_temporary() {
                    self.persistent_context = target;
                }
            }
            None => tracing::debug!("Context switch to unknown context {}", target),
        }
    }
}

/// Log line for a key event and the command it dispatched, if any
fn describe_event(event: KeyEvent, dispatched: Option<Command>) -> String {
    match dispatched {
        Some(command) => format!("{} Cmd:{:06X}", event, command),
        None => event.to_string(),
    }
}
