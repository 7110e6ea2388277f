//! Command codes handed to the braille command queue
//!
//! A command is a single `u32` made of three fields:
//!
//! ```text
//! 31        24 23      16 15                0
//! +-----------+----------+------------------+
//! |   flags   |  block   |     argument     |
//! +-----------+----------+------------------+
//! ```
//!
//! Block 0 holds the basic commands, whose argument is the command number.
//! Every other block takes a numeric argument (a column, a character, a dot
//! pattern or a context id).

use std::fmt;
use std::str::FromStr;

/// Flag bits of a command as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CommandFlags(u32);

impl CommandFlags {
    pub const NONE: CommandFlags = CommandFlags(0);
    pub const TOGGLE_ON: CommandFlags = CommandFlags(1 << 24);
    pub const TOGGLE_OFF: CommandFlags = CommandFlags(1 << 25);
    pub const CHAR_SHIFT: CommandFlags = CommandFlags(1 << 26);
    pub const CHAR_UPPER: CommandFlags = CommandFlags(1 << 27);
    pub const CHAR_CONTROL: CommandFlags = CommandFlags(1 << 28);
    pub const CHAR_META: CommandFlags = CommandFlags(1 << 29);
    /// Repeat once the initial delay has passed
    pub const REPEAT_DELAY: CommandFlags = CommandFlags(1 << 30);
    /// Execute as soon as the key goes down
    pub const REPEAT_INITIAL: CommandFlags = CommandFlags(1 << 31);

    pub const REPEAT_MASK: CommandFlags =
        CommandFlags(Self::REPEAT_DELAY.0 | Self::REPEAT_INITIAL.0);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        CommandFlags(bits & Command::FLG_MASK)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: CommandFlags) -> CommandFlags {
        CommandFlags(self.0 | other.0)
    }

    #[inline]
    pub const fn intersection(self, other: CommandFlags) -> CommandFlags {
        CommandFlags(self.0 & other.0)
    }

    #[inline]
    pub const fn contains(self, other: CommandFlags) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for CommandFlags {
    type Output = CommandFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for CommandFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Command blocks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Block {
    /// Argument is a [`BasicCommand`]
    Basic = 0,
    /// Bring the screen cursor to a column
    Route,
    CutBegin,
    CutAppend,
    CutRect,
    CutLine,
    /// Place a column at the left edge of the window
    SetLeft,
    /// Describe the character at a column
    DescChar,
    SwitchVt,
    /// Type a special key
    PassKey,
    /// Type a braille dot pattern
    PassDots,
    /// Switch key context; never leaves the key table
    Context,
}

const BLOCKS: &[(Block, &str)] = &[
    (Block::Route, "ROUTE"),
    (Block::CutBegin, "CUTBEGIN"),
    (Block::CutAppend, "CUTAPPEND"),
    (Block::CutRect, "CUTRECT"),
    (Block::CutLine, "CUTLINE"),
    (Block::SetLeft, "SETLEFT"),
    (Block::DescChar, "DESCCHAR"),
    (Block::SwitchVt, "SWITCHVT"),
    (Block::PassKey, "PASSKEY"),
    (Block::PassDots, "PASSDOTS"),
    (Block::Context, "CONTEXT"),
];

impl Block {
    pub fn from_u8(value: u8) -> Option<Block> {
        if value == Block::Basic as u8 {
            return Some(Block::Basic);
        }
        BLOCKS
            .iter()
            .map(|(block, _)| *block)
            .find(|block| *block as u8 == value)
    }

    /// Key table name of the block
    pub fn name(self) -> &'static str {
        BLOCKS
            .iter()
            .find(|(block, _)| *block == self)
            .map(|(_, name)| *name)
            .unwrap_or("BASIC")
    }

    fn from_name(name: &str) -> Option<Block> {
        BLOCKS
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(block, _)| *block)
    }
}

/// Commands of the basic block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BasicCommand {
    Noop = 0,
    LineUp,
    LineDown,
    WindowUp,
    WindowDown,
    PreviousDifferentLine,
    NextDifferentLine,
    Top,
    Bottom,
    TopLeft,
    BottomLeft,
    FullWindowLeft,
    FullWindowRight,
    LineBegin,
    LineEnd,
    Home,
    Back,
    Return,
    Freeze,
    DisplayMode,
    SixDots,
    CursorTracking,
    Help,
    Info,
    PreferencesMenu,
    PreferencesSave,
    PreferencesLoad,
    MenuPreviousItem,
    MenuNextItem,
    MenuPreviousSetting,
    MenuNextSetting,
}

const BASIC_COMMANDS: &[(BasicCommand, &str)] = &[
    (BasicCommand::Noop, "NOOP"),
    (BasicCommand::LineUp, "LNUP"),
    (BasicCommand::LineDown, "LNDN"),
    (BasicCommand::WindowUp, "WINUP"),
    (BasicCommand::WindowDown, "WINDN"),
    (BasicCommand::PreviousDifferentLine, "PRDIFLN"),
    (BasicCommand::NextDifferentLine, "NXDIFLN"),
    (BasicCommand::Top, "TOP"),
    (BasicCommand::Bottom, "BOT"),
    (BasicCommand::TopLeft, "TOP_LEFT"),
    (BasicCommand::BottomLeft, "BOT_LEFT"),
    (BasicCommand::FullWindowLeft, "FWINLT"),
    (BasicCommand::FullWindowRight, "FWINRT"),
    (BasicCommand::LineBegin, "LNBEG"),
    (BasicCommand::LineEnd, "LNEND"),
    (BasicCommand::Home, "HOME"),
    (BasicCommand::Back, "BACK"),
    (BasicCommand::Return, "RETURN"),
    (BasicCommand::Freeze, "FREEZE"),
    (BasicCommand::DisplayMode, "DISPMD"),
    (BasicCommand::SixDots, "SIXDOTS"),
    (BasicCommand::CursorTracking, "CSRTRK"),
    (BasicCommand::Help, "HELP"),
    (BasicCommand::Info, "INFO"),
    (BasicCommand::PreferencesMenu, "PREFMENU"),
    (BasicCommand::PreferencesSave, "PREFSAVE"),
    (BasicCommand::PreferencesLoad, "PREFLOAD"),
    (BasicCommand::MenuPreviousItem, "MENU_PREV_ITEM"),
    (BasicCommand::MenuNextItem, "MENU_NEXT_ITEM"),
    (BasicCommand::MenuPreviousSetting, "MENU_PREV_SETTING"),
    (BasicCommand::MenuNextSetting, "MENU_NEXT_SETTING"),
];

impl BasicCommand {
    pub fn from_u16(value: u16) -> Option<BasicCommand> {
        BASIC_COMMANDS
            .iter()
            .map(|(command, _)| *command)
            .find(|command| *command as u16 == value)
    }

    /// Key table name of the command
    pub fn name(self) -> &'static str {
        BASIC_COMMANDS
            .iter()
            .find(|(command, _)| *command == self)
            .map(|(_, name)| *name)
            .unwrap_or("NOOP")
    }

    fn from_name(name: &str) -> Option<BasicCommand> {
        BASIC_COMMANDS
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(command, _)| *command)
    }
}

/// An encoded command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Command(u32);

impl Command {
    pub const ARG_MASK: u32 = 0x0000_FFFF;
    pub const BLK_MASK: u32 = 0x00FF_0000;
    pub const BLK_SHIFT: u32 = 16;
    pub const FLG_MASK: u32 = 0xFF00_0000;

    /// Dot bits of a `PASSDOTS` argument
    pub const DOTS_MASK: u16 = 0x00FF;
    /// Chord bit of a `PASSDOTS` argument: dots typed together with space
    pub const DOTC: u16 = 0x0100;

    pub const NOOP: Command = Command::basic(BasicCommand::Noop);

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Command(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn basic(command: BasicCommand) -> Self {
        Command(command as u32)
    }

    pub const fn block(block: Block, arg: u16) -> Self {
        Command(((block as u32) << Self::BLK_SHIFT) | arg as u32)
    }

    /// Raw block number
    #[inline]
    pub const fn block_number(self) -> u8 {
        ((self.0 & Self::BLK_MASK) >> Self::BLK_SHIFT) as u8
    }

    pub fn block_kind(self) -> Option<Block> {
        Block::from_u8(self.block_number())
    }

    #[inline]
    pub const fn arg(self) -> u16 {
        (self.0 & Self::ARG_MASK) as u16
    }

    #[inline]
    pub const fn flags(self) -> CommandFlags {
        CommandFlags::from_bits_truncate(self.0)
    }

    pub const fn with_flags(self, flags: CommandFlags) -> Self {
        Command(self.0 | flags.bits())
    }

    /// The command without any flags
    pub const fn bare(self) -> Self {
        Command(self.0 & !Self::FLG_MASK)
    }

    /// Add to the argument, staying within the argument field
    pub const fn offset(self, amount: u16) -> Self {
        let arg = self.arg().wrapping_add(amount) as u32;
        Command((self.0 & !Self::ARG_MASK) | arg)
    }

    pub const fn is_noop(self) -> bool {
        self.bare().0 == Self::NOOP.0
    }

    /// Whether the command only asks to repeat after a delay
    ///
    /// Such a command announces a held key; the bare command follows on
    /// release.
    pub const fn is_delayed(self) -> bool {
        self.flags().intersection(CommandFlags::REPEAT_MASK).bits()
            == CommandFlags::REPEAT_DELAY.bits()
    }

    pub fn is_context_switch(self) -> bool {
        self.block_kind() == Some(Block::Context)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.block_kind() {
            Some(Block::Basic) => match BasicCommand::from_u16(self.arg()) {
                Some(command) => write!(f, "{}", command.name())?,
                None => write!(f, "{:#06X}", self.arg())?,
            },
            Some(block) => write!(f, "{}+{}", block.name(), self.arg())?,
            None => write!(f, "BLK{}+{}", self.block_number(), self.arg())?,
        }

        let flags = self.flags();
        if flags.contains(CommandFlags::TOGGLE_ON) {
            write!(f, "+on")?;
        }
        if flags.contains(CommandFlags::TOGGLE_OFF) {
            write!(f, "+off")?;
        }
        Ok(())
    }
}

impl fmt::UpperHex for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Parse `NAME[+N][+on|+off]`
///
/// Basic commands accept the toggle suffixes, block commands also accept a
/// numeric offset for their argument.
impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('+');
        let name = parts.next().ok_or(())?;

        let (mut command, is_block) = if let Some(basic) = BasicCommand::from_name(name) {
            (Command::basic(basic), false)
        } else if let Some(block) = Block::from_name(name) {
            (Command::block(block, 0), true)
        } else {
            return Err(());
        };

        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "on" => command = command.with_flags(CommandFlags::TOGGLE_ON),
                "off" => command = command.with_flags(CommandFlags::TOGGLE_OFF),
                number if is_block => {
                    let amount: u16 = number.parse().map_err(|_| ())?;
                    command = command.offset(amount);
                }
                _ => return Err(()),
            }
        }

        Ok(command)
    }
}
