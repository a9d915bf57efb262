// SPDX-License-Identifier: MPL-2.0
//! Keyboard input mapping.
//!
//! The composition layer translates its own key events into [`Key`] and feeds
//! them to the session. Which arrow advances depends on the reading direction.

use crate::domain::reader::ReadingDirection;

/// A key press, independent of any windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Char(char),
    Other,
}

impl Key {
    /// Parses a DOM-style key name (`"ArrowLeft"`, `"s"`).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// What a key press asks the reader to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCommand {
    Advance,
    Retreat,
    ToggleSettings,
}

/// Maps a key to a reader command for the given reading direction.
///
/// Left-to-right: `ArrowRight` advances. Right-to-left: `ArrowLeft` advances.
#[must_use]
pub fn map_key(key: Key, direction: ReadingDirection) -> Option<ReaderCommand> {
    match (key, direction) {
        (Key::ArrowRight, ReadingDirection::Ltr) | (Key::ArrowLeft, ReadingDirection::Rtl) => {
            Some(ReaderCommand::Advance)
        }
        (Key::ArrowLeft, ReadingDirection::Ltr) | (Key::ArrowRight, ReadingDirection::Rtl) => {
            Some(ReaderCommand::Retreat)
        }
        (Key::Char('s'), _) => Some(ReaderCommand::ToggleSettings),
        _ => None,
    }
}
