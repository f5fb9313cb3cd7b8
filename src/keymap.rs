//! Keyboard shortcuts for drawing mode.
//!
//! | Chord    | Command          |
//! |----------|------------------|
//! | `p`      | pen              |
//! | `e`      | eraser           |
//! | `b`      | bucket           |
//! | `v`      | move             |
//! | `Ctrl+Q` | eyedropper       |
//! | `Ctrl+E` | bucket           |
//! | `Ctrl+Z` | undo             |
//! | `Ctrl+D` | reset            |
//! | `Ctrl+C` | copy             |
//! | `Ctrl+V` | paste            |
//! | `Ctrl+S` | save             |
//! | `Ctrl+X` | close            |
//! | `Ctrl+O` | open import      |
//! | `Space`  | pan while held   |

use std::fmt;

use crate::canvas::Tool;
use crate::editor::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key, stored lowercase.
    Char(char),
    Space,
}

/// A key plus the Ctrl modifier (Cmd is treated the same way).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyChord {
    pub fn plain(c: char) -> Self {
        Self { key: Key::Char(c.to_ascii_lowercase()), ctrl: false }
    }

    pub fn ctrl(c: char) -> Self {
        Self { key: Key::Char(c.to_ascii_lowercase()), ctrl: true }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c),
            Key::Space => write!(f, "space"),
        }
    }
}

/// Parse a chord such as `p`, `ctrl+z`, `Cmd+S` or `space`.
pub fn parse_chord(s: &str) -> Option<KeyChord> {
    let mut ctrl = false;
    let mut key = None;
    for part in s.trim().split('+') {
        let part = part.trim().to_ascii_lowercase();
        match part.as_str() {
            "ctrl" | "control" | "cmd" | "meta" => ctrl = true,
            "space" | " " => key = Some(Key::Space),
            _ => {
                let mut chars = part.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => key = Some(Key::Char(c)),
                    _ => return None,
                }
            }
        }
    }
    key.map(|key| KeyChord { key, ctrl })
}

/// Command for a key press (`pressed = true`) or release.
///
/// Only Space reacts to release; every other binding fires on press.
pub fn command_for(chord: KeyChord, pressed: bool) -> Option<Command> {
    if chord.key == Key::Space {
        return Some(Command::SetPanning(pressed));
    }
    if !pressed {
        return None;
    }
    let Key::Char(c) = chord.key else {
        return None;
    };

    let command = if chord.ctrl {
        match c {
            'q' => Command::SetTool(Tool::Eyedropper),
            'e' => Command::SetTool(Tool::Bucket),
            'z' => Command::Undo,
            'd' => Command::Reset,
            'c' => Command::Copy,
            'v' => Command::Paste,
            's' => Command::Save,
            'x' => Command::Close,
            'o' => Command::OpenImport,
            _ => return None,
        }
    } else {
        match c {
            'p' => Command::SetTool(Tool::Pen),
            'e' => Command::SetTool(Tool::Eraser),
            'b' => Command::SetTool(Tool::Bucket),
            'v' => Command::SetTool(Tool::Move),
            _ => return None,
        }
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chord() {
        assert_eq!(parse_chord("p"), Some(KeyChord::plain('p')));
        assert_eq!(parse_chord("Ctrl+Z"), Some(KeyChord::ctrl('z')));
        assert_eq!(parse_chord("cmd+s"), Some(KeyChord::ctrl('s')));
        assert_eq!(parse_chord("space"), Some(KeyChord { key: Key::Space, ctrl: false }));
        assert_eq!(parse_chord("ctrl+"), None);
        assert_eq!(parse_chord("ctrl+zz"), None);
    }

    #[test]
    fn test_chord_display_round_trips() {
        for chord in [KeyChord::plain('b'), KeyChord::ctrl('o'), KeyChord { key: Key::Space, ctrl: false }] {
            assert_eq!(parse_chord(&chord.to_string()), Some(chord));
        }
    }

    #[test]
    fn test_tool_keys() {
        assert_eq!(command_for(KeyChord::plain('p'), true), Some(Command::SetTool(Tool::Pen)));
        assert_eq!(command_for(KeyChord::plain('e'), true), Some(Command::SetTool(Tool::Eraser)));
        assert_eq!(command_for(KeyChord::plain('b'), true), Some(Command::SetTool(Tool::Bucket)));
        assert_eq!(command_for(KeyChord::plain('v'), true), Some(Command::SetTool(Tool::Move)));
        assert_eq!(command_for(KeyChord::ctrl('q'), true), Some(Command::SetTool(Tool::Eyedropper)));
        assert_eq!(command_for(KeyChord::ctrl('e'), true), Some(Command::SetTool(Tool::Bucket)));
    }

    #[test]
    fn test_ctrl_commands() {
        let expected = [
            ('z', Command::Undo),
            ('d', Command::Reset),
            ('c', Command::Copy),
            ('v', Command::Paste),
            ('s', Command::Save),
            ('x', Command::Close),
            ('o', Command::OpenImport),
        ];
        for (c, command) in expected {
            assert_eq!(command_for(KeyChord::ctrl(c), true), Some(command));
        }
        assert_eq!(command_for(KeyChord::ctrl('p'), true), None);
        assert_eq!(command_for(KeyChord::plain('z'), true), None);
    }

    #[test]
    fn test_space_pans_while_held() {
        let space = KeyChord { key: Key::Space, ctrl: false };
        assert_eq!(command_for(space, true), Some(Command::SetPanning(true)));
        assert_eq!(command_for(space, false), Some(Command::SetPanning(false)));
        assert_eq!(command_for(KeyChord::plain('p'), false), None);
    }
}
