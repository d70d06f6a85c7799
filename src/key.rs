//! Key codes and the textual binding grammar used to describe them:
//! `C-`/`A-`/`S-` modifier prefixes in front of a printable character or a
//! named code, with multi-key sequences written space-separated (e.g.
//! `"C-x C-s"`).

use crate::error::EditorError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub control: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { control: false, alt: false, shift: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Mouse4,
    Mouse5,
    ScrollUp,
    ScrollDown,
    Space,
    Tab,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub modifiers: Modifiers,
    pub code: KeyCode,
}

impl Key {
    pub fn plain(c: char) -> Self {
        Self { modifiers: Modifiers::NONE, code: KeyCode::Char(c) }
    }

    fn named_code(name: &str) -> Option<KeyCode> {
        Some(match name {
            "BACKSPACE" => KeyCode::Backspace,
            "INSERT" => KeyCode::Insert,
            "DELETE" => KeyCode::Delete,
            "HOME" => KeyCode::Home,
            "END" => KeyCode::End,
            "PAGE_UP" => KeyCode::PageUp,
            "PAGE_DOWN" => KeyCode::PageDown,
            "UP" => KeyCode::Up,
            "DOWN" => KeyCode::Down,
            "LEFT" => KeyCode::Left,
            "RIGHT" => KeyCode::Right,
            "MOUSE4" => KeyCode::Mouse4,
            "MOUSE5" => KeyCode::Mouse5,
            "SCROLL_UP" => KeyCode::ScrollUp,
            "SCROLL_DOWN" => KeyCode::ScrollDown,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" => KeyCode::Enter,
            _ => return None,
        })
    }

    /// Parses one key token: zero or more `C-`/`A-`/`S-` prefixes followed
    /// by either a single printable character or one of the named codes
    /// above.
    pub fn parse_one(token: &str) -> Result<Self, EditorError> {
        let mut rest = token;
        let mut modifiers = Modifiers::NONE;
        loop {
            if let Some(r) = rest.strip_prefix("C-") {
                modifiers.control = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("A-") {
                modifiers.alt = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("S-") {
                modifiers.shift = true;
                rest = r;
            } else {
                break;
            }
        }

        if rest.is_empty() {
            return Err(EditorError::parse_key(format!("empty key code in token {token:?}")));
        }

        let code = if let Some(named) = Self::named_code(rest) {
            named
        } else {
            let mut chars = rest.chars();
            let c = chars.next().unwrap();
            if chars.next().is_some() {
                return Err(EditorError::parse_key(format!(
                    "unrecognized key token {token:?}: not a single character or a known name"
                )));
            }
            KeyCode::Char(c)
        };

        Ok(Key { modifiers, code })
    }

    /// Parses a space-separated binding description such as `"C-x C-s"`
    /// into its component keys. A failure here is a startup-time
    /// configuration error, not something recoverable mid-session.
    pub fn parse_sequence(description: &str) -> Result<Vec<Key>, EditorError> {
        description
            .split(' ')
            .filter(|tok| !tok.is_empty())
            .map(Key::parse_one)
            .collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.control {
            write!(f, "C-")?;
        }
        if self.modifiers.alt {
            write!(f, "A-")?;
        }
        if self.modifiers.shift {
            if let KeyCode::Char(c) = self.code {
                if c.is_ascii_lowercase() {
                    return write!(f, "{}", c.to_ascii_uppercase());
                }
            }
            write!(f, "S-")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "SPACE"),
            KeyCode::Char('\t') => write!(f, "TAB"),
            KeyCode::Char('\n') => write!(f, "ENTER"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Backspace => write!(f, "BACKSPACE"),
            KeyCode::Insert => write!(f, "INSERT"),
            KeyCode::Delete => write!(f, "DELETE"),
            KeyCode::Home => write!(f, "HOME"),
            KeyCode::End => write!(f, "END"),
            KeyCode::PageUp => write!(f, "PAGE_UP"),
            KeyCode::PageDown => write!(f, "PAGE_DOWN"),
            KeyCode::Up => write!(f, "UP"),
            KeyCode::Down => write!(f, "DOWN"),
            KeyCode::Left => write!(f, "LEFT"),
            KeyCode::Right => write!(f, "RIGHT"),
            KeyCode::Mouse4 => write!(f, "MOUSE4"),
            KeyCode::Mouse5 => write!(f, "MOUSE5"),
            KeyCode::ScrollUp => write!(f, "SCROLL_UP"),
            KeyCode::ScrollDown => write!(f, "SCROLL_DOWN"),
            KeyCode::Space => write!(f, "SPACE"),
            KeyCode::Tab => write!(f, "TAB"),
            KeyCode::Enter => write!(f, "ENTER"),
        }
    }
}

/// If `key` carries no modifiers and names a printable character, this is
/// what `self-insert-char` should insert when no binding matches it.
pub fn self_insert_char(key: &Key) -> Option<char> {
    if key.modifiers.control || key.modifiers.alt {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(c),
        KeyCode::Space => Some(' '),
        KeyCode::Tab => Some('\t'),
        KeyCode::Enter => Some('\n'),
        _ => None,
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
