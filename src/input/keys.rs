use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Numpad(u8),
    Function(u8),
}

impl KeyCode {
    /// Looks a key up by its configuration name.
    ///
    /// Matching ignores case and surrounding whitespace, so `" space "`,
    /// `"SPACE"` and `"Space"` all resolve to the space bar.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_uppercase();
        if let Some(key) = parse_named_key(&name) {
            return Some(Self::Named(key));
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch));
            }
            if let Some(digit) = ch.to_digit(10) {
                return Some(Self::Digit(digit as u8));
            }
        }
        if let Some(digit) = name.strip_prefix("NUMPAD") {
            if let Ok(index) = digit.parse::<u8>() {
                if index <= 9 {
                    return Some(Self::Numpad(index));
                }
            }
        }
        if let Some(function) = name.strip_prefix('F') {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=15).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }
}

fn parse_named_key(name: &str) -> Option<NamedKey> {
    use NamedKey::*;
    let key = match name {
        "SPACE" => Space,
        "ENTER" | "RETURN" => Enter,
        "NUMPADENTER" => NumpadEnter,
        "TAB" => Tab,
        "LEFT" | "LEFTARROW" => Left,
        "RIGHT" | "RIGHTARROW" => Right,
        "UP" | "UPARROW" => Up,
        "DOWN" | "DOWNARROW" => Down,
        "ESCAPE" | "ESC" => Escape,
        "BACKSPACE" => Backspace,
        "INSERT" => Insert,
        "DELETE" => Delete,
        "HOME" => Home,
        "END" => End,
        "PAGEUP" | "PRIOR" => PageUp,
        "PAGEDOWN" | "NEXT" => PageDown,
        "PAUSE" => Pause,
        "CAPSLOCK" | "CAPITAL" => CapsLock,
        "LEFTSHIFT" | "LSHIFT" => LeftShift,
        "RIGHTSHIFT" | "RSHIFT" => RightShift,
        "LEFTCONTROL" | "LEFTCTRL" | "LCONTROL" => LeftCtrl,
        "RIGHTCONTROL" | "RIGHTCTRL" | "RCONTROL" => RightCtrl,
        "ALT_LEFT" | "LEFTALT" | "LEFTMENU" | "LALT" => LeftAlt,
        "ALT_RIGHT" | "RIGHTALT" | "RIGHTMENU" | "RALT" => RightAlt,
        "MINUS" => Minus,
        "EQUALS" => Equals,
        "COMMA" => Comma,
        "PERIOD" => Period,
        "SLASH" => Slash,
        "BACKSLASH" => Backslash,
        "SEMICOLON" => Semicolon,
        "APOSTROPHE" => Apostrophe,
        "GRAVE" => Grave,
        "LEFTBRACKET" => LeftBracket,
        "RIGHTBRACKET" => RightBracket,
        "ADD" | "NUMPADPLUS" => NumpadAdd,
        "SUBTRACT" | "NUMPADMINUS" => NumpadSubtract,
        "MULTIPLY" | "NUMPADSTAR" => NumpadMultiply,
        "DIVIDE" | "NUMPADSLASH" => NumpadDivide,
        "DECIMAL" | "NUMPADPERIOD" => NumpadDecimal,
        _ => return None,
    };
    Some(key)
}

/// Friendly names for the non-alphanumeric keys the game binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    NumpadEnter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Pause,
    CapsLock,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    Minus,
    Equals,
    Comma,
    Period,
    Slash,
    Backslash,
    Semicolon,
    Apostrophe,
    Grave,
    LeftBracket,
    RightBracket,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadDecimal,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}
