//! Keyboard event encoding.
//!
//! Maps a key symbol plus modifier mask to the byte sequence a real
//! terminal would transmit, honoring cursor-key mode, keypad application
//! mode and CR/NL mode. Sequence choices follow xterm where the DEC manuals
//! leave room.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::screen::Screen;

use super::Vte;

bitflags! {
    /// Modifier mask of a key event.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u32 {
        const SHIFT = 0x01;
        const CONTROL = 0x04;
        const ALT = 0x08;
    }
}

/// A key symbol as reported by the host's input layer. Keys that produce
/// text arrive as `Char`; keypad keys have their own symbols so keypad
/// application mode can tell them apart from the main row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySym {
    Char(char),

    BackSpace,
    Tab,
    IsoLeftTab,
    Linefeed,
    Clear,
    SysReq,
    Escape,
    Return,

    Find,
    Insert,
    Delete,
    Select,
    PageUp,
    PageDown,

    Up,
    Down,
    Right,
    Left,
    Home,
    End,

    KpEnter,
    KpSpace,
    Kp0,
    Kp1,
    Kp2,
    Kp3,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    KpSubtract,
    KpSeparator,
    KpDecimal,
    KpDivide,
    KpMultiply,
    KpAdd,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
}

impl Vte {
    /// Encode a key event and transmit it. `ascii` is the layout-independent
    /// ASCII fallback used for CTRL shortcuts so e.g. ctrl+c works on any
    /// keyboard layout. `unicode` is the text the host's input method
    /// produced, if any. Returns whether anything was sent.
    pub fn handle_keyboard(
        &mut self,
        screen: &mut dyn Screen,
        keysym: KeySym,
        ascii: Option<char>,
        mods: Modifiers,
        unicode: Option<char>,
    ) -> bool {
        // Alt prepends an escape to whatever the key produces.
        if mods.contains(Modifiers::ALT) {
            self.flags.prepend_escape = true;
        }

        if mods.contains(Modifiers::CONTROL) {
            let sym = ascii.or(match keysym {
                KeySym::Char(c) => Some(c),
                _ => None,
            });
            if let Some(sym) = sym {
                let ctrl = match sym {
                    ' ' | '2' => Some(0x00),
                    'a'..='z' => Some(sym as u8 - b'a' + 1),
                    'A'..='Z' => Some(sym as u8 - b'A' + 1),
                    '3' | '[' | '{' => Some(0x1b),
                    '4' | '\\' | '|' => Some(0x1c),
                    '5' | ']' | '}' => Some(0x1d),
                    '6' | '`' | '~' => Some(0x1e),
                    '7' | '/' | '?' => Some(0x1f),
                    '8' => Some(0x7f),
                    _ => None,
                };
                if let Some(byte) = ctrl {
                    self.write(screen, &[byte]);
                    return true;
                }
            }
        }

        match keysym {
            KeySym::BackSpace => {
                self.write(screen, b"\x08");
                return true;
            }
            KeySym::Tab => {
                self.write(screen, b"\x09");
                return true;
            }
            KeySym::IsoLeftTab => {
                self.write(screen, b"\x1b[Z");
                return true;
            }
            KeySym::Linefeed => {
                self.write(screen, b"\x0a");
                return true;
            }
            KeySym::Clear => {
                self.write(screen, b"\x0b");
                return true;
            }
            KeySym::SysReq => {
                self.write(screen, b"\x15");
                return true;
            }
            KeySym::Escape => {
                self.write(screen, b"\x1b");
                return true;
            }
            KeySym::KpEnter | KeySym::Return => {
                if keysym == KeySym::KpEnter && self.flags.keypad_application_mode {
                    self.write(screen, b"\x1bOM");
                } else if self.flags.lf_nl_mode {
                    self.write(screen, b"\x0d\x0a");
                } else {
                    self.write(screen, b"\x0d");
                }
                return true;
            }
            KeySym::Find => {
                self.write(screen, b"\x1b[1~");
                return true;
            }
            KeySym::Insert => {
                self.write(screen, b"\x1b[2~");
                return true;
            }
            KeySym::Delete => {
                self.write(screen, b"\x1b[3~");
                return true;
            }
            KeySym::Select => {
                self.write(screen, b"\x1b[4~");
                return true;
            }
            KeySym::PageUp => {
                self.write(screen, b"\x1b[5~");
                return true;
            }
            KeySym::PageDown => {
                self.write(screen, b"\x1b[6~");
                return true;
            }
            KeySym::Up | KeySym::Down | KeySym::Right | KeySym::Left | KeySym::Home | KeySym::End => {
                let class = match keysym {
                    KeySym::Up => b'A',
                    KeySym::Down => b'B',
                    KeySym::Right => b'C',
                    KeySym::Left => b'D',
                    KeySym::Home => b'H',
                    _ => b'F',
                };
                if mods.contains(Modifiers::CONTROL) {
                    self.write(screen, &[0x1b, b'[', b'1', b';', b'5', class]);
                } else if self.flags.cursor_key_mode {
                    self.write(screen, &[0x1b, b'O', class]);
                } else {
                    self.write(screen, &[0x1b, b'[', class]);
                }
                return true;
            }
            KeySym::Kp0 => return self.write_keypad(screen, b"\x1bOp", b"0"),
            KeySym::Kp1 => return self.write_keypad(screen, b"\x1bOq", b"1"),
            KeySym::Kp2 => return self.write_keypad(screen, b"\x1bOr", b"2"),
            KeySym::Kp3 => return self.write_keypad(screen, b"\x1bOs", b"3"),
            KeySym::Kp4 => return self.write_keypad(screen, b"\x1bOt", b"4"),
            KeySym::Kp5 => return self.write_keypad(screen, b"\x1bOu", b"5"),
            KeySym::Kp6 => return self.write_keypad(screen, b"\x1bOv", b"6"),
            KeySym::Kp7 => return self.write_keypad(screen, b"\x1bOw", b"7"),
            KeySym::Kp8 => return self.write_keypad(screen, b"\x1bOx", b"8"),
            KeySym::Kp9 => return self.write_keypad(screen, b"\x1bOy", b"9"),
            KeySym::KpSubtract => return self.write_keypad(screen, b"\x1bOm", b"-"),
            KeySym::KpSeparator => return self.write_keypad(screen, b"\x1bOl", b","),
            KeySym::KpDecimal => return self.write_keypad(screen, b"\x1bOn", b"."),
            KeySym::KpDivide => return self.write_keypad(screen, b"\x1bOj", b"/"),
            KeySym::KpMultiply => return self.write_keypad(screen, b"\x1bOo", b"*"),
            KeySym::KpAdd => return self.write_keypad(screen, b"\x1bOk", b"+"),
            KeySym::KpSpace => {
                self.write(screen, b" ");
                return true;
            }
            // Shifted function keys use the next block of the legacy
            // mapping, the way hterm and the linux console do it.
            KeySym::F1 => return self.write_fkey(screen, mods, b"\x1b[23~", b"\x1bOP"),
            KeySym::F2 => return self.write_fkey(screen, mods, b"\x1b[24~", b"\x1bOQ"),
            KeySym::F3 => return self.write_fkey(screen, mods, b"\x1b[25~", b"\x1bOR"),
            KeySym::F4 => return self.write_fkey(screen, mods, b"\x1b[26~", b"\x1bOS"),
            KeySym::F5 => return self.write_fkey(screen, mods, b"\x1b[28~", b"\x1b[15~"),
            KeySym::F6 => return self.write_fkey(screen, mods, b"\x1b[29~", b"\x1b[17~"),
            KeySym::F7 => return self.write_fkey(screen, mods, b"\x1b[31~", b"\x1b[18~"),
            KeySym::F8 => return self.write_fkey(screen, mods, b"\x1b[32~", b"\x1b[19~"),
            KeySym::F9 => return self.write_fkey(screen, mods, b"\x1b[33~", b"\x1b[20~"),
            KeySym::F10 => return self.write_fkey(screen, mods, b"\x1b[34~", b"\x1b[21~"),
            KeySym::F11 => return self.write_fkey(screen, mods, b"\x1b[23;2~", b"\x1b[23~"),
            KeySym::F12 => return self.write_fkey(screen, mods, b"\x1b[24;2~", b"\x1b[24~"),
            KeySym::F13 => return self.write_fkey(screen, mods, b"\x1b[25;2~", b"\x1b[25~"),
            KeySym::F14 => return self.write_fkey(screen, mods, b"\x1b[26;2~", b"\x1b[26~"),
            KeySym::F15 => return self.write_fkey(screen, mods, b"\x1b[28;2~", b"\x1b[28~"),
            KeySym::F16 => return self.write_fkey(screen, mods, b"\x1b[29;2~", b"\x1b[29~"),
            KeySym::F17 => return self.write_fkey(screen, mods, b"\x1b[31;2~", b"\x1b[31~"),
            KeySym::F18 => return self.write_fkey(screen, mods, b"\x1b[32;2~", b"\x1b[32~"),
            KeySym::F19 => return self.write_fkey(screen, mods, b"\x1b[33;2~", b"\x1b[33~"),
            KeySym::F20 => return self.write_fkey(screen, mods, b"\x1b[34;2~", b"\x1b[34~"),
            KeySym::Char(_) => {}
        }

        if let Some(unicode) = unicode {
            let cp = unicode as u32;
            if self.flags.seven_bit_mode {
                let mut val = cp as u8;
                if cp & 0x80 != 0 {
                    log::debug!("invalid keyboard input in 7bit mode U+{cp:x}; mapping to '?'");
                    val = b'?';
                }
                self.write(screen, &[val]);
            } else if self.flags.eight_bit_mode {
                let mut val = cp as u8;
                if cp > 0xff {
                    log::debug!("invalid keyboard input in 8bit mode U+{cp:x}; mapping to '?'");
                    val = b'?';
                }
                self.write_raw(screen, &[val]);
            } else {
                let mut buf = [0u8; 4];
                let encoded = unicode.encode_utf8(&mut buf);
                self.write_raw(screen, encoded.as_bytes());
            }
            return true;
        }

        self.flags.prepend_escape = false;
        false
    }

    fn write_keypad(
        &mut self,
        screen: &mut dyn Screen,
        application: &[u8],
        numeric: &[u8],
    ) -> bool {
        if self.flags.keypad_application_mode {
            self.write(screen, application);
        } else {
            self.write(screen, numeric);
        }
        true
    }

    fn write_fkey(
        &mut self,
        screen: &mut dyn Screen,
        mods: Modifiers,
        shifted: &[u8],
        plain: &[u8],
    ) -> bool {
        if mods.contains(Modifiers::SHIFT) {
            self.write(screen, shifted);
        } else {
            self.write(screen, plain);
        }
        true
    }
}
