//! The virtual terminal emulator core.
//!
//! Consumes the byte stream a child process writes to its PTY and turns it
//! into calls against a [`Screen`], answering device queries through the
//! [`TerminalHost`]. The parser follows the VT500 state diagram
//! (<https://vt100.net/emu/dec_ansi_parser>); the command set covers VT102
//! plus the later additions real client software relies on, see
//! <https://invisible-island.net/xterm/ctlseqs/ctlseqs.html>.

use bitflags::bitflags;

use crate::EngineResult;
use crate::attribute::Attribute;
use crate::charset::{Charset, CharsetState, Slot};
use crate::color::{Color, term_color};
use crate::error::VteError;
use crate::host::TerminalHost;
use crate::palette::Palette;
use crate::screen::{Screen, ScreenFlag};
use crate::utf8::Utf8Decoder;

use self::state_machine::{Action, State, entry_action, exit_action, transition};

mod csi;
mod keyboard;
mod state_machine;

pub use keyboard::{KeySym, Modifiers};

/// CSI sequences with more parameters are truncated.
pub(crate) const CSI_ARG_MAX: usize = 16;
/// OSC payloads beyond this many bytes are dropped.
pub(crate) const OSC_MAX_LEN: usize = 128;

bitflags! {
    /// Intermediate and private-marker characters collected while a CSI,
    /// DCS or ESC sequence is in flight.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub(crate) struct CsiFlags: u16 {
        const BANG = 0x0001; // !
        const CASH = 0x0002; // $
        const WHAT = 0x0004; // ?
        const GT = 0x0008; // >
        const SPACE = 0x0010;
        const SQUOTE = 0x0020; // '
        const DQUOTE = 0x0040; // "
        const MULT = 0x0080; // *
        const PLUS = 0x0100; // +
        const POPEN = 0x0200; // (
        const PCLOSE = 0x0400; // )
    }
}

/// The terminal mode switches. Kept as named booleans; most are toggled by
/// SM/RM, some only through ESC sequences or the embedding application.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ModeFlags {
    pub cursor_key_mode: bool,
    pub keypad_application_mode: bool,
    pub lf_nl_mode: bool,
    pub eight_bit_mode: bool,
    pub seven_bit_mode: bool,
    pub use_c1: bool,
    pub keyboard_action_mode: bool,
    pub insert_replace_mode: bool,
    /// When off, everything we transmit is echoed back through the parser.
    pub send_receive_mode: bool,
    pub text_cursor_mode: bool,
    pub inverse_screen_mode: bool,
    pub origin_mode: bool,
    pub auto_wrap_mode: bool,
    pub auto_repeat_mode: bool,
    pub national_charset_mode: bool,
    /// Erased cells take the current background color.
    pub bce_mode: bool,
    /// One-shot: the next outbound payload gets an ESC prefix (Alt).
    pub prepend_escape: bool,
    /// Refuse to switch to the alternate screen buffer.
    pub tite_inhibit_mode: bool,
}

impl Default for ModeFlags {
    fn default() -> Self {
        ModeFlags {
            cursor_key_mode: false,
            keypad_application_mode: false,
            lf_nl_mode: false,
            eight_bit_mode: false,
            seven_bit_mode: false,
            use_c1: false,
            keyboard_action_mode: false,
            insert_replace_mode: false,
            send_receive_mode: true,
            text_cursor_mode: true,
            inverse_screen_mode: false,
            origin_mode: false,
            auto_wrap_mode: true,
            auto_repeat_mode: true,
            national_charset_mode: false,
            bce_mode: true,
            prepend_escape: false,
            tite_inhibit_mode: false,
        }
    }
}

/// DECSC snapshot.
#[derive(Debug, Clone, Copy)]
struct SavedState {
    cursor_x: u32,
    cursor_y: u32,
    attr: Attribute,
    gl: Slot,
    gr: Slot,
    wrap_mode: bool,
    origin_mode: bool,
}

pub struct Vte {
    host: Box<dyn TerminalHost>,

    state: State,
    csi_argc: usize,
    csi_argv: [i32; CSI_ARG_MAX],
    csi_flags: CsiFlags,

    osc_buf: [u8; OSC_MAX_LEN],
    osc_len: usize,

    utf8: Utf8Decoder,
    /// Re-entrancy depth of `input()`; guards the local-echo self-feed.
    parse_depth: u32,

    palette_name: Option<String>,
    custom_palette: Option<Box<[Color; term_color::COUNT]>>,
    palette: Palette,
    def_attr: Attribute,
    cattr: Attribute,

    flags: ModeFlags,
    charsets: CharsetState,

    saved_state: SavedState,
    alt_cursor_x: u32,
    alt_cursor_y: u32,
}

impl Vte {
    /// Create an emulator bound to the given host. The screen is reset and
    /// erased as part of construction.
    pub fn new(screen: &mut dyn Screen, host: Box<dyn TerminalHost>) -> Self {
        let mut vte = Vte {
            host,
            state: State::Ground,
            csi_argc: 0,
            csi_argv: [-1; CSI_ARG_MAX],
            csi_flags: CsiFlags::empty(),
            osc_buf: [0; OSC_MAX_LEN],
            osc_len: 0,
            utf8: Utf8Decoder::new(),
            parse_depth: 0,
            palette_name: None,
            custom_palette: None,
            palette: Palette::default(),
            def_attr: Attribute::default(),
            cattr: Attribute::default(),
            flags: ModeFlags::default(),
            charsets: CharsetState::default(),
            saved_state: SavedState {
                cursor_x: 0,
                cursor_y: 0,
                attr: Attribute::default(),
                gl: Slot::G0,
                gr: Slot::G1,
                wrap_mode: true,
                origin_mode: false,
            },
            alt_cursor_x: 0,
            alt_cursor_y: 0,
        };

        vte.reset(screen);
        screen.erase_screen(false);
        log::debug!("new vte object");
        vte
    }

    /// Soft reset: parser state, modes, attributes and character sets return
    /// to their power-on values. Screen content is untouched.
    pub fn reset(&mut self, screen: &mut dyn Screen) {
        self.flags = ModeFlags::default();
        screen.reset();
        screen.set_flags(ScreenFlag::AUTO_WRAP);

        self.utf8.reset();
        self.state = State::Ground;
        self.charsets = CharsetState::default();

        self.cattr = self.def_attr;
        screen.set_def_attr(&self.def_attr.resolve(&self.palette));

        self.reset_saved_state();
    }

    /// Soft reset plus screen erase, scrollback drop and cursor home.
    pub fn hard_reset(&mut self, screen: &mut dyn Screen) {
        self.reset(screen);
        screen.erase_screen(false);
        screen.clear_scrollback();
        screen.move_to(0, 0);
    }

    /// Feed PTY output. Consumes the whole slice; malformed input never
    /// fails, it only moves the parser through its ignore states.
    pub fn input(&mut self, screen: &mut dyn Screen, bytes: &[u8]) {
        self.parse_depth += 1;
        for &byte in bytes {
            if self.flags.seven_bit_mode {
                if byte & 0x80 != 0 {
                    log::debug!("receiving 8bit character {byte:#04x} from pty while in 7bit mode");
                }
                self.parse_data(screen, u32::from(byte & 0x7f));
            } else if self.flags.eight_bit_mode {
                self.parse_data(screen, u32::from(byte));
            } else if let Some(cp) = self.utf8.feed(byte) {
                self.parse_data(screen, cp);
            }
        }
        self.parse_depth -= 1;
    }

    /// Select a named palette; `None` returns to the built-in default.
    /// Unknown names fall back to the default as well.
    pub fn set_palette(&mut self, screen: &mut dyn Screen, name: Option<&str>) {
        self.palette_name = name.map(String::from);
        self.update_palette(screen);
    }

    /// Install (or with `None` remove) the palette used by the `"custom"`
    /// selection. The table must hold the 16 ANSI colors plus foreground and
    /// background.
    pub fn set_custom_palette(
        &mut self,
        screen: &mut dyn Screen,
        palette: Option<&[[u8; 3]]>,
    ) -> EngineResult<()> {
        match palette {
            Some(table) => {
                if table.len() != term_color::COUNT {
                    return Err(VteError::InvalidPaletteSize {
                        expected: term_color::COUNT,
                        got: table.len(),
                    }
                    .into());
                }
                let mut colors = [Color::default(); term_color::COUNT];
                for (slot, rgb) in colors.iter_mut().zip(table) {
                    *slot = Color::from(*rgb);
                }
                self.custom_palette = Some(Box::new(colors));
            }
            None => self.custom_palette = None,
        }
        self.update_palette(screen);
        Ok(())
    }

    /// The attribute used for unstyled cells under the active palette.
    pub fn def_attr(&self) -> Attribute {
        self.def_attr
    }

    /// Forbid the alternate screen buffer; curses-style applications then
    /// leave their output on the main screen.
    pub fn set_tite_inhibit(&mut self, inhibit: bool) {
        self.flags.tite_inhibit_mode = inhibit;
    }

    fn update_palette(&mut self, screen: &mut dyn Screen) {
        self.palette = Palette::resolve(self.palette_name.as_deref(), self.custom_palette.as_deref());
        self.def_attr = Attribute::default();
        self.cattr = self.def_attr;

        screen.set_def_attr(&self.def_attr.resolve(&self.palette));
        screen.erase_screen(false);
    }

    /// Transmit to the client. With local echo active (SRM reset) and when
    /// not already inside `input()`, the bytes are first re-fed through the
    /// parser; the recursion depth counter keeps self-responses from
    /// looping. A pending Alt prefix is emitted before the payload and then
    /// cleared.
    pub(crate) fn write(&mut self, screen: &mut dyn Screen, bytes: &[u8]) {
        self.write_inner(screen, bytes, false);
    }

    /// Like [`Self::write`] but without the 7bit cleanliness check, for
    /// payloads that are legitimately 8bit (UTF-8 keyboard input).
    pub(crate) fn write_raw(&mut self, screen: &mut dyn Screen, bytes: &[u8]) {
        self.write_inner(screen, bytes, true);
    }

    fn write_inner(&mut self, screen: &mut dyn Screen, bytes: &[u8], raw: bool) {
        if !raw && bytes.iter().any(|&b| b & 0x80 != 0) {
            // Escape sequences must stay below 0x80 so non-unicode clients
            // parse them correctly.
            log::warn!("sending 8bit character inline to client");
        }

        if self.parse_depth == 0 && !self.flags.send_receive_mode {
            if self.flags.prepend_escape {
                self.input(screen, b"\x1b");
            }
            self.input(screen, bytes);
        }

        if self.flags.prepend_escape {
            self.host.write(b"\x1b");
        }
        self.host.write(bytes);

        self.flags.prepend_escape = false;
    }

    fn write_console(&mut self, screen: &mut dyn Screen, sym: char) {
        let cell = self.cattr.resolve(&self.palette);
        screen.write(sym, &cell);
    }

    fn parse_data(&mut self, screen: &mut dyn Screen, cp: u32) {
        let (next, action) = transition(self.state, cp);
        match next {
            Some(next) => {
                // A transition fires exit-action, transition-action and
                // entry-action in that order, even when it re-enters the
                // same state.
                self.do_action(screen, cp, exit_action(self.state));
                self.do_action(screen, cp, action);
                self.do_action(screen, cp, entry_action(next));
                self.state = next;
            }
            None => self.do_action(screen, cp, action),
        }
    }

    fn do_action(&mut self, screen: &mut dyn Screen, cp: u32, action: Action) {
        match action {
            Action::None | Action::Ignore => {}
            Action::Print => self.do_print(screen, cp),
            Action::Execute => self.do_execute(screen, cp),
            Action::Clear => self.do_clear(),
            Action::Collect => self.do_collect(cp),
            Action::Param => self.do_param(cp),
            Action::EscDispatch => self.do_esc(screen, cp),
            Action::CsiDispatch => self.do_csi(screen, cp),
            // DCS payloads are discarded; the states exist so DCS sequences
            // pass through cleanly.
            Action::DcsStart | Action::DcsCollect | Action::DcsEnd => {}
            Action::OscStart => self.do_clear(),
            Action::OscCollect => self.do_osc_collect(cp),
            Action::OscEnd => self.do_osc_end(),
        }
    }

    fn do_clear(&mut self) {
        self.csi_argc = 0;
        self.csi_argv = [-1; CSI_ARG_MAX];
        self.csi_flags = CsiFlags::empty();
        self.osc_len = 0;
    }

    fn do_collect(&mut self, cp: u32) {
        match cp {
            0x21 => self.csi_flags |= CsiFlags::BANG,
            0x24 => self.csi_flags |= CsiFlags::CASH,
            0x3f => self.csi_flags |= CsiFlags::WHAT,
            0x3e => self.csi_flags |= CsiFlags::GT,
            0x20 => self.csi_flags |= CsiFlags::SPACE,
            0x27 => self.csi_flags |= CsiFlags::SQUOTE,
            0x22 => self.csi_flags |= CsiFlags::DQUOTE,
            0x2a => self.csi_flags |= CsiFlags::MULT,
            0x2b => self.csi_flags |= CsiFlags::PLUS,
            0x28 => self.csi_flags |= CsiFlags::POPEN,
            0x29 => self.csi_flags |= CsiFlags::PCLOSE,
            _ => {}
        }
    }

    fn do_param(&mut self, cp: u32) {
        if cp == u32::from(b';') {
            if self.csi_argc < CSI_ARG_MAX {
                self.csi_argc += 1;
            }
            return;
        }
        if self.csi_argc >= CSI_ARG_MAX {
            return;
        }

        if (0x30..=0x39).contains(&cp) {
            let digit = (cp - 0x30) as i32;
            let current = self.csi_argv[self.csi_argc];
            let value = if current <= 0 { digit } else { current * 10 + digit };
            // Saturate; nothing meaningful needs more.
            self.csi_argv[self.csi_argc] = value.min(0xffff);
        }
    }

    fn do_osc_collect(&mut self, cp: u32) {
        let Some(ch) = char::from_u32(cp) else {
            return;
        };
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf).as_bytes();
        // Keep one byte of headroom so the payload stays NUL-terminatable
        // for hosts that pass it on to C code.
        if self.osc_len + encoded.len() > OSC_MAX_LEN - 1 {
            return;
        }
        self.osc_buf[self.osc_len..self.osc_len + encoded.len()].copy_from_slice(encoded);
        self.osc_len += encoded.len();
    }

    fn do_osc_end(&mut self) {
        self.host.osc(&self.osc_buf[..self.osc_len]);
    }

    fn do_print(&mut self, screen: &mut dyn Screen, cp: u32) {
        let mapped = self.charsets.map(cp);
        if let Some(sym) = char::from_u32(mapped) {
            self.write_console(screen, sym);
        }
    }

    /// Execute a single C0/C1 control.
    fn do_execute(&mut self, screen: &mut dyn Screen, ctrl: u32) {
        match ctrl {
            0x00 => {} // NUL, ignored on input
            0x05 => {
                // ENQ: transmit answerback
                self.write(screen, b"\x06");
            }
            0x07 => self.host.bell(),
            0x08 => screen.move_left(1),
            0x09 => screen.tab_right(1),
            0x0a | 0x0b | 0x0c => {
                // LF/VT/FF: newline in CR/NL mode, plain line feed otherwise
                if self.flags.lf_nl_mode {
                    screen.newline();
                } else {
                    screen.move_down(1, true);
                }
            }
            0x0d => screen.move_line_home(),
            0x0e => {
                // SO: invoke G1 into GL
                self.charsets.gl = Slot::G1;
            }
            0x0f => {
                // SI: invoke G0 into GL
                self.charsets.gl = Slot::G0;
            }
            0x11 | 0x13 => {} // XON/XOFF: flow control is the host's business
            0x18 => {}        // CAN: the state machine already aborted the sequence
            0x1a => {
                // SUB: abort and show the error glyph
                self.write_console(screen, '\u{00bf}');
            }
            0x1b => {}
            0x1f => {} // treated as DEL, ignored
            0x84 => screen.move_down(1, true), // IND
            0x85 => screen.newline(),          // NEL
            0x88 => screen.set_tabstop(),      // HTS
            0x8d => screen.move_up(1, true),   // RI
            0x8e => {
                // SS2: G2 into GL for the next character
                self.charsets.glt = Some(Slot::G2);
            }
            0x8f => {
                // SS3: G3 into GL for the next character
                self.charsets.glt = Some(Slot::G3);
            }
            0x9a => self.send_primary_da(screen), // DECID
            0x9c => {}                            // ST
            _ => log::debug!("unhandled control char {ctrl}"),
        }
    }

    fn set_charset(&mut self, set: Charset) -> bool {
        let slot = if self.csi_flags.contains(CsiFlags::POPEN) {
            Slot::G0
        } else if self.csi_flags.contains(CsiFlags::PCLOSE) {
            Slot::G1
        } else if self.csi_flags.contains(CsiFlags::MULT) {
            Slot::G2
        } else if self.csi_flags.contains(CsiFlags::PLUS) {
            Slot::G3
        } else {
            return false;
        };
        self.charsets.designate(slot, set);
        true
    }

    fn do_esc(&mut self, screen: &mut dyn Screen, cp: u32) {
        let Some(data) = char::from_u32(cp) else {
            return;
        };

        match data {
            'B' => {
                if self.set_charset(Charset::AsciiLower) {
                    return;
                }
            }
            '<' => {
                if self.set_charset(Charset::DecSupplementalGraphics) {
                    return;
                }
            }
            '0' => {
                if self.set_charset(Charset::DecSpecialGraphics) {
                    return;
                }
            }
            // National replacement sets. No dedicated tables; they designate
            // the upper half so the sequences at least stay harmless.
            'A' | '4' | 'C' | '5' | 'R' | 'Q' | 'K' | 'Y' | 'E' | '6' | 'Z' | 'H' | '7' | '=' => {
                if self.set_charset(Charset::AsciiUpper) {
                    return;
                }
            }
            'F' => {
                if self.csi_flags.contains(CsiFlags::SPACE) {
                    // S7C1T
                    self.flags.use_c1 = false;
                    return;
                }
            }
            'G' => {
                if self.csi_flags.contains(CsiFlags::SPACE) {
                    // S8C1T
                    self.flags.use_c1 = true;
                    return;
                }
            }
            _ => {}
        }

        // Everything below is only valid without intermediates.
        if !self.csi_flags.is_empty() {
            log::debug!("unhandled escape seq {data:?}");
            return;
        }

        match data {
            'D' => screen.move_down(1, true), // IND
            'E' => screen.newline(),          // NEL
            'H' => screen.set_tabstop(),      // HTS
            'M' => screen.move_up(1, true),   // RI
            'N' => self.charsets.glt = Some(Slot::G2), // SS2
            'O' => self.charsets.glt = Some(Slot::G3), // SS3
            'Z' => self.send_primary_da(screen), // DECID
            '\\' => {}                        // ST
            '~' => self.charsets.gr = Slot::G1, // LS1R
            'n' => self.charsets.gl = Slot::G2, // LS2
            '}' => self.charsets.gr = Slot::G2, // LS2R
            'o' => self.charsets.gl = Slot::G3, // LS3
            '|' => self.charsets.gr = Slot::G3, // LS3R
            '=' => self.flags.keypad_application_mode = true, // DECKPAM
            '>' => self.flags.keypad_application_mode = false, // DECKPNM
            'c' => self.hard_reset(screen),   // RIS
            '7' => self.save_state(screen),   // DECSC
            '8' => self.restore_state(screen), // DECRC
            _ => log::debug!("unhandled escape seq {data:?}"),
        }
    }

    pub(crate) fn send_primary_da(&mut self, screen: &mut dyn Screen) {
        self.write(screen, b"\x1b[?60;1;6;9;15c");
    }

    fn reset_saved_state(&mut self) {
        self.saved_state = SavedState {
            cursor_x: 0,
            cursor_y: 0,
            attr: Attribute {
                fg: self.def_attr.fg,
                bg: self.def_attr.bg,
                ..Attribute::default()
            },
            gl: Slot::G0,
            gr: Slot::G1,
            wrap_mode: true,
            origin_mode: false,
        };
    }

    fn save_state(&mut self, screen: &mut dyn Screen) {
        self.saved_state = SavedState {
            cursor_x: screen.cursor_x(),
            cursor_y: screen.cursor_y(),
            attr: self.cattr,
            gl: self.charsets.gl,
            gr: self.charsets.gr,
            wrap_mode: self.flags.auto_wrap_mode,
            origin_mode: self.flags.origin_mode,
        };
    }

    fn restore_state(&mut self, screen: &mut dyn Screen) {
        screen.move_to(self.saved_state.cursor_x, self.saved_state.cursor_y);
        self.cattr = self.saved_state.attr;
        if self.flags.bce_mode {
            screen.set_def_attr(&self.cattr.resolve(&self.palette));
        }
        self.charsets.gl = self.saved_state.gl;
        self.charsets.gr = self.saved_state.gr;

        self.flags.auto_wrap_mode = self.saved_state.wrap_mode;
        if self.saved_state.wrap_mode {
            screen.set_flags(ScreenFlag::AUTO_WRAP);
        } else {
            screen.reset_flags(ScreenFlag::AUTO_WRAP);
        }

        self.flags.origin_mode = self.saved_state.origin_mode;
        if self.saved_state.origin_mode {
            screen.set_flags(ScreenFlag::REL_ORIGIN);
        } else {
            screen.reset_flags(ScreenFlag::REL_ORIGIN);
        }
    }
}
