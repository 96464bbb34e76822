//! CSI sequence dispatch: cursor motion, erasure, scrolling, SGR, mode
//! switching and the device reports.

use crate::attribute::ColorSpec;
use crate::charset::{Charset, Slot};
use crate::color::Color;
use crate::screen::{Screen, ScreenFlag};

use super::{CSI_ARG_MAX, CsiFlags, Vte};

// 6x6x6 cube channel levels of the xterm 256-color palette.
const CUBE_LEVELS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

impl Vte {
    /// Parameter with the usual "absent or zero means one" rule of the
    /// cursor motion commands.
    fn count_arg(&self, index: usize) -> u32 {
        let num = self.csi_argv[index];
        if num <= 0 { 1 } else { num as u32 }
    }

    pub(super) fn do_csi(&mut self, screen: &mut dyn Screen, cp: u32) {
        let Some(data) = char::from_u32(cp) else {
            return;
        };

        // Close the parameter under construction.
        if self.csi_argc < CSI_ARG_MAX {
            self.csi_argc += 1;
        }

        match data {
            'A' => {
                // CUU
                let num = self.count_arg(0);
                screen.move_up(num, false);
            }
            'B' => {
                // CUD
                let num = self.count_arg(0);
                screen.move_down(num, false);
            }
            'C' => {
                // CUF
                let num = self.count_arg(0);
                screen.move_right(num);
            }
            'D' => {
                // CUB
                let num = self.count_arg(0);
                screen.move_left(num);
            }
            'd' => {
                // VPA - Vertical Line Position Absolute
                let num = self.count_arg(0);
                let x = screen.cursor_x();
                screen.move_to(x, num - 1);
            }
            'e' => {
                // VPR - Vertical Line Position Relative
                let num = self.count_arg(0);
                let x = screen.cursor_x();
                let y = screen.cursor_y();
                screen.move_to(x, y + num);
            }
            'H' | 'f' => {
                // CUP/HVP - position cursor, row;col, 1-based
                let row = self.count_arg(0);
                let col = self.count_arg(1);
                screen.move_to(col - 1, row - 1);
            }
            'G' => {
                // CHA - Cursor Character Absolute
                let num = self.count_arg(0);
                let y = screen.cursor_y();
                screen.move_to(num - 1, y);
            }
            'J' => {
                // ED / DECSED (with '?': keep protected cells)
                let protect = self.csi_flags.contains(CsiFlags::WHAT);
                match self.csi_argv[0] {
                    i32::MIN..=0 => screen.erase_cursor_to_screen(protect),
                    1 => screen.erase_screen_to_cursor(protect),
                    2 => screen.erase_screen(protect),
                    n => log::debug!("unknown parameter to CSI-J: {n}"),
                }
            }
            'K' => {
                // EL / DECSEL
                let protect = self.csi_flags.contains(CsiFlags::WHAT);
                match self.csi_argv[0] {
                    i32::MIN..=0 => screen.erase_cursor_to_end(protect),
                    1 => screen.erase_home_to_cursor(protect),
                    2 => screen.erase_current_line(protect),
                    n => log::debug!("unknown parameter to CSI-K: {n}"),
                }
            }
            'X' => {
                // ECH - erase characters in place
                let num = self.count_arg(0);
                screen.erase_chars(num);
            }
            'm' => {
                if self.csi_flags.contains(CsiFlags::GT) {
                    // XTMODKEYS - set/reset key modifier options, ignored
                } else {
                    self.csi_attribute(screen);
                }
            }
            'p' => {
                if self.csi_flags.contains(CsiFlags::GT) {
                    // xterm: select X11 visual cursor mode
                    self.reset(screen);
                } else if self.csi_flags.contains(CsiFlags::BANG) {
                    // DECSTR - soft reset
                    self.reset(screen);
                } else if self.csi_flags.contains(CsiFlags::CASH) {
                    // DECRQM - request mode
                    if !self.csi_flags.contains(CsiFlags::WHAT) {
                        self.reset(screen);
                    }
                } else {
                    // DECSCL - compatibility level
                    self.csi_compat_mode(screen);
                }
            }
            'h' => self.csi_mode(screen, true),  // SM
            'l' => self.csi_mode(screen, false), // RM
            'r' => {
                // DECSTBM - scrolling margins; the screen clamps
                let upper = self.csi_argv[0].max(0) as u32;
                let lower = self.csi_argv[1].max(0) as u32;
                screen.set_margins(upper, lower);
            }
            'c' => self.csi_dev_attr(screen), // DA
            'L' => {
                // IL
                let num = self.count_arg(0);
                screen.insert_lines(num);
            }
            'M' => {
                // DL
                let num = self.count_arg(0);
                screen.delete_lines(num);
            }
            'g' => {
                // TBC - tabulation clear
                match self.csi_argv[0] {
                    i32::MIN..=0 => screen.reset_tabstop(),
                    3 => screen.reset_all_tabstops(),
                    n => log::debug!("invalid parameter {n} to TBC CSI"),
                }
            }
            '@' => {
                // ICH
                let num = self.count_arg(0);
                screen.insert_chars(num);
            }
            'P' => {
                // DCH
                let num = self.count_arg(0);
                screen.delete_chars(num);
            }
            'Z' => {
                // CBT - cursor backward tab
                let num = self.count_arg(0);
                screen.tab_left(num);
            }
            'I' => {
                // CHT - cursor forward tab
                let num = self.count_arg(0);
                screen.tab_right(num);
            }
            'n' => self.csi_dsr(screen), // DSR
            'S' => {
                // SU
                let num = self.count_arg(0);
                screen.scroll_up(num);
            }
            'T' => {
                // SD
                let num = self.count_arg(0);
                screen.scroll_down(num);
            }
            _ => log::debug!("unhandled CSI sequence {data:?}"),
        }
    }

    /// SGR. Subcommands consume parameters left to right; unknown ones are
    /// skipped so the rest of the sequence still applies.
    fn csi_attribute(&mut self, screen: &mut dyn Screen) {
        if self.csi_argc <= 1 && self.csi_argv[0] == -1 {
            self.csi_argc = 1;
            self.csi_argv[0] = 0;
        }

        let mut i = 0;
        while i < self.csi_argc {
            match self.csi_argv[i] {
                -1 => {}
                0 => {
                    self.cattr.fg = self.def_attr.fg;
                    self.cattr.bg = self.def_attr.bg;
                    self.cattr.bold = false;
                    self.cattr.italic = false;
                    self.cattr.underline = false;
                    self.cattr.inverse = false;
                    self.cattr.blink = false;
                }
                1 => self.cattr.bold = true,
                3 => self.cattr.italic = true,
                4 => self.cattr.underline = true,
                5 => self.cattr.blink = true,
                7 => self.cattr.inverse = true,
                22 => self.cattr.bold = false,
                23 => self.cattr.italic = false,
                24 => self.cattr.underline = false,
                25 => self.cattr.blink = false,
                27 => self.cattr.inverse = false,
                code @ 30..=37 => self.cattr.fg = ColorSpec::Indexed((code - 30) as u8),
                39 => self.cattr.fg = self.def_attr.fg,
                code @ 40..=47 => self.cattr.bg = ColorSpec::Indexed((code - 40) as u8),
                49 => self.cattr.bg = self.def_attr.bg,
                code @ 90..=97 => self.cattr.fg = ColorSpec::Indexed((code - 90 + 8) as u8),
                code @ 100..=107 => self.cattr.bg = ColorSpec::Indexed((code - 100 + 8) as u8),
                val @ (38 | 48) => {
                    let Some(spec) = self.extended_color(&mut i) else {
                        i += 1;
                        continue;
                    };
                    if val == 38 {
                        self.cattr.fg = spec;
                    } else {
                        self.cattr.bg = spec;
                    }
                }
                n => log::debug!("unhandled SGR attr {n}"),
            }
            i += 1;
        }

        if self.flags.bce_mode {
            screen.set_def_attr(&self.cattr.resolve(&self.palette));
        }
    }

    /// SGR 38/48 extension: `;5;idx` selects from the 256-color palette,
    /// `;2;r;g;b` is direct color. Advances `*i` past the consumed
    /// parameters; returns `None` on malformed input, leaving `*i` alone so
    /// the remaining parameters are still interpreted.
    fn extended_color(&mut self, i: &mut usize) -> Option<ColorSpec> {
        let arg = |idx: usize| -> i32 {
            if idx < CSI_ARG_MAX { self.csi_argv[idx] } else { -1 }
        };

        match arg(*i + 1) {
            5 => {
                // 256-color mode
                if *i + 2 >= self.csi_argc || arg(*i + 2) < 0 {
                    log::debug!("invalid 256color SGR");
                    return None;
                }
                let code = arg(*i + 2) as u32;
                *i += 2;
                if code < 16 {
                    Some(ColorSpec::Indexed(code as u8))
                } else if code < 232 {
                    let mut code = code - 16;
                    let b = CUBE_LEVELS[(code % 6) as usize];
                    code /= 6;
                    let g = CUBE_LEVELS[(code % 6) as usize];
                    code /= 6;
                    let r = CUBE_LEVELS[(code % 6) as usize];
                    Some(ColorSpec::Rgb(Color::new(r, g, b)))
                } else {
                    let v = ((code - 232) * 10 + 8) as u8;
                    Some(ColorSpec::Rgb(Color::new(v, v, v)))
                }
            }
            2 => {
                // true color mode
                if *i + 4 >= self.csi_argc
                    || arg(*i + 2) < 0
                    || arg(*i + 3) < 0
                    || arg(*i + 4) < 0
                {
                    log::debug!("invalid true color SGR");
                    return None;
                }
                let r = arg(*i + 2) as u8;
                let g = arg(*i + 3) as u8;
                let b = arg(*i + 4) as u8;
                *i += 4;
                Some(ColorSpec::Rgb(Color::new(r, g, b)))
            }
            _ => {
                log::debug!("invalid SGR");
                None
            }
        }
    }

    /// DECSCL. Always soft-resets, then applies the requested conformance
    /// level. 61 selects VT100 compatibility which we approximate with 7bit
    /// mode; 62-64 select the 8bit-capable levels.
    fn csi_compat_mode(&mut self, screen: &mut dyn Screen) {
        self.reset(screen);

        match self.csi_argv[0] {
            61 => {
                self.flags.seven_bit_mode = true;
                self.charsets.designate(Slot::G0, Charset::AsciiLower);
                self.charsets.designate(Slot::G1, Charset::DecSupplementalGraphics);
            }
            62 | 63 | 64 => {
                // The sub-parameter selects the control encoding. VT220
                // documents 2 as 7bit but the later models use it as 8bit;
                // we follow the later models.
                if self.csi_argv[1] == 1 || self.csi_argv[1] == 2 {
                    self.flags.use_c1 = true;
                }
                self.flags.eight_bit_mode = true;
                self.charsets.designate(Slot::G0, Charset::AsciiLower);
                self.charsets.designate(Slot::G1, Charset::DecSupplementalGraphics);
            }
            n => {
                log::debug!("unhandled DECSCL 'p' CSI {n}, switching to utf-8 mode again");
            }
        }
    }

    /// SM/RM. Without the '?' marker the ANSI modes, with it the DEC
    /// private modes.
    fn csi_mode(&mut self, screen: &mut dyn Screen, set: bool) {
        for i in 0..self.csi_argc {
            let arg = self.csi_argv[i];

            if !self.csi_flags.contains(CsiFlags::WHAT) {
                match arg {
                    -1 => {}
                    2 => self.flags.keyboard_action_mode = set, // KAM
                    4 => {
                        // IRM
                        self.flags.insert_replace_mode = set;
                        if set {
                            screen.set_flags(ScreenFlag::INSERT_MODE);
                        } else {
                            screen.reset_flags(ScreenFlag::INSERT_MODE);
                        }
                    }
                    12 => self.flags.send_receive_mode = set, // SRM
                    20 => self.flags.lf_nl_mode = set,        // LNM
                    n => log::debug!("unknown non-DEC (Re)Set-Mode {n}"),
                }
                continue;
            }

            match arg {
                -1 => {}
                1 => self.flags.cursor_key_mode = set, // DECCKM
                // DECANM (VT52), DECCOLM, DECSCLM (smooth scroll), blinking
                // cursor, DECPFF and DECPEX are accepted but not
                // implemented.
                2 | 3 | 4 | 12 | 18 | 19 => {}
                5 => {
                    // DECSCNM
                    self.flags.inverse_screen_mode = set;
                    if set {
                        screen.set_flags(ScreenFlag::INVERSE);
                    } else {
                        screen.reset_flags(ScreenFlag::INVERSE);
                    }
                }
                6 => {
                    // DECOM
                    self.flags.origin_mode = set;
                    if set {
                        screen.set_flags(ScreenFlag::REL_ORIGIN);
                    } else {
                        screen.reset_flags(ScreenFlag::REL_ORIGIN);
                    }
                }
                7 => {
                    // DECAWM
                    self.flags.auto_wrap_mode = set;
                    if set {
                        screen.set_flags(ScreenFlag::AUTO_WRAP);
                    } else {
                        screen.reset_flags(ScreenFlag::AUTO_WRAP);
                    }
                }
                8 => self.flags.auto_repeat_mode = set, // DECARM
                25 => {
                    // DECTCEM
                    self.flags.text_cursor_mode = set;
                    if set {
                        screen.reset_flags(ScreenFlag::HIDE_CURSOR);
                    } else {
                        screen.set_flags(ScreenFlag::HIDE_CURSOR);
                    }
                }
                42 => self.flags.national_charset_mode = set, // DECNRCM
                47 => {
                    // alternate screen buffer
                    if self.flags.tite_inhibit_mode {
                        continue;
                    }
                    if set {
                        screen.set_flags(ScreenFlag::ALTERNATE);
                    } else {
                        screen.reset_flags(ScreenFlag::ALTERNATE);
                    }
                }
                1047 => {
                    // alternate screen buffer with post-erase
                    if self.flags.tite_inhibit_mode {
                        continue;
                    }
                    if set {
                        screen.set_flags(ScreenFlag::ALTERNATE);
                    } else {
                        screen.erase_screen(false);
                        screen.reset_flags(ScreenFlag::ALTERNATE);
                    }
                }
                1048 => {
                    // save/restore cursor for the alternate screen
                    if self.flags.tite_inhibit_mode {
                        continue;
                    }
                    if set {
                        self.alt_cursor_x = screen.cursor_x();
                        self.alt_cursor_y = screen.cursor_y();
                    } else {
                        screen.move_to(self.alt_cursor_x, self.alt_cursor_y);
                    }
                }
                1049 => {
                    // alternate screen buffer with pre-erase and cursor
                    if self.flags.tite_inhibit_mode {
                        continue;
                    }
                    if set {
                        self.alt_cursor_x = screen.cursor_x();
                        self.alt_cursor_y = screen.cursor_y();
                        screen.set_flags(ScreenFlag::ALTERNATE);
                        screen.erase_screen(false);
                    } else {
                        screen.reset_flags(ScreenFlag::ALTERNATE);
                        screen.move_to(self.alt_cursor_x, self.alt_cursor_y);
                    }
                }
                n => {
                    log::debug!("unknown DEC {}-Mode {n}", if set { "Set" } else { "Reset" });
                }
            }
        }
    }

    fn csi_dev_attr(&mut self, screen: &mut dyn Screen) {
        if self.csi_argc <= 1 && self.csi_argv[0] <= 0 {
            if self.csi_flags.is_empty() {
                self.send_primary_da(screen);
                return;
            } else if self.csi_flags.contains(CsiFlags::GT) {
                // secondary DA
                self.write(screen, b"\x1b[>1;1;0c");
                return;
            }
        }

        log::debug!(
            "unhandled DA: {:x} {} {} {}...",
            self.csi_flags.bits(),
            self.csi_argv[0],
            self.csi_argv[1],
            self.csi_argv[2]
        );
    }

    fn csi_dsr(&mut self, screen: &mut dyn Screen) {
        if self.csi_argv[0] == 5 {
            self.write(screen, b"\x1b[0n");
        } else if self.csi_argv[0] == 6 {
            let x = screen.cursor_x();
            let y = screen.cursor_y();
            let report = format!("\x1b[{};{}R", y + 1, x + 1);
            if report.len() >= 64 {
                self.write(screen, b"\x1b[0;0R");
            } else {
                self.write(screen, report.as_bytes());
            }
        }
    }
}
