//! End-to-end scenarios against a small but real cell grid, including the
//! alternate-screen round trips and scrolling-region behavior.

use std::sync::{Arc, Mutex};

use termstate::{CellAttr, KeySym, Modifiers, Screen, ScreenFlag, TerminalHost, Vte};

const WIDTH: usize = 80;
const HEIGHT: usize = 25;

/// A minimal screen implementation: two character grids (main and
/// alternate), scrolling margins and tab stops. Attributes are accepted but
/// only the glyphs are stored; that is enough to observe the interpreter.
struct GridScreen {
    main: Vec<Vec<char>>,
    alt: Vec<Vec<char>>,
    cursor_x: usize,
    cursor_y: usize,
    flags: ScreenFlag,
    margin_top: usize,
    margin_bottom: usize,
    tabs: [bool; WIDTH],
}

fn blank_grid() -> Vec<Vec<char>> {
    vec![vec![' '; WIDTH]; HEIGHT]
}

fn default_tabs() -> [bool; WIDTH] {
    let mut tabs = [false; WIDTH];
    for (x, tab) in tabs.iter_mut().enumerate() {
        *tab = x % 8 == 0 && x != 0;
    }
    tabs
}

impl GridScreen {
    fn new() -> Self {
        GridScreen {
            main: blank_grid(),
            alt: blank_grid(),
            cursor_x: 0,
            cursor_y: 0,
            flags: ScreenFlag::empty(),
            margin_top: 0,
            margin_bottom: HEIGHT - 1,
            tabs: default_tabs(),
        }
    }

    fn grid(&self) -> &Vec<Vec<char>> {
        if self.flags.contains(ScreenFlag::ALTERNATE) {
            &self.alt
        } else {
            &self.main
        }
    }

    fn grid_mut(&mut self) -> &mut Vec<Vec<char>> {
        if self.flags.contains(ScreenFlag::ALTERNATE) {
            &mut self.alt
        } else {
            &mut self.main
        }
    }

    fn char_at(&self, x: usize, y: usize) -> char {
        self.grid()[y][x]
    }

    fn row_text(&self, y: usize) -> String {
        self.grid()[y].iter().collect::<String>().trim_end().to_string()
    }

    fn scroll_region_up(&mut self, num: usize) {
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        for _ in 0..num {
            let grid = self.grid_mut();
            grid.remove(top);
            grid.insert(bottom, vec![' '; WIDTH]);
        }
    }

    fn scroll_region_down(&mut self, num: usize) {
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        for _ in 0..num {
            let grid = self.grid_mut();
            grid.remove(bottom);
            grid.insert(top, vec![' '; WIDTH]);
        }
    }
}

impl Screen for GridScreen {
    fn cursor_x(&self) -> u32 {
        self.cursor_x as u32
    }

    fn cursor_y(&self) -> u32 {
        self.cursor_y as u32
    }

    fn move_to(&mut self, x: u32, y: u32) {
        self.cursor_x = (x as usize).min(WIDTH - 1);
        self.cursor_y = (y as usize).min(HEIGHT - 1);
    }

    fn move_up(&mut self, num: u32, scroll: bool) {
        for _ in 0..num {
            if scroll && self.cursor_y == self.margin_top {
                self.scroll_region_down(1);
            } else {
                self.cursor_y = self.cursor_y.saturating_sub(1);
            }
        }
    }

    fn move_down(&mut self, num: u32, scroll: bool) {
        for _ in 0..num {
            if scroll && self.cursor_y == self.margin_bottom {
                self.scroll_region_up(1);
            } else {
                self.cursor_y = (self.cursor_y + 1).min(HEIGHT - 1);
            }
        }
    }

    fn move_left(&mut self, num: u32) {
        self.cursor_x = self.cursor_x.saturating_sub(num as usize);
    }

    fn move_right(&mut self, num: u32) {
        self.cursor_x = (self.cursor_x + num as usize).min(WIDTH - 1);
    }

    fn move_line_home(&mut self) {
        self.cursor_x = 0;
    }

    fn tab_right(&mut self, num: u32) {
        for _ in 0..num {
            let next = (self.cursor_x + 1..WIDTH).find(|&x| self.tabs[x]);
            self.cursor_x = next.unwrap_or(WIDTH - 1);
        }
    }

    fn tab_left(&mut self, num: u32) {
        for _ in 0..num {
            let prev = (0..self.cursor_x).rev().find(|&x| self.tabs[x]);
            self.cursor_x = prev.unwrap_or(0);
        }
    }

    fn set_tabstop(&mut self) {
        self.tabs[self.cursor_x] = true;
    }

    fn reset_tabstop(&mut self) {
        self.tabs[self.cursor_x] = false;
    }

    fn reset_all_tabstops(&mut self) {
        self.tabs = [false; WIDTH];
    }

    fn newline(&mut self) {
        self.cursor_x = 0;
        self.move_down(1, true);
    }

    fn scroll_up(&mut self, num: u32) {
        self.scroll_region_up(num as usize);
    }

    fn scroll_down(&mut self, num: u32) {
        self.scroll_region_down(num as usize);
    }

    fn insert_lines(&mut self, num: u32) {
        let y = self.cursor_y;
        let bottom = self.margin_bottom;
        if y > bottom {
            return;
        }
        for _ in 0..num {
            let grid = self.grid_mut();
            grid.remove(bottom);
            grid.insert(y, vec![' '; WIDTH]);
        }
    }

    fn delete_lines(&mut self, num: u32) {
        let y = self.cursor_y;
        let bottom = self.margin_bottom;
        if y > bottom {
            return;
        }
        for _ in 0..num {
            let grid = self.grid_mut();
            grid.remove(y);
            grid.insert(bottom, vec![' '; WIDTH]);
        }
    }

    fn insert_chars(&mut self, num: u32) {
        let (x, y) = (self.cursor_x, self.cursor_y);
        for _ in 0..num {
            let row = &mut self.grid_mut()[y];
            row.pop();
            row.insert(x, ' ');
        }
    }

    fn delete_chars(&mut self, num: u32) {
        let (x, y) = (self.cursor_x, self.cursor_y);
        for _ in 0..num {
            let row = &mut self.grid_mut()[y];
            row.remove(x);
            row.push(' ');
        }
    }

    fn erase_chars(&mut self, num: u32) {
        let (x, y) = (self.cursor_x, self.cursor_y);
        let end = (x + num as usize).min(WIDTH);
        for cell in &mut self.grid_mut()[y][x..end] {
            *cell = ' ';
        }
    }

    fn erase_cursor_to_end(&mut self, _protect: bool) {
        let (x, y) = (self.cursor_x, self.cursor_y);
        for cell in &mut self.grid_mut()[y][x..] {
            *cell = ' ';
        }
    }

    fn erase_home_to_cursor(&mut self, _protect: bool) {
        let (x, y) = (self.cursor_x, self.cursor_y);
        for cell in &mut self.grid_mut()[y][..=x.min(WIDTH - 1)] {
            *cell = ' ';
        }
    }

    fn erase_current_line(&mut self, _protect: bool) {
        let y = self.cursor_y;
        self.grid_mut()[y] = vec![' '; WIDTH];
    }

    fn erase_cursor_to_screen(&mut self, protect: bool) {
        self.erase_cursor_to_end(protect);
        let y = self.cursor_y;
        for row in &mut self.grid_mut()[y + 1..] {
            *row = vec![' '; WIDTH];
        }
    }

    fn erase_screen_to_cursor(&mut self, protect: bool) {
        let y = self.cursor_y;
        for row in &mut self.grid_mut()[..y] {
            *row = vec![' '; WIDTH];
        }
        self.erase_home_to_cursor(protect);
    }

    fn erase_screen(&mut self, _protect: bool) {
        *self.grid_mut() = blank_grid();
    }

    fn set_flags(&mut self, flags: ScreenFlag) {
        self.flags |= flags;
    }

    fn reset_flags(&mut self, flags: ScreenFlag) {
        self.flags &= !flags;
    }

    fn set_margins(&mut self, top: u32, bottom: u32) {
        let top = top as usize;
        let bottom = bottom as usize;
        let new_top = top.saturating_sub(1);
        let new_bottom = if bottom == 0 || bottom > HEIGHT {
            HEIGHT - 1
        } else {
            bottom - 1
        };
        if new_top >= new_bottom {
            self.margin_top = 0;
            self.margin_bottom = HEIGHT - 1;
        } else {
            self.margin_top = new_top;
            self.margin_bottom = new_bottom;
        }
    }

    fn set_def_attr(&mut self, _attr: &CellAttr) {}

    fn write(&mut self, sym: char, _attr: &CellAttr) {
        let (x, y) = (self.cursor_x, self.cursor_y);
        self.grid_mut()[y][x] = sym;
        self.cursor_x += 1;
        if self.cursor_x >= WIDTH {
            if self.flags.contains(ScreenFlag::AUTO_WRAP) {
                self.newline();
            } else {
                self.cursor_x = WIDTH - 1;
            }
        }
    }

    fn reset(&mut self) {
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.flags = ScreenFlag::empty();
        self.margin_top = 0;
        self.margin_bottom = HEIGHT - 1;
        self.tabs = default_tabs();
    }

    fn clear_scrollback(&mut self) {}
}

#[derive(Default, Clone)]
struct CaptureHost {
    out: Arc<Mutex<Vec<u8>>>,
}

impl CaptureHost {
    fn output(&self) -> Vec<u8> {
        self.out.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.out.lock().unwrap().clear();
    }
}

impl TerminalHost for CaptureHost {
    fn write(&mut self, bytes: &[u8]) {
        self.out.lock().unwrap().extend_from_slice(bytes);
    }
}

fn create() -> (Vte, GridScreen, CaptureHost) {
    let mut screen = GridScreen::new();
    let host = CaptureHost::default();
    let vte = Vte::new(&mut screen, Box::new(host.clone()));
    (vte, screen, host)
}

#[test]
fn plain_text_lands_on_the_grid() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"Hi");

    assert_eq!(screen.char_at(0, 0), 'H');
    assert_eq!(screen.char_at(1, 0), 'i');
    assert_eq!((screen.cursor_x, screen.cursor_y), (2, 0));
}

#[test]
fn newline_and_carriage_return() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"one\r\ntwo");

    assert_eq!(screen.row_text(0), "one");
    assert_eq!(screen.row_text(1), "two");
}

#[test]
fn auto_wrap_can_be_disabled() {
    let (mut vte, mut screen, _host) = create();
    let line = vec![b'x'; WIDTH + 1];
    vte.input(&mut screen, &line);
    assert_eq!(screen.char_at(0, 1), 'x');

    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"\x1b[?7l");
    vte.input(&mut screen, &line);
    assert_eq!(screen.char_at(0, 1), ' ');
    assert_eq!(screen.char_at(WIDTH - 1, 0), 'x');
}

#[test]
fn cursor_position_report_is_one_based() {
    let (mut vte, mut screen, host) = create();
    vte.input(&mut screen, b"\x1b[5;10H\x1b[6n");
    assert_eq!(host.output(), b"\x1b[5;10R");

    host.clear();
    vte.input(&mut screen, b"\x1b[H\x1b[6n");
    assert_eq!(host.output(), b"\x1b[1;1R");
}

#[test]
fn alt_screen_1049_round_trip() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"A");
    vte.input(&mut screen, b"\x1b[6;6H");
    assert_eq!((screen.cursor_x, screen.cursor_y), (5, 5));

    vte.input(&mut screen, b"\x1b[?1049h\x1b[2J hello\x1b[?1049l");

    assert!(!screen.flags.contains(ScreenFlag::ALTERNATE));
    assert_eq!(screen.char_at(0, 0), 'A');
    assert_eq!((screen.cursor_x, screen.cursor_y), (5, 5));
    // nothing from the alternate screen leaked onto the main grid
    assert_eq!(screen.row_text(5), "");
}

#[test]
fn alt_screen_1049_erases_on_enter() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"\x1b[?1049h");
    vte.input(&mut screen, b"stale\x1b[?1049l\x1b[?1049h");

    assert!(screen.flags.contains(ScreenFlag::ALTERNATE));
    assert_eq!(screen.row_text(0), "");
}

#[test]
fn mode_1048_saves_cursor_only() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"\x1b[3;7H\x1b[?1048h\x1b[10;1H\x1b[?1048l");

    assert!(!screen.flags.contains(ScreenFlag::ALTERNATE));
    assert_eq!((screen.cursor_x, screen.cursor_y), (6, 2));
}

#[test]
fn mode_1047_erases_on_leave() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"\x1b[?1047hgone");
    assert_eq!(screen.row_text(0), "gone");
    vte.input(&mut screen, b"\x1b[?1047l");
    assert!(!screen.flags.contains(ScreenFlag::ALTERNATE));

    vte.input(&mut screen, b"\x1b[?1047h");
    assert_eq!(screen.row_text(0), "");
}

#[test]
fn scrolling_region_confines_line_feeds() {
    let (mut vte, mut screen, _host) = create();
    for (i, row) in [b"aaa", b"bbb", b"ccc"].iter().enumerate() {
        vte.input(&mut screen, format!("\x1b[{};1H", i + 1).as_bytes());
        vte.input(&mut screen, *row);
    }
    vte.input(&mut screen, b"\x1b[12;1Hbelow");

    // region rows 1..2, cursor to the region bottom, one line feed
    vte.input(&mut screen, b"\x1b[1;2r\x1b[2;1H\n");

    assert_eq!(screen.row_text(0), "bbb");
    assert_eq!(screen.row_text(1), "");
    assert_eq!(screen.row_text(2), "ccc");
    assert_eq!(screen.row_text(11), "below");
}

#[test]
fn reverse_index_scrolls_region_down() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"top\r\nsecond");
    vte.input(&mut screen, b"\x1b[1;1H\x1bM");

    assert_eq!(screen.row_text(0), "");
    assert_eq!(screen.row_text(1), "top");
    assert_eq!(screen.row_text(2), "second");
}

#[test]
fn erase_in_line_variants() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"abcdef\x1b[1;4H\x1b[K");
    assert_eq!(screen.row_text(0), "abc");

    vte.input(&mut screen, b"\x1b[1;1Habcdef\x1b[1;3H\x1b[1K");
    assert_eq!(screen.row_text(0), "   def");
}

#[test]
fn tab_stops_can_be_set_and_cleared() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"\tX");
    assert_eq!(screen.char_at(8, 0), 'X');

    // clear all stops, set one at column 21
    vte.input(&mut screen, b"\x1b[3g\x1b[1;21H\x1bH\x1b[1;1H\tY");
    assert_eq!(screen.char_at(20, 0), 'Y');
}

#[test]
fn insert_and_delete_lines_at_cursor() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"one\r\ntwo\r\nthree");
    vte.input(&mut screen, b"\x1b[2;1H\x1b[L");
    assert_eq!(screen.row_text(1), "");
    assert_eq!(screen.row_text(2), "two");

    vte.input(&mut screen, b"\x1b[M");
    assert_eq!(screen.row_text(1), "two");
    assert_eq!(screen.row_text(2), "three");
}

#[test]
fn local_echo_round_trip() {
    let (mut vte, mut screen, host) = create();
    vte.input(&mut screen, b"\x1b[12l");
    vte.handle_keyboard(&mut screen, KeySym::Char('h'), None, Modifiers::empty(), Some('h'));
    vte.handle_keyboard(&mut screen, KeySym::Char('i'), None, Modifiers::empty(), Some('i'));

    assert_eq!(screen.row_text(0), "hi");
    assert_eq!(host.output(), b"hi");
}

#[test]
fn hard_reset_via_ris() {
    let (mut vte, mut screen, _host) = create();
    vte.input(&mut screen, b"junk\x1b[?1h\x1bc");
    assert_eq!(screen.row_text(0), "");
    assert_eq!((screen.cursor_x, screen.cursor_y), (0, 0));
}
