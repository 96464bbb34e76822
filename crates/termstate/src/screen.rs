use bitflags::bitflags;

use crate::attribute::CellAttr;

bitflags! {
    /// Settable behavior bits of the screen collaborator, toggled through
    /// [`Screen::set_flags`] / [`Screen::reset_flags`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ScreenFlag: u32 {
        /// Wrap to the next line when writing past the last column.
        const AUTO_WRAP = 0x01;
        /// Shift the rest of the line right on write instead of replacing.
        const INSERT_MODE = 0x02;
        /// Cursor addressing is relative to the scrolling region.
        const REL_ORIGIN = 0x04;
        /// Do not render the text cursor.
        const HIDE_CURSOR = 0x08;
        /// Render the whole screen with inverted colors.
        const INVERSE = 0x10;
        /// Use the alternate screen buffer.
        const ALTERNATE = 0x20;
    }
}

/// The back-buffer contract the command interpreter drives.
///
/// The emulator core does not own a cell store; the embedding application
/// supplies one through this trait. All coordinates are 0-based. Count
/// arguments are at least 1 by the time they arrive here; out-of-range
/// positions clamp inside the implementation.
pub trait Screen: Send {
    fn cursor_x(&self) -> u32;
    fn cursor_y(&self) -> u32;
    fn move_to(&mut self, x: u32, y: u32);
    /// Move up; when `scroll` is set and the cursor sits on the top margin,
    /// scroll the region down instead.
    fn move_up(&mut self, num: u32, scroll: bool);
    /// Move down; when `scroll` is set and the cursor sits on the bottom
    /// margin, scroll the region up instead.
    fn move_down(&mut self, num: u32, scroll: bool);
    fn move_left(&mut self, num: u32);
    fn move_right(&mut self, num: u32);
    fn move_line_home(&mut self);

    fn tab_right(&mut self, num: u32);
    fn tab_left(&mut self, num: u32);
    fn set_tabstop(&mut self);
    fn reset_tabstop(&mut self);
    fn reset_all_tabstops(&mut self);

    /// Carriage return plus line feed, scrolling at the bottom margin.
    fn newline(&mut self);
    fn scroll_up(&mut self, num: u32);
    fn scroll_down(&mut self, num: u32);

    fn insert_lines(&mut self, num: u32);
    fn delete_lines(&mut self, num: u32);
    fn insert_chars(&mut self, num: u32);
    fn delete_chars(&mut self, num: u32);
    /// Erase `num` cells in place starting at the cursor.
    fn erase_chars(&mut self, num: u32);

    /// `protect` skips cells whose attribute has the protect bit.
    fn erase_cursor_to_end(&mut self, protect: bool);
    fn erase_home_to_cursor(&mut self, protect: bool);
    fn erase_current_line(&mut self, protect: bool);
    fn erase_cursor_to_screen(&mut self, protect: bool);
    fn erase_screen_to_cursor(&mut self, protect: bool);
    fn erase_screen(&mut self, protect: bool);

    fn set_flags(&mut self, flags: ScreenFlag);
    fn reset_flags(&mut self, flags: ScreenFlag);

    /// Set the scrolling region. `0` selects the screen edge; values clamp
    /// to the screen height.
    fn set_margins(&mut self, top: u32, bottom: u32);

    /// Attribute used for erased cells.
    fn set_def_attr(&mut self, attr: &CellAttr);

    /// Write one symbol at the cursor with the given attribute, honoring
    /// auto-wrap and insert mode, and advance the cursor.
    fn write(&mut self, sym: char, attr: &CellAttr);

    fn reset(&mut self);
    fn clear_scrollback(&mut self);
}
