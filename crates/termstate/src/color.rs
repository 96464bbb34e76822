use serde::{Deserialize, Serialize};

/// Well-known palette slots. The first 16 are the ANSI colors, the last two
/// are the terminal default foreground/background which may differ from any
/// of the ANSI entries.
pub mod term_color {
    pub const BLACK: u8 = 0;
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const YELLOW: u8 = 3;
    pub const BLUE: u8 = 4;
    pub const MAGENTA: u8 = 5;
    pub const CYAN: u8 = 6;
    pub const LIGHT_GREY: u8 = 7;
    pub const DARK_GREY: u8 = 8;
    pub const LIGHT_RED: u8 = 9;
    pub const LIGHT_GREEN: u8 = 10;
    pub const LIGHT_YELLOW: u8 = 11;
    pub const LIGHT_BLUE: u8 = 12;
    pub const LIGHT_MAGENTA: u8 = 13;
    pub const LIGHT_CYAN: u8 = 14;
    pub const WHITE: u8 = 15;

    pub const FOREGROUND: u8 = 16;
    pub const BACKGROUND: u8 = 17;

    pub const COUNT: usize = 18;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn get_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Color {
            r: value.0,
            g: value.1,
            b: value.2,
        }
    }
}

impl From<[u8; 3]> for Color {
    fn from(value: [u8; 3]) -> Self {
        Color {
            r: value[0],
            g: value[1],
            b: value[2],
        }
    }
}

impl From<Color> for [u8; 3] {
    fn from(value: Color) -> [u8; 3] {
        [value.r, value.g, value.b]
    }
}
