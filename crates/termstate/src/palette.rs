use crate::color::{Color, term_color};

pub type PaletteTable = [Color; term_color::COUNT];

// Entries are ordered by the `term_color` slots: the 16 ANSI colors followed
// by the default foreground and background.
const DEFAULT: PaletteTable = [
    Color::new(0, 0, 0),       // black
    Color::new(205, 0, 0),     // red
    Color::new(0, 205, 0),     // green
    Color::new(205, 205, 0),   // yellow
    Color::new(0, 0, 238),     // blue
    Color::new(205, 0, 205),   // magenta
    Color::new(0, 205, 205),   // cyan
    Color::new(229, 229, 229), // light grey
    Color::new(127, 127, 127), // dark grey
    Color::new(255, 0, 0),     // light red
    Color::new(0, 255, 0),     // light green
    Color::new(255, 255, 0),   // light yellow
    Color::new(92, 92, 255),   // light blue
    Color::new(255, 0, 255),   // light magenta
    Color::new(0, 255, 255),   // light cyan
    Color::new(255, 255, 255), // white
    Color::new(229, 229, 229), // foreground
    Color::new(0, 0, 0),       // background
];

const SOLARIZED: PaletteTable = [
    Color::new(7, 54, 66),
    Color::new(220, 50, 47),
    Color::new(133, 153, 0),
    Color::new(181, 137, 0),
    Color::new(38, 139, 210),
    Color::new(211, 54, 130),
    Color::new(42, 161, 152),
    Color::new(238, 232, 213),
    Color::new(0, 43, 54),
    Color::new(203, 75, 22),
    Color::new(88, 110, 117),
    Color::new(101, 123, 131),
    Color::new(131, 148, 150),
    Color::new(108, 113, 196),
    Color::new(147, 161, 161),
    Color::new(253, 246, 227),
    Color::new(238, 232, 213),
    Color::new(7, 54, 66),
];

const SOLARIZED_BLACK: PaletteTable = [
    Color::new(0, 0, 0),
    Color::new(220, 50, 47),
    Color::new(133, 153, 0),
    Color::new(181, 137, 0),
    Color::new(38, 139, 210),
    Color::new(211, 54, 130),
    Color::new(42, 161, 152),
    Color::new(238, 232, 213),
    Color::new(0, 43, 54),
    Color::new(203, 75, 22),
    Color::new(88, 110, 117),
    Color::new(101, 123, 131),
    Color::new(131, 148, 150),
    Color::new(108, 113, 196),
    Color::new(147, 161, 161),
    Color::new(253, 246, 227),
    Color::new(238, 232, 213),
    Color::new(0, 0, 0),
];

const SOLARIZED_WHITE: PaletteTable = [
    Color::new(7, 54, 66),
    Color::new(220, 50, 47),
    Color::new(133, 153, 0),
    Color::new(181, 137, 0),
    Color::new(38, 139, 210),
    Color::new(211, 54, 130),
    Color::new(42, 161, 152),
    Color::new(238, 232, 213),
    Color::new(0, 43, 54),
    Color::new(203, 75, 22),
    Color::new(88, 110, 117),
    Color::new(101, 123, 131),
    Color::new(131, 148, 150),
    Color::new(108, 113, 196),
    Color::new(147, 161, 161),
    Color::new(253, 246, 227),
    Color::new(7, 54, 66),
    Color::new(238, 232, 213),
];

const SOFT_BLACK: PaletteTable = [
    Color::new(0x3f, 0x3f, 0x3f),
    Color::new(0x70, 0x50, 0x50),
    Color::new(0x60, 0xb4, 0x8a),
    Color::new(0xdf, 0xaf, 0x8f),
    Color::new(0x9a, 0xb8, 0xd7),
    Color::new(0xdc, 0x8c, 0xc3),
    Color::new(0x8c, 0xd0, 0xd3),
    Color::new(0xff, 0xff, 0xff),
    Color::new(0x70, 0x90, 0x80),
    Color::new(0xdc, 0xa3, 0xa3),
    Color::new(0x72, 0xd5, 0xa3),
    Color::new(0xf0, 0xdf, 0xaf),
    Color::new(0x94, 0xbf, 0xf3),
    Color::new(0xec, 0x93, 0xd3),
    Color::new(0x93, 0xe0, 0xe3),
    Color::new(0xdc, 0xdc, 0xcc),
    Color::new(0xdc, 0xdc, 0xcc),
    Color::new(0x2c, 0x2c, 0x2c),
];

const BASE16_DARK: PaletteTable = [
    Color::new(0x00, 0x00, 0x00),
    Color::new(0xab, 0x46, 0x42), // base08
    Color::new(0xa1, 0xb5, 0x6c), // base0B
    Color::new(0xf7, 0xca, 0x88), // base0A
    Color::new(0x7c, 0xaf, 0xc2), // base0D
    Color::new(0xba, 0x8b, 0xaf), // base0E
    Color::new(0x86, 0xc1, 0xb9), // base0C
    Color::new(0xaa, 0xaa, 0xaa),
    Color::new(0x55, 0x55, 0x55),
    Color::new(0xab, 0x46, 0x42),
    Color::new(0xa1, 0xb5, 0x6c),
    Color::new(0xf7, 0xca, 0x88),
    Color::new(0x7c, 0xaf, 0xc2),
    Color::new(0xba, 0x8b, 0xaf),
    Color::new(0x86, 0xc1, 0xb9),
    Color::new(0xff, 0xff, 0xff),
    Color::new(0xd8, 0xd8, 0xd8),
    Color::new(0x18, 0x18, 0x18),
];

const BASE16_LIGHT: PaletteTable = [
    Color::new(0x00, 0x00, 0x00),
    Color::new(0xab, 0x46, 0x42),
    Color::new(0xa1, 0xb5, 0x6c),
    Color::new(0xf7, 0xca, 0x88),
    Color::new(0x7c, 0xaf, 0xc2),
    Color::new(0xba, 0x8b, 0xaf),
    Color::new(0x86, 0xc1, 0xb9),
    Color::new(0xaa, 0xaa, 0xaa),
    Color::new(0x55, 0x55, 0x55),
    Color::new(0xab, 0x46, 0x42),
    Color::new(0xa1, 0xb5, 0x6c),
    Color::new(0xf7, 0xca, 0x88),
    Color::new(0x7c, 0xaf, 0xc2),
    Color::new(0xba, 0x8b, 0xaf),
    Color::new(0x86, 0xc1, 0xb9),
    Color::new(0xff, 0xff, 0xff),
    Color::new(0x18, 0x18, 0x18),
    Color::new(0xd8, 0xd8, 0xd8),
];

/// An 18-entry color table: 16 ANSI colors plus default foreground and
/// background. Bold promotion (dark color + bold renders as the light
/// variant) happens during attribute resolution, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: PaletteTable,
}

impl Default for Palette {
    fn default() -> Self {
        Palette { colors: DEFAULT }
    }
}

impl Palette {
    /// Look up a palette by its configuration name. Unknown names and a
    /// `"custom"` selection without installed storage fall back to the
    /// built-in default.
    pub fn resolve(name: Option<&str>, custom: Option<&PaletteTable>) -> Self {
        let colors = match name {
            Some("custom") => match custom {
                Some(table) => *table,
                None => DEFAULT,
            },
            Some("solarized") => SOLARIZED,
            Some("solarized-black") => SOLARIZED_BLACK,
            Some("solarized-white") => SOLARIZED_WHITE,
            Some("soft-black") => SOFT_BLACK,
            Some("base16-dark") => BASE16_DARK,
            Some("base16-light") => BASE16_LIGHT,
            _ => DEFAULT,
        };
        Palette { colors }
    }

    pub fn color(&self, index: u8) -> Color {
        self.colors[index as usize]
    }
}
