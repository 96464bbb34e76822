use crate::color::{Color, term_color};
use crate::palette::Palette;

/// A foreground or background color as carried by the character attribute.
///
/// `Indexed` holds a slot of the active palette and is resolved lazily so
/// that palette switches and bold promotion affect already-set attributes.
/// `Rgb` is an explicit 24-bit color (SGR 38;2 / 48;2 and the 256-color cube)
/// and bypasses the palette entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    Indexed(u8),
    Rgb(Color),
}

/// The current character attribute of the emulator.
///
/// Colors stay in their semantic form here; [`Attribute::resolve`] turns the
/// attribute into concrete RGB values right before a cell is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub fg: ColorSpec,
    pub bg: ColorSpec,

    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub blink: bool,
    pub protect: bool,
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute {
            fg: ColorSpec::Indexed(term_color::FOREGROUND),
            bg: ColorSpec::Indexed(term_color::BACKGROUND),
            bold: false,
            italic: false,
            underline: false,
            inverse: false,
            blink: false,
            protect: false,
        }
    }
}

/// A fully resolved attribute as handed to the screen: both colors are
/// concrete RGB values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellAttr {
    pub fg: Color,
    pub bg: Color,

    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub blink: bool,
    pub protect: bool,
}

impl Attribute {
    /// Convert the semantic colors into RGB against the given palette.
    ///
    /// Bold promotes a dark foreground palette index (0-7) to its light
    /// variant (8-15) so bold text stands out even when the renderer has no
    /// bold font. Out-of-range indices clamp to the default slots.
    pub fn resolve(&self, palette: &Palette) -> CellAttr {
        let fg = match self.fg {
            ColorSpec::Indexed(code) => {
                let mut code = code;
                if self.bold && code < 8 {
                    code += 8;
                }
                if code as usize >= term_color::COUNT {
                    code = term_color::FOREGROUND;
                }
                palette.color(code)
            }
            ColorSpec::Rgb(rgb) => rgb,
        };
        let bg = match self.bg {
            ColorSpec::Indexed(code) => {
                let mut code = code;
                if code as usize >= term_color::COUNT {
                    code = term_color::BACKGROUND;
                }
                palette.color(code)
            }
            ColorSpec::Rgb(rgb) => rgb,
        };

        CellAttr {
            fg,
            bg,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            inverse: self.inverse,
            blink: self.blink,
            protect: self.protect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_promotes_dark_foreground() {
        let palette = Palette::default();
        let attr = Attribute {
            fg: ColorSpec::Indexed(term_color::RED),
            bold: true,
            ..Default::default()
        };
        let cell = attr.resolve(&palette);
        assert_eq!(cell.fg, palette.color(term_color::LIGHT_RED));
    }

    #[test]
    fn bold_does_not_promote_background() {
        let palette = Palette::default();
        let attr = Attribute {
            bg: ColorSpec::Indexed(term_color::RED),
            bold: true,
            ..Default::default()
        };
        let cell = attr.resolve(&palette);
        assert_eq!(cell.bg, palette.color(term_color::RED));
    }

    #[test]
    fn rgb_colors_bypass_the_palette() {
        let palette = Palette::default();
        let attr = Attribute {
            fg: ColorSpec::Rgb(Color::new(10, 20, 30)),
            bold: true,
            ..Default::default()
        };
        let cell = attr.resolve(&palette);
        assert_eq!(cell.fg, Color::new(10, 20, 30));
    }
}
