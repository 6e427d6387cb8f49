//! Color tables addressed by pixel index.
//!
//! A [`Palette`] is shared by a whole stream (the global palette) or private
//! to a single frame. Transforms rewrite its entries in place but never change
//! how many entries it holds.
//!
//! # Text Format
//!
//! The text form is what external color filters read and write: one color per
//! line, three decimal components in palette index order.
//!
//! ```text
//! 0 0 0
//! 255 255 255
//! 10 128 200
//! ```
//!
//! When reading, blank lines and comments (`;` or `#` followed by anything
//! other than six hex digits) are skipped, and `#rrggbb` lines are accepted.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading a palette in text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    /// A line could not be read as a color.
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// A single palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Fixed pixel index. Color-change rules with this set match by index
    /// instead of by RGB value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel: Option<u32>,
}

impl Color {
    /// Create a color with no fixed pixel index.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            pixel: None,
        }
    }

    /// Create a color that addresses palette slot `pixel` directly.
    pub const fn at_index(pixel: u32) -> Self {
        Self {
            red: 0,
            green: 0,
            blue: 0,
            pixel: Some(pixel),
        }
    }

    /// Compare red, green and blue only.
    #[inline]
    pub fn same_rgb(&self, other: &Color) -> bool {
        self.red == other.red && self.green == other.green && self.blue == other.blue
    }

    /// Convert to an `image` RGBA pixel.
    pub fn to_rgba(self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.red, self.green, self.blue, alpha])
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(value: image::Rgb<u8>) -> Self {
        let [red, green, blue] = value.0;
        Color::rgb(red, green, blue)
    }
}

impl From<[u8; 3]> for Color {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Color::rgb(red, green, blue)
    }
}

/// Ordered color table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette from its entries.
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Create a palette from plain RGB triples.
    pub fn from_rgb(colors: &[[u8; 3]]) -> Self {
        Self {
            colors: colors.iter().copied().map(Color::from).collect(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Color> {
        self.colors.get(index)
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Mutable access to the entries. The slice can't grow or shrink.
    pub fn colors_mut(&mut self) -> &mut [Color] {
        &mut self.colors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.colors.iter()
    }

    /// Render the palette in text form, one `red green blue` line per entry.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.colors.len() * 12);
        for color in &self.colors {
            // Writing to a String can't fail.
            let _ = writeln!(out, "{} {} {}", color.red, color.green, color.blue);
        }
        out
    }

    /// Parse a palette from text form.
    ///
    /// # Errors
    ///
    /// Returns `PaletteError::Malformed` for the first line that isn't a
    /// color, a comment or blank.
    pub fn parse_text(text: &str) -> Result<Palette, PaletteError> {
        let mut colors = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if let Some(hex) = line.strip_prefix('#') {
                if let Some(color) = parse_hex(hex) {
                    colors.push(color);
                }
                continue;
            }
            colors.push(parse_triple(line).map_err(|message| PaletteError::Malformed {
                line: number + 1,
                message,
            })?);
        }
        Ok(Palette { colors })
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

/// Parse `rrggbb`. Anything else is treated as a comment by the caller.
fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let component = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::rgb(component(0..2)?, component(2..4)?, component(4..6)?))
}

fn parse_triple(line: &str) -> Result<Color, String> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty());

    let mut component = |name: &str| -> Result<u8, String> {
        let part = parts
            .next()
            .ok_or_else(|| format!("missing {name} component"))?;
        part.parse::<u8>()
            .map_err(|_| format!("{name} component '{part}' is not in 0-255"))
    };

    let red = component("red")?;
    let green = component("green")?;
    let blue = component("blue")?;
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected trailing value '{extra}'"));
    }
    Ok(Color::rgb(red, green, blue))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: text output is read back as the same colors.
        #[test]
        fn prop_text_form_is_readable(
            colors in prop::collection::vec(any::<[u8; 3]>(), 0..64),
        ) {
            let palette = Palette::from_rgb(&colors);
            let parsed = Palette::parse_text(&palette.to_text()).unwrap();
            prop_assert_eq!(parsed, palette);
        }
    }
}
