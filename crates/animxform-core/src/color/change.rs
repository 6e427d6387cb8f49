//! Rule-based palette entry replacement.

use serde::{Deserialize, Serialize};

use crate::palette::{Color, Palette};

/// Replace `old` with `new`.
///
/// `old` matches by RGB value, or by palette index when `old.pixel` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorChange {
    pub old: Color,
    pub new: Color,
}

impl ColorChange {
    pub fn new(old: Color, new: Color) -> Self {
        Self { old, new }
    }

    /// Check if this rule applies to `color` at palette slot `index`.
    #[inline]
    pub fn matches(&self, index: usize, color: &Color) -> bool {
        match self.old.pixel {
            Some(pixel) => pixel as usize == index,
            None => self.old.same_rgb(color),
        }
    }
}

/// Apply `changes` to every palette entry.
///
/// Rules are tried in order and the first match wins; later rules are not
/// consulted for that entry, even if they'd match the replacement color.
pub fn apply_color_changes(palette: &mut Palette, changes: &[ColorChange]) {
    for (index, color) in palette.colors_mut().iter_mut().enumerate() {
        if let Some(change) = changes.iter().find(|change| change.matches(index, color)) {
            *color = Color::rgb(change.new.red, change.new.green, change.new.blue);
        }
    }
}
