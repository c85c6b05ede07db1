/*
 *  textfit/metrics.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text measurement capability used by all text fitting
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::mono_font::MonoFont;

/// Unicode horizontal ellipsis, used by fonts that carry the glyph.
pub const ELLIPSIS: &str = "\u{2026}";

/// Three full stops, for fonts limited to ASCII / Latin-1.
pub const ASCII_ELLIPSIS: &str = "...";

/// Measures the rendered width of a string in one font.
///
/// Implementations must be pure and deterministic for a fixed
/// `(text, font)` pair, and width must not shrink as characters are
/// appended. The wrapper and truncator binary-search on that property.
pub trait TextMetrics {
    /// Rendered width of `text` in pixels.
    fn measure_width(&self, text: &str) -> u32;

    /// Marker appended to truncated text.
    fn ellipsis(&self) -> &str {
        ELLIPSIS
    }

    /// Convenience: does `text` fit in `max_width` pixels?
    fn fits(&self, text: &str, max_width: u32) -> bool {
        self.measure_width(text) <= max_width
    }
}

/// Mono fonts advance by a fixed cell plus spacing; trailing spacing is
/// not part of the rendered width.
impl TextMetrics for MonoFont<'_> {
    fn measure_width(&self, text: &str) -> u32 {
        let chars = text.chars().count() as u32;
        (chars * (self.character_size.width + self.character_spacing))
            .saturating_sub(self.character_spacing)
    }

    fn ellipsis(&self) -> &str {
        // the embedded-graphics glyph sets stop at Latin-1
        ASCII_ELLIPSIS
    }
}

/// Deterministic fixed-advance metrics: every character is `advance` px.
///
/// Used where no rasterizer is wanted, e.g. unit tests and sizing
/// estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAdvance {
    pub advance: u32,
}

impl FixedAdvance {
    pub const fn new(advance: u32) -> Self {
        Self { advance }
    }
}

impl TextMetrics for FixedAdvance {
    fn measure_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.advance
    }
}

/// Byte offset of the `n`th character, or the string length.
pub(crate) fn char_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map(|(i, _)| i).unwrap_or(text.len())
}
