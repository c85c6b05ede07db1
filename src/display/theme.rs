/*
 *  display/theme.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Colours and typefaces for composed screens
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

use embedded_graphics::mono_font::iso_8859_1::{
    FONT_10X20, FONT_7X13, FONT_9X15_BOLD, FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// A font plus the vertical distance between consecutive lines set in it.
#[derive(Debug, Clone, Copy)]
pub struct Typeface {
    pub font: &'static MonoFont<'static>,
    pub pitch: u32,
}

impl Typeface {
    pub const fn new(font: &'static MonoFont<'static>, pitch: u32) -> Self {
        Self { font, pitch }
    }

    /// Glyph cell height.
    pub fn height(&self) -> u32 {
        self.font.character_size.height
    }
}

/// Everything visual that is not geometry.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Rgb888,
    pub taskbar_background: Rgb888,
    pub taskbar_rule: Rgb888,
    pub clock_color: Rgb888,
    pub title_color: Rgb888,
    pub artist_color: Rgb888,
    pub separator_color: Rgb888,

    /// Now playing title
    pub title: Typeface,
    /// Now playing artist
    pub artist: Typeface,
    /// Status bar clock and date
    pub clock: Typeface,
    /// Idle screen heading
    pub heading: Typeface,
    /// Idle screen entry title
    pub list_title: Typeface,
    /// Idle screen entry artist
    pub list_artist: Typeface,

    /// Gap below each idle screen entry
    pub block_spacing: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb888::WHITE,
            taskbar_background: Rgb888::BLACK,
            taskbar_rule: Rgb888::new(220, 220, 220),
            clock_color: Rgb888::WHITE,
            title_color: Rgb888::BLACK,
            artist_color: Rgb888::BLACK,
            separator_color: Rgb888::new(60, 60, 60),

            title: Typeface::new(&FONT_10X20, 24),
            artist: Typeface::new(&FONT_9X18_BOLD, 22),
            clock: Typeface::new(&FONT_9X18_BOLD, 22),
            heading: Typeface::new(&FONT_10X20, 24),
            list_title: Typeface::new(&FONT_9X15_BOLD, 18),
            list_artist: Typeface::new(&FONT_7X13, 16),

            block_spacing: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_clears_glyph_height() {
        let t = Theme::default();
        for face in [t.title, t.artist, t.clock, t.heading, t.list_title, t.list_artist] {
            assert!(face.pitch >= face.height());
        }
    }
}
