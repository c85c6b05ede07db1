/*
 *  display/components/column.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text column cursor shared by the screen composers
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

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};

use crate::display::layout::ResolvedLayout;
use crate::display::theme::Typeface;

/// Vertical cursor over the text column right of the art square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextColumn {
    x: i32,
    y: i32,
    width: u32,
    bottom: i32,
}

impl TextColumn {
    /// Column starting `top_pad` pixels below the canvas top and ending at
    /// the status bar.
    pub fn new(layout: &ResolvedLayout, top_pad: u32) -> Self {
        Self {
            x: layout.column_x0 as i32,
            y: top_pad as i32,
            width: layout.column_width,
            bottom: layout.column_height() as i32,
        }
    }

    pub fn cursor(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn advance(&mut self, px: u32) {
        self.y += px as i32;
    }

    /// True when a block `needed` pixels tall still ends above the bar.
    pub fn fits(&self, needed: u32) -> bool {
        self.y + needed as i32 <= self.bottom
    }

    /// Draw one line at the cursor without moving it.
    pub fn draw_line<D>(
        &self,
        target: &mut D,
        line: &str,
        face: &Typeface,
        color: Rgb888,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let style = MonoTextStyle::new(face.font, color);
        Text::with_baseline(line, Point::new(self.x, self.y), style, Baseline::Top)
            .draw(target)?;
        Ok(())
    }

    /// Draw lines top to bottom, advancing one pitch per line.
    pub fn draw_lines<D, S>(
        &mut self,
        target: &mut D,
        lines: &[S],
        face: &Typeface,
        color: Rgb888,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
        S: AsRef<str>,
    {
        for line in lines {
            self.draw_line(target, line.as_ref(), face, color)?;
            self.advance(face.pitch);
        }
        Ok(())
    }

    /// Horizontal rule half the column wide, centred, at the cursor.
    pub fn rule<D>(&self, target: &mut D, color: Rgb888, thickness: u32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let line_w = (self.width / 2) as i32;
        let x0 = self.x + (self.width as i32 - line_w) / 2;
        Line::new(Point::new(x0, self.y), Point::new(x0 + line_w, self.y))
            .into_styled(PrimitiveStyle::with_stroke(color, thickness))
            .draw(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::layout::LayoutConstraints;
    use crate::display::theme::Theme;
    use crate::vframebuf::RgbBitmap;

    fn layout() -> ResolvedLayout {
        LayoutConstraints::default().resolve_for(600, 448)
    }

    #[test]
    fn test_column_origin_and_bottom() {
        let col = TextColumn::new(&layout(), 8);
        assert_eq!(col.cursor(), 8);
        assert_eq!(col.width(), 168);
        assert!(col.fits(400));
        assert!(!col.fits(401));
    }

    #[test]
    fn test_draw_lines_advances_by_pitch() {
        let theme = Theme::default();
        let mut fb = RgbBitmap::new(600, 448, Rgb888::WHITE);
        let mut col = TextColumn::new(&layout(), 8);
        col.draw_lines(&mut fb, &["one", "two"], &theme.title, Rgb888::BLACK).ok();
        assert_eq!(col.cursor(), 8 + 2 * theme.title.pitch as i32);

        let inked = fb.as_slice().iter().filter(|c| **c == Rgb888::BLACK).count();
        assert!(inked > 0);
        // nothing lands left of the column
        for y in 0..448 {
            for x in 0..420 {
                assert_eq!(fb.pixel(x, y), Some(Rgb888::WHITE));
            }
        }
    }

    #[test]
    fn test_rule_is_centred_half_width() {
        let mut fb = RgbBitmap::new(600, 448, Rgb888::WHITE);
        let col = TextColumn::new(&layout(), 100);
        col.rule(&mut fb, Rgb888::BLACK, 2).ok();
        // 168 wide column at x=420; rule spans 84px starting at 462
        assert_eq!(fb.pixel(470, 100), Some(Rgb888::BLACK));
        assert_eq!(fb.pixel(425, 100), Some(Rgb888::WHITE));
        assert_eq!(fb.pixel(560, 100), Some(Rgb888::WHITE));
    }
}
