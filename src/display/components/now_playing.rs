/*
 *  display/components/now_playing.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Now playing screen: art square, title, artist and status bar
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::display::components::column::TextColumn;
use crate::display::components::status_bar::{render_status_bar, StatusLine};
use crate::display::layout::ResolvedLayout;
use crate::display::theme::Theme;
use crate::textfit::wrap;
use crate::vframebuf::RgbBitmap;

pub const TITLE_MAX_LINES: usize = 7;
pub const ARTIST_MAX_LINES: usize = 4;

const COLUMN_TOP: u32 = 8;
const RULE_THICKNESS: u32 = 2;

/// Inputs for one now playing frame.
#[derive(Debug, Clone, Copy)]
pub struct NowPlaying<'a> {
    pub title: &'a str,
    pub artists: &'a str,
    /// Cover art already scaled to the art square; empty for none.
    pub art: &'a RgbBitmap,
}

/// Paint the art square at the origin of `target`.
///
/// `art` is expected at `art_side` square; anything it does not cover
/// keeps `fill`, anything beyond the square is clipped.
pub(crate) fn place_art<D>(
    target: &mut D,
    art: &RgbBitmap,
    layout: &ResolvedLayout,
    fill: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let side = layout.art_side;
    if side == 0 {
        return Ok(());
    }
    let area = Rectangle::new(Point::zero(), Size::new(side, side));
    let mut square = target.clipped(&area);
    square.fill_solid(&area, fill)?;
    square.fill_contiguous(
        &Rectangle::new(Point::zero(), art.size()),
        art.as_slice().iter().copied(),
    )
}

/// Compose the whole now playing screen.
///
/// Title and artist are wrapped independently; a separator rule sits
/// between them only when both have content. The status bar is painted
/// last.
pub fn compose_now_playing<D>(
    target: &mut D,
    layout: &ResolvedLayout,
    theme: &Theme,
    screen: &NowPlaying<'_>,
    status: &StatusLine,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    target.clear(theme.background)?;
    place_art(target, screen.art, layout, theme.background)?;

    if layout.has_column() {
        let mut col = TextColumn::new(layout, COLUMN_TOP);
        let width = col.width();
        let title_lines = wrap(screen.title, theme.title.font, width, TITLE_MAX_LINES);
        let artist_lines = wrap(screen.artists, theme.artist.font, width, ARTIST_MAX_LINES);

        col.draw_lines(target, &title_lines, &theme.title, theme.title_color)?;

        if !title_lines.is_empty() && !artist_lines.is_empty() {
            col.advance(4);
            col.rule(target, theme.separator_color, RULE_THICKNESS)?;
            col.advance(8);
        } else {
            col.advance(6);
        }

        col.draw_lines(target, &artist_lines, &theme.artist, theme.artist_color)?;
    }

    render_status_bar(target, layout, theme, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::layout::LayoutConstraints;

    fn frame(title: &str, artists: &str, art: &RgbBitmap) -> (RgbBitmap, Theme) {
        let layout = LayoutConstraints::default().resolve_for(600, 448);
        let theme = Theme::default();
        let mut fb = RgbBitmap::new(600, 448, Rgb888::new(1, 2, 3));
        let screen = NowPlaying { title, artists, art };
        compose_now_playing(&mut fb, &layout, &theme, &screen, &StatusLine::default()).ok();
        (fb, theme)
    }

    fn column_has(fb: &RgbBitmap, color: Rgb888) -> bool {
        (0..408).any(|y| (420..588).any(|x| fb.pixel(x, y) == Some(color)))
    }

    #[test]
    fn test_art_fills_square() {
        let art = RgbBitmap::new(408, 408, Rgb888::RED);
        let (fb, theme) = frame("Song", "Band", &art);
        assert_eq!(fb.pixel(0, 0), Some(Rgb888::RED));
        assert_eq!(fb.pixel(407, 406), Some(Rgb888::RED));
        assert_eq!(fb.pixel(408, 0), Some(theme.background));
    }

    #[test]
    fn test_bar_rule_overlays_last_art_row() {
        let art = RgbBitmap::new(408, 408, Rgb888::RED);
        let (fb, theme) = frame("Song", "Band", &art);
        assert!((0..408).all(|x| fb.pixel(x, 407) == Some(theme.taskbar_rule)));
    }

    #[test]
    fn test_oversized_art_is_clipped_to_square() {
        let art = RgbBitmap::new(640, 480, Rgb888::RED);
        let (fb, theme) = frame("", "", &art);
        assert_eq!(fb.pixel(300, 300), Some(Rgb888::RED));
        assert_eq!(fb.pixel(500, 100), Some(theme.background));
    }

    #[test]
    fn test_undersized_art_leaves_fill() {
        let art = RgbBitmap::new(100, 100, Rgb888::RED);
        let (fb, theme) = frame("Song", "Band", &art);
        assert_eq!(fb.pixel(50, 50), Some(Rgb888::RED));
        assert_eq!(fb.pixel(200, 200), Some(theme.background));
    }

    #[test]
    fn test_title_and_rule_when_both_present() {
        let art = RgbBitmap::new(10, 10, Rgb888::RED);
        let (fb, theme) = frame("Song", "Band", &art);
        assert!(column_has(&fb, theme.title_color));
        assert!(column_has(&fb, theme.separator_color));
    }

    #[test]
    fn test_no_rule_without_artist() {
        let art = RgbBitmap::new(10, 10, Rgb888::RED);
        let (fb, theme) = frame("Song", "", &art);
        assert!(column_has(&fb, theme.title_color));
        assert!(!column_has(&fb, theme.separator_color));
    }

    #[test]
    fn test_empty_art_leaves_background() {
        let art = RgbBitmap::new(0, 0, Rgb888::RED);
        let (fb, theme) = frame("Song", "Band", &art);
        assert_eq!(fb.pixel(100, 100), Some(theme.background));
    }

    #[test]
    fn test_no_column_on_narrow_canvas() {
        let layout = LayoutConstraints::default().resolve_for(100, 448);
        let theme = Theme::default();
        let art = RgbBitmap::new(10, 10, Rgb888::RED);
        let mut fb = RgbBitmap::new(100, 448, Rgb888::WHITE);
        let screen = NowPlaying { title: "Song", artists: "Band", art: &art };
        compose_now_playing(&mut fb, &layout, &theme, &screen, &StatusLine::default()).ok();
        assert!(!fb.as_slice().iter().any(|c| *c == theme.separator_color));
    }
}
