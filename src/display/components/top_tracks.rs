/*
 *  display/components/top_tracks.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Idle screen: hero art and the week's top tracks
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

use crate::display::components::column::TextColumn;
use crate::display::components::now_playing::place_art;
use crate::display::components::status_bar::{render_status_bar, StatusLine};
use crate::display::layout::ResolvedLayout;
use crate::display::theme::Theme;
use crate::service::TrackSummary;
use crate::textfit::{truncate, wrap};
use crate::vframebuf::RgbBitmap;

pub const HEADING: &str = "Top this week";
pub const HEADING_MAX_LINES: usize = 2;
pub const ENTRY_TITLE_MAX_LINES: usize = 2;
/// Entries considered for the list; fewer are drawn when they do not fit.
pub const MAX_ENTRIES: usize = 5;

const COLUMN_TOP: u32 = 8;

/// Compose the idle screen and return how many entries made it on.
///
/// `hero` is the cover of the first entry. An empty list yields a blank
/// screen with only the status bar. Entries are laid out top down and
/// the list stops at the first entry that would cross into the bar.
pub fn compose_top_tracks<D>(
    target: &mut D,
    layout: &ResolvedLayout,
    theme: &Theme,
    items: &[TrackSummary],
    hero: Option<&RgbBitmap>,
    status: &StatusLine,
) -> Result<usize, D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    target.clear(theme.background)?;
    let mut drawn = 0;

    if !items.is_empty() {
        if let Some(art) = hero {
            place_art(target, art, layout, theme.background)?;
        }
        if layout.has_column() {
            drawn = draw_list(target, layout, theme, items)?;
        }
    }

    render_status_bar(target, layout, theme, status)?;
    Ok(drawn)
}

fn draw_list<D>(
    target: &mut D,
    layout: &ResolvedLayout,
    theme: &Theme,
    items: &[TrackSummary],
) -> Result<usize, D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let mut col = TextColumn::new(layout, COLUMN_TOP);
    let width = col.width();

    let heading = wrap(HEADING, theme.heading.font, width, HEADING_MAX_LINES);
    col.draw_lines(target, &heading, &theme.heading, theme.title_color)?;
    col.advance(8);

    let mut drawn = 0;
    for item in items.iter().take(MAX_ENTRIES) {
        let title_lines = wrap(&item.title, theme.list_title.font, width, ENTRY_TITLE_MAX_LINES);
        let artist_line = truncate(&item.artists, theme.list_artist.font, width);

        let needed = theme.list_title.pitch * title_lines.len() as u32
            + theme.list_artist.pitch
            + theme.block_spacing;
        if !col.fits(needed) {
            break;
        }

        col.draw_lines(target, &title_lines, &theme.list_title, theme.title_color)?;
        col.draw_line(target, &artist_line, &theme.list_artist, theme.artist_color)?;
        col.advance(theme.list_artist.pitch + theme.block_spacing);
        drawn += 1;
    }
    Ok(drawn)
}
