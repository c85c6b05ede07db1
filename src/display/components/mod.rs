/*
 *  display/components/mod.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen composers
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

pub mod column;
pub mod now_playing;
pub mod status_bar;
pub mod top_tracks;

// Re-exports
pub use column::TextColumn;
pub use now_playing::{compose_now_playing, NowPlaying};
pub use status_bar::{clock_text_round10, date_text, render_status_bar, StatusLine};
pub use top_tracks::compose_top_tracks;
