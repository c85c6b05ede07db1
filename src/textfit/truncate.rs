/*
 *  textfit/truncate.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Single line truncation with an ellipsis marker
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

use super::metrics::{char_offset, TextMetrics};

/// Shorten `text` so it renders within `max_width` pixels.
///
/// Text that already fits is returned untouched. Otherwise the result is
/// the longest character prefix of `text` followed by the font's ellipsis
/// that still fits. When not even the bare ellipsis fits, the bare
/// ellipsis is returned and may overflow.
pub fn truncate<M: TextMetrics + ?Sized>(text: &str, font: &M, max_width: u32) -> String {
    if font.fits(text, max_width) {
        return text.to_string();
    }

    let ellipsis = font.ellipsis();
    let with_ellipsis = |k: usize| -> String {
        let mut s = String::with_capacity(text.len() + ellipsis.len());
        s.push_str(&text[..char_offset(text, k)]);
        s.push_str(ellipsis);
        s
    };

    // largest k in 0..=n with prefix(k) + ellipsis fitting
    let (mut lo, mut hi) = (0usize, text.chars().count());
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        if font.fits(&with_ellipsis(mid), max_width) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    with_ellipsis(lo)
}
