/*
 *  textfit/wrap.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Greedy word wrapping into a bounded number of lines
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
use super::truncate::truncate;

/// Wrap `text` into at most `max_lines` lines of `max_width` pixels.
///
/// Words wider than the column are broken into chunks that each fit;
/// chunks are never ellipsized. The ellipsis is reserved for text that
/// does not fit in the line budget, and it is applied to the last line
/// only, against everything that was left over.
///
/// A single glyph wider than `max_width` is emitted on its own line and
/// is the only case where a line may overflow.
pub fn wrap<M: TextMetrics + ?Sized>(
    text: &str,
    font: &M,
    max_width: u32,
    max_lines: usize,
) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }

    let mut words: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        if font.fits(word, max_width) {
            words.push(word.to_string());
        } else {
            words.extend(split_long_word(word, font, max_width));
        }
    }
    if words.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::with_capacity(max_lines);
    let mut current = String::new();
    let mut i = 0;

    while i < words.len() {
        let word = &words[i];
        let trial = if current.is_empty() {
            word.clone()
        } else {
            format!("{current} {word}")
        };

        if font.fits(&trial, max_width) {
            current = trial;
            i += 1;
            continue;
        }

        if current.is_empty() {
            // single glyph floor: nothing smaller to place
            lines.push(word.clone());
            i += 1;
        } else {
            lines.push(std::mem::take(&mut current));
        }

        if lines.len() == max_lines {
            if i < words.len() || !current.is_empty() {
                let rest = words[i..].join(" ");
                ellipsize_last(&mut lines, &rest, font, max_width);
            }
            return lines;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        let rest = lines.split_off(max_lines).join(" ");
        ellipsize_last(&mut lines, &rest, font, max_width);
    }

    lines
}

/// Split one overlong word into the fewest contiguous chunks that fit.
///
/// Every chunk holds at least one character, so a glyph wider than the
/// column still makes progress.
pub fn split_long_word<M: TextMetrics + ?Sized>(
    word: &str,
    font: &M,
    max_width: u32,
) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = word;

    while !rest.is_empty() {
        let n = rest.chars().count();
        let (mut lo, mut hi) = (1usize, n);
        let mut best = 1usize;
        while lo <= hi {
            let mid = (lo + hi) / 2;
            if font.fits(&rest[..char_offset(rest, mid)], max_width) {
                best = mid;
                lo = mid + 1;
            } else {
                hi = mid - 1;
            }
        }
        let split = char_offset(rest, best);
        chunks.push(rest[..split].to_string());
        rest = &rest[split..];
    }

    chunks
}

fn ellipsize_last<M: TextMetrics + ?Sized>(
    lines: &mut [String],
    rest: &str,
    font: &M,
    max_width: u32,
) {
    if let Some(last) = lines.last_mut() {
        let joined = format!("{last} {rest}");
        *last = truncate(joined.trim(), font, max_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textfit::metrics::{FixedAdvance, ELLIPSIS};

    const FONT: FixedAdvance = FixedAdvance::new(10);

    #[test]
    fn test_empty_and_blank_input() {
        assert!(wrap("", &FONT, 100, 3).is_empty());
        assert!(wrap("   \t\n ", &FONT, 100, 3).is_empty());
        assert!(wrap("words here", &FONT, 100, 0).is_empty());
    }

    #[test]
    fn test_greedy_packing_without_overflow() {
        let lines = wrap("The quick brown fox jumps over the lazy dog", &FONT, 100, 5);
        assert_eq!(lines, vec!["The quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(lines.iter().all(|l| !l.ends_with(ELLIPSIS)));
    }

    #[test]
    fn test_overflow_ellipsizes_last_line_with_all_remaining_text() {
        let lines = wrap("The quick brown fox jumps over the lazy dog", &FONT, 100, 3);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "The quick");
        assert_eq!(lines[1], "brown fox");
        assert_eq!(lines[2], format!("jumps ove{ELLIPSIS}"));
        assert!(!lines[0].ends_with(ELLIPSIS));
        assert!(!lines[1].ends_with(ELLIPSIS));
    }

    #[test]
    fn test_single_line_budget() {
        let lines = wrap("Don't Stop Me Now", &FONT, 100, 1);
        assert_eq!(lines, vec![format!("Don't Sto{ELLIPSIS}")]);
    }

    #[test]
    fn test_long_word_is_broken_not_ellipsized() {
        let lines = wrap("a Supercalifragilistic b", &FONT, 100, 5);
        assert_eq!(lines, vec!["a", "Supercalif", "ragilistic", "b"]);
    }

    #[test]
    fn test_split_long_word_reassembles() {
        let word = "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC";
        let chunks = split_long_word(word, &FONT, 100);
        assert!(chunks.len() >= 2);
        assert_eq!(chunks.concat(), word);
        for c in &chunks {
            assert!(FONT.measure_width(c) <= 100);
            assert!(!c.ends_with(ELLIPSIS));
        }
        // minimal: all chunks but the last are full
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.chars().count(), 10);
        }
    }

    #[test]
    fn test_glyph_wider_than_column_still_progresses() {
        let lines = wrap("abc", &FONT, 5, 5);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_line_budget_and_width_hold_across_widths() {
        let text = "Everybody Wants To Rule The World - 2014 Remaster featuring nobody";
        for max_width in [40u32, 70, 100, 130, 250] {
            for max_lines in 1..=6 {
                let lines = wrap(text, &FONT, max_width, max_lines);
                assert!(lines.len() <= max_lines);
                for (i, l) in lines.iter().enumerate() {
                    assert!(FONT.measure_width(l) <= max_width, "{max_width}/{max_lines}: {l}");
                    if i + 1 < lines.len() {
                        assert!(!l.ends_with(ELLIPSIS));
                    }
                }
            }
        }
    }

    #[test]
    fn test_exact_fit_has_no_ellipsis() {
        let lines = wrap("abcde fghij", &FONT, 50, 2);
        assert_eq!(lines, vec!["abcde", "fghij"]);
    }
}
