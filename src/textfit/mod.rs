/*
 *  textfit/mod.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fitting variable length text into fixed pixel columns
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

pub mod metrics;
pub mod truncate;
pub mod wrap;

pub use metrics::{FixedAdvance, TextMetrics, ASCII_ELLIPSIS, ELLIPSIS};
pub use truncate::truncate;
pub use wrap::{split_long_word, wrap};
