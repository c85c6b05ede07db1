/*
 *  poller/mod.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Playback polling: decisions, top tracks cache, tick driver
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

pub mod machine;
pub mod top_cache;
pub mod runner;

pub use machine::{Action, DebounceCandidate, Decision, DisplayState, Phase, PlaybackMachine, Timing};
pub use top_cache::TopTracksCache;
pub use runner::{Poller, Screen, TickError, TickOutcome};
