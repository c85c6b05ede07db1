/*
 *  display/drivers/mod.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame sink implementations
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

pub mod mock;
pub mod ppm;

use crate::display::error::DisplayError;
use crate::display::layout::PanelSpec;
use crate::display::traits::{DisplayCapabilities, DisplaySink};
use crate::vframebuf::RgbBitmap;

pub use mock::MockDriver;
pub use ppm::PpmSink;

/// Accepts and drops every frame (dry runs).
#[derive(Debug)]
pub struct NullSink {
    capabilities: DisplayCapabilities,
}

impl NullSink {
    pub fn new(panel: PanelSpec) -> Self {
        Self {
            capabilities: DisplayCapabilities { panel, name: "null" },
        }
    }
}

impl DisplaySink for NullSink {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn present(&mut self, frame: &RgbBitmap) -> Result<(), DisplayError> {
        self.check_frame(frame)
    }
}
