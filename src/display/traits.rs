/*
 *  display/traits.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display sink abstraction
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

use crate::display::error::DisplayError;
use crate::display::layout::PanelSpec;
use crate::vframebuf::RgbBitmap;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Physical panel size in pixels
    pub panel: PanelSpec,

    /// Human readable name for logs
    pub name: &'static str,
}

/// Minimal display abstraction - everything that can show a frame.
///
/// A sink receives one fully composed, opaque raster at exactly panel
/// size per call. It either shows the frame or returns an error; there is
/// no partial success.
pub trait DisplaySink {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.panel.width, caps.panel.height)
    }

    /// Show a complete frame.
    fn present(&mut self, frame: &RgbBitmap) -> Result<(), DisplayError>;

    /// Reject frames that do not match the panel before any output happens.
    fn check_frame(&self, frame: &RgbBitmap) -> Result<(), DisplayError> {
        let expected = self.dimensions();
        let actual = (frame.width() as u32, frame.height() as u32);
        if expected != actual {
            return Err(DisplayError::FrameSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn capabilities(&self) -> &DisplayCapabilities {
        (**self).capabilities()
    }

    fn present(&mut self, frame: &RgbBitmap) -> Result<(), DisplayError> {
        (**self).present(frame)
    }
}
