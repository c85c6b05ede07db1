/*
 *  display/framebuffer.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Orientation aware composition canvas
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

use crate::display::layout::{Orientation, PanelSpec, Rotation};
use crate::vframebuf::RgbBitmap;

/// Surface a screen is composed on.
///
/// The canvas is sized for the configured orientation; [`Canvas::finish`]
/// maps it onto the physical panel so sinks only ever see panel sized
/// frames.
pub struct Canvas {
    bitmap: RgbBitmap,
    orientation: Orientation,
}

impl Canvas {
    pub fn new(panel: PanelSpec, orientation: Orientation, fill: Rgb888) -> Self {
        let (w, h) = orientation.canvas_size(panel);
        Self {
            bitmap: RgbBitmap::new(w, h, fill),
            orientation,
        }
    }

    pub fn bitmap_mut(&mut self) -> &mut RgbBitmap {
        &mut self.bitmap
    }

    /// Consume the canvas and produce the panel frame.
    pub fn finish(self) -> RgbBitmap {
        let mut frame = match self.orientation.rotation {
            Rotation::Landscape => self.bitmap,
            Rotation::Portrait => self.bitmap.rotate_90_ccw(),
        };
        if self.orientation.flip_180 {
            frame.rotate_180();
        }
        frame
    }
}
