/*
 *  vframebuf.rs
 * 
 *  NowInk - now playing, on paper
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{PixelColor, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

/// Full colour raster, the unit handed to display sinks.
pub type RgbBitmap = VarFrameBuf<Rgb888>;

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    /// Wrap an existing row-major pixel vector. Returns None on a size mismatch.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<C>) -> Option<Self> {
        let (w, h) = (width as usize, height as usize);
        (pixels.len() == w * h).then_some(Self { buf: pixels, w, h })
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<C> {
        (x < self.w && y < self.h).then(|| self.buf[y * self.w + x])
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }

    /// Rotate a quarter turn counter-clockwise; width and height swap.
    pub fn rotate_90_ccw(&self) -> Self {
        let (w, h) = (self.w, self.h);
        let mut buf = Vec::with_capacity(w * h);
        // destination is h wide, w tall
        for y in 0..w {
            for x in 0..h {
                buf.push(self.buf[x * w + (w - 1 - y)]);
            }
        }
        Self { buf, w: h, h: w }
    }

    /// Rotate a half turn in place.
    pub fn rotate_180(&mut self) {
        self.buf.reverse();
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // area may hang off any edge; clip per pixel
        for (p, c) in area.points().zip(colors) {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        let Size { width, height } = clipped.size;
        if width == 0 || height == 0 { return Ok(()); }
        let (x0, y0) = (clipped.top_left.x as usize, clipped.top_left.y as usize);
        for row in y0..y0 + height as usize {
            let base = row * self.w;
            self.buf[base + x0..base + x0 + width as usize].fill(color);
        }
        Ok(())
    }
}
