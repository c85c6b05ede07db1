/*
 *  display/drivers/ppm.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  File sink writing each frame as a binary PPM image
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

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::RgbColor;
use log::debug;

use crate::display::error::DisplayError;
use crate::display::layout::PanelSpec;
use crate::display::traits::{DisplayCapabilities, DisplaySink};
use crate::vframebuf::RgbBitmap;

/// Writes every presented frame to one PPM file.
///
/// The frame is written to a sibling temp file first and renamed into
/// place, so a reader never sees half a frame.
#[derive(Debug)]
pub struct PpmSink {
    capabilities: DisplayCapabilities,
    path: PathBuf,
}

impl PpmSink {
    pub fn new(panel: PanelSpec, path: impl Into<PathBuf>) -> Self {
        Self {
            capabilities: DisplayCapabilities { panel, name: "ppm" },
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Serialize a bitmap as P6.
pub fn write_ppm<W: Write>(out: &mut W, frame: &RgbBitmap) -> std::io::Result<()> {
    write!(out, "P6\n{} {}\n255\n", frame.width(), frame.height())?;
    let mut row = Vec::with_capacity(frame.width() * 3);
    for line in frame.as_slice().chunks(frame.width().max(1)) {
        row.clear();
        for px in line {
            row.extend_from_slice(&[px.r(), px.g(), px.b()]);
        }
        out.write_all(&row)?;
    }
    Ok(())
}

impl DisplaySink for PpmSink {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn present(&mut self, frame: &RgbBitmap) -> Result<(), DisplayError> {
        self.check_frame(frame)?;

        let tmp = self.temp_path();
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            write_ppm(&mut out, frame)?;
            out.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("frame written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_ppm_header_and_payload() {
        let mut fb = RgbBitmap::new(2, 1, Rgb888::WHITE);
        Pixel(Point::new(1, 0), Rgb888::new(1, 2, 3)).draw(&mut fb).ok();
        let mut out = Vec::new();
        write_ppm(&mut out, &fb).unwrap();
        assert_eq!(&out[..11], b"P6\n2 1\n255\n");
        assert_eq!(&out[11..], &[255, 255, 255, 1, 2, 3]);
    }

    #[test]
    fn test_sink_replaces_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.ppm");
        let mut sink = PpmSink::new(PanelSpec::new(4, 3), &path);

        sink.present(&RgbBitmap::new(4, 3, Rgb888::BLACK)).unwrap();
        sink.present(&RgbBitmap::new(4, 3, Rgb888::WHITE)).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 11 + 4 * 3 * 3);
        assert!(bytes[11..].iter().all(|b| *b == 255));
        assert!(!dir.path().join("frame.ppm.tmp").exists());
    }

    #[test]
    fn test_sink_rejects_wrong_size_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.ppm");
        let mut sink = PpmSink::new(PanelSpec::new(4, 3), &path);
        assert!(sink.present(&RgbBitmap::new(3, 4, Rgb888::BLACK)).is_err());
        assert!(!path.exists());
    }
}
