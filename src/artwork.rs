/*
 *  artwork.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Album artwork download and raster decode
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

//! Album artwork download and decode.
//!
//! Covers arrive as JPEG or PNG. The intrinsic size is read straight from
//! the file header; the raster itself is decoded by wrapping it in a one
//! element SVG and rendering that with resvg onto a white pixmap, so the
//! result is always opaque.

use std::sync::Arc;
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use log::debug;
use reqwest::Client;
use resvg::usvg::{self, ImageHrefResolver, ImageKind, Transform};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::constants::{HTTP_CONNECT_TIMEOUT_MS, HTTP_TIMEOUT_MS};
use crate::vframebuf::RgbBitmap;

/// Covers larger than this on either side are refused.
pub const MAX_SIDE: u32 = 4096;

const COVER_HREF: &str = "cover";
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("artwork request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("artwork request returned HTTP {0}")]
    Status(u16),
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("image is {width}x{height}, limit is {}", MAX_SIDE)]
    TooLarge { width: u32, height: u32 },
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Anything that turns an art URL into a square of pixels.
#[allow(async_fn_in_trait)]
pub trait ArtworkSource {
    /// Cover at `url`, scaled and centre-cropped to `side`x`side`.
    async fn fetch(&mut self, url: &str, side: u32) -> Result<RgbBitmap, ArtworkError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        Some(ImageFormat::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

fn is_jpeg_sof_marker(marker: u8) -> bool {
    matches!(
        marker,
        0xC0 | 0xC1 | 0xC2 | 0xC3 | 0xC5 | 0xC6 | 0xC7 | 0xC9 | 0xCA | 0xCB | 0xCD | 0xCE | 0xCF
    )
}

fn be16(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 2)?;
    Some(u32::from(u16::from_be_bytes([b[0], b[1]])))
}

fn be32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    // signature, IHDR length, "IHDR", then width and height
    if bytes.get(12..16)? != b"IHDR" {
        return None;
    }
    Some((be32(bytes, 16)?, be32(bytes, 20)?))
}

fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;
    loop {
        // markers may be padded with any number of 0xFF
        while *bytes.get(pos)? != 0xFF {
            pos += 1;
        }
        while *bytes.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *bytes.get(pos)?;
        pos += 1;

        match marker {
            0xD8 | 0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return None,
            m if is_jpeg_sof_marker(m) => {
                // length(2) precision(1) height(2) width(2)
                let height = be16(bytes, pos + 3)?;
                let width = be16(bytes, pos + 5)?;
                return Some((width, height));
            }
            _ => {
                let len = be16(bytes, pos)? as usize;
                if len < 2 {
                    return None;
                }
                pos += len;
            }
        }
    }
}

/// Width and height as recorded in the file header.
pub fn intrinsic_size(bytes: &[u8]) -> Option<(ImageFormat, u32, u32)> {
    let format = sniff(bytes)?;
    let (w, h) = match format {
        ImageFormat::Png => png_dimensions(bytes)?,
        ImageFormat::Jpeg => jpeg_dimensions(bytes)?,
    };
    Some((format, w, h))
}

/// Scale and translation that make a `width`x`height` image cover a
/// `side` square, centred, with the overhang cropped.
pub fn cover_transform(width: u32, height: u32, side: u32) -> Transform {
    let scale = side as f32 / width.min(height) as f32;
    let tx = (side as f32 - width as f32 * scale) / 2.0;
    let ty = (side as f32 - height as f32 * scale) / 2.0;
    Transform::from_row(scale, 0.0, 0.0, scale, tx, ty)
}

/// Decode a JPEG or PNG straight into an opaque `side`x`side` square.
///
/// resvg does the resampling (filtered, aspect preserved); whatever
/// falls outside the square after scaling is cropped.
pub fn decode(bytes: &[u8], side: u32) -> Result<RgbBitmap, ArtworkError> {
    let (format, width, height) = intrinsic_size(bytes).ok_or(ArtworkError::UnsupportedFormat)?;
    if width == 0 || height == 0 {
        return Err(ArtworkError::Decode(format!("empty image {}x{}", width, height)));
    }
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(ArtworkError::TooLarge { width, height });
    }

    let data = Arc::new(bytes.to_vec());
    let mut options = usvg::Options::default();
    options.image_href_resolver = ImageHrefResolver {
        resolve_data: ImageHrefResolver::default_data_resolver(),
        resolve_string: Box::new(move |href: &str, _: &usvg::Options| {
            (href == COVER_HREF).then(|| match format {
                ImageFormat::Png => ImageKind::PNG(Arc::clone(&data)),
                ImageFormat::Jpeg => ImageKind::JPEG(Arc::clone(&data)),
            })
        }),
    };

    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><image x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="none" xlink:href="{href}"/></svg>"#,
        w = width,
        h = height,
        href = COVER_HREF,
    );
    let tree = usvg::Tree::from_str(&svg, &options)
        .map_err(|e| ArtworkError::Decode(format!("{:?}", e)))?;

    let mut pixmap = Pixmap::new(side, side)
        .ok_or_else(|| ArtworkError::Decode(format!("failed to create {}x{} pixmap", side, side)))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, cover_transform(width, height, side), &mut pixmap.as_mut());

    let pixels = pixmap
        .pixels()
        .iter()
        .map(|p| {
            let c = p.demultiply();
            Rgb888::new(c.red(), c.green(), c.blue())
        })
        .collect();
    RgbBitmap::from_pixels(side, side, pixels)
        .ok_or_else(|| ArtworkError::Decode("pixel count mismatch".to_string()))
}

/// Fetches covers over HTTP and remembers the last one.
#[derive(Debug)]
pub struct HttpArtwork {
    client: Client,
    last: Option<(String, u32, RgbBitmap)>,
}

impl HttpArtwork {
    pub fn new() -> Result<Self, ArtworkError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
            .timeout(Duration::from_millis(HTTP_TIMEOUT_MS))
            .build()?;
        Ok(Self { client, last: None })
    }
}

impl ArtworkSource for HttpArtwork {
    async fn fetch(&mut self, url: &str, side: u32) -> Result<RgbBitmap, ArtworkError> {
        if let Some((cached_url, cached_side, bitmap)) = &self.last {
            if cached_url == url && *cached_side == side {
                return Ok(bitmap.clone());
            }
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArtworkError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        debug!("artwork {} bytes from {}", bytes.len(), url);

        let bitmap = tokio::task::spawn_blocking(move || decode(&bytes, side)).await??;
        self.last = Some((url.to_string(), side, bitmap.clone()));
        Ok(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use tiny_skia::PremultipliedColorU8;

    fn png(width: u32, height: u32, color: tiny_skia::Color) -> Vec<u8> {
        let mut pm = Pixmap::new(width, height).unwrap();
        pm.fill(color);
        pm.encode_png().unwrap()
    }

    fn jpeg_header(width: u16, height: u16) -> Vec<u8> {
        let mut v = vec![0xFF, 0xD8];
        // APP0 segment with a short payload
        v.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x06, b'J', b'F', b'I', b'F']);
        // SOF2 (progressive)
        v.extend_from_slice(&[0xFF, 0xC2, 0x00, 0x11, 0x08]);
        v.extend_from_slice(&height.to_be_bytes());
        v.extend_from_slice(&width.to_be_bytes());
        v.extend_from_slice(&[0x03, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        v
    }

    #[test]
    fn test_sniff() {
        assert_eq!(sniff(&png(1, 1, tiny_skia::Color::BLACK)), Some(ImageFormat::Png));
        assert_eq!(sniff(&jpeg_header(1, 1)), Some(ImageFormat::Jpeg));
        assert_eq!(sniff(b"GIF89a"), None);
    }

    #[test]
    fn test_png_size_from_header() {
        let bytes = png(640, 480, tiny_skia::Color::BLACK);
        assert_eq!(intrinsic_size(&bytes), Some((ImageFormat::Png, 640, 480)));
    }

    #[test]
    fn test_jpeg_size_skips_segments() {
        let bytes = jpeg_header(300, 200);
        assert_eq!(intrinsic_size(&bytes), Some((ImageFormat::Jpeg, 300, 200)));
    }

    #[test]
    fn test_truncated_jpeg_has_no_size() {
        let bytes = jpeg_header(300, 200);
        assert_eq!(intrinsic_size(&bytes[..12]), None);
        assert_eq!(intrinsic_size(&[0xFF, 0xD8, 0xFF, 0xD9]), None);
    }

    /// Columns alternate 1px black and 1px white.
    fn striped_png(width: u32, height: u32) -> Vec<u8> {
        let mut pm = Pixmap::new(width, height).unwrap();
        let black = PremultipliedColorU8::from_rgba(0, 0, 0, 255).unwrap();
        let white = PremultipliedColorU8::from_rgba(255, 255, 255, 255).unwrap();
        for (i, px) in pm.pixels_mut().iter_mut().enumerate() {
            *px = if (i as u32 % width) % 2 == 0 { black } else { white };
        }
        pm.encode_png().unwrap()
    }

    /// Left third red, middle third green, right third blue.
    fn banded_png(width: u32, height: u32) -> Vec<u8> {
        let mut pm = Pixmap::new(width, height).unwrap();
        let bands = [
            PremultipliedColorU8::from_rgba(255, 0, 0, 255).unwrap(),
            PremultipliedColorU8::from_rgba(0, 255, 0, 255).unwrap(),
            PremultipliedColorU8::from_rgba(0, 0, 255, 255).unwrap(),
        ];
        for (i, px) in pm.pixels_mut().iter_mut().enumerate() {
            *px = bands[((i as u32 % width) * 3 / width) as usize];
        }
        pm.encode_png().unwrap()
    }

    #[test]
    fn test_cover_transform_centres_the_overhang() {
        let t = cover_transform(600, 300, 150);
        assert_eq!((t.sx, t.sy), (0.5, 0.5));
        assert_eq!((t.tx, t.ty), (-75.0, 0.0));

        let t = cover_transform(100, 100, 408);
        assert_eq!((t.sx, t.tx, t.ty), (4.08, 0.0, 0.0));
    }

    #[test]
    fn test_decode_png_to_square() {
        let bytes = png(4, 3, tiny_skia::Color::from_rgba8(200, 10, 20, 255));
        let bmp = decode(&bytes, 12).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (12, 12));
        assert_eq!(bmp.pixel(6, 6), Some(Rgb888::new(200, 10, 20)));
    }

    #[test]
    fn test_wide_cover_keeps_the_middle() {
        // 300x100 scaled to height 60 is 180 wide; the centre 60 columns are green
        let bmp = decode(&banded_png(300, 100), 60).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (60, 60));
        for x in [5, 30, 54] {
            let c = bmp.pixel(x, 30).unwrap();
            assert!(c.g() > 200 && c.r() < 40 && c.b() < 40, "x={} {:?}", x, c);
        }
    }

    #[test]
    fn test_downscale_is_filtered() {
        // halving 1px stripes must average them, not drop every other column
        let bmp = decode(&striped_png(816, 816), 408).unwrap();
        for x in [100, 101, 204, 205] {
            let c = bmp.pixel(x, 204).unwrap();
            assert!((32..=224).contains(&c.r()), "x={} {:?}", x, c);
        }
    }

    #[test]
    fn test_transparent_png_flattens_to_white() {
        let bytes = png(2, 2, tiny_skia::Color::TRANSPARENT);
        let bmp = decode(&bytes, 4).unwrap();
        assert!(bmp.as_slice().iter().all(|c| *c == Rgb888::WHITE));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(decode(b"not an image", 8), Err(ArtworkError::UnsupportedFormat)));
    }

    #[test]
    fn test_zero_side_is_rejected() {
        let bytes = png(2, 2, tiny_skia::Color::BLACK);
        assert!(matches!(decode(&bytes, 0), Err(ArtworkError::Decode(_))));
    }

    #[test]
    fn test_oversized_is_rejected() {
        let mut bytes = png(1, 1, tiny_skia::Color::BLACK);
        bytes[16..20].copy_from_slice(&5000u32.to_be_bytes());
        assert!(matches!(decode(&bytes, 8), Err(ArtworkError::TooLarge { width: 5000, .. })));
    }
}
