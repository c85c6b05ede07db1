/*
 *  display/manager.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display manager - composes screens and hands frames to the sink
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

use std::time::Instant;

use log::{debug, info, warn};

use crate::artwork::ArtworkSource;
use crate::display::components::{compose_now_playing, compose_top_tracks, NowPlaying, StatusLine};
use crate::display::error::DisplayError;
use crate::display::framebuffer::Canvas;
use crate::display::layout::{LayoutConstraints, Orientation, PanelSpec, ResolvedLayout};
use crate::display::theme::Theme;
use crate::display::traits::DisplaySink;
use crate::service::{TrackSnapshot, TrackSummary};
use crate::vframebuf::RgbBitmap;

/// Timing of the last presented frame
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderMetrics {
    /// Artwork fetch plus composition
    pub compose_time_us: u64,
    /// Time spent in the sink
    pub present_time_us: u64,
    pub frame_count: u64,
}

impl RenderMetrics {
    fn record(&mut self, compose_time_us: u64, present_time_us: u64) {
        self.compose_time_us = compose_time_us;
        self.present_time_us = present_time_us;
        self.frame_count += 1;
        debug!(
            "frame {}: compose {}us, present {}us",
            self.frame_count, compose_time_us, present_time_us
        );
    }
}

/// Owns the sink and the artwork source; turns screen content into
/// panel frames.
///
/// Every frame is composed completely before the sink sees it. When the
/// artwork cannot be fetched the frame is abandoned and the sink is not
/// called at all.
pub struct DisplayManager<S, A> {
    sink: S,
    artwork: A,
    panel: PanelSpec,
    orientation: Orientation,
    layout: ResolvedLayout,
    theme: Theme,
    metrics: RenderMetrics,
}

impl<S: DisplaySink, A: ArtworkSource> DisplayManager<S, A> {
    pub fn new(
        sink: S,
        artwork: A,
        orientation: Orientation,
        constraints: LayoutConstraints,
        theme: Theme,
    ) -> Result<Self, DisplayError> {
        let panel = sink.capabilities().panel;
        if panel.width == 0 || panel.height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "panel {}x{} has no area",
                panel.width, panel.height
            )));
        }

        let (cw, ch) = orientation.canvas_size(panel);
        let layout = constraints.resolve_for(cw, ch);
        if !layout.has_column() {
            warn!("canvas {}x{} leaves no room for text; screens will show art only", cw, ch);
        }
        if layout.art_side < constraints.nominal_art_side {
            info!(
                "album art clamped from {} to {}px for a {}x{} canvas",
                constraints.nominal_art_side, layout.art_side, cw, ch
            );
        }

        Ok(Self {
            sink,
            artwork,
            panel,
            orientation,
            layout,
            theme,
            metrics: RenderMetrics::default(),
        })
    }

    pub fn layout(&self) -> &ResolvedLayout {
        &self.layout
    }

    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// Cover for the art square, already at its size.
    async fn art(&mut self, url: Option<&str>) -> Result<Option<RgbBitmap>, DisplayError> {
        let side = self.layout.art_side;
        match url {
            Some(url) if side > 0 => Ok(Some(self.artwork.fetch(url, side).await?)),
            _ => Ok(None),
        }
    }

    fn canvas(&self) -> Canvas {
        Canvas::new(self.panel, self.orientation, self.theme.background)
    }

    fn present(&mut self, canvas: Canvas, started: Instant) -> Result<(), DisplayError> {
        let frame = canvas.finish();
        let composed = started.elapsed().as_micros() as u64;

        let t = Instant::now();
        self.sink.present(&frame)?;
        self.metrics.record(composed, t.elapsed().as_micros() as u64);
        Ok(())
    }

    /// Compose and show the now playing screen for `track`.
    pub async fn show_now_playing(
        &mut self,
        track: &TrackSnapshot,
        status: &StatusLine,
    ) -> Result<(), DisplayError> {
        let started = Instant::now();
        let art = self
            .art(track.art_url.as_deref())
            .await?
            .unwrap_or_else(|| RgbBitmap::new(0, 0, self.theme.background));

        let mut canvas = self.canvas();
        let screen = NowPlaying {
            title: &track.title,
            artists: &track.artists,
            art: &art,
        };
        let Ok(()) = compose_now_playing(canvas.bitmap_mut(), &self.layout, &self.theme, &screen, status);

        self.present(canvas, started)
    }

    /// Compose and show the idle screen; returns the number of entries drawn.
    pub async fn show_top_tracks(
        &mut self,
        items: &[TrackSummary],
        status: &StatusLine,
    ) -> Result<usize, DisplayError> {
        let started = Instant::now();
        let hero_url = items.first().and_then(|t| t.art_url.as_deref());
        let hero = self.art(hero_url).await?;

        let mut canvas = self.canvas();
        let Ok(drawn) = compose_top_tracks(
            canvas.bitmap_mut(),
            &self.layout,
            &self.theme,
            items,
            hero.as_ref(),
            status,
        );

        self.present(canvas, started)?;
        Ok(drawn)
    }
}
