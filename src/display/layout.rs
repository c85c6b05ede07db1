/*
 *  display/layout.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Constraint driven panel layout
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

use serde::{Deserialize, Serialize};

use crate::constants::{ALBUM_ART_SIDE, COLUMN_MARGIN, MIN_BAR_HEIGHT, MIN_COLUMN_WIDTH};

/// Physical raster size of the target panel. Fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub width: u32,
    pub height: u32,
}

impl PanelSpec {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// How composed screens map onto the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// Compose at panel size.
    #[default]
    Landscape,
    /// Compose on a canvas with swapped sides, then turn it a quarter
    /// counter-clockwise onto the panel.
    Portrait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    pub rotation: Rotation,
    /// Turn the final frame upside down (panel mounted inverted).
    pub flip_180: bool,
}

impl Orientation {
    /// Size of the surface screens are composed on.
    pub fn canvas_size(&self, panel: PanelSpec) -> (u32, u32) {
        match self.rotation {
            Rotation::Landscape => (panel.width, panel.height),
            Rotation::Portrait => (panel.height, panel.width),
        }
    }
}

/// Hard layout knobs; configuration, never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConstraints {
    /// The single control: desired album art side length.
    pub nominal_art_side: u32,
    pub min_bar_height: u32,
    pub min_column_width: u32,
    pub column_margin: u32,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            nominal_art_side: ALBUM_ART_SIDE,
            min_bar_height: MIN_BAR_HEIGHT,
            min_column_width: MIN_COLUMN_WIDTH,
            column_margin: COLUMN_MARGIN,
        }
    }
}

/// Concrete geometry derived from [`LayoutConstraints`] for one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLayout {
    /// Side of the album art square at the canvas origin.
    pub art_side: u32,
    /// Height of the status bar strip below the art.
    pub bar_height: u32,
    /// Left edge of the text column.
    pub column_x0: u32,
    /// Width of the text column; zero means "no room for text".
    pub column_width: u32,
    /// Margin kept right of the column.
    pub margin: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl ResolvedLayout {
    /// Top of the status bar.
    pub fn bar_y(&self) -> u32 {
        self.art_side
    }

    /// Text column usable height (everything above the bar).
    pub fn column_height(&self) -> u32 {
        self.art_side
    }

    /// Composers skip text entirely when this is false.
    pub fn has_column(&self) -> bool {
        self.column_width > 0 && self.column_height() > 0
    }
}

/// Derive the whole layout from the nominal art side.
///
/// The art square is clamped so that both the bar and the column keep
/// their minimums; every other measure follows from the clamped side, so
/// regions can never overlap or go negative.
pub fn resolve(
    nominal_art_side: u32,
    panel_width: u32,
    panel_height: u32,
    min_bar_height: u32,
    min_column_width: u32,
    margin: u32,
) -> ResolvedLayout {
    let max_by_height = panel_height.saturating_sub(min_bar_height);
    let max_by_width = panel_width
        .saturating_sub(min_column_width)
        .saturating_sub(2 * margin);
    let art_side = nominal_art_side.min(max_by_height).min(max_by_width);

    let bar_height = panel_height - art_side;
    let column_x0 = art_side + margin;
    let column_width = panel_width.saturating_sub(margin).saturating_sub(column_x0);

    ResolvedLayout {
        art_side,
        bar_height,
        column_x0,
        column_width,
        margin,
        canvas_width: panel_width,
        canvas_height: panel_height,
    }
}

impl LayoutConstraints {
    /// Resolve these constraints against a canvas.
    pub fn resolve_for(&self, canvas_width: u32, canvas_height: u32) -> ResolvedLayout {
        resolve(
            self.nominal_art_side,
            canvas_width,
            canvas_height,
            self.min_bar_height,
            self.min_column_width,
            self.column_margin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_landscape_layout() {
        let l = LayoutConstraints::default().resolve_for(600, 448);
        assert_eq!(l.art_side, 408);
        assert_eq!(l.bar_height, 40);
        assert_eq!(l.column_x0, 420);
        assert_eq!(l.column_width, 168);
        assert!(l.has_column());
    }

    #[test]
    fn test_oversized_nominal_is_clamped_by_both_minimums() {
        // height allows 412, width allows 600-90-24 = 486
        let l = resolve(1000, 600, 448, 36, 90, 12);
        assert_eq!(l.art_side, 412);
        assert!(l.bar_height >= 36);
        assert!(l.column_width >= 90);

        // width is the binding limit: 500-90-24 = 386
        let l = resolve(1000, 500, 448, 36, 90, 12);
        assert_eq!(l.art_side, 386);
        assert!(l.bar_height >= 36);
        assert_eq!(l.column_width, 90);
    }

    #[test]
    fn test_invariants_hold_over_a_sweep() {
        for nominal in [0u32, 1, 50, 200, 334, 408, 412, 600, 5000] {
            for (w, h) in [(600u32, 448u32), (448, 600), (120, 80), (10, 10), (0, 0)] {
                let l = resolve(nominal, w, h, 36, 90, 12);
                assert_eq!(l.art_side + l.bar_height, h);
                assert!(l.art_side <= nominal);
                if l.column_width > 0 {
                    assert!(l.column_x0 + l.column_width + l.margin <= w);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_panel_has_no_column() {
        let l = resolve(408, 100, 448, 36, 90, 12);
        assert_eq!(l.art_side, 0);
        assert_eq!(l.bar_height, 448);
        assert!(!l.has_column());
    }

    #[test]
    fn test_portrait_canvas_swaps_sides() {
        let o = Orientation { rotation: Rotation::Portrait, flip_180: false };
        assert_eq!(o.canvas_size(PanelSpec::new(600, 448)), (448, 600));
        let l = LayoutConstraints::default().resolve_for(448, 600);
        assert_eq!(l.art_side, 334);
        assert_eq!(l.art_side + l.bar_height, 600);
    }
}
