/*
 *  display/mod.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem: layout, composition and frame sinks
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod factory;

// Frame sinks
pub mod drivers;

// Geometry derived from the nominal art side
pub mod layout;

// Colours and fonts
pub mod theme;

// Display manager
pub mod manager;

// Screen composers
pub mod components;

// Re-exports for convenience
pub use traits::{DisplayCapabilities, DisplaySink};
pub use error::DisplayError;
pub use framebuffer::Canvas;
pub use factory::{BoxedSink, SinkFactory};
pub use layout::{LayoutConstraints, Orientation, PanelSpec, ResolvedLayout, Rotation};
pub use manager::{DisplayManager, RenderMetrics};
pub use theme::{Theme, Typeface};
