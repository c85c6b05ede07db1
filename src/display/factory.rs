/*
 *  display/factory.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the configured frame sink
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

use crate::config::{OutputConfig, SinkKind};
use crate::constants::FRAME_PATH;
use crate::display::drivers::{NullSink, PpmSink};
use crate::display::error::DisplayError;
use crate::display::layout::PanelSpec;
use crate::display::traits::DisplaySink;
use log::info;

/// Type alias for boxed sink trait objects
pub type BoxedSink = Box<dyn DisplaySink>;

/// Factory for creating frame sinks from configuration
pub struct SinkFactory;

impl SinkFactory {
    /// Create the sink named by `output`, sized for `panel`.
    pub fn create_from_config(
        output: &OutputConfig,
        panel: PanelSpec,
    ) -> Result<BoxedSink, DisplayError> {
        if panel.width == 0 || panel.height == 0 {
            return Err(DisplayError::InvalidConfiguration(
                "panel width/height must be > 0".to_string(),
            ));
        }

        match output.sink.unwrap_or_default() {
            SinkKind::Ppm => {
                let path = output.path.clone().unwrap_or_else(|| FRAME_PATH.into());
                info!("Frames go to {}", path.display());
                Ok(Box::new(PpmSink::new(panel, path)))
            }
            SinkKind::None => {
                info!("Frames are discarded (null sink)");
                Ok(Box::new(NullSink::new(panel)))
            }
        }
    }
}
