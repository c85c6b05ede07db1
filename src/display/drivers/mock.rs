/*
 *  display/drivers/mock.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display sink recording frames for tests
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

use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::error::DisplayError;
use crate::display::layout::PanelSpec;
use crate::display::traits::{DisplayCapabilities, DisplaySink};
use crate::vframebuf::RgbBitmap;

/// Mock display sink for testing
///
/// Keeps every presented frame so tests can count renders and inspect
/// pixels. Cloning shares the recorded state, so a test can hand one
/// clone to the poller and keep another for assertions.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Frames accepted by present(), oldest first
    pub frames: Vec<RgbBitmap>,

    /// Number of present() calls, including failed ones
    pub present_calls: usize,

    /// Simulate failures (for error testing)
    pub simulate_present_failure: bool,
}

impl MockDriver {
    pub fn new(panel: PanelSpec) -> Self {
        Self {
            capabilities: DisplayCapabilities { panel, name: "mock" },
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    pub fn frame_count(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn last_frame(&self) -> Option<RgbBitmap> {
        self.lock().frames.last().cloned()
    }

    pub fn set_fail(&self, fail: bool) {
        self.lock().simulate_present_failure = fail;
    }
}

impl DisplaySink for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn present(&mut self, frame: &RgbBitmap) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        let mut state = self.lock();
        state.present_calls += 1;

        if state.simulate_present_failure {
            return Err(DisplayError::Other("Simulated present failure".to_string()));
        }

        state.frames.push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::*;

    const PANEL: PanelSpec = PanelSpec::new(600, 448);

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new(PANEL);
        assert_eq!(driver.dimensions(), (600, 448));
        assert_eq!(driver.frame_count(), 0);
    }

    #[test]
    fn test_mock_driver_records_frames() {
        let mut driver = MockDriver::new(PANEL);
        let observer = driver.clone();

        driver.present(&RgbBitmap::new(600, 448, Rgb888::WHITE)).unwrap();
        driver.present(&RgbBitmap::new(600, 448, Rgb888::BLACK)).unwrap();

        assert_eq!(observer.frame_count(), 2);
        assert_eq!(observer.last_frame().unwrap().pixel(0, 0), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_mock_driver_rejects_wrong_size() {
        let mut driver = MockDriver::new(PANEL);
        let err = driver.present(&RgbBitmap::new(448, 600, Rgb888::WHITE)).unwrap_err();
        assert!(matches!(err, DisplayError::FrameSizeMismatch { .. }));
        assert_eq!(driver.state().lock().unwrap().present_calls, 0);
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new(PANEL);
        driver.set_fail(true);
        assert!(driver.present(&RgbBitmap::new(600, 448, Rgb888::WHITE)).is_err());
        assert_eq!(driver.frame_count(), 0);
        assert_eq!(driver.state().lock().unwrap().present_calls, 1);
    }
}
