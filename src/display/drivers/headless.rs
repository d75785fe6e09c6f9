/*
 *  display/drivers/headless.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless panel driver for testing and running without hardware
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

use image::RgbImage;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, PanelDriver};

/// Headless panel driver
///
/// This driver simulates the panel without requiring hardware. It's useful for:
/// - Integration tests
/// - Development on a desktop
///
/// Every operation is recorded in a shared state that outlives the boxed driver,
/// so tests can hand the driver to the engine and still inspect what it got.
#[derive(Debug, Clone)]
pub struct HeadlessDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<HeadlessState>>,
}

/// Internal state for the headless driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct HeadlessState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of frames pushed
    pub frame_count: usize,

    /// Number of times reset() was called
    pub reset_count: usize,

    /// Last backlight value set
    pub backlight: Option<bool>,

    /// Every backlight switch in order
    pub backlight_log: Vec<bool>,

    /// Copy of the last frame pushed
    pub last_frame: Option<RgbImage>,

    /// Simulate failures (for error testing)
    pub simulate_display_failure: bool,
    pub simulate_backlight_failure: bool,
}

impl Default for HeadlessDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width: DISPLAY_WIDTH,
                height: DISPLAY_HEIGHT,
                max_fps: 20,
                supports_backlight: true,
            },
            state: Arc::new(Mutex::new(HeadlessState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<HeadlessState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HeadlessState>, DisplayError> {
        self.state
            .lock()
            .map_err(|_| DisplayError::Other("headless state poisoned".to_string()))
    }
}

impl PanelDriver for HeadlessDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.lock()?.init_count += 1;
        log::debug!("headless panel initialized");
        Ok(())
    }

    fn display(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        let mut state = self.lock()?;
        if state.simulate_display_failure {
            return Err(DisplayError::SpiError("simulated transfer failure".to_string()));
        }
        state.frame_count += 1;
        state.last_frame = Some(frame.clone());
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        let mut state = self.lock()?;
        if state.simulate_backlight_failure {
            return Err(DisplayError::GpioError("simulated backlight failure".to_string()));
        }
        state.backlight = Some(on);
        state.backlight_log.push(on);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), DisplayError> {
        self.lock()?.reset_count += 1;
        Ok(())
    }
}
