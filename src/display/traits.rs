/*
 *  display/traits.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for panel driver abstraction
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

use image::{Rgb, RgbImage};
use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Maximum recommended frame rate
    pub max_fps: u32,

    /// Whether the backlight can be switched
    pub supports_backlight: bool,
}

/// Minimal hardware abstraction - all panel drivers must implement this trait
///
/// Frames are always full canvas RGB; the driver owns any conversion to the
/// panel's native pixel format, rotation, and transfer.
pub trait PanelDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push one full RGB frame. Blocks until the transfer is done.
    fn display(&mut self, frame: &RgbImage) -> Result<(), DisplayError>;

    /// Switch the backlight on or off
    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Hardware (or software) reset of the controller
    fn reset(&mut self) -> Result<(), DisplayError>;

    /// Clear the display to black
    fn clear(&mut self) -> Result<(), DisplayError> {
        let (w, h) = self.dimensions();
        let black = RgbImage::from_pixel(w, h, Rgb([0, 0, 0]));
        self.display(&black)
    }

    /// Check a frame matches the panel before transfer
    fn check_frame(&self, frame: &RgbImage) -> Result<(), DisplayError> {
        let expected = self.dimensions();
        let actual = frame.dimensions();
        if expected != actual {
            return Err(DisplayError::FrameSizeMismatch { expected, actual });
        }
        Ok(())
    }
}
