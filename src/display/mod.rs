/*
 *  display/mod.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - canvas, compositor and panel drivers
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
pub mod factory;
pub mod color;

// Panel drivers (hardware one conditionally compiled)
pub mod drivers;

// Drawing surface and frame composition
pub mod canvas;
pub mod compositor;

// UI components
pub mod components;

// Blank on idle
pub mod backlight;

// Re-exports for convenience
pub use traits::{PanelDriver, DisplayCapabilities};
pub use error::{DisplayError, DisplayFactoryError};
pub use factory::{DisplayDriverFactory, BoxedDriver};
pub use canvas::Canvas;
pub use compositor::{Compositor, FrameSummary};
pub use color::Scheme;
pub use backlight::{BacklightController, BacklightState};
