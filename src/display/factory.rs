/*
 *  display/factory.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Factory for panel drivers
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

use crate::config::{DriverKind, Settings};
use crate::display::drivers::headless::HeadlessDriver;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::PanelDriver;
use log::info;

#[cfg(feature = "st7789")]
use crate::display::drivers::st7789::St7789Driver;

/// Type alias for boxed panel driver trait objects
pub type BoxedDriver = Box<dyn PanelDriver>;

/// Factory for creating panel drivers from settings
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a panel driver from resolved settings
    ///
    /// The driver is opened but not initialized; call `init()` on it before
    /// pushing frames.
    pub fn create(settings: &Settings) -> Result<BoxedDriver, DisplayFactoryError> {
        match settings.driver {
            #[cfg(feature = "st7789")]
            DriverKind::St7789 => {
                info!("Creating ST7789 driver, rotation {}", settings.rotation);
                Ok(Box::new(St7789Driver::new(&settings.wiring, settings.rotation)?))
            }

            #[cfg(not(feature = "st7789"))]
            DriverKind::St7789 => Err(DisplayFactoryError::DriverUnavailable(
                "st7789 (enable with --features st7789)".to_string(),
            )),

            DriverKind::Headless => {
                info!("Creating headless driver");
                Ok(Box::new(HeadlessDriver::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

    #[test]
    fn test_headless_from_settings() {
        let settings = Settings { driver: DriverKind::Headless, ..Settings::default() };
        let driver = DisplayDriverFactory::create(&settings).unwrap();
        assert_eq!(driver.dimensions(), (DISPLAY_WIDTH, DISPLAY_HEIGHT));
    }
}
