/*
 *  display/drivers/st7789.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  ST7789 240x240 TFT driver, mipidsi over spidev and sysfs GPIO
 *  (Pirate Audio wiring)
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

use display_interface_spi::SPIInterface;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_hal::digital::OutputPin;
use image::RgbImage;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};
use log::{debug, info};
use mipidsi::models::ST7789;
use mipidsi::options::{ColorInversion, Orientation, Rotation};
use mipidsi::{Builder, Display, NoResetPin};

use crate::config::SpiWiring;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, PanelDriver};

type Interface = SPIInterface<SpidevDevice, SysfsPin>;

/// Initialized controller; the reset line changes the concrete type
enum Panel {
    WithReset(Display<Interface, ST7789, SysfsPin>),
    NoReset(Display<Interface, ST7789, NoResetPin>),
}

impl Panel {
    fn set_pixels<T>(&mut self, colors: T) -> Result<(), DisplayError>
    where
        T: IntoIterator<Item = Rgb565>,
    {
        let (ex, ey) = ((DISPLAY_WIDTH - 1) as u16, (DISPLAY_HEIGHT - 1) as u16);
        let res = match self {
            Panel::WithReset(d) => d.set_pixels(0, 0, ex, ey, colors),
            Panel::NoReset(d) => d.set_pixels(0, 0, ex, ey, colors),
        };
        res.map_err(|e| DisplayError::SpiError(format!("{:?}", e)))
    }
}

/// Lines claimed in `new`, handed to the controller crate by `init`
enum State {
    Claimed { interface: Interface, rst: Option<SysfsPin> },
    Ready(Panel),
    Failed,
}

/// ST7789 display driver
pub struct St7789Driver {
    state: State,
    backlight: SysfsPin,
    rotation: u16,
    delay: Delay,
    capabilities: DisplayCapabilities,
}

fn output_pin(num: u8) -> Result<SysfsPin, DisplayError> {
    let pin = SysfsPin::new(num as u64);
    pin.export()
        .map_err(|e| DisplayError::GpioError(format!("export GPIO{num}: {:?}", e)))?;
    pin.set_direction(Direction::Out)
        .map_err(|e| DisplayError::GpioError(format!("GPIO{num} as output: {:?}", e)))?;
    Ok(pin)
}

/// Config rotation is counter-clockwise, the controller's is clockwise
fn controller_rotation(rotation: u16) -> Rotation {
    match rotation {
        90 => Rotation::Deg270,
        180 => Rotation::Deg180,
        270 => Rotation::Deg90,
        _ => Rotation::Deg0,
    }
}

fn to_rgb565(frame: &RgbImage) -> impl Iterator<Item = Rgb565> + '_ {
    frame.pixels().map(|p| {
        let [r, g, b] = p.0;
        Rgb565::from(Rgb888::new(r, g, b))
    })
}

impl St7789Driver {
    /// Open the SPI device and claim the GPIO lines.
    ///
    /// # Arguments
    ///
    /// * `wiring` - SPI port, chip select, pins and clock
    /// * `rotation` - 0, 90, 180 or 270, counter-clockwise
    pub fn new(wiring: &SpiWiring, rotation: u16) -> Result<Self, DisplayError> {
        let path = format!("/dev/spidev{}.{}", wiring.port, wiring.chip_select);
        info!(
            "Initializing ST7789 on {} at {} Hz, dc {} bl {} rst {:?}",
            path, wiring.speed_hz, wiring.dc_pin, wiring.backlight_pin, wiring.rst_pin
        );

        let mut spi = SpidevDevice::open(&path)
            .map_err(|e| DisplayError::InitializationFailed(format!("Failed to open {}: {:?}", path, e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(wiring.speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)
            .map_err(|e| DisplayError::SpiError(format!("configure {}: {}", path, e)))?;

        let dc = output_pin(wiring.dc_pin)?;
        let mut backlight = output_pin(wiring.backlight_pin)?;
        backlight
            .set_low()
            .map_err(|e| DisplayError::GpioError(format!("{:?}", e)))?;
        let rst = wiring.rst_pin.map(output_pin).transpose()?;

        Ok(Self {
            state: State::Claimed { interface: SPIInterface::new(spi, dc), rst },
            backlight,
            rotation,
            delay: Delay,
            capabilities: DisplayCapabilities {
                width: DISPLAY_WIDTH,
                height: DISPLAY_HEIGHT,
                max_fps: 20,
                supports_backlight: true,
            },
        })
    }

    fn panel(&mut self) -> Result<&mut Panel, DisplayError> {
        match &mut self.state {
            State::Ready(panel) => Ok(panel),
            _ => Err(DisplayError::Other("ST7789 not initialized".to_string())),
        }
    }
}

impl PanelDriver for St7789Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let (interface, rst) = match std::mem::replace(&mut self.state, State::Failed) {
            State::Claimed { interface, rst } => (interface, rst),
            State::Ready(panel) => {
                debug!("ST7789 already initialized");
                self.state = State::Ready(panel);
                return Ok(());
            }
            State::Failed => {
                return Err(DisplayError::InitializationFailed("SPI lines lost by an earlier init".to_string()));
            }
        };

        let (w, h) = (DISPLAY_WIDTH as u16, DISPLAY_HEIGHT as u16);
        let builder = Builder::new(ST7789, interface)
            .display_size(w, h)
            .invert_colors(ColorInversion::Inverted)
            .orientation(Orientation::new().rotate(controller_rotation(self.rotation)));

        let panel = match rst {
            Some(rst) => builder
                .reset_pin(rst)
                .init(&mut self.delay)
                .map(Panel::WithReset)
                .map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))?,
            None => builder
                .init(&mut self.delay)
                .map(Panel::NoReset)
                .map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))?,
        };
        self.state = State::Ready(panel);

        debug!("ST7789 initialized, rotation {}", self.rotation);
        Ok(())
    }

    fn display(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        self.panel()?.set_pixels(to_rgb565(frame))
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        let res = if on { self.backlight.set_high() } else { self.backlight.set_low() };
        res.map_err(|e| DisplayError::GpioError(format!("{:?}", e)))
    }

    /// Blank the controller RAM; the reset line is pulsed by `init` only.
    fn reset(&mut self) -> Result<(), DisplayError> {
        let black = (0..DISPLAY_WIDTH * DISPLAY_HEIGHT).map(|_| Rgb565::BLACK);
        self.panel()?.set_pixels(black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb565_conversion() {
        let mut frame = RgbImage::new(3, 1);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(1, 0, Rgb([0, 255, 0]));
        frame.put_pixel(2, 0, Rgb([0, 0, 255]));
        let out: Vec<Rgb565> = to_rgb565(&frame).collect();
        assert_eq!(out, vec![Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE]);
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        assert_eq!(controller_rotation(0), Rotation::Deg0);
        assert_eq!(controller_rotation(90), Rotation::Deg270);
        assert_eq!(controller_rotation(180), Rotation::Deg180);
        assert_eq!(controller_rotation(270), Rotation::Deg90);
    }
}
