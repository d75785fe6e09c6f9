/*
 *  display/canvas.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGB canvas the compositor draws into, usable as an embedded-graphics target
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::{Rgb, RgbImage, RgbaImage};

/// A fixed-size RGB framebuffer backed by an `image::RgbImage`.
#[derive(Debug, Clone)]
pub struct Canvas {
    img: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { img: RgbImage::from_pixel(width, height, Rgb([0, 0, 0])) }
    }

    pub fn width(&self) -> u32 { self.img.width() }
    pub fn height(&self) -> u32 { self.img.height() }

    pub fn image(&self) -> &RgbImage { &self.img }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x < self.img.width() && y < self.img.height() {
            Some(self.img.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Clear to a color
    pub fn fill(&mut self, rgb: [u8; 3]) {
        for p in self.img.pixels_mut() {
            *p = Rgb(rgb);
        }
    }

    /// Overwrite the whole canvas with a same-sized image.
    pub fn paste(&mut self, src: &RgbImage) {
        if src.dimensions() == self.img.dimensions() {
            self.img.copy_from_slice(src.as_raw());
        } else {
            image::imageops::replace(&mut self.img, src, 0, 0);
        }
    }

    /// Paste an RGBA image at the origin using its own alpha as the mask.
    pub fn paste_masked(&mut self, src: &RgbaImage) {
        let w = self.img.width().min(src.width());
        let h = self.img.height().min(src.height());
        for y in 0..h {
            for x in 0..w {
                let s = src.get_pixel(x, y).0;
                if s[3] == 0 {
                    continue;
                }
                let d = self.img.get_pixel_mut(x, y);
                d.0 = blend(d.0, [s[0], s[1], s[2]], s[3]);
            }
        }
    }

    /// Alpha-blend a solid rectangle; out of bounds parts are clipped.
    pub fn blend_rect(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: [u8; 4]) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x + width as i32).clamp(0, self.img.width() as i32) as u32;
        let y1 = (y + height as i32).clamp(0, self.img.height() as i32) as u32;
        let rgb = [rgba[0], rgba[1], rgba[2]];
        for py in y0..y1 {
            for px in x0..x1 {
                let d = self.img.get_pixel_mut(px, py);
                d.0 = blend(d.0, rgb, rgba[3]);
            }
        }
    }

    pub fn into_image(self) -> RgbImage { self.img }
}

#[inline]
fn blend(dst: [u8; 3], src: [u8; 3], alpha: u8) -> [u8; 3] {
    let a = alpha as u16;
    let inv = 255 - a;
    let mix = |d: u8, s: u8| ((s as u16 * a + d as u16 * inv + 127) / 255) as u8;
    [mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2])]
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.img.width(), self.img.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = (self.img.width() as i32, self.img.height() as i32);
        for Pixel(p, c) in pixels {
            if p.x >= 0 && p.y >= 0 && p.x < w && p.y < h {
                self.img.put_pixel(p.x as u32, p.y as u32, Rgb([c.r(), c.g(), c.b()]));
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // fast path for rectangular fills the primitives use
        let Size { width, height } = area.size;
        self.blend_rect(area.top_left.x, area.top_left.y, width, height, [color.r(), color.g(), color.b(), 255]);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill([color.r(), color.g(), color.b()]);
        Ok(())
    }
}
