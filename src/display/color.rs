/*
 *  display/color.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Luminance adaptive color schemes for text and overlays
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

use embedded_graphics::pixelcolor::Rgb888;
use image::RgbImage;
use crate::constants::{LUMA_BRIGHT_THRESHOLD, LUMA_DARK_THRESHOLD};

/// Which of the three fixed schemes a background calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Bright cover, dark text and dark icon variants
    Bright,
    /// Mid cover, white text
    Neutral,
    /// Dark cover, light grey text
    Dark,
}

impl Scheme {
    /// Strict thresholds; 80 and 175 exactly are neutral.
    pub fn for_luma(mean: f32) -> Self {
        if mean > LUMA_BRIGHT_THRESHOLD {
            Scheme::Bright
        } else if mean < LUMA_DARK_THRESHOLD {
            Scheme::Dark
        } else {
            Scheme::Neutral
        }
    }

    pub fn text(&self) -> Rgb888 {
        match self {
            Scheme::Bright => Rgb888::new(55, 55, 55),
            Scheme::Neutral => Rgb888::new(255, 255, 255),
            Scheme::Dark => Rgb888::new(200, 200, 200),
        }
    }

    pub fn shadow(&self) -> Rgb888 {
        match self {
            Scheme::Bright => Rgb888::new(200, 200, 200),
            Scheme::Neutral => Rgb888::new(15, 15, 15),
            Scheme::Dark => Rgb888::new(55, 55, 55),
        }
    }

    /// Fill color for the volume and progress bars
    pub fn bar_fill(&self) -> [u8; 4] {
        match self {
            Scheme::Bright => [100, 100, 100, 225],
            Scheme::Neutral | Scheme::Dark => [255, 255, 255, 255],
        }
    }

    /// Icons have a dark variant for bright covers
    pub fn dark_icons(&self) -> bool {
        *self == Scheme::Bright
    }
}

/// Average of the three channel means.
pub fn mean_luma(img: &RgbImage) -> f32 {
    let count = (img.width() as u64) * (img.height() as u64);
    if count == 0 {
        return 0.0;
    }
    let mut sums = [0u64; 3];
    for p in img.pixels() {
        sums[0] += p.0[0] as u64;
        sums[1] += p.0[1] as u64;
        sums[2] += p.0[2] as u64;
    }
    let means = sums.map(|s| s as f64 / count as f64);
    ((means[0] + means[1] + means[2]) / 3.0) as f32
}
