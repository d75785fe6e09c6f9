/*
 *  cache.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Change detection: skip redraws when nothing moved and keep the resized
 *  cover until the track changes
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

use image::imageops::{self, FilterType};
use image::RgbImage;
use log::debug;

use crate::constants::{BACKGROUND_BLUR_SIGMA, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::cover::CoverSource;
use crate::display::color::{mean_luma, Scheme};
use crate::metadata::PlaybackSnapshot;
use crate::mpd::{PlayState, PlayerStatus};

/// The coarse per-tick tuple compared against the previous tick
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableState {
    pub file: Option<String>,
    pub state: Option<PlayState>,
    pub volume: Option<u8>,
    pub elapsed: Option<f64>,
}

impl ComparableState {
    pub fn new(snapshot: &PlaybackSnapshot, status: &PlayerStatus) -> Self {
        Self {
            file: snapshot.file.clone(),
            state: status.state,
            volume: status.volume,
            elapsed: status.elapsed,
        }
    }
}

/// A cover ready to paste: canvas sized, blurred if the overlay wants it
#[derive(Debug, Clone)]
pub struct PreparedCover {
    pub background: RgbImage,
    pub luma: f32,
    pub scheme: Scheme,
}

/// Render cache entry, owned by the engine for the process lifetime
#[derive(Debug)]
pub struct RenderCache {
    blur: bool,
    last_state: Option<ComparableState>,
    cover_key: Option<String>,
    cover: Option<PreparedCover>,
    resolutions: u64,
}

impl RenderCache {
    pub fn new(blur: bool) -> Self {
        Self {
            blur,
            last_state: None,
            cover_key: None,
            cover: None,
            resolutions: 0,
        }
    }

    /// True when the tuple moved since the last pushed frame, or any line is
    /// mid-scroll.
    pub fn needs_redraw(&self, state: &ComparableState, scrolling: bool) -> bool {
        self.last_state.as_ref() != Some(state) || scrolling
    }

    /// Record the tuple of a frame that reached the panel.
    pub fn commit(&mut self, state: ComparableState) {
        self.last_state = Some(state);
    }

    /// Re-resolve only when the cover key moved. Returns true on a track change.
    pub fn refresh_cover(&mut self, snapshot: &PlaybackSnapshot, resolver: &dyn CoverSource) -> bool {
        let key = snapshot.cover_key();
        if self.cover.is_some() && self.cover_key.as_deref() == Some(key.as_str()) {
            return false;
        }

        let raw = resolver.resolve(snapshot);
        self.resolutions += 1;

        let resized = if raw.width() == DISPLAY_WIDTH && raw.height() == DISPLAY_HEIGHT {
            raw.to_rgb8()
        } else {
            raw.resize_exact(DISPLAY_WIDTH, DISPLAY_HEIGHT, FilterType::Lanczos3).to_rgb8()
        };
        let luma = mean_luma(&resized);
        let scheme = Scheme::for_luma(luma);
        let background = if self.blur {
            imageops::blur(&resized, BACKGROUND_BLUR_SIGMA)
        } else {
            resized
        };

        debug!("cover changed ({key:?}), luma {luma:.1} -> {scheme:?}");
        self.cover = Some(PreparedCover { background, luma, scheme });
        self.cover_key = Some(key);
        true
    }

    pub fn cover(&self) -> Option<&PreparedCover> {
        self.cover.as_ref()
    }

    /// How many times the resolver has been consulted
    pub fn resolutions(&self) -> u64 {
        self.resolutions
    }
}
