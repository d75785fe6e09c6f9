/*
 *  assets.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Overlay icons and fixed backgrounds, loaded once at startup
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

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use log::info;
use thiserror::Error;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::metadata::Source;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load asset {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Which overlay icon to paste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Play,
    Pause,
    Volume,
}

/// One polarity of the overlay icons, each canvas sized with alpha
#[derive(Debug, Clone)]
pub struct IconSet {
    pub play: RgbaImage,
    pub pause: RgbaImage,
    pub volume: RgbaImage,
}

impl IconSet {
    pub fn get(&self, icon: Icon) -> &RgbaImage {
        match icon {
            Icon::Play => &self.play,
            Icon::Pause => &self.pause,
            Icon::Volume => &self.volume,
        }
    }

    fn swap_play_pause(&mut self) {
        std::mem::swap(&mut self.play, &mut self.pause);
    }
}

/// Everything read from the images directory. Shared read-only after startup.
#[derive(Debug, Clone)]
pub struct Assets {
    light: IconSet,
    dark: IconSet,
    backgrounds: HashMap<Source, DynamicImage>,
    default_cover: DynamicImage,
}

const BACKGROUNDS: [(Source, &str); 5] = [
    (Source::Bluetooth, "bta.png"),
    (Source::Airplay, "airplay.png"),
    (Source::Input, "jack.png"),
    (Source::Spotify, "spotify.png"),
    (Source::Squeeze, "squeeze.png"),
];

impl Assets {
    /// Assemble from already decoded images. `ppbutton` swaps the play and
    /// pause icons so the overlay shows the action rather than the state.
    pub fn new(
        mut light: IconSet,
        mut dark: IconSet,
        backgrounds: HashMap<Source, DynamicImage>,
        default_cover: DynamicImage,
        ppbutton: bool,
    ) -> Self {
        if ppbutton {
            light.swap_play_pause();
            dark.swap_play_pause();
        }
        Self { light, dark, backgrounds, default_cover }
    }

    /// Load and resize everything under `images_dir`. Any missing file is fatal.
    pub fn load(images_dir: &Path, ppbutton: bool) -> Result<Self, AssetError> {
        let icons = |suffix: &str| -> Result<IconSet, AssetError> {
            Ok(IconSet {
                play: load_rgba(&images_dir.join(format!("controls-play{suffix}.png")))?,
                pause: load_rgba(&images_dir.join(format!("controls-pause{suffix}.png")))?,
                volume: load_rgba(&images_dir.join(format!("controls-vol{suffix}.png")))?,
            })
        };
        let light = icons("")?;
        let dark = icons("-dark")?;

        let mut backgrounds = HashMap::new();
        for (source, name) in BACKGROUNDS {
            let img = load_image(&images_dir.join(name))?;
            backgrounds.insert(source, img);
        }
        let default_cover = load_image(&images_dir.join("default-cover-v6.jpg"))?;

        info!("loaded overlay assets from {}", images_dir.display());
        Ok(Self::new(light, dark, backgrounds, default_cover, ppbutton))
    }

    pub fn icons(&self, dark: bool) -> &IconSet {
        if dark { &self.dark } else { &self.light }
    }

    /// Fixed background for device sources; library and radio have none.
    pub fn background(&self, source: Source) -> Option<&DynamicImage> {
        self.backgrounds.get(&source)
    }

    pub fn default_cover(&self) -> &DynamicImage {
        &self.default_cover
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.resize_exact(DISPLAY_WIDTH, DISPLAY_HEIGHT, FilterType::Lanczos3))
}

fn load_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    Ok(load_image(path)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn solid_icon(v: u8) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba([v, v, v, 255]))
    }

    fn set(base: u8) -> IconSet {
        IconSet { play: solid_icon(base), pause: solid_icon(base + 1), volume: solid_icon(base + 2) }
    }

    #[test]
    fn test_ppbutton_swaps_both_polarities() {
        let cover = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let assets = Assets::new(set(10), set(20), HashMap::new(), cover.clone(), true);
        assert_eq!(assets.icons(false).get(Icon::Play).get_pixel(0, 0).0[0], 11);
        assert_eq!(assets.icons(false).get(Icon::Pause).get_pixel(0, 0).0[0], 10);
        assert_eq!(assets.icons(true).get(Icon::Play).get_pixel(0, 0).0[0], 21);
        assert_eq!(assets.icons(true).get(Icon::Volume).get_pixel(0, 0).0[0], 22);

        let plain = Assets::new(set(10), set(20), HashMap::new(), cover, false);
        assert_eq!(plain.icons(false).get(Icon::Play).get_pixel(0, 0).0[0], 10);
    }

    #[test]
    fn test_load_resizes_to_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let names = [
            "controls-play.png", "controls-pause.png", "controls-vol.png",
            "controls-play-dark.png", "controls-pause-dark.png", "controls-vol-dark.png",
            "bta.png", "airplay.png", "jack.png", "spotify.png", "squeeze.png",
        ];
        for name in names {
            RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255])).save(dir.path().join(name)).unwrap();
        }
        RgbImage::from_pixel(16, 16, Rgb([9, 9, 9])).save(dir.path().join("default-cover-v6.jpg")).unwrap();

        let assets = Assets::load(dir.path(), false).unwrap();
        assert_eq!(assets.icons(true).get(Icon::Pause).dimensions(), (DISPLAY_WIDTH, DISPLAY_HEIGHT));
        assert_eq!(assets.default_cover().width(), DISPLAY_WIDTH);
        assert!(assets.background(Source::Squeeze).is_some());
        assert!(assets.background(Source::Library).is_none());
    }

    #[test]
    fn test_missing_asset_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Assets::load(dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("controls-play.png"));
    }
}
