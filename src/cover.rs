/*
 *  cover.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cover art resolution: station logos, device backgrounds, embedded and
 *  folder art, with the bundled default as the last resort
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

use std::path::{Path, PathBuf};
use std::sync::Arc;
use image::DynamicImage;
use lofty::picture::PictureType;
use lofty::prelude::*;
use log::{debug, warn};
use thiserror::Error;

use crate::assets::Assets;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FOLDER_COVERS, RADIO_PLACEHOLDER_LOGO};
use crate::func_timer::FunctionTimer;
use crate::metadata::{PlaybackSnapshot, Source};
use crate::svgimage::{SvgImageError, SvgImageRenderer};

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("tag read failed for {path}: {source}")]
    Tags {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
    #[error("image decode failed for {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("svg render failed for {path}: {source}")]
    Svg {
        path: PathBuf,
        #[source]
        source: SvgImageError,
    },
}

/// Anything that can turn a snapshot into a cover image. Never fails: the
/// worst case is the bundled default.
pub trait CoverSource {
    fn resolve(&self, snapshot: &PlaybackSnapshot) -> DynamicImage;
}

/// Filesystem backed resolver for a moOde install
pub struct CoverResolver {
    music_root: PathBuf,
    web_root: PathBuf,
    assets: Arc<Assets>,
}

impl CoverResolver {
    pub fn new(music_root: PathBuf, web_root: PathBuf, assets: Arc<Assets>) -> Self {
        Self { music_root, web_root, assets }
    }

    /// Station logo under the web root, unless it is the "no logo" placeholder.
    fn radio_logo(&self, snapshot: &PlaybackSnapshot) -> Option<DynamicImage> {
        let url = snapshot.cover_url.as_deref()?;
        let rel = url.trim_start_matches('/');
        if rel.is_empty() || rel == RADIO_PLACEHOLDER_LOGO {
            return None;
        }
        let path = self.web_root.join(rel);
        if !path.is_file() {
            debug!("station logo {} not found", path.display());
            return None;
        }
        match open_cover(&path) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    fn library_cover(&self, snapshot: &PlaybackSnapshot) -> Option<DynamicImage> {
        let file = snapshot.file.as_deref().filter(|f| !f.is_empty())?;
        let track = self.music_root.join(file);

        match embedded_art(&track) {
            Ok(Some(img)) => return Some(img),
            Ok(None) => debug!("no embedded art in {}", track.display()),
            Err(e) => debug!("{e}"),
        }

        let dir = track.parent()?;
        for name in FOLDER_COVERS {
            let candidate = dir.join(name);
            if !candidate.is_file() {
                continue;
            }
            match open_cover(&candidate) {
                Ok(img) => return Some(img),
                // a broken file should not hide a later good one
                Err(e) => warn!("{e}"),
            }
        }
        None
    }
}

impl CoverSource for CoverResolver {
    fn resolve(&self, snapshot: &PlaybackSnapshot) -> DynamicImage {
        let _timer = FunctionTimer::new("cover resolve");
        let found = match snapshot.source {
            Source::Radio => self.radio_logo(snapshot),
            Source::Airplay | Source::Bluetooth | Source::Input | Source::Spotify | Source::Squeeze => {
                self.assets.background(snapshot.source).cloned()
            }
            Source::Library => self.library_cover(snapshot),
        };
        found.unwrap_or_else(|| {
            debug!("using default cover for {} source", snapshot.source);
            self.assets.default_cover().clone()
        })
    }
}

/// Front cover if tagged as such, else the first picture of any type.
fn embedded_art(track: &Path) -> Result<Option<DynamicImage>, CoverError> {
    let tagged = lofty::read_from_path(track).map_err(|source| CoverError::Tags {
        path: track.to_path_buf(),
        source,
    })?;

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return Ok(None);
    };
    let pictures = tag.pictures();
    let Some(picture) = pictures
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .or_else(|| pictures.first())
    else {
        return Ok(None);
    };

    image::load_from_memory(picture.data())
        .map(Some)
        .map_err(|source| CoverError::Decode { path: track.to_path_buf(), source })
}

fn open_cover(path: &Path) -> Result<DynamicImage, CoverError> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let rgba = SvgImageRenderer::from_path(path, DISPLAY_WIDTH, DISPLAY_HEIGHT)
            .and_then(|r| r.render_rgba())
            .map_err(|source| CoverError::Svg { path: path.to_path_buf(), source })?;
        return Ok(DynamicImage::ImageRgba8(rgba));
    }
    image::open(path).map_err(|source| CoverError::Decode { path: path.to_path_buf(), source })
}
