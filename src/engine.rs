/*
 *  engine.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Render engine - one tick from snapshot and status to a frame on the panel
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

use std::path::PathBuf;
use std::sync::Arc;
use log::{debug, error, info, warn};

use crate::assets::Assets;
use crate::cache::{ComparableState, RenderCache};
use crate::config::Settings;
use crate::cover::CoverSource;
use crate::display::{BacklightController, BoxedDriver, Compositor, DisplayError, FrameSummary};
use crate::metadata::{MetadataError, PlaybackSnapshot};
use crate::mpd::PlayerStatus;

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Record unreadable, previous frame stays
    Skipped,
    /// Nothing moved, no redraw
    Unchanged,
    Rendered(FrameSummary),
}

/// Everything that lives across ticks, built once at startup.
pub struct Engine {
    cache: RenderCache,
    resolver: Box<dyn CoverSource + Send>,
    compositor: Compositor,
    backlight: BacklightController,
    driver: BoxedDriver,
    /// Backlight level the panel last accepted
    panel_lit: Option<bool>,
    snapshot_path: Option<PathBuf>,
    frames: u64,
}

impl Engine {
    pub fn new(
        settings: &Settings,
        assets: Arc<Assets>,
        resolver: Box<dyn CoverSource + Send>,
        driver: BoxedDriver,
    ) -> Self {
        Self {
            cache: RenderCache::new(settings.overlay.blurs_background()),
            resolver,
            compositor: Compositor::new(settings, assets),
            backlight: BacklightController::new(settings.blank_secs, settings.pauseblank),
            driver,
            panel_lit: None,
            snapshot_path: settings.snapshot.clone(),
            frames: 0,
        }
    }

    /// Panel init and backlight on
    pub fn start(&mut self) -> Result<(), DisplayError> {
        self.driver.init()?;
        self.apply_backlight(true)
    }

    /// Only a switch the driver accepted counts; a failed one is retried next tick.
    fn apply_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        if self.panel_lit != Some(on) {
            self.driver.set_backlight(on)?;
            self.panel_lit = Some(on);
        }
        Ok(())
    }

    /// One tick of the render loop.
    ///
    /// The blank machine steps on every tick with a status; the rest only runs
    /// when the record parsed and something worth drawing changed. The redraw
    /// tuple is only committed once the panel took the frame.
    pub fn tick(
        &mut self,
        metadata: Result<PlaybackSnapshot, MetadataError>,
        status: &PlayerStatus,
    ) -> Result<TickOutcome, DisplayError> {
        self.backlight.update(status.state);
        let lit = self.backlight.is_lit();
        self.apply_backlight(lit)?;

        let snapshot = match metadata {
            Ok(snapshot) => snapshot,
            // a missing record is routine between tracks, a corrupt one is not
            Err(e @ MetadataError::Io(_)) => {
                debug!("skipping tick: {e}");
                return Ok(TickOutcome::Skipped);
            }
            Err(e) => {
                error!("skipping tick: {e}");
                return Ok(TickOutcome::Skipped);
            }
        };

        let state = ComparableState::new(&snapshot, status);
        if !self.cache.needs_redraw(&state, self.compositor.any_scrolling()) {
            return Ok(TickOutcome::Unchanged);
        }

        if self.cache.refresh_cover(&snapshot, self.resolver.as_ref()) {
            info!(
                "now playing [{}] {} - {}",
                snapshot.source,
                snapshot.artist.as_deref().unwrap_or(""),
                snapshot.title.as_deref().unwrap_or("")
            );
            self.compositor.reset_scroll();
        }
        let Some(cover) = self.cache.cover() else {
            return Ok(TickOutcome::Skipped);
        };

        let summary = self.compositor.compose(&snapshot, status, cover);
        self.driver.display(self.compositor.canvas().image())?;
        self.cache.commit(state);
        self.frames += 1;

        if self.frames == 1 {
            self.save_snapshot();
        }

        Ok(TickOutcome::Rendered(summary))
    }

    /// First frame goes to disk for debugging; failure is only logged.
    fn save_snapshot(&self) {
        let Some(path) = self.snapshot_path.as_ref() else {
            return;
        };
        match self.compositor.canvas().image().save(path) {
            Ok(()) => debug!("first frame saved to {}", path.display()),
            Err(e) => warn!("could not save first frame to {}: {e}", path.display()),
        }
    }

    /// Static message frame, used when the player never came up.
    pub fn show_message(&mut self, message: &str) -> Result<(), DisplayError> {
        self.compositor.compose_message(message);
        self.driver.display(self.compositor.canvas().image())
    }

    /// Reset the controller and switch the backlight off.
    pub fn shutdown(&mut self) -> Result<(), DisplayError> {
        info!("shutting down display");
        self.driver.reset()?;
        self.driver.set_backlight(false)?;
        self.panel_lit = Some(false);
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cover_resolutions(&self) -> u64 {
        self.cache.resolutions()
    }

    pub fn backlight(&self) -> &BacklightController {
        &self.backlight
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}
