/*
 *  display/compositor.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame compositor - cover, overlay icon, bars and text into one frame
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

use std::sync::Arc;
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_9X18_BOLD};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use embedded_text::{TextBox, style::TextBoxStyleBuilder};

use crate::assets::{Assets, Icon};
use crate::cache::PreparedCover;
use crate::config::{OverlayMode, Settings};
use crate::constants::*;
use crate::metadata::PlaybackSnapshot;
use crate::mpd::{PlayState, PlayerStatus};
use super::canvas::Canvas;
use super::color::Scheme;
use super::components::scrollers::{ScrollingText, TextField, TextPaint};

/// What went into the last frame, for logging and tests
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub scheme: Scheme,
    pub icon: Option<Icon>,
    /// filled width in pixels of the volume bar
    pub volume_fill: Option<u32>,
    /// filled width in pixels of the progress bar
    pub progress_fill: Option<u32>,
    pub scrolling: bool,
    /// device source, identifier drawn as centered lines
    pub multiline: bool,
}

/// Owns the canvas and the scroll state; one frame at a time.
pub struct Compositor {
    overlay: OverlayMode,
    timebar: bool,
    shadow: u32,
    assets: Arc<Assets>,
    canvas: Canvas,
    scrollers: ScrollingText,
}

impl Compositor {
    pub fn new(settings: &Settings, assets: Arc<Assets>) -> Self {
        Self {
            overlay: settings.overlay,
            timebar: settings.timebar,
            shadow: settings.shadow,
            assets,
            canvas: Canvas::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
            scrollers: ScrollingText::new(DISPLAY_WIDTH, settings.scrollspeed),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn scrollers(&self) -> &ScrollingText {
        &self.scrollers
    }

    /// Track change
    pub fn reset_scroll(&mut self) {
        self.scrollers.reset();
    }

    pub fn any_scrolling(&self) -> bool {
        self.scrollers.any_scrolling()
    }

    fn paint(&self, scheme: Scheme) -> TextPaint {
        TextPaint {
            fg: scheme.text(),
            shadow: (self.shadow > 0).then(|| (scheme.shadow(), self.shadow as i32)),
        }
    }

    /// Compose one frame onto the canvas.
    pub fn compose(
        &mut self,
        snapshot: &PlaybackSnapshot,
        status: &PlayerStatus,
        cover: &PreparedCover,
    ) -> FrameSummary {
        self.canvas.paste(&cover.background);

        let scheme = cover.scheme;
        let mut summary = FrameSummary {
            scheme,
            icon: None,
            volume_fill: None,
            progress_fill: None,
            scrolling: false,
            multiline: false,
        };

        if !snapshot.source.has_track_tags() {
            for field in TextField::ALL {
                self.scrollers.idle(field);
            }
            if let Some(file) = snapshot.file.as_deref() {
                self.draw_identifier(file, scheme);
                summary.multiline = true;
            }
            return summary;
        }

        if self.overlay.shows_icon() {
            let (icon, dark) = match (self.overlay, status.state) {
                // nothing reported, plain light play icon
                (_, None) => (Icon::Play, false),
                (OverlayMode::PlayPause, Some(PlayState::Play)) => (Icon::Play, scheme.dark_icons()),
                (OverlayMode::PlayPause, Some(_)) => (Icon::Pause, scheme.dark_icons()),
                (_, Some(_)) => (Icon::Volume, scheme.dark_icons()),
            };
            self.canvas.paste_masked(self.assets.icons(dark).get(icon));
            summary.icon = Some(icon);
        }

        if self.overlay.shows_volume_bar() {
            if let Some(volume) = status.volume {
                let frac = volume.min(100) as f64 / 100.0;
                summary.volume_fill = Some(self.draw_bar(
                    VOLUME_BAR_X, VOLUME_BAR_Y, VOLUME_BAR_WIDTH, VOLUME_BAR_HEIGHT, frac, scheme,
                ));
            }
        }

        if !self.overlay.shows_text() {
            for field in TextField::ALL {
                self.scrollers.idle(field);
            }
            return summary;
        }

        if self.timebar {
            if let (Some(elapsed), Some(duration)) = (status.elapsed, status.duration) {
                if duration > 0.0 {
                    let frac = (elapsed / duration).clamp(0.0, 1.0);
                    summary.progress_fill = Some(self.draw_bar(
                        PROGRESS_BAR_X, PROGRESS_BAR_Y, PROGRESS_BAR_WIDTH, PROGRESS_BAR_HEIGHT, frac, scheme,
                    ));
                }
            }
        }

        let paint = self.paint(scheme);
        for field in TextField::ALL {
            let text = match field {
                TextField::Artist => snapshot.artist.as_deref(),
                TextField::Album => snapshot.album.as_deref(),
                TextField::Title => snapshot.title.as_deref(),
            };
            match text {
                Some(text) => {
                    let Ok(_) = self.scrollers.render_field(field, text, paint, &mut self.canvas);
                }
                None => self.scrollers.idle(field),
            }
        }
        summary.scrolling = self.scrollers.any_scrolling();
        summary
    }

    /// Translucent track with a proportional fill on top. Returns the fill width.
    fn draw_bar(&mut self, x: i32, y: i32, width: u32, height: u32, frac: f64, scheme: Scheme) -> u32 {
        self.canvas.blend_rect(x, y, width, height, [255, 255, 255, BAR_TRACK_ALPHA]);
        // truncate, partial pixels stay unfilled
        let fill = (width as f64 * frac) as u32;
        if fill > 0 {
            self.canvas.blend_rect(x, y, fill, height, scheme.bar_fill());
        }
        fill
    }

    /// Device sources only have an identifier like "Bluetooth Active"; one word per line.
    fn draw_identifier(&mut self, file: &str, scheme: Scheme) {
        let text = file.replace(' ', "\n");
        let bounds = Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT));
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Center)
            .vertical_alignment(VerticalAlignment::Middle)
            .paragraph_spacing(MULTILINE_SPACING)
            .build();

        if self.shadow > 0 {
            let off = self.shadow as i32;
            let shadow_style = MonoTextStyle::new(&FONT_10X20, scheme.shadow());
            let Ok(_) = TextBox::with_textbox_style(&text, bounds.translate(Point::new(off, off)), shadow_style, textbox_style)
                .draw(&mut self.canvas);
        }
        let text_style = MonoTextStyle::new(&FONT_10X20, scheme.text());
        let Ok(_) = TextBox::with_textbox_style(&text, bounds, text_style, textbox_style).draw(&mut self.canvas);
    }

    /// Black frame with a centered message near the top.
    pub fn compose_message(&mut self, message: &str) {
        self.canvas.fill([0, 0, 0]);
        let bounds = Rectangle::new(Point::new(0, 20), Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT - 20));
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Center)
            .vertical_alignment(VerticalAlignment::Top)
            .paragraph_spacing(4)
            .build();
        let text_style = MonoTextStyle::new(&FONT_9X18_BOLD, Rgb888::WHITE);
        let Ok(_) = TextBox::with_textbox_style(message, bounds, text_style, textbox_style).draw(&mut self.canvas);
    }
}
