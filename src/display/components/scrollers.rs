/*
 *  display/components/scrollers.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scrolling text component for artist, album and title
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

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_8X13, FONT_9X18_BOLD};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::text::renderer::TextRenderer;
use crate::constants::{
    ALBUM_TOP, ARTIST_TOP, TITLE_TOP, SCROLL_GAP, SCROLL_START_OFFSET, SCROLL_STEP_FACTOR,
};

/// The three text lines drawn over the cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Artist,
    Album,
    Title,
}

impl TextField {
    pub const ALL: [TextField; 3] = [TextField::Artist, TextField::Album, TextField::Title];

    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextField::Artist => &FONT_9X18_BOLD,
            TextField::Album => &FONT_8X13,
            TextField::Title => &FONT_10X20,
        }
    }

    pub fn top(&self) -> i32 {
        match self {
            TextField::Artist => ARTIST_TOP,
            TextField::Album => ALBUM_TOP,
            TextField::Title => TITLE_TOP,
        }
    }
}

/// Rendered width of `text` in `font`, in pixels.
pub fn text_width(font: &MonoFont<'_>, text: &str) -> u32 {
    let style = MonoTextStyle::new(font, Rgb888::WHITE);
    style
        .measure_string(text, Point::zero(), Baseline::Top)
        .bounding_box
        .size
        .width
}

/// Where a field's text lands this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Fits: drawn once, centered
    Centered(i32),
    /// Overflows: drawn twice, one text width plus the gap apart
    Marquee { first: i32, second: i32 },
}

/// Horizontal offset state for one line of text
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    offset: f32,
    text_width: u32,
    scrolling: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            offset: SCROLL_START_OFFSET,
            text_width: 0,
            scrolling: false,
        }
    }

    /// Back to the starting offset; called on every track change.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn text_width(&self) -> u32 {
        self.text_width
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Field not drawn this frame
    pub fn idle(&mut self) {
        self.scrolling = false;
    }

    /// One frame step.
    ///
    /// Text that fits is centered afresh every call. Wider text moves left by
    /// `speed * 0.5` and wraps to 0 once a full copy plus the gap has passed.
    pub fn advance(&mut self, text_width: u32, canvas_width: u32, speed: f32) -> Placement {
        self.text_width = text_width;

        if text_width <= canvas_width {
            self.scrolling = false;
            let x = (canvas_width as i32 - text_width as i32) / 2;
            self.offset = x as f32;
            return Placement::Centered(x);
        }

        self.scrolling = true;
        let span = text_width as f32 + SCROLL_GAP;
        self.offset -= speed * SCROLL_STEP_FACTOR;
        if !self.offset.is_finite() || self.offset < -span {
            self.offset = 0.0;
        }
        Placement::Marquee {
            first: self.offset as i32,
            second: (self.offset + span) as i32,
        }
    }
}

/// Colors for one text draw; the shadow goes first when present
#[derive(Debug, Clone, Copy)]
pub struct TextPaint {
    pub fg: Rgb888,
    pub shadow: Option<(Rgb888, i32)>,
}

/// Scrolling text component for artist, album and title
#[derive(Debug, Clone)]
pub struct ScrollingText {
    artist_scroll: ScrollState,
    album_scroll: ScrollState,
    title_scroll: ScrollState,
    canvas_width: u32,
    speed: f32,
}

impl ScrollingText {
    pub fn new(canvas_width: u32, speed: f32) -> Self {
        Self {
            artist_scroll: ScrollState::new(),
            album_scroll: ScrollState::new(),
            title_scroll: ScrollState::new(),
            canvas_width,
            speed,
        }
    }

    /// Track changed: all three lines restart
    pub fn reset(&mut self) {
        self.artist_scroll.reset();
        self.album_scroll.reset();
        self.title_scroll.reset();
    }

    pub fn state(&self, field: TextField) -> &ScrollState {
        match field {
            TextField::Artist => &self.artist_scroll,
            TextField::Album => &self.album_scroll,
            TextField::Title => &self.title_scroll,
        }
    }

    fn state_mut(&mut self, field: TextField) -> &mut ScrollState {
        match field {
            TextField::Artist => &mut self.artist_scroll,
            TextField::Album => &mut self.album_scroll,
            TextField::Title => &mut self.title_scroll,
        }
    }

    /// Any line currently marqueeing forces a redraw every tick
    pub fn any_scrolling(&self) -> bool {
        TextField::ALL.iter().any(|f| self.state(*f).is_scrolling())
    }

    pub fn idle(&mut self, field: TextField) {
        self.state_mut(field).idle();
    }

    /// Advance one field and draw it.
    pub fn render_field<D>(
        &mut self,
        field: TextField,
        text: &str,
        paint: TextPaint,
        target: &mut D,
    ) -> Result<Placement, D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let font = field.font();
        let top = field.top();
        let width = text_width(font, text);
        let (canvas_width, speed) = (self.canvas_width, self.speed);
        let placement = self.state_mut(field).advance(width, canvas_width, speed);

        let xs: &[i32] = match &placement {
            Placement::Centered(x) => &[*x][..],
            Placement::Marquee { first, second } => &[*first, *second][..],
        };

        if let Some((shadow, off)) = paint.shadow {
            let style = MonoTextStyle::new(font, shadow);
            for x in xs {
                Text::with_baseline(text, Point::new(x + off, top + off), style, Baseline::Top).draw(target)?;
            }
        }

        let style = MonoTextStyle::new(font, paint.fg);
        for x in xs {
            Text::with_baseline(text, Point::new(*x, top), style, Baseline::Top).draw(target)?;
        }

        Ok(placement)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}
