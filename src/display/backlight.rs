/*
 *  display/backlight.rs
 *
 *  tft-coverart - now playing on a 240x240 TFT
 *  (c) 2020-26 Stuart Hunter
 *
 *  Backlight controller - blanks the panel after a stretch of stop or pause
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

use crate::constants::TICKS_PER_SECOND;
use crate::mpd::PlayState;

/// Backlight state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklightState {
    /// Lit, counter at zero
    On,
    /// Still lit, counting idle ticks toward blank
    Fading,
    /// Blanked
    Off,
}

/// Backlight controller - counts idle ticks and decides when to blank
#[derive(Debug, Clone)]
pub struct BacklightController {
    timeout_ticks: u64,
    pauseblank: bool,
    counter: u64,
    state: BacklightState,
}

impl BacklightController {
    /// `blank_secs` of zero disables blanking entirely
    pub fn new(blank_secs: u32, pauseblank: bool) -> Self {
        Self {
            timeout_ticks: blank_secs as u64 * TICKS_PER_SECOND as u64,
            pauseblank,
            counter: 0,
            state: BacklightState::On,
        }
    }

    pub fn state(&self) -> BacklightState {
        self.state
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn is_lit(&self) -> bool {
        self.state != BacklightState::Off
    }

    fn enabled(&self) -> bool {
        self.timeout_ticks > 0
    }

    /// Step once per tick.
    /// Returns `Some(on)` only when the backlight must be switched.
    pub fn update(&mut self, state: Option<PlayState>) -> Option<bool> {
        let Some(state) = state else {
            // no status this tick, hold whatever we have
            return None;
        };

        let idle = match state {
            PlayState::Stop => self.enabled(),
            PlayState::Pause => self.enabled() && self.pauseblank,
            PlayState::Play => false,
        };

        let was_lit = self.is_lit();

        if !idle {
            self.counter = 0;
            self.state = BacklightState::On;
        } else {
            self.counter = self.counter.saturating_add(1);
            if self.counter > self.timeout_ticks {
                self.state = BacklightState::Off;
            } else {
                self.state = BacklightState::Fading;
            }
        }

        let lit = self.is_lit();
        if lit != was_lit {
            log::info!("backlight {} ({state}, idle {} ticks)", if lit { "on" } else { "off" }, self.counter);
            Some(lit)
        } else {
            None
        }
    }
}
