use keylink_core::ClipState;

use super::modes::SurfaceState;
use super::Render;
use crate::midi::{ApcMapping, GridColor, LedSink};

/// One cell of the clip grid.
#[derive(Debug, Clone)]
pub struct Clip {
    has_content: bool,
    state: ClipState,
    /// Whether a change of `state` is pending at the next launch boundary.
    queued: bool,
    led: u8,
}

impl Clip {
    pub(crate) fn new(track: usize, scene: usize) -> Self {
        Self {
            has_content: false,
            state: ClipState::Stopped,
            queued: false,
            led: ApcMapping::grid_note(track, scene),
        }
    }

    pub fn led(&self) -> u8 {
        self.led
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn state(&self) -> ClipState {
        self.state
    }

    pub fn queued(&self) -> bool {
        self.queued
    }

    pub fn on_has_content_changed(
        &mut self,
        has_content: bool,
        state: &SurfaceState,
        leds: &mut impl LedSink,
    ) {
        self.has_content = has_content;
        self.render(state, leds);
    }

    pub fn on_playback_state_changed(
        &mut self,
        clip_state: ClipState,
        queued: bool,
        state: &SurfaceState,
        leds: &mut impl LedSink,
    ) {
        self.state = clip_state;
        self.queued = queued;
        self.render(state, leds);
    }

    /// Grid color for the current state. Queued states blink.
    pub fn color(&self) -> GridColor {
        match (self.queued, self.state) {
            (_, ClipState::Stopped) if !self.has_content => GridColor::Off,
            (false, ClipState::Stopped) => GridColor::Amber,
            (false, ClipState::Playing) => GridColor::Green,
            (false, ClipState::Recording) => GridColor::Red,
            (true, ClipState::Stopped) => GridColor::BlinkingAmber,
            (true, ClipState::Playing) => GridColor::BlinkingGreen,
            (true, ClipState::Recording) => GridColor::BlinkingRed,
        }
    }
}

impl Render for Clip {
    fn render(&self, _state: &SurfaceState, leds: &mut impl LedSink) {
        leds.set_grid(self.led, self.color());
    }

    fn clear(&self, _state: &SurfaceState, leds: &mut impl LedSink) {
        leds.set_grid(self.led, GridColor::Off);
    }
}
