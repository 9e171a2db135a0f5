//! Walks every entity of the surface and re-emits its LED.
//!
//! Used for the initial draw, for shift overlay transitions and on
//! shutdown. Single notifications only re-render the entity they touch.

use keylink_core::ScrollDirection;

use super::arrow::Arrow;
use super::modes::SurfaceState;
use super::track::Track;
use super::Render;
use crate::midi::{ApcMapping, LedSink};

pub struct Grid {
    tracks: Vec<Track>,
    arrows: Vec<Arrow>,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            tracks: (0..ApcMapping::GRID_WIDTH).map(Track::new).collect(),
            arrows: ScrollDirection::ALL.into_iter().map(Arrow::new).collect(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn arrow_mut(&mut self, direction: ScrollDirection) -> Option<&mut Arrow> {
        self.arrows.iter_mut().find(|a| a.direction() == direction)
    }

    /// Redraw the track row and every clip.
    pub fn render_all(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        self.render_track_row(state, leds);
        for clip in self.tracks.iter().flat_map(|t| t.clips()) {
            clip.render(state, leds);
        }
    }

    pub fn render_track_row(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        for track in &self.tracks {
            track.render(state, leds);
        }
    }

    /// Turn the track row off. The clips stay as they are.
    pub fn clear_track_row(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        for track in &self.tracks {
            track.clear(state, leds);
        }
    }

    /// Turn the track row and every clip off.
    pub fn clear_all(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        self.clear_track_row(state, leds);
        for clip in self.tracks.iter().flat_map(|t| t.clips()) {
            clip.clear(state, leds);
        }
    }

    pub fn render_arrows(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        for arrow in &self.arrows {
            arrow.render(state, leds);
        }
    }

    pub fn clear_arrows(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        for arrow in &self.arrows {
            arrow.clear(state, leds);
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
