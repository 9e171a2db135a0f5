use keylink_core::ClipState;

use super::clip::Clip;
use super::modes::{ModeRegisters, SurfaceState, TrackMode};
use super::Render;
use crate::midi::{ApcMapping, LedSink, TrackLed};

/// One column of the surface: the track-row button plus its clip slots.
#[derive(Debug, Clone)]
pub struct Track {
    index: usize,
    led: u8,
    muted: bool,
    soloed: bool,
    armed: bool,
    exists: bool,
    selected: bool,
    /// No clip of the column is playing.
    matrix_stopped: bool,
    /// A stop of the whole column is pending.
    matrix_queued_for_stop: bool,
    clips: Vec<Clip>,
}

impl Track {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            led: ApcMapping::TRACK_ROW_FIRST + index as u8,
            muted: false,
            soloed: false,
            armed: false,
            exists: false,
            selected: false,
            matrix_stopped: true,
            matrix_queued_for_stop: false,
            clips: (0..ApcMapping::GRID_HEIGHT)
                .map(|scene| Clip::new(index, scene))
                .collect(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn led(&self) -> u8 {
        self.led
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn clip(&self, scene: usize) -> Option<&Clip> {
        self.clips.get(scene)
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn on_mute_changed(&mut self, muted: bool, state: &SurfaceState, leds: &mut impl LedSink) {
        self.muted = muted;
        self.render(state, leds);
    }

    pub fn on_solo_changed(&mut self, soloed: bool, state: &SurfaceState, leds: &mut impl LedSink) {
        self.soloed = soloed;
        self.render(state, leds);
    }

    pub fn on_arm_changed(&mut self, armed: bool, state: &SurfaceState, leds: &mut impl LedSink) {
        self.armed = armed;
        self.render(state, leds);
    }

    pub fn on_exists_changed(&mut self, exists: bool, state: &SurfaceState, leds: &mut impl LedSink) {
        self.exists = exists;
        self.render(state, leds);
    }

    /// A track becoming selected also becomes the target of device mode.
    pub fn on_selected_changed(
        &mut self,
        selected: bool,
        modes: &mut ModeRegisters,
        leds: &mut impl LedSink,
    ) {
        if selected {
            modes.select_track(self.index);
        }
        self.selected = selected;
        self.render(&modes.state(), leds);
    }

    pub fn on_matrix_stopped_changed(
        &mut self,
        stopped: bool,
        state: &SurfaceState,
        leds: &mut impl LedSink,
    ) {
        self.matrix_stopped = stopped;
        self.render(state, leds);
    }

    pub fn on_matrix_queued_for_stop_changed(
        &mut self,
        queued: bool,
        state: &SurfaceState,
        leds: &mut impl LedSink,
    ) {
        self.matrix_queued_for_stop = queued;
        self.render(state, leds);
    }

    pub fn on_clip_content_changed(
        &mut self,
        scene: usize,
        has_content: bool,
        state: &SurfaceState,
        leds: &mut impl LedSink,
    ) {
        if let Some(clip) = self.clips.get_mut(scene) {
            clip.on_has_content_changed(has_content, state, leds);
        }
    }

    pub fn on_clip_playback_changed(
        &mut self,
        scene: usize,
        clip_state: ClipState,
        queued: bool,
        state: &SurfaceState,
        leds: &mut impl LedSink,
    ) {
        if let Some(clip) = self.clips.get_mut(scene) {
            clip.on_playback_state_changed(clip_state, queued, state, leds);
        }
    }

    /// Track-row LED for `mode`, assuming the track exists.
    pub fn led_for(&self, mode: TrackMode) -> TrackLed {
        let lit = |on: bool| if on { TrackLed::Red } else { TrackLed::Off };
        match mode {
            TrackMode::ClipStop if self.matrix_queued_for_stop => TrackLed::BlinkingRed,
            TrackMode::ClipStop if self.matrix_stopped => TrackLed::Off,
            TrackMode::ClipStop => TrackLed::Red,
            TrackMode::Solo => lit(self.soloed),
            TrackMode::RecArm => lit(self.armed),
            TrackMode::Mute => lit(self.muted),
            TrackMode::Select => lit(self.selected),
        }
    }
}

impl Render for Track {
    /// The track row belongs to the overlay while shift is held.
    fn render(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        if state.shift_engaged() {
            return;
        }
        if !self.exists {
            self.clear(state, leds);
            return;
        }
        leds.set_track(self.led, self.led_for(state.track_mode));
    }

    fn clear(&self, _state: &SurfaceState, leds: &mut impl LedSink) {
        leds.set_track(self.led, TrackLed::Off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::LedMessage;
    use crate::surface::modes::Layer;

    fn normal(track_mode: TrackMode) -> SurfaceState {
        SurfaceState {
            track_mode,
            ..SurfaceState::default()
        }
    }

    fn existing(index: usize) -> Track {
        let mut track = Track::new(index);
        track.exists = true;
        track
    }

    #[test]
    fn test_new_track() {
        let track = Track::new(3);
        assert_eq!(track.led(), 67);
        assert_eq!(track.clips().len(), 5);
        assert_eq!(track.clip(0).unwrap().led(), 35);
        assert!(track.clip(5).is_none());
    }

    #[test]
    fn test_clip_stop_colors() {
        let mut track = existing(0);
        assert_eq!(track.led_for(TrackMode::ClipStop), TrackLed::Off);

        track.matrix_stopped = false;
        assert_eq!(track.led_for(TrackMode::ClipStop), TrackLed::Red);

        track.matrix_queued_for_stop = true;
        assert_eq!(track.led_for(TrackMode::ClipStop), TrackLed::BlinkingRed);

        // Queued wins over stopped
        track.matrix_stopped = true;
        assert_eq!(track.led_for(TrackMode::ClipStop), TrackLed::BlinkingRed);
    }

    #[test]
    fn test_flag_modes() {
        let mut track = existing(1);
        track.soloed = true;
        assert_eq!(track.led_for(TrackMode::Solo), TrackLed::Red);
        assert_eq!(track.led_for(TrackMode::Mute), TrackLed::Off);
        assert_eq!(track.led_for(TrackMode::RecArm), TrackLed::Off);
        assert_eq!(track.led_for(TrackMode::Select), TrackLed::Off);
    }

    #[test]
    fn test_mute_notification_renders() {
        let mut track = existing(2);
        let state = normal(TrackMode::Mute);
        let mut leds: Vec<LedMessage> = Vec::new();

        track.on_mute_changed(true, &state, &mut leds);
        track.on_mute_changed(false, &state, &mut leds);

        assert_eq!(
            leds,
            vec![
                LedMessage {
                    note: 66,
                    velocity: 1
                },
                LedMessage {
                    note: 66,
                    velocity: 0
                },
            ]
        );
    }

    #[test]
    fn test_missing_track_is_off() {
        let mut track = Track::new(0);
        track.muted = true;
        let mut leds: Vec<LedMessage> = Vec::new();
        track.render(&normal(TrackMode::Mute), &mut leds);
        assert_eq!(
            leds,
            vec![LedMessage {
                note: 64,
                velocity: 0
            }]
        );
    }

    #[test]
    fn test_render_skipped_under_shift() {
        let mut track = existing(0);
        let state = SurfaceState {
            layer: Layer::ShiftOverlay,
            ..normal(TrackMode::Solo)
        };
        let mut leds: Vec<LedMessage> = Vec::new();

        track.on_solo_changed(true, &state, &mut leds);
        assert!(leds.is_empty());
        assert_eq!(track.led_for(TrackMode::Solo), TrackLed::Red);
    }

    #[test]
    fn test_selection_updates_registers() {
        let mut track = existing(5);
        let mut modes = ModeRegisters::new();
        let mut leds: Vec<LedMessage> = Vec::new();

        track.on_selected_changed(true, &mut modes, &mut leds);
        assert_eq!(modes.selected_track(), 5);

        // Deselection leaves the last selected track in place
        track.on_selected_changed(false, &mut modes, &mut leds);
        assert_eq!(modes.selected_track(), 5);
    }

    #[test]
    fn test_clip_forwarding() {
        let mut track = existing(0);
        let state = normal(TrackMode::ClipStop);
        let mut leds: Vec<LedMessage> = Vec::new();

        track.on_clip_content_changed(1, true, &state, &mut leds);
        track.on_clip_playback_changed(1, ClipState::Recording, false, &state, &mut leds);
        track.on_clip_content_changed(9, true, &state, &mut leds);

        let clip = track.clip(1).unwrap();
        assert!(clip.has_content());
        assert_eq!(clip.state(), ClipState::Recording);
        assert_eq!(leds.len(), 2);
        assert_eq!(
            leds[1],
            LedMessage {
                note: 24,
                velocity: 3
            }
        );
    }
}
