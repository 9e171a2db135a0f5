//! Mode registers.
//!
//! One owner for the layer (normal or shift overlay), the knob mode, the
//! track-button mode and the selected track. Mode changes always go through
//! [`ModeRegisters::set_track_mode`] and [`ModeRegisters::set_knob_mode`],
//! which keep the indicator LEDs in step with the registers.

use crate::midi::{ApcMapping, LedSink, SceneLed, TrackLed};

/// Which input layer owns the track row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    #[default]
    Normal,
    ShiftOverlay,
}

/// What the eight knobs write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobMode {
    Volume,
    Pan,
    Send,
    Device,
}

impl KnobMode {
    pub fn from_note(note: u8) -> Option<Self> {
        match note {
            ApcMapping::VOLUME => Some(KnobMode::Volume),
            ApcMapping::PAN => Some(KnobMode::Pan),
            ApcMapping::SEND => Some(KnobMode::Send),
            ApcMapping::DEVICE => Some(KnobMode::Device),
            _ => None,
        }
    }

    /// Button that selects (and indicates) this mode under shift.
    pub fn note(self) -> u8 {
        match self {
            KnobMode::Volume => ApcMapping::VOLUME,
            KnobMode::Pan => ApcMapping::PAN,
            KnobMode::Send => ApcMapping::SEND,
            KnobMode::Device => ApcMapping::DEVICE,
        }
    }
}

/// What the track-row buttons show and do outside the shift overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    ClipStop,
    Solo,
    RecArm,
    Mute,
    Select,
}

impl TrackMode {
    pub fn from_note(note: u8) -> Option<Self> {
        match note {
            ApcMapping::CLIP_STOP => Some(TrackMode::ClipStop),
            ApcMapping::SOLO => Some(TrackMode::Solo),
            ApcMapping::REC_ARM => Some(TrackMode::RecArm),
            ApcMapping::MUTE => Some(TrackMode::Mute),
            ApcMapping::SELECT => Some(TrackMode::Select),
            _ => None,
        }
    }

    /// Scene button that selects (and indicates) this mode under shift.
    pub fn note(self) -> u8 {
        match self {
            TrackMode::ClipStop => ApcMapping::CLIP_STOP,
            TrackMode::Solo => ApcMapping::SOLO,
            TrackMode::RecArm => ApcMapping::REC_ARM,
            TrackMode::Mute => ApcMapping::MUTE,
            TrackMode::Select => ApcMapping::SELECT,
        }
    }
}

/// Snapshot of the modal state, read once per render or dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceState {
    pub layer: Layer,
    pub knob_mode: KnobMode,
    pub track_mode: TrackMode,
}

impl SurfaceState {
    pub fn shift_engaged(&self) -> bool {
        self.layer == Layer::ShiftOverlay
    }
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            layer: Layer::Normal,
            knob_mode: KnobMode::Device,
            track_mode: TrackMode::ClipStop,
        }
    }
}

/// Result of a knob mode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobSelection {
    /// The note is not a knob mode button.
    Ignored,
    /// A different mode became active.
    Changed(KnobMode),
    /// The active mode was selected again.
    Reselected(KnobMode),
}

#[derive(Debug, Default)]
pub struct ModeRegisters {
    state: SurfaceState,
    selected_track: usize,
}

impl ModeRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn selected_track(&self) -> usize {
        self.selected_track
    }

    pub fn select_track(&mut self, track: usize) {
        self.selected_track = track;
    }

    /// Switch to the shift overlay. The caller lights the indicators with
    /// [`show_indicators`](Self::show_indicators) once the row is cleared.
    pub fn enter_overlay(&mut self) {
        self.state.layer = Layer::ShiftOverlay;
    }

    /// Light the knob mode (red) and track mode (green) indicators.
    pub fn show_indicators(&self, leds: &mut impl LedSink) {
        leds.set_track(self.state.knob_mode.note(), TrackLed::Red);
        leds.set_scene(self.state.track_mode.note(), SceneLed::Green);
    }

    /// Leave the shift overlay and turn both mode indicators off.
    pub fn leave_overlay(&mut self, leds: &mut impl LedSink) {
        self.state.layer = Layer::Normal;
        leds.set_track(self.state.knob_mode.note(), TrackLed::Off);
        leds.set_scene(self.state.track_mode.note(), SceneLed::Off);
    }

    /// Select the track-button mode for `note`.
    ///
    /// The indicator is turned off and back on even when the mode does not
    /// change. Returns `false` if `note` is not a track mode button.
    pub fn set_track_mode(&mut self, note: u8, leds: &mut impl LedSink) -> bool {
        let Some(mode) = TrackMode::from_note(note) else {
            return false;
        };
        leds.set_scene(self.state.track_mode.note(), SceneLed::Off);
        self.state.track_mode = mode;
        leds.set_scene(mode.note(), SceneLed::Green);
        true
    }

    /// Select the knob mode for `note`.
    ///
    /// Indicators are only touched when the mode actually changes.
    pub fn set_knob_mode(&mut self, note: u8, leds: &mut impl LedSink) -> KnobSelection {
        let Some(mode) = KnobMode::from_note(note) else {
            return KnobSelection::Ignored;
        };
        if mode == self.state.knob_mode {
            return KnobSelection::Reselected(mode);
        }
        leds.set_track(self.state.knob_mode.note(), TrackLed::Off);
        self.state.knob_mode = mode;
        leds.set_track(mode.note(), TrackLed::Red);
        KnobSelection::Changed(mode)
    }
}
