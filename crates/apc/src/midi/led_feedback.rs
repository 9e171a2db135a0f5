//! LED feedback for the APC Key 25.
//!
//! Every button LED is driven by a Note On on channel 0 whose velocity
//! selects a color from a small fixed palette. The palette differs per
//! button group.

use keylink_core::MidiMessage;

/// Clip grid palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridColor {
    #[default]
    Off,
    Green,
    BlinkingGreen,
    Red,
    BlinkingRed,
    Amber,
    BlinkingAmber,
}

impl GridColor {
    pub const fn velocity(self) -> u8 {
        match self {
            GridColor::Off => 0,
            GridColor::Green => 1,
            GridColor::BlinkingGreen => 2,
            GridColor::Red => 3,
            GridColor::BlinkingRed => 4,
            GridColor::Amber => 5,
            GridColor::BlinkingAmber => 6,
        }
    }
}

/// Track row palette (single red LED per button).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackLed {
    #[default]
    Off,
    Red,
    BlinkingRed,
}

impl TrackLed {
    pub const fn velocity(self) -> u8 {
        match self {
            TrackLed::Off => 0,
            TrackLed::Red => 1,
            TrackLed::BlinkingRed => 2,
        }
    }
}

/// Scene column palette (single green LED per button).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneLed {
    #[default]
    Off,
    Green,
    BlinkingGreen,
}

impl SceneLed {
    pub const fn velocity(self) -> u8 {
        match self {
            SceneLed::Off => 0,
            SceneLed::Green => 1,
            SceneLed::BlinkingGreen => 2,
        }
    }
}

/// One "set LED" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedMessage {
    pub note: u8,
    pub velocity: u8,
}

impl LedMessage {
    pub fn to_bytes(self) -> [u8; 3] {
        MidiMessage::note_on_bytes(0, self.note, self.velocity)
    }
}

/// Destination for LED updates.
pub trait LedSink {
    fn set_led(&mut self, note: u8, velocity: u8);

    fn set_grid(&mut self, note: u8, color: GridColor) {
        self.set_led(note, color.velocity());
    }

    fn set_track(&mut self, note: u8, led: TrackLed) {
        self.set_led(note, led.velocity());
    }

    fn set_scene(&mut self, note: u8, led: SceneLed) {
        self.set_led(note, led.velocity());
    }
}

/// Records every write in order.
impl LedSink for Vec<LedMessage> {
    fn set_led(&mut self, note: u8, velocity: u8) {
        self.push(LedMessage { note, velocity });
    }
}

const NOTE_COUNT: usize = 128;

/// LED state for every note on the controller.
///
/// Writes are coalesced per note until the next flush, so a note written
/// several times while handling one event goes out once with its final value.
pub struct LedState {
    leds: [u8; NOTE_COUNT],

    /// Dirty flags for each note (needs update)
    dirty: [bool; NOTE_COUNT],
}

impl LedState {
    /// Create a new LED state with all LEDs off and nothing pending.
    pub fn new() -> Self {
        Self {
            leds: [0; NOTE_COUNT],
            dirty: [false; NOTE_COUNT],
        }
    }

    /// Last velocity written to `note`.
    pub fn velocity(&self, note: u8) -> u8 {
        self.leds[(note & 0x7F) as usize]
    }

    /// Whether `note` has an update waiting to be flushed.
    pub fn is_dirty(&self, note: u8) -> bool {
        self.dirty[(note & 0x7F) as usize]
    }

    /// Generate MIDI messages for all dirty notes.
    pub fn to_midi_messages(&mut self) -> Vec<[u8; 3]> {
        let mut messages = Vec::new();

        for note in 0..NOTE_COUNT {
            if self.dirty[note] {
                messages.push(MidiMessage::note_on_bytes(0, note as u8, self.leds[note]));
                self.dirty[note] = false;
            }
        }

        messages
    }
}

impl LedSink for LedState {
    fn set_led(&mut self, note: u8, velocity: u8) {
        let index = (note & 0x7F) as usize;
        self.leds[index] = velocity;
        self.dirty[index] = true;
    }
}

impl Default for LedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_values() {
        assert_eq!(GridColor::Off.velocity(), 0);
        assert_eq!(GridColor::BlinkingAmber.velocity(), 6);
        assert_eq!(TrackLed::BlinkingRed.velocity(), 2);
        assert_eq!(SceneLed::Green.velocity(), 1);
    }

    #[test]
    fn test_led_state_flush() {
        let mut state = LedState::new();
        state.set_grid(3, GridColor::Amber);
        state.set_track(64, TrackLed::Red);

        let messages = state.to_midi_messages();
        assert_eq!(messages, vec![[0x90, 3, 5], [0x90, 64, 1]]);

        // Nothing pending after a flush
        assert!(state.to_midi_messages().is_empty());
        assert_eq!(state.velocity(3), 5);
    }

    #[test]
    fn test_last_write_wins() {
        let mut state = LedState::new();
        state.set_scene(82, SceneLed::Off);
        state.set_scene(82, SceneLed::Green);

        assert_eq!(state.to_midi_messages(), vec![[0x90, 82, 1]]);
    }

    #[test]
    fn test_recording_sink() {
        let mut sink: Vec<LedMessage> = Vec::new();
        sink.set_track(65, TrackLed::BlinkingRed);
        assert_eq!(
            sink,
            vec![LedMessage {
                note: 65,
                velocity: 2
            }]
        );
        assert_eq!(sink[0].to_bytes(), [0x90, 65, 2]);
    }
}
