//! APC Key 25 MIDI handling.
//!
//! Handles the button/knob mapping and LED feedback.

mod led_feedback;
mod mapping;

pub use led_feedback::{GridColor, LedMessage, LedSink, LedState, SceneLed, TrackLed};
pub use mapping::ApcMapping;
