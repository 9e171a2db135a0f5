//! Display entities of the APC Key 25 and the modal state they render under.

mod arrow;
mod clip;
mod grid;
mod modes;
mod track;

pub use arrow::Arrow;
pub use clip::Clip;
pub use grid::Grid;
pub use modes::{KnobMode, KnobSelection, Layer, ModeRegisters, SurfaceState, TrackMode};
pub use track::Track;

use crate::midi::LedSink;

/// An entity that owns one or more LEDs.
pub trait Render {
    /// Emit the LED state for the current entity state.
    fn render(&self, state: &SurfaceState, leds: &mut impl LedSink);

    /// Turn the entity's LEDs off.
    fn clear(&self, state: &SurfaceState, leds: &mut impl LedSink);
}
