//! Akai APC Key 25 control surface for keylink.
//!
//! Keeps the controller's LEDs in step with a host [`Session`] and turns
//! button presses and knob turns into session commands.
//!
//! # Layout
//!
//! - An 8x5 clip grid (notes 0-39), one column per track.
//! - A track row (notes 64-71) whose meaning depends on the track mode.
//!   While shift is held it shows the scroll arrows and the knob modes.
//! - Scene buttons (notes 82-86), doubling as track mode buttons under shift.
//! - Eight knobs (CC 48-55).
//!
//! [`ControlSurface`] is the synchronous engine; [`ApcModule`] wraps it with
//! midir ports and the async module lifecycle.
//!
//! [`Session`]: keylink_core::Session

pub mod error;
pub mod midi;
pub mod module;
pub mod router;
pub mod surface;

pub use error::ApcError;
pub use module::{ApcConfig, ApcModule};
pub use router::ControlSurface;
