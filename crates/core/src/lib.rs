//! Shared building blocks for keylink.
//!
//! - [`session`]: the contract between a control surface and the host session
//! - [`MidiMessage`]: decoding of inbound controller messages
//! - [`ConfigManager`]: JSON backed settings
//! - [`AsyncModule`]: the lifecycle every device module implements

pub use config::{ConfigError, ConfigManager, ConfigSchema, Settings};
pub use midi::midi::{MidiError, MidiMessage};
pub use modules::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};
pub use session::loopback::LoopbackSession;
pub use session::{
    ClipState, ControlValue, ScrollDirection, SendDirection, Session, SessionCommand, SessionEvent,
};

mod config;
mod midi;
mod modules;
pub mod session;
