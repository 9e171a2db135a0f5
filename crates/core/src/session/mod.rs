//! Contract between the control surface and the host session.
//!
//! The surface never reads session state directly. It issues
//! [`SessionCommand`]s through a [`Session`] and learns about the result
//! from [`SessionEvent`] notifications delivered later by the host.

pub mod loopback;

use crate::midi::midi::MidiMessage;

/// Playback state of a clip slot as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipState {
    #[default]
    Stopped,
    Playing,
    Recording,
}

/// Bank scroll directions. Up/down move the scene window, left/right move
/// the track window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub const ALL: [ScrollDirection; 4] = [
        ScrollDirection::Up,
        ScrollDirection::Down,
        ScrollDirection::Left,
        ScrollDirection::Right,
    ];
}

/// Direction of the send bank window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendDirection {
    Up,
    Down,
}

/// A controller value together with the resolution it was sampled at.
///
/// Hosts expose parameters as `set(value, resolution)`, so the value is
/// forwarded untouched and the host does the scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlValue {
    pub value: u8,
    pub resolution: u16,
}

impl ControlValue {
    /// Resolution of a 7-bit MIDI controller.
    pub const MIDI_RESOLUTION: u16 = 128;

    pub fn from_midi(value: u8) -> Self {
        Self {
            value: value.min(127),
            resolution: Self::MIDI_RESOLUTION,
        }
    }

    /// Value mapped to 0.0..=1.0.
    pub fn normalized(&self) -> f64 {
        if self.resolution <= 1 {
            return 0.0;
        }
        (self.value as f64 / (self.resolution - 1) as f64).clamp(0.0, 1.0)
    }
}

/// Commands the surface sends to the host session.
///
/// All commands are fire-and-forget; the host answers with notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    // Transport
    TogglePlay,
    Record,

    // Scenes
    /// Stop every clip in the current bank window.
    StopAllClips,
    ReturnToArrangement,
    LaunchScene {
        scene: usize,
    },

    // Bank navigation
    Scroll(ScrollDirection),
    ScrollSendsDown,

    // Clips and tracks
    LaunchClip {
        track: usize,
        scene: usize,
    },
    StopTrack {
        track: usize,
    },
    ToggleSolo {
        track: usize,
    },
    ToggleArm {
        track: usize,
    },
    ToggleMute {
        track: usize,
    },
    SelectTrack {
        track: usize,
    },

    // Mixer and device parameters
    SetVolume {
        track: usize,
        value: ControlValue,
    },
    SetPan {
        track: usize,
        value: ControlValue,
    },
    SetSend {
        track: usize,
        slot: usize,
        value: ControlValue,
    },
    SetDeviceParameter {
        track: usize,
        parameter: usize,
        value: ControlValue,
    },

    // Keyboard
    /// A message from the piano keys, passed through for the host to play.
    NoteInput(MidiMessage),
}

/// Change notifications delivered by the host session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TrackMute {
        track: usize,
        muted: bool,
    },
    TrackSolo {
        track: usize,
        soloed: bool,
    },
    TrackArm {
        track: usize,
        armed: bool,
    },
    TrackExists {
        track: usize,
        exists: bool,
    },
    TrackSelected {
        track: usize,
        selected: bool,
    },
    TrackMatrixStopped {
        track: usize,
        stopped: bool,
    },
    TrackMatrixQueuedForStop {
        track: usize,
        queued: bool,
    },
    ClipHasContent {
        track: usize,
        scene: usize,
        has_content: bool,
    },
    ClipPlaybackState {
        track: usize,
        scene: usize,
        state: ClipState,
        queued: bool,
    },
    CanScroll {
        direction: ScrollDirection,
        can_scroll: bool,
    },
    CanScrollSends {
        direction: SendDirection,
        can_scroll: bool,
    },
}

/// The host session as seen by the control surface.
pub trait Session {
    /// Issue a command. The effect becomes visible through a later
    /// [`SessionEvent`], never synchronously.
    fn execute(&mut self, command: SessionCommand);

    /// Whether `track` has a send in window slot `slot`.
    fn has_send(&self, track: usize, slot: usize) -> bool;
}

impl<S: Session + ?Sized> Session for Box<S> {
    fn execute(&mut self, command: SessionCommand) {
        (**self).execute(command)
    }

    fn has_send(&self, track: usize, slot: usize) -> bool {
        (**self).has_send(track, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_value_normalized() {
        assert_eq!(ControlValue::from_midi(0).normalized(), 0.0);
        assert_eq!(ControlValue::from_midi(127).normalized(), 1.0);

        let mid = ControlValue::from_midi(64).normalized();
        assert!((mid - 0.5039).abs() < 0.001);
    }

    #[test]
    fn test_control_value_clamps_input() {
        let value = ControlValue::from_midi(200);
        assert_eq!(value.value, 127);
        assert_eq!(value.resolution, ControlValue::MIDI_RESOLUTION);
    }

    #[test]
    fn test_degenerate_resolution() {
        let value = ControlValue {
            value: 5,
            resolution: 1,
        };
        assert_eq!(value.normalized(), 0.0);
    }
}
