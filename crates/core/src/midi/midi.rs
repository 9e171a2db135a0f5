use thiserror::Error;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

/// Errors produced while decoding a raw MIDI message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MidiError {
    #[error("empty MIDI message")]
    Empty,
    #[error("truncated MIDI message: expected 3 bytes, got {0}")]
    Truncated(usize),
    #[error("unsupported MIDI status byte {0:#04x}")]
    Unsupported(u8),
}

// MIDI message types we care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
}

impl MidiMessage {
    /// Decode a three byte channel message.
    ///
    /// A Note On with velocity 0 is reported as a Note Off, which is how most
    /// controllers (including the APC Key 25) signal a release.
    pub fn parse(bytes: &[u8]) -> Result<Self, MidiError> {
        let status = *bytes.first().ok_or(MidiError::Empty)?;
        let kind = status & 0xF0;
        if !matches!(kind, NOTE_OFF | NOTE_ON | CONTROL_CHANGE) {
            return Err(MidiError::Unsupported(status));
        }
        if bytes.len() < 3 {
            return Err(MidiError::Truncated(bytes.len()));
        }

        let channel = status & 0x0F;
        let (data1, data2) = (bytes[1] & 0x7F, bytes[2] & 0x7F);

        Ok(match kind {
            NOTE_ON if data2 > 0 => MidiMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            },
            NOTE_ON | NOTE_OFF => MidiMessage::NoteOff {
                channel,
                note: data1,
            },
            _ => MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            },
        })
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. } => channel,
        }
    }

    /// Build the Note On bytes used to drive a button LED.
    pub fn note_on_bytes(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
        [NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let msg = MidiMessage::parse(&[0x90, 98, 127]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 0,
                note: 98,
                velocity: 127
            }
        );
    }

    #[test]
    fn test_zero_velocity_is_note_off() {
        let msg = MidiMessage::parse(&[0x90, 98, 0]).unwrap();
        assert_eq!(msg, MidiMessage::NoteOff { channel: 0, note: 98 });

        let msg = MidiMessage::parse(&[0x83, 12, 64]).unwrap();
        assert_eq!(msg, MidiMessage::NoteOff { channel: 3, note: 12 });
    }

    #[test]
    fn test_parse_control_change() {
        let msg = MidiMessage::parse(&[0xB1, 48, 100]).unwrap();
        assert_eq!(msg.channel(), 1);
        assert!(matches!(
            msg,
            MidiMessage::ControlChange {
                controller: 48,
                value: 100,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(MidiMessage::parse(&[]), Err(MidiError::Empty));
        assert_eq!(MidiMessage::parse(&[0x90, 1]), Err(MidiError::Truncated(2)));
        assert_eq!(MidiMessage::parse(&[0xF8]), Err(MidiError::Unsupported(0xF8)));
        assert_eq!(
            MidiMessage::parse(&[0xE0, 0, 64]),
            Err(MidiError::Unsupported(0xE0))
        );
    }

    #[test]
    fn test_note_on_bytes() {
        assert_eq!(MidiMessage::note_on_bytes(0, 64, 2), [0x90, 64, 2]);
    }
}
