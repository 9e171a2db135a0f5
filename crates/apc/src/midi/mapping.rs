//! APC Key 25 MIDI mapping.
//!
//! Maps the controller's buttons and knobs to grid coordinates and
//! session targets.
//!
//! # Layout (channel 0)
//!
//! ```text
//! Clip grid (notes 0-39):
//! Top row    (32-39): scene 0
//!            (24-31): scene 1
//!            (16-23): scene 2
//!            (8-15):  scene 3
//! Bottom row (0-7):   scene 4
//!
//! Scene column (82-86): CLIP STOP, SOLO, REC ARM, MUTE, SELECT
//! Track row (64-71): UP, DOWN, LEFT, RIGHT, VOLUME, PAN, SEND, DEVICE
//! Transport: STOP ALL CLIPS 81, PLAY/PAUSE 91, RECORD 93, SHIFT 98
//! Knobs: CC 48-55
//! ```
//!
//! Note numbers grow bottom-up while scenes count top-down, so the mapping
//! between the two is row-reversed.

use keylink_core::ScrollDirection;

/// APC Key 25 MIDI mapping constants and translation.
pub struct ApcMapping;

impl ApcMapping {
    // === Clip grid ===
    pub const GRID_WIDTH: usize = 8;
    pub const GRID_HEIGHT: usize = 5;
    pub const GRID_NOTES: u8 = (Self::GRID_WIDTH * Self::GRID_HEIGHT) as u8;

    // === Transport ===
    pub const STOP_ALL_CLIPS: u8 = 81;
    pub const PLAY_PAUSE: u8 = 91;
    pub const RECORD: u8 = 93;
    pub const SHIFT: u8 = 98;

    // === Scene column (track-button mode selectors under shift) ===
    pub const CLIP_STOP: u8 = 82;
    pub const SOLO: u8 = 83;
    pub const REC_ARM: u8 = 84;
    pub const MUTE: u8 = 85;
    pub const SELECT: u8 = 86;

    // === Track row (arrows and knob mode selectors under shift) ===
    pub const UP: u8 = 64;
    pub const DOWN: u8 = 65;
    pub const LEFT: u8 = 66;
    pub const RIGHT: u8 = 67;
    pub const VOLUME: u8 = 68;
    pub const PAN: u8 = 69;
    pub const SEND: u8 = 70;
    pub const DEVICE: u8 = 71;

    pub const TRACK_ROW_FIRST: u8 = Self::UP;
    pub const TRACK_ROW_LAST: u8 = Self::DEVICE;

    // === Knobs (CC 48-55) ===
    pub const KNOB_FIRST: u8 = 48;
    pub const KNOB_LAST: u8 = 55;

    /// Resolve a grid note to `(track, scene)`.
    pub fn grid_to_track_scene(note: u8) -> Option<(usize, usize)> {
        if note >= Self::GRID_NOTES {
            return None;
        }
        let note = note as usize;
        let track = note % Self::GRID_WIDTH;
        let scene = Self::GRID_HEIGHT - 1 - note / Self::GRID_WIDTH;
        Some((track, scene))
    }

    /// Hardware note of the grid cell for `(track, scene)`.
    pub fn track_scene_to_grid(track: usize, scene: usize) -> Option<u8> {
        if track >= Self::GRID_WIDTH || scene >= Self::GRID_HEIGHT {
            return None;
        }
        Some(Self::grid_note(track, scene))
    }

    /// Unchecked form of [`track_scene_to_grid`](Self::track_scene_to_grid);
    /// `track` and `scene` must be inside the grid.
    pub(crate) const fn grid_note(track: usize, scene: usize) -> u8 {
        ((Self::GRID_HEIGHT - 1 - scene) * Self::GRID_WIDTH + track) as u8
    }

    /// Track index of a track-row button.
    pub fn track_row_index(note: u8) -> Option<usize> {
        (Self::TRACK_ROW_FIRST..=Self::TRACK_ROW_LAST)
            .contains(&note)
            .then(|| (note - Self::TRACK_ROW_FIRST) as usize)
    }

    /// Note of the track-row button above `track`.
    pub fn track_row_note(track: usize) -> Option<u8> {
        (track < Self::GRID_WIDTH).then(|| Self::TRACK_ROW_FIRST + track as u8)
    }

    /// Scene index of a scene-column button.
    pub fn scene_index(note: u8) -> Option<usize> {
        (Self::CLIP_STOP..=Self::SELECT)
            .contains(&note)
            .then(|| (note - Self::CLIP_STOP) as usize)
    }

    /// Track index controlled by a knob.
    pub fn knob_track(cc: u8) -> Option<usize> {
        (Self::KNOB_FIRST..=Self::KNOB_LAST)
            .contains(&cc)
            .then(|| (cc - Self::KNOB_FIRST) as usize)
    }

    /// Button used as the arrow for `direction` while shift is held.
    pub fn arrow_note(direction: ScrollDirection) -> u8 {
        match direction {
            ScrollDirection::Up => Self::UP,
            ScrollDirection::Down => Self::DOWN,
            ScrollDirection::Left => Self::LEFT,
            ScrollDirection::Right => Self::RIGHT,
        }
    }

    /// Scroll direction of an arrow button.
    pub fn arrow_direction(note: u8) -> Option<ScrollDirection> {
        match note {
            Self::UP => Some(ScrollDirection::Up),
            Self::DOWN => Some(ScrollDirection::Down),
            Self::LEFT => Some(ScrollDirection::Left),
            Self::RIGHT => Some(ScrollDirection::Right),
            _ => None,
        }
    }
}
