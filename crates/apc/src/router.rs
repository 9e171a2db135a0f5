//! The control surface: routes controller input to the session and session
//! notifications to the display entities.
//!
//! Every inbound event is handled to completion, including all LED updates,
//! before the call returns. Session commands are fire-and-forget; the
//! surface only reflects their effect once the matching notification
//! arrives through [`ControlSurface::handle_session_event`].

use keylink_core::{
    ControlValue, MidiMessage, SendDirection, Session, SessionCommand, SessionEvent,
};

use crate::midi::{ApcMapping, LedState};
use crate::surface::{
    Grid, KnobMode, KnobSelection, Layer, ModeRegisters, SurfaceState, Track, TrackMode,
};

/// Only channel 0 carries the surface's buttons and knobs.
const SURFACE_CHANNEL: u8 = 0;

/// The piano keys play on channel 1 and go straight to the host.
const KEYBOARD_CHANNEL: u8 = 1;

/// Sends are addressed through a one slot window.
const SEND_SLOT: usize = 0;

pub struct ControlSurface<S> {
    session: S,
    modes: ModeRegisters,
    grid: Grid,
    leds: LedState,
    can_scroll_sends_up: bool,
    can_scroll_sends_down: bool,
}

impl<S: Session> ControlSurface<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            modes: ModeRegisters::new(),
            grid: Grid::new(),
            leds: LedState::new(),
            can_scroll_sends_up: false,
            can_scroll_sends_down: false,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn state(&self) -> SurfaceState {
        self.modes.state()
    }

    pub fn modes(&self) -> &ModeRegisters {
        &self.modes
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn leds(&self) -> &LedState {
        &self.leds
    }

    /// LED buffer, for flushing pending updates to the device.
    pub fn leds_mut(&mut self) -> &mut LedState {
        &mut self.leds
    }

    pub fn can_scroll_sends(&self, direction: SendDirection) -> bool {
        match direction {
            SendDirection::Up => self.can_scroll_sends_up,
            SendDirection::Down => self.can_scroll_sends_down,
        }
    }

    /// Draw the whole surface.
    pub fn initialize(&mut self) {
        self.grid.render_all(&self.modes.state(), &mut self.leds);
    }

    /// Turn off every LED the surface drives.
    pub fn shutdown(&mut self) {
        let state = self.modes.state();
        if state.shift_engaged() {
            self.grid.clear_arrows(&state, &mut self.leds);
            self.modes.leave_overlay(&mut self.leds);
        }
        self.grid.clear_all(&self.modes.state(), &mut self.leds);
    }

    /// Hand the track row to the overlay: arrows plus mode indicators.
    /// The clip grid stays visible.
    pub fn engage_shift(&mut self) {
        self.modes.enter_overlay();
        let state = self.modes.state();
        self.grid.clear_track_row(&state, &mut self.leds);
        self.grid.render_arrows(&state, &mut self.leds);
        self.modes.show_indicators(&mut self.leds);
    }

    pub fn release_shift(&mut self) {
        self.grid.clear_arrows(&self.modes.state(), &mut self.leds);
        self.modes.leave_overlay(&mut self.leds);
        self.grid
            .render_track_row(&self.modes.state(), &mut self.leds);
    }

    /// Select a track-button mode. Notes outside the mode buttons are
    /// ignored. The track row is redrawn when the overlay is released.
    pub fn set_track_mode(&mut self, note: u8) {
        if !self.modes.set_track_mode(note, &mut self.leds) {
            tracing::trace!(note, "Not a track mode button");
        }
    }

    /// Select a knob mode. Selecting Send while it is already active moves
    /// the send window to the next send, stopping at the last one.
    pub fn set_knob_mode(&mut self, note: u8) {
        match self.modes.set_knob_mode(note, &mut self.leds) {
            KnobSelection::Reselected(KnobMode::Send) => self.advance_send(),
            KnobSelection::Changed(mode) => tracing::debug!(?mode, "Knob mode changed"),
            KnobSelection::Reselected(_) => {}
            KnobSelection::Ignored => tracing::trace!(note, "Not a knob mode button"),
        }
    }

    fn advance_send(&mut self) {
        if self.can_scroll_sends_down {
            self.session.execute(SessionCommand::ScrollSendsDown);
        } else {
            tracing::debug!("Already at the last send");
        }
    }

    /// Handle raw bytes from the controller. Anything that does not decode
    /// is dropped.
    pub fn handle_midi(&mut self, bytes: &[u8]) {
        match MidiMessage::parse(bytes) {
            Ok(message) => self.handle_message(message),
            Err(e) => tracing::trace!("Ignoring MIDI input: {}", e),
        }
    }

    pub fn handle_message(&mut self, message: MidiMessage) {
        match message.channel() {
            SURFACE_CHANNEL => {}
            KEYBOARD_CHANNEL => {
                self.session.execute(SessionCommand::NoteInput(message));
                return;
            }
            channel => {
                tracing::trace!(channel, "Ignoring message on unmapped channel");
                return;
            }
        }

        let state = self.modes.state();
        match (state.layer, message) {
            (Layer::ShiftOverlay, MidiMessage::NoteOn { note, .. }) => self.overlay_note_on(note),
            (Layer::Normal, MidiMessage::NoteOn { note, .. }) => {
                self.normal_note_on(note, state.track_mode)
            }
            (_, MidiMessage::NoteOff { note, .. }) => {
                if note == ApcMapping::SHIFT {
                    self.release_shift();
                }
            }
            (_, MidiMessage::ControlChange {
                controller, value, ..
            }) => self.control_change(controller, value, state.knob_mode),
        }
    }

    fn overlay_note_on(&mut self, note: u8) {
        if let Some(direction) = ApcMapping::arrow_direction(note) {
            self.session.execute(SessionCommand::Scroll(direction));
            return;
        }

        match note {
            ApcMapping::STOP_ALL_CLIPS => {
                self.session.execute(SessionCommand::ReturnToArrangement)
            }
            ApcMapping::CLIP_STOP..=ApcMapping::SELECT => self.set_track_mode(note),
            ApcMapping::VOLUME..=ApcMapping::DEVICE => self.set_knob_mode(note),
            _ => tracing::trace!(note, "Unmapped note in shift overlay"),
        }
    }

    fn normal_note_on(&mut self, note: u8, track_mode: TrackMode) {
        let command = match note {
            ApcMapping::PLAY_PAUSE => SessionCommand::TogglePlay,
            ApcMapping::RECORD => SessionCommand::Record,
            ApcMapping::STOP_ALL_CLIPS => SessionCommand::StopAllClips,
            ApcMapping::SHIFT => {
                self.engage_shift();
                return;
            }
            _ => {
                if let Some((track, scene)) = ApcMapping::grid_to_track_scene(note) {
                    SessionCommand::LaunchClip { track, scene }
                } else if let Some(track) = ApcMapping::track_row_index(note) {
                    Self::track_command(track_mode, track)
                } else if let Some(scene) = ApcMapping::scene_index(note) {
                    SessionCommand::LaunchScene { scene }
                } else {
                    tracing::trace!(note, "Unmapped note");
                    return;
                }
            }
        };
        self.session.execute(command);
    }

    fn track_command(mode: TrackMode, track: usize) -> SessionCommand {
        match mode {
            TrackMode::ClipStop => SessionCommand::StopTrack { track },
            TrackMode::Solo => SessionCommand::ToggleSolo { track },
            TrackMode::RecArm => SessionCommand::ToggleArm { track },
            TrackMode::Mute => SessionCommand::ToggleMute { track },
            TrackMode::Select => SessionCommand::SelectTrack { track },
        }
    }

    fn control_change(&mut self, controller: u8, value: u8, knob_mode: KnobMode) {
        let Some(track) = ApcMapping::knob_track(controller) else {
            tracing::trace!(controller, "Controller outside the knob window");
            return;
        };
        let value = ControlValue::from_midi(value);

        let command = match knob_mode {
            KnobMode::Volume => SessionCommand::SetVolume { track, value },
            KnobMode::Pan => SessionCommand::SetPan { track, value },
            KnobMode::Send => {
                if !self.session.has_send(track, SEND_SLOT) {
                    tracing::trace!(track, "No send to write to");
                    return;
                }
                SessionCommand::SetSend {
                    track,
                    slot: SEND_SLOT,
                    value,
                }
            }
            KnobMode::Device => SessionCommand::SetDeviceParameter {
                track: self.modes.selected_track(),
                parameter: track,
                value,
            },
        };
        self.session.execute(command);
    }

    /// Apply a notification from the session and redraw what it touched.
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TrackMute { track, muted } => self.track_event(track, |t, modes, leds| {
                t.on_mute_changed(muted, &modes.state(), leds)
            }),
            SessionEvent::TrackSolo { track, soloed } => self.track_event(track, |t, modes, leds| {
                t.on_solo_changed(soloed, &modes.state(), leds)
            }),
            SessionEvent::TrackArm { track, armed } => self.track_event(track, |t, modes, leds| {
                t.on_arm_changed(armed, &modes.state(), leds)
            }),
            SessionEvent::TrackExists { track, exists } => {
                self.track_event(track, |t, modes, leds| {
                    t.on_exists_changed(exists, &modes.state(), leds)
                })
            }
            SessionEvent::TrackSelected { track, selected } => {
                self.track_event(track, |t, modes, leds| {
                    t.on_selected_changed(selected, modes, leds)
                })
            }
            SessionEvent::TrackMatrixStopped { track, stopped } => {
                self.track_event(track, |t, modes, leds| {
                    t.on_matrix_stopped_changed(stopped, &modes.state(), leds)
                })
            }
            SessionEvent::TrackMatrixQueuedForStop { track, queued } => {
                self.track_event(track, |t, modes, leds| {
                    t.on_matrix_queued_for_stop_changed(queued, &modes.state(), leds)
                })
            }
            SessionEvent::ClipHasContent {
                track,
                scene,
                has_content,
            } => {
                if scene >= ApcMapping::GRID_HEIGHT {
                    tracing::debug!(track, scene, "Ignoring clip outside the grid");
                    return;
                }
                self.track_event(track, |t, modes, leds| {
                    t.on_clip_content_changed(scene, has_content, &modes.state(), leds)
                })
            }
            SessionEvent::ClipPlaybackState {
                track,
                scene,
                state,
                queued,
            } => {
                if scene >= ApcMapping::GRID_HEIGHT {
                    tracing::debug!(track, scene, "Ignoring clip outside the grid");
                    return;
                }
                self.track_event(track, |t, modes, leds| {
                    t.on_clip_playback_changed(scene, state, queued, &modes.state(), leds)
                })
            }
            SessionEvent::CanScroll {
                direction,
                can_scroll,
            } => {
                let state = self.modes.state();
                if let Some(arrow) = self.grid.arrow_mut(direction) {
                    arrow.on_can_scroll_changed(can_scroll, &state, &mut self.leds);
                }
            }
            SessionEvent::CanScrollSends {
                direction,
                can_scroll,
            } => match direction {
                SendDirection::Up => self.can_scroll_sends_up = can_scroll,
                SendDirection::Down => self.can_scroll_sends_down = can_scroll,
            },
        }
    }

    fn track_event(
        &mut self,
        track: usize,
        apply: impl FnOnce(&mut Track, &mut ModeRegisters, &mut LedState),
    ) {
        match self.grid.track_mut(track) {
            Some(t) => apply(t, &mut self.modes, &mut self.leds),
            None => tracing::debug!(track, "Ignoring notification for track outside the grid"),
        }
    }
}
