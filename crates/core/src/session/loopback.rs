//! In-process session used when no host is attached.
//!
//! Keeps a small model of the banked tracks and clip slots, applies
//! commands to it and answers with the notifications a real host would send.

use tokio::sync::mpsc;

use super::{ClipState, ScrollDirection, SendDirection, Session, SessionCommand, SessionEvent};

#[derive(Debug, Clone, Default)]
struct LoopbackClip {
    has_content: bool,
    state: ClipState,
}

#[derive(Debug, Clone)]
struct LoopbackTrack {
    exists: bool,
    muted: bool,
    soloed: bool,
    armed: bool,
    selected: bool,
    clips: Vec<LoopbackClip>,
}

impl LoopbackTrack {
    fn is_stopped(&self) -> bool {
        self.clips.iter().all(|c| c.state == ClipState::Stopped)
    }
}

/// A [`Session`] that echoes commands back as [`SessionEvent`]s.
pub struct LoopbackSession {
    tracks: Vec<LoopbackTrack>,
    send_count: usize,
    send_offset: usize,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl LoopbackSession {
    /// Create a bank of `tracks` x `scenes` slots where the first `existing`
    /// tracks exist. Every existing track gets `send_count` sends.
    pub fn new(
        tracks: usize,
        scenes: usize,
        existing: usize,
        send_count: usize,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let tracks = (0..tracks)
            .map(|index| LoopbackTrack {
                exists: index < existing,
                muted: false,
                soloed: false,
                armed: false,
                selected: false,
                clips: vec![LoopbackClip::default(); scenes],
            })
            .collect();

        Self {
            tracks,
            send_count,
            send_offset: 0,
            events,
        }
    }

    /// Mark a slot as holding (or not holding) a clip and notify.
    pub fn set_clip_content(&mut self, track: usize, scene: usize, has_content: bool) {
        let Some(clip) = self
            .tracks
            .get_mut(track)
            .and_then(|t| t.clips.get_mut(scene))
        else {
            return;
        };
        clip.has_content = has_content;
        self.emit(SessionEvent::ClipHasContent {
            track,
            scene,
            has_content,
        });
    }

    /// Publish the whole model, as a host does when observers are registered.
    pub fn initial_events(&self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for (index, track) in self.tracks.iter().enumerate() {
            events.push(SessionEvent::TrackExists {
                track: index,
                exists: track.exists,
            });
            events.push(SessionEvent::TrackMute {
                track: index,
                muted: track.muted,
            });
            events.push(SessionEvent::TrackSolo {
                track: index,
                soloed: track.soloed,
            });
            events.push(SessionEvent::TrackArm {
                track: index,
                armed: track.armed,
            });
            events.push(SessionEvent::TrackSelected {
                track: index,
                selected: track.selected,
            });
            events.push(SessionEvent::TrackMatrixStopped {
                track: index,
                stopped: track.is_stopped(),
            });
            for (scene, clip) in track.clips.iter().enumerate() {
                events.push(SessionEvent::ClipHasContent {
                    track: index,
                    scene,
                    has_content: clip.has_content,
                });
                events.push(SessionEvent::ClipPlaybackState {
                    track: index,
                    scene,
                    state: clip.state,
                    queued: false,
                });
            }
        }
        events.extend(self.send_scroll_events());
        events
    }

    /// Send [`initial_events`](Self::initial_events) over the event channel.
    pub fn publish_initial_state(&self) {
        for event in self.initial_events() {
            self.emit(event);
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            log::warn!("Loopback session event dropped: receiver closed");
        }
    }

    fn send_scroll_events(&self) -> [SessionEvent; 2] {
        [
            SessionEvent::CanScrollSends {
                direction: SendDirection::Up,
                can_scroll: self.send_offset > 0,
            },
            SessionEvent::CanScrollSends {
                direction: SendDirection::Down,
                can_scroll: self.send_offset + 1 < self.send_count,
            },
        ]
    }

    fn existing_track(&mut self, track: usize) -> Option<&mut LoopbackTrack> {
        self.tracks.get_mut(track).filter(|t| t.exists)
    }

    fn launch_clip(&mut self, track: usize, scene: usize) {
        let Some(t) = self.existing_track(track) else {
            return;
        };
        if scene >= t.clips.len() {
            return;
        }

        let mut changes = Vec::new();
        for (index, clip) in t.clips.iter_mut().enumerate() {
            if index == scene {
                clip.state = if clip.has_content {
                    ClipState::Playing
                } else {
                    clip.has_content = true;
                    changes.push(SessionEvent::ClipHasContent {
                        track,
                        scene,
                        has_content: true,
                    });
                    ClipState::Recording
                };
            } else if clip.state != ClipState::Stopped {
                clip.state = ClipState::Stopped;
            } else {
                continue;
            }
            changes.push(SessionEvent::ClipPlaybackState {
                track,
                scene: index,
                state: clip.state,
                queued: false,
            });
        }
        changes.push(SessionEvent::TrackMatrixStopped {
            track,
            stopped: false,
        });

        for event in changes {
            self.emit(event);
        }
    }

    fn stop_track(&mut self, track: usize) {
        let Some(t) = self.existing_track(track) else {
            return;
        };

        let mut changes = Vec::new();
        for (scene, clip) in t.clips.iter_mut().enumerate() {
            if clip.state != ClipState::Stopped {
                clip.state = ClipState::Stopped;
                changes.push(SessionEvent::ClipPlaybackState {
                    track,
                    scene,
                    state: ClipState::Stopped,
                    queued: false,
                });
            }
        }
        changes.push(SessionEvent::TrackMatrixStopped {
            track,
            stopped: true,
        });

        for event in changes {
            self.emit(event);
        }
    }

    fn select_track(&mut self, track: usize) {
        if self.existing_track(track).is_none() {
            return;
        }

        let mut changes = Vec::new();
        for (index, t) in self.tracks.iter_mut().enumerate() {
            let selected = index == track;
            if t.selected != selected {
                t.selected = selected;
                changes.push(SessionEvent::TrackSelected { track: index, selected });
            }
        }

        for event in changes {
            self.emit(event);
        }
    }

    /// Launch the row on every existing track. Tracks whose slot is empty
    /// stop.
    fn launch_scene(&mut self, scene: usize) {
        for track in 0..self.tracks.len() {
            let t = &self.tracks[track];
            if !t.exists {
                continue;
            }
            let Some(has_content) = t.clips.get(scene).map(|c| c.has_content) else {
                continue;
            };
            if has_content {
                self.launch_clip(track, scene);
            } else {
                self.stop_track(track);
            }
        }
    }

    fn toggle(&mut self, track: usize, pick: fn(&mut LoopbackTrack) -> &mut bool) -> Option<bool> {
        let flag = pick(self.existing_track(track)?);
        *flag = !*flag;
        Some(*flag)
    }
}

impl Session for LoopbackSession {
    fn execute(&mut self, command: SessionCommand) {
        log::debug!("Loopback session command: {:?}", command);

        match command {
            SessionCommand::LaunchClip { track, scene } => self.launch_clip(track, scene),
            SessionCommand::LaunchScene { scene } => self.launch_scene(scene),
            SessionCommand::StopTrack { track } => self.stop_track(track),
            SessionCommand::StopAllClips => {
                for track in 0..self.tracks.len() {
                    self.stop_track(track);
                }
            }
            SessionCommand::SelectTrack { track } => self.select_track(track),
            SessionCommand::ToggleMute { track } => {
                if let Some(muted) = self.toggle(track, |t| &mut t.muted) {
                    self.emit(SessionEvent::TrackMute { track, muted });
                }
            }
            SessionCommand::ToggleSolo { track } => {
                if let Some(soloed) = self.toggle(track, |t| &mut t.soloed) {
                    self.emit(SessionEvent::TrackSolo { track, soloed });
                }
            }
            SessionCommand::ToggleArm { track } => {
                if let Some(armed) = self.toggle(track, |t| &mut t.armed) {
                    self.emit(SessionEvent::TrackArm { track, armed });
                }
            }
            SessionCommand::ScrollSendsDown => {
                if self.send_offset + 1 < self.send_count {
                    self.send_offset += 1;
                    for event in self.send_scroll_events() {
                        self.emit(event);
                    }
                }
            }
            SessionCommand::Scroll(direction) => {
                // The loopback bank is fixed; there is nowhere to scroll to.
                log::info!("Loopback session ignoring scroll {:?}", direction);
                self.emit(SessionEvent::CanScroll {
                    direction,
                    can_scroll: false,
                });
            }
            SessionCommand::TogglePlay
            | SessionCommand::Record
            | SessionCommand::ReturnToArrangement => {
                log::info!("Loopback session transport: {:?}", command);
            }
            SessionCommand::SetVolume { track, value } => {
                log::debug!("Loopback track {} volume {:.3}", track, value.normalized());
            }
            SessionCommand::SetPan { track, value } => {
                log::debug!("Loopback track {} pan {:.3}", track, value.normalized());
            }
            SessionCommand::SetSend { track, slot, value } => {
                log::debug!(
                    "Loopback track {} send {} = {:.3}",
                    track,
                    self.send_offset + slot,
                    value.normalized()
                );
            }
            SessionCommand::SetDeviceParameter {
                track,
                parameter,
                value,
            } => {
                log::debug!(
                    "Loopback track {} device parameter {} = {:.3}",
                    track,
                    parameter,
                    value.normalized()
                );
            }
            SessionCommand::NoteInput(message) => {
                log::debug!("Loopback session note input: {:?}", message);
            }
        }
    }

    fn has_send(&self, track: usize, slot: usize) -> bool {
        self.tracks.get(track).is_some_and(|t| t.exists)
            && self.send_offset + slot < self.send_count
    }
}
