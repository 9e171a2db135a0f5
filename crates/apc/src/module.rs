//! ApcModule - Async module driving an APC Key 25 over MIDI.

use std::collections::HashMap;

use async_trait::async_trait;
use keylink_core::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage, Session, Settings};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::sync::mpsc;

use crate::error::ApcError;
use crate::router::ControlSurface;

/// Port and lifecycle settings for [`ApcModule`].
#[derive(Debug, Clone)]
pub struct ApcConfig {
    /// Substring matched against MIDI input port names.
    pub input_port: String,
    /// Substring matched against MIDI output port names.
    pub output_port: String,
    pub client_name: String,
    /// Blank the surface on shutdown.
    pub clear_on_exit: bool,
}

impl From<&Settings> for ApcConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            input_port: settings.midi_input_port.clone(),
            output_port: settings.midi_output_port.clone(),
            client_name: settings.client_name.clone(),
            clear_on_exit: settings.clear_on_exit,
        }
    }
}

/// APC Key 25 controller module.
///
/// Owns the [`ControlSurface`] and the MIDI connections. The run loop is the
/// only place the surface is touched; the midir callback thread only
/// forwards raw bytes.
pub struct ApcModule<S> {
    config: ApcConfig,

    surface: ControlSurface<S>,

    /// MIDI input connection
    midi_input: Option<MidiInputConnection<mpsc::UnboundedSender<Vec<u8>>>>,

    /// MIDI output connection for LED feedback
    midi_output: Option<MidiOutputConnection>,

    /// MIDI message receiver (from callback)
    midi_rx: Option<mpsc::UnboundedReceiver<Vec<u8>>>,

    status: HashMap<String, String>,
}

impl<S: Session + Send> ApcModule<S> {
    pub fn new(session: S, config: ApcConfig) -> Self {
        let mut status = HashMap::new();
        status.insert("state".to_string(), "created".to_string());
        Self {
            config,
            surface: ControlSurface::new(session),
            midi_input: None,
            midi_output: None,
            midi_rx: None,
            status,
        }
    }

    pub fn surface(&self) -> &ControlSurface<S> {
        &self.surface
    }

    fn connect_midi(&mut self) -> Result<(), ApcError> {
        let midi_in = MidiInput::new(&format!("{}_in", self.config.client_name))?;

        let in_ports = midi_in.ports();
        let in_port = in_ports.iter().find(|p| {
            midi_in
                .port_name(p)
                .map(|n| n.contains(&self.config.input_port))
                .unwrap_or(false)
        });

        let in_port = match in_port {
            Some(p) => p.clone(),
            None => {
                self.status
                    .insert("midi_input".to_string(), "not_found".to_string());
                return Err(ApcError::InputNotFound(self.config.input_port.clone()));
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        self.midi_rx = Some(rx);

        let connection = midi_in
            .connect(
                &in_port,
                "apc-input",
                move |_timestamp, message, tx| {
                    let _ = tx.send(message.to_vec());
                },
                tx,
            )
            .map_err(|e| ApcError::connect(&self.config.input_port, e))?;

        self.midi_input = Some(connection);
        self.status
            .insert("midi_input".to_string(), "connected".to_string());

        let midi_out = MidiOutput::new(&format!("{}_out", self.config.client_name))?;
        let out_ports = midi_out.ports();
        let out_port = out_ports.iter().find(|p| {
            midi_out
                .port_name(p)
                .map(|n| n.contains(&self.config.output_port))
                .unwrap_or(false)
        });

        if let Some(port) = out_port {
            let connection = midi_out
                .connect(port, "apc-output")
                .map_err(|e| ApcError::connect(&self.config.output_port, e))?;
            self.midi_output = Some(connection);
            self.status
                .insert("midi_output".to_string(), "connected".to_string());
        } else {
            self.status
                .insert("midi_output".to_string(), "not_found".to_string());
            tracing::warn!(
                "MIDI output '{}' not found - LED feedback disabled",
                self.config.output_port
            );
        }

        tracing::info!("APC Key 25 MIDI connected");
        Ok(())
    }

    /// Apply one module event. Returns `false` once shutdown is requested.
    pub fn handle_event(&mut self, event: ModuleEvent) -> bool {
        match event {
            ModuleEvent::Session(event) => {
                self.surface.handle_session_event(event);
                true
            }
            ModuleEvent::Shutdown => false,
        }
    }

    pub fn handle_midi(&mut self, message: &[u8]) {
        self.surface.handle_midi(message);
    }

    /// Send pending LED changes. Without an output port they are dropped.
    fn send_led_state(&mut self) {
        let messages = self.surface.leds_mut().to_midi_messages();
        if let Some(ref mut output) = self.midi_output {
            for message in messages {
                if let Err(e) = output.send(&message) {
                    tracing::debug!("LED update failed: {}", e);
                }
            }
        }
    }
}

#[async_trait]
impl<S: Session + Send> AsyncModule for ApcModule<S> {
    fn id(&self) -> ModuleId {
        ModuleId::Apc
    }

    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Initializing APC Key 25 module");

        self.connect_midi()?;

        self.surface.initialize();
        self.send_led_state();

        self.status
            .insert("state".to_string(), "initialized".to_string());
        Ok(())
    }

    async fn run(
        &mut self,
        mut rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("APC Key 25 module running");
        self.status
            .insert("state".to_string(), "running".to_string());
        if let Err(e) = tx.try_send(ModuleMessage::Status("running".to_string())) {
            tracing::debug!("Failed to report status: {}", e);
        }

        let mut midi_rx = self.midi_rx.take();

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else {
                        tracing::info!("Event channel closed");
                        break;
                    };
                    if !self.handle_event(event) {
                        tracing::info!("APC Key 25 module received shutdown");
                        break;
                    }
                }

                Some(message) = async {
                    if let Some(ref mut rx) = midi_rx {
                        rx.recv().await
                    } else {
                        std::future::pending().await
                    }
                } => {
                    self.handle_midi(&message);
                }
            }

            self.send_led_state();
        }

        self.midi_rx = midi_rx;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Shutting down APC Key 25 module");

        if self.config.clear_on_exit {
            self.surface.shutdown();
            self.send_led_state();
        }

        self.midi_input = None;
        self.midi_output = None;
        self.midi_rx = None;

        self.status
            .insert("state".to_string(), "shutdown".to_string());
        Ok(())
    }

    fn status(&self) -> HashMap<String, String> {
        self.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use keylink_core::{SessionCommand, SessionEvent};

    use super::*;
    use crate::midi::ApcMapping;

    #[derive(Default)]
    struct RecordingSession {
        commands: Vec<SessionCommand>,
    }

    impl Session for RecordingSession {
        fn execute(&mut self, command: SessionCommand) {
            self.commands.push(command);
        }

        fn has_send(&self, _track: usize, _slot: usize) -> bool {
            false
        }
    }

    fn module(clear_on_exit: bool) -> ApcModule<RecordingSession> {
        ApcModule::new(
            RecordingSession::default(),
            ApcConfig {
                input_port: "APC Key 25".to_string(),
                output_port: "APC Key 25".to_string(),
                client_name: "keylink-test".to_string(),
                clear_on_exit,
            },
        )
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::default();
        let config = ApcConfig::from(&settings);
        assert_eq!(config.input_port, settings.midi_input_port);
        assert_eq!(config.client_name, settings.client_name);
        assert!(config.clear_on_exit);
    }

    #[test]
    fn test_run_applies_events_until_shutdown() {
        let mut module = module(true);
        let (event_tx, event_rx) = mpsc::channel(16);
        let (message_tx, mut message_rx) = mpsc::channel(16);

        tokio_test::block_on(async {
            event_tx
                .send(ModuleEvent::Session(SessionEvent::ClipHasContent {
                    track: 1,
                    scene: 0,
                    has_content: true,
                }))
                .await
                .unwrap();
            event_tx.send(ModuleEvent::Shutdown).await.unwrap();

            module.run(event_rx, message_tx).await.unwrap();
        });

        assert!(matches!(
            message_rx.try_recv(),
            Ok(ModuleMessage::Status(_))
        ));
        assert_eq!(module.status().get("state").unwrap(), "running");
        assert_eq!(module.surface().leds().velocity(33), 5);
        // Flushed even without an output port
        assert!(!module.surface().leds().is_dirty(33));
    }

    #[test]
    fn test_run_stops_when_channel_closes() {
        let mut module = module(true);
        let (event_tx, event_rx) = mpsc::channel(1);
        let (message_tx, _message_rx) = mpsc::channel(1);
        drop(event_tx);

        tokio_test::block_on(async {
            module.run(event_rx, message_tx).await.unwrap();
        });
    }

    #[test]
    fn test_midi_input_reaches_session() {
        let mut module = module(true);
        module.handle_midi(&[0x90, ApcMapping::PLAY_PAUSE, 127]);
        assert_eq!(
            module.surface().session().commands,
            vec![SessionCommand::TogglePlay]
        );
    }

    #[test]
    fn test_shutdown_respects_clear_on_exit() {
        let mut kept = module(false);
        let mut cleared = module(true);
        for module in [&mut kept, &mut cleared] {
            module.handle_event(ModuleEvent::Session(SessionEvent::ClipHasContent {
                track: 0,
                scene: 0,
                has_content: true,
            }));
            tokio_test::block_on(module.shutdown()).unwrap();
            assert_eq!(module.status().get("state").unwrap(), "shutdown");
        }

        assert_eq!(kept.surface().leds().velocity(32), 5);
        assert_eq!(cleared.surface().leds().velocity(32), 0);
    }
}
