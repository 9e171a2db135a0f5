use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::SessionEvent;

/// Unique identifier for each module type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleId {
    Apc,
}

/// Events that can be sent to a module
#[derive(Debug, Clone)]
pub enum ModuleEvent {
    /// Notification from the host session
    Session(SessionEvent),
    /// System events
    Shutdown,
}

/// Messages passed from modules back to their owner
#[derive(Debug)]
pub enum ModuleMessage {
    Status(String),
    Error(String),
}

/// Trait that all async modules must implement
#[async_trait]
pub trait AsyncModule: Send {
    /// Get the unique identifier for this module
    fn id(&self) -> ModuleId;

    /// Initialize the module (called once at startup)
    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Start the module's main loop
    async fn run(
        &mut self,
        mut rx: mpsc::Receiver<ModuleEvent>,
        tx: mpsc::Sender<ModuleMessage>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Shutdown the module gracefully
    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Get the module's status
    fn status(&self) -> HashMap<String, String>;
}
