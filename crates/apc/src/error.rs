use midir::ConnectError;
use thiserror::Error;

/// Errors raised while connecting to the controller.
#[derive(Debug, Error)]
pub enum ApcError {
    #[error("failed to create MIDI client: {0}")]
    Init(#[from] midir::InitError),

    #[error("no MIDI input port matching '{0}'")]
    InputNotFound(String),

    #[error("failed to connect to '{port}'")]
    Connect {
        port: String,
        #[source]
        source: ConnectError<()>,
    },
}

impl ApcError {
    /// Wrap a failed connect. The client handle midir hands back is dropped.
    pub(crate) fn connect<T>(port: &str, error: ConnectError<T>) -> Self {
        Self::Connect {
            port: port.to_string(),
            source: ConnectError::new(error.kind(), ()),
        }
    }
}
