use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("backend returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Text for a single chat bubble. Server messages are shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "No pude comunicarme con el servidor. Intenta de nuevo en un momento.".to_string()
            }
            Self::Timeout { .. } => {
                "El servidor tardó demasiado en responder. Intenta de nuevo.".to_string()
            }
            Self::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Server { status, .. } => {
                format!("El servidor rechazó la solicitud (código {status}).")
            }
            Self::Decode(_) => "El servidor respondió con datos que no entiendo.".to_string(),
        }
    }
}

/// Failure of an intent handler or a flow step. Caught by the dispatcher,
/// rendered as one message, and the active flow is torn down.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TurnError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway(error) => error.user_message(),
            Self::InvalidInput(message) => message.clone(),
        }
    }
}
