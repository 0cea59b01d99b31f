use thiserror::Error;

use crate::protocol::fault::Fault;

/// Errors surfaced by the remi runtime.
///
/// The variants fall into three groups: synchronous API-boundary
/// rejections (`NullArgument`, `BadInterface`, `IllegalState`,
/// `UnknownHost`), the runtime's transport kind (`Transport`,
/// `Serialization`) covering everything that can go wrong on the wire,
/// and `Fault` for a failure the remote user method raised and declared,
/// re-raised verbatim on the caller's side.
#[derive(Error, Debug)]
pub enum RemiError {
    #[error("required argument missing: {0}")]
    NullArgument(&'static str),

    #[error("not a remote interface: {0}")]
    BadInterface(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("unknown host: {0}")]
    UnknownHost(String),

    /// Catch-all for wire failures: connection errors, framing and codec
    /// errors, protocol violations, and server-side dispatch errors that
    /// are not the user method's own failure. Carries the remote fault
    /// when one was received but could not be re-raised as declared.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        fault: Option<Fault>,
    },

    /// A declared failure raised by the remote user method.
    #[error("{0}")]
    Fault(Fault),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RemiError {
    /// Shorthand for a transport error with no wrapped fault.
    pub fn transport(message: impl Into<String>) -> Self {
        RemiError::Transport {
            message: message.into(),
            fault: None,
        }
    }

    /// A transport error wrapping a fault that arrived on the wire but is
    /// not declared by the invoked method.
    pub fn wrapping(message: impl Into<String>, fault: Fault) -> Self {
        RemiError::Transport {
            message: message.into(),
            fault: Some(fault),
        }
    }

    /// Whether this error is the runtime's transport kind, as opposed to a
    /// user-declared failure or an API-boundary rejection.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RemiError::Transport { .. } | RemiError::Serialization(_)
        )
    }

    /// The wire representation of this error. Every variant except a
    /// declared user fault maps to the transport kind.
    pub fn to_fault(&self) -> Fault {
        match self {
            RemiError::Fault(fault) => fault.clone(),
            RemiError::Transport { message, fault } => {
                let transport = Fault::transport(message.clone());
                match fault {
                    Some(inner) => transport.caused_by(inner),
                    None => transport,
                }
            }
            other => Fault::transport(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RemiError>;
