use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire form of a raised failure.
///
/// A fault identifies the failure by a stable `kind` (a fully qualified
/// type identifier), carries a human-readable `message`, and optionally a
/// `detail` payload with whatever data the raising side attached. When a
/// fault wraps another failure (an undeclared user failure wrapped in the
/// transport kind), the original travels in `cause` so the client can
/// still observe it with fidelity.
///
/// The runtime's own kind, [`Fault::TRANSPORT_KIND`], is the one every
/// remote interface method must declare; it is always transportable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fault {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Fault>>,
}

impl Fault {
    /// Kind identifier of the runtime's transport failure.
    pub const TRANSPORT_KIND: &'static str = "remi.Transport";

    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Fault {
            kind: kind.into(),
            message: message.into(),
            detail: None,
            cause: None,
        }
    }

    /// A fault of the runtime's transport kind.
    pub fn transport(message: impl Into<String>) -> Self {
        Fault::new(Self::TRANSPORT_KIND, message)
    }

    /// Attaches a payload for the re-raising side.
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Records the failure this fault wraps.
    pub fn caused_by(mut self, cause: &Fault) -> Self {
        self.cause = Some(Box::new(cause.clone()));
        self
    }

    pub fn is_transport(&self) -> bool {
        self.kind == Self::TRANSPORT_KIND
    }

    /// The wrapped failure, if any.
    pub fn cause(&self) -> Option<Fault> {
        self.cause.as_deref().cloned()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
