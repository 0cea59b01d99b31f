//! Remote interface descriptors.
//!
//! There is no reflection here: an [`InterfaceDescriptor`] is an ordinary
//! value describing a user-declared interface by its fully qualified name
//! and, per method, the name, ordered parameter type identifiers, return
//! type and declared failure kinds. Stub and skeleton share the same
//! descriptor: the stub uses it to build requests, the skeleton to resolve
//! them.
//!
//! An interface qualifies as *remote* only when every one of its methods
//! declares the runtime's transport fault kind. Both endpoints run
//! [`InterfaceDescriptor::validate_remote`] at construction time; it is
//! the sole mechanism guaranteeing the skeleton can always surface
//! transport errors to callers.

use serde::{Deserialize, Serialize};

use crate::protocol::error::{RemiError, Result};
use crate::protocol::fault::Fault;

/// One method of a remote interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub name: String,
    /// Ordered parameter type identifiers (fully qualified names).
    pub parameter_types: Vec<String>,
    pub return_type: String,
    /// Kind identifiers of the declared failure types.
    pub throws: Vec<String>,
}

impl MethodDescriptor {
    /// Whether `kind` is among the declared failure kinds.
    pub fn declares(&self, kind: &str) -> bool {
        self.throws.iter().any(|declared| declared == kind)
    }
}

/// Runtime description of a user-declared interface.
///
/// Descriptors are built through the chaining constructor and can only
/// ever describe interfaces; inherited methods are listed flattened.
///
/// # Example
///
/// ```
/// use remi_common::descriptor::InterfaceDescriptor;
/// use remi_common::protocol::Fault;
///
/// let descriptor = InterfaceDescriptor::new("app.Calculator")
///     .method("divide", &["i32", "i32"], "i32", &[Fault::TRANSPORT_KIND, "app.Arithmetic"])
///     .method("reset", &[], "()", &[Fault::TRANSPORT_KIND]);
/// assert!(descriptor.validate_remote().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InterfaceDescriptor {
    name: String,
    methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceDescriptor {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Declares a method on the interface.
    pub fn method(
        mut self,
        name: &str,
        parameter_types: &[&str],
        return_type: &str,
        throws: &[&str],
    ) -> Self {
        self.methods.push(MethodDescriptor {
            name: name.to_string(),
            parameter_types: parameter_types.iter().map(|t| t.to_string()).collect(),
            return_type: return_type.to_string(),
            throws: throws.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    /// Fully qualified interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Exact-match resolution by method name and ordered parameter type
    /// identifiers.
    pub fn resolve(&self, method: &str, parameter_types: &[String]) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .find(|m| m.name == method && m.parameter_types == parameter_types)
    }

    /// Checks that this descriptor qualifies as a remote interface.
    ///
    /// Rules, in order: the descriptor must name an interface, and every
    /// declared method must list [`Fault::TRANSPORT_KIND`] among its
    /// failure kinds. One offending method disqualifies the interface.
    pub fn validate_remote(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RemiError::NullArgument("interface name"));
        }
        for method in &self.methods {
            if method.name.is_empty() {
                return Err(RemiError::NullArgument("method name"));
            }
            if !method.declares(Fault::TRANSPORT_KIND) {
                return Err(RemiError::BadInterface(format!(
                    "method {}::{} does not declare {}",
                    self.name,
                    method.name,
                    Fault::TRANSPORT_KIND
                )));
            }
        }
        Ok(())
    }
}
