//! Request envelope.
//!
//! A request names the invoked method, identifies its signature by the
//! ordered list of declared parameter type identifiers, and carries the
//! serialized argument values. The skeleton resolves the target method by
//! the exact pair `(method, parameter_types)`; there is no widening and no
//! coercion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable type identifier: the fully qualified name of a parameter or
/// return type as declared on the remote interface.
pub type TypeName = String;

/// One remote method invocation, client to server.
///
/// Exactly one request travels per connection, fully written and flushed
/// before the client reads anything back.
///
/// # Example
///
/// ```
/// use remi_common::protocol::Request;
/// use serde_json::json;
///
/// let request = Request::new("divide", &["i32", "i32"], vec![json!(10), json!(2)], "i32");
/// assert_eq!(request.method, "divide");
/// assert_eq!(request.arguments.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    /// Name of the method to invoke.
    pub method: String,
    /// Ordered parameter type identifiers of the declared signature.
    pub parameter_types: Vec<TypeName>,
    /// Ordered argument values.
    pub arguments: Vec<Value>,
    /// Declared return type identifier.
    pub return_type: TypeName,
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        parameter_types: &[&str],
        arguments: Vec<Value>,
        return_type: impl Into<String>,
    ) -> Self {
        Request {
            method: method.into(),
            parameter_types: parameter_types.iter().map(|t| t.to_string()).collect(),
            arguments,
            return_type: return_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_creation() {
        let request = Request::new("ping", &["i32"], vec![json!(7)], "String");
        assert_eq!(request.method, "ping");
        assert_eq!(request.parameter_types, vec!["i32".to_string()]);
        assert_eq!(request.arguments, vec![json!(7)]);
        assert_eq!(request.return_type, "String");
    }

    #[test]
    fn request_serialization() {
        let request = Request::new(
            "store",
            &["String", "app.Record"],
            vec![json!("key"), json!({"field": [1, 2, 3]})],
            "()",
        );

        let encoded = serde_json::to_string(&request).unwrap();
        let decoded: Request = serde_json::from_str(&encoded).unwrap();
        assert_eq!(request, decoded);
    }
}
