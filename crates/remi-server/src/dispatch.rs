//! The implementation surface of a skeleton.
//!
//! With no reflection to lean on, the implementation object is a
//! dispatch table: the user registers one handler closure per declared
//! method signature, keyed by `(method name, ordered parameter type
//! identifiers)`. The skeleton resolves incoming requests against the
//! interface descriptor first and this table second, so the table can
//! never widen the remote surface beyond the declared interface.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use remi_common::protocol::fault::Fault;

/// What a handler produced: a value for the caller, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(Value),
    Void,
}

impl Outcome {
    /// Serializes a handler's return value.
    ///
    /// A non-serializable value is reported as a transport fault, which
    /// the skeleton sends back in place of the result.
    pub fn value<T: Serialize>(value: T) -> Result<Outcome, Fault> {
        match serde_json::to_value(value) {
            Ok(encoded) => Ok(Outcome::Value(encoded)),
            Err(e) => Err(Fault::transport(format!(
                "return value is not serializable: {}",
                e
            ))),
        }
    }
}

type Handler = dyn Fn(Vec<Value>) -> Result<Outcome, Fault> + Send + Sync;

#[derive(PartialEq, Eq, Hash)]
struct MethodKey {
    name: String,
    parameter_types: Vec<String>,
}

/// Table of method handlers backing a skeleton.
///
/// # Example
///
/// ```
/// use remi_server::{Dispatcher, Outcome};
/// use remi_common::Fault;
///
/// let dispatcher = Dispatcher::new().register("divide", &["i32", "i32"], |args| {
///     let a = args[0].as_i64().unwrap_or(0);
///     let b = args[1].as_i64().unwrap_or(0);
///     if b == 0 {
///         return Err(Fault::new("app.Arithmetic", "/ by zero"));
///     }
///     Outcome::value(a / b)
/// });
/// # let _ = dispatcher;
/// ```
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<MethodKey, Box<Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
        }
    }

    /// Registers the handler for `(method, parameter_types)`, replacing
    /// any previous registration of the same signature.
    pub fn register<F>(mut self, method: &str, parameter_types: &[&str], handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Outcome, Fault> + Send + Sync + 'static,
    {
        let key = MethodKey {
            name: method.to_string(),
            parameter_types: parameter_types.iter().map(|t| t.to_string()).collect(),
        };
        self.handlers.insert(key, Box::new(handler));
        self
    }

    /// Invokes the handler registered for the exact signature, or `None`
    /// when the implementation does not provide it.
    pub fn invoke(
        &self,
        method: &str,
        parameter_types: &[String],
        arguments: Vec<Value>,
    ) -> Option<Result<Outcome, Fault>> {
        let key = MethodKey {
            name: method.to_string(),
            parameter_types: parameter_types.to_vec(),
        };
        self.handlers.get(&key).map(|handler| handler(arguments))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn registered_handler_is_invoked() {
        let dispatcher = Dispatcher::new().register("ping", &["i32"], |args| {
            Outcome::value(format!("pong{}", args[0]))
        });

        let outcome = dispatcher
            .invoke("ping", &types(&["i32"]), vec![json!(3)])
            .unwrap()
            .unwrap();
        assert_eq!(outcome, Outcome::Value(json!("pong3")));
    }

    #[test]
    fn void_handlers_produce_no_value() {
        let dispatcher = Dispatcher::new().register("reset", &[], |_| Ok(Outcome::Void));

        let outcome = dispatcher.invoke("reset", &[], vec![]).unwrap().unwrap();
        assert_eq!(outcome, Outcome::Void);
    }

    #[test]
    fn handler_faults_pass_through() {
        let dispatcher = Dispatcher::new().register("divide", &["i32", "i32"], |args| {
            if args[1] == json!(0) {
                return Err(Fault::new("app.Arithmetic", "/ by zero"));
            }
            Outcome::value(args[0].as_i64().unwrap_or(0) / args[1].as_i64().unwrap_or(1))
        });

        let fault = dispatcher
            .invoke("divide", &types(&["i32", "i32"]), vec![json!(1), json!(0)])
            .unwrap()
            .unwrap_err();
        assert_eq!(fault.kind, "app.Arithmetic");
    }

    #[test]
    fn lookup_is_exact_on_the_signature() {
        let dispatcher = Dispatcher::new().register("ping", &["i32"], |_| Ok(Outcome::Void));

        assert!(dispatcher.invoke("ping", &types(&["i64"]), vec![]).is_none());
        assert!(dispatcher.invoke("pong", &types(&["i32"]), vec![]).is_none());
        assert!(dispatcher.invoke("ping", &[], vec![]).is_none());
    }
}
