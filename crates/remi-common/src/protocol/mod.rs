//! remi Protocol Definitions
//!
//! Core protocol types for the RMI wire exchange: the [`Request`] and
//! [`Response`] envelopes, the [`Fault`] representation of raised
//! failures, and the [`RemiError`] error type.
//!
//! # Exchange
//!
//! Exactly one [`Request`] travels from client to server per connection
//! and exactly one [`Response`] travels back; the connection is then
//! closed. The response [`Status`] is one of the three literal tags
//! `"success"`, `"void"` and `"failed"`. A failed response carries a
//! serialized [`Fault`] which the client re-raises: verbatim when the
//! fault's kind is declared by the invoked method, wrapped in the
//! transport kind otherwise.
//!
//! # Example
//!
//! ```
//! use remi_common::protocol::{Request, Response};
//! use serde_json::json;
//!
//! let request = Request::new("ping", &["i32"], vec![json!(0)], "String");
//! let response = Response::success(json!("pong0"));
//! # let _ = (request, response);
//! ```

pub mod error;
pub mod fault;
pub mod requests;
pub mod responses;


pub use error::{RemiError, Result};
pub use fault::Fault;
pub use requests::{Request, TypeName};
pub use responses::{Response, Status};
