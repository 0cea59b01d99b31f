//! remi Common Types and Transport
//!
//! This crate provides the protocol definitions, interface descriptors and
//! TCP transport layer shared by the two halves of the remi RMI runtime:
//! the stub factory (`remi-client`) and the skeleton server (`remi-server`).
//!
//! # Overview
//!
//! remi lets one process call methods on an object hosted in another
//! process over TCP. A method call becomes exactly one request/response
//! exchange on a fresh connection:
//!
//! - **Descriptors**: runtime descriptions of user-declared remote
//!   interfaces, and the validator that decides whether an interface
//!   qualifies for remoting
//! - **Protocol Layer**: the [`Request`] and [`Response`] envelopes, the
//!   [`Fault`] wire form of raised failures, and the [`RemiError`] type
//! - **Transport Layer**: JSON codec and length-prefixed framing over
//!   blocking TCP
//!
//! # Wire Format
//!
//! Each envelope is a JSON document preceded by a 4-byte big-endian length
//! prefix. One request and one response travel per connection; the
//! connection is then closed.
//!
//! # Example
//!
//! ```
//! use remi_common::{Fault, InterfaceDescriptor, Request, Response};
//! use serde_json::json;
//!
//! let descriptor = InterfaceDescriptor::new("app.PingServer")
//!     .method("ping", &["i32"], "String", &[Fault::TRANSPORT_KIND]);
//! descriptor.validate_remote().unwrap();
//!
//! let request = Request::new("ping", &["i32"], vec![json!(7)], "String");
//! let response = Response::success(json!("pong7"));
//! # let _ = (request, response);
//! ```

pub mod descriptor;
pub mod endpoint;
pub mod protocol;
pub mod transport;

pub use descriptor::{InterfaceDescriptor, MethodDescriptor};
pub use endpoint::Endpoint;
pub use protocol::{Fault, RemiError, Request, Response, Result, Status};
