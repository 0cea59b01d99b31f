//! remi Transport Layer
//!
//! Blocking TCP transport and the JSON codec for the RMI wire exchange.
//!
//! # Architecture
//!
//! - **Codec**: [`JsonCodec`] encodes/decodes the protocol envelopes
//! - **Transport**: [`TcpTransport`] frames envelopes with a 4-byte
//!   big-endian length prefix over `std::net::TcpStream`
//! - **Connection discipline**: one request and one response per
//!   connection; the sender writes and flushes completely before reading
//!
//! All receive paths enforce [`MAX_MESSAGE_SIZE`] so a corrupt or hostile
//! length prefix cannot trigger an arbitrary allocation.

pub mod codec;
pub mod tcp;

pub use codec::JsonCodec;
pub use tcp::{TcpTransport, MAX_MESSAGE_SIZE};
