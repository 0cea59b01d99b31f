//! remi Client
//!
//! This crate provides the stub factory: it builds [`Stub`] values that
//! impersonate an interface implementation hosted in another process.
//!
//! # Overview
//!
//! A stub hides the network behind an object-like surface. Invoking a
//! method on it opens a fresh TCP connection to the skeleton, sends one
//! request, reads one response, and either returns the decoded value or
//! re-raises the failure the remote method produced.
//!
//! # Key Properties
//!
//! - **One connection per call**: no pooling, no reuse, no retries; the
//!   socket is closed before the call returns on every path
//! - **Local identity**: equality, hashing and the display form derive
//!   from the `(interface, address)` pair and never touch the network
//! - **Concurrency**: a stub carries no mutable state; concurrent calls
//!   from many threads proceed on independent connections
//! - **Transmissible**: stubs serialize, so one process can hand another
//!   a ready-made handle to a remote object
//!
//! # Usage
//!
//! ```rust,no_run
//! use remi_client::Stub;
//! use remi_common::{Fault, InterfaceDescriptor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let descriptor = InterfaceDescriptor::new("app.PingServer")
//!         .method("ping", &["i32"], "String", &[Fault::TRANSPORT_KIND]);
//!
//!     let stub = Stub::create_with_address(descriptor, ("127.0.0.1", 7099))?;
//!     let reply: String = stub.call("ping", (7,))?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod stub;

pub use stub::{Stub, StubAddress};
