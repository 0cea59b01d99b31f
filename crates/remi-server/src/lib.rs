//! remi Server
//!
//! This crate provides the skeleton: a multithreaded TCP server that
//! receives method invocation requests from stubs and forwards them to a
//! user-supplied implementation.
//!
//! # Architecture
//!
//! A [`Skeleton`] owns one listening socket and one listener thread; each
//! accepted connection is handed to its own service thread, which reads
//! exactly one request, dispatches it, writes exactly one response and
//! exits. The implementation is a [`Dispatcher`], a table from
//! `(method name, parameter types)` to handler closures, shared across
//! service threads without coordination.
//!
//! # Thread Safety
//!
//! The skeleton never serializes calls: handlers run concurrently on as
//! many service threads as there are in-flight connections. Interior
//! thread safety of a handler is the user's concern; the skeleton only
//! guarantees that a handler is invoked with arguments matching its
//! declared signature.
//!
//! # Lifecycle
//!
//! `start` binds and spawns the listener, returning immediately; `stop`
//! shuts the listener down and waits for it, leaving in-flight service
//! threads to drain on their own connections. Lifecycle events are
//! reported through [`SkeletonHooks`]. A stopped skeleton can be started
//! again.
//!
//! # Main Components
//!
//! - [`Skeleton`] - the server
//! - [`Dispatcher`] / [`Outcome`] - the implementation surface
//! - [`SkeletonHooks`] - lifecycle customization points

pub mod dispatch;
pub mod skeleton;

pub use dispatch::{Dispatcher, Outcome};
pub use skeleton::{Skeleton, SkeletonHooks};
