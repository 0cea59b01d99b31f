//! The skeleton: a multithreaded TCP server fronting a dispatcher.
//!
//! One listener thread accepts connections; every accepted connection is
//! owned by its own service thread for exactly one request/response
//! exchange. The state machine (`Created → Running → Stopping → Stopped`,
//! restartable) is guarded by a single mutex, and all transitions happen
//! in `start`, `stop` or on the listener's way out.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use remi_common::descriptor::InterfaceDescriptor;
use remi_common::endpoint::Endpoint;
use remi_common::protocol::error::{RemiError, Result};
use remi_common::protocol::{Request, Response};
use remi_common::transport::TcpTransport;

use crate::dispatch::{Dispatcher, Outcome};

/// Customization points for skeleton lifecycle events.
///
/// All methods have default bodies; implement only what you need. Hooks
/// run on the skeleton's own threads, so they should not block for long
/// and must not call `start` or `stop` on the same skeleton.
pub trait SkeletonHooks: Send + Sync {
    /// Called exactly once per stop, after the accept loop has ended.
    /// `cause` is the terminating error, or `None` for a clean stop.
    fn stopped(&self, cause: Option<&RemiError>) {
        let _ = cause;
    }

    /// Called on a top-level error in the accept loop. Return `true` to
    /// resume accepting; `false` shuts the server down, and the error is
    /// then delivered to [`SkeletonHooks::stopped`].
    fn listen_error(&self, error: &RemiError) -> bool {
        let _ = error;
        false
    }

    /// Called when a service thread fails for any reason other than a
    /// failure raised by the user method itself.
    fn service_error(&self, error: &RemiError) {
        let _ = error;
    }
}

/// Default hooks: ignore everything, shut down on listener errors.
struct NoHooks;

impl SkeletonHooks for NoHooks {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Running,
    Stopping,
    Stopped,
}

struct Inner {
    state: State,
    bound: Option<SocketAddr>,
    listener: Option<JoinHandle<()>>,
}

struct Core {
    descriptor: InterfaceDescriptor,
    dispatcher: Dispatcher,
    hooks: Box<dyn SkeletonHooks>,
    configured: Option<SocketAddr>,
    stop: AtomicBool,
    inner: Mutex<Inner>,
}

impl Core {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Server half of the RMI runtime.
///
/// A skeleton pairs an [`InterfaceDescriptor`] with a [`Dispatcher`] and
/// serves invocation requests for that interface over TCP. Cloning a
/// skeleton yields another handle to the same server.
///
/// # Example
///
/// ```rust,no_run
/// use remi_common::{Fault, InterfaceDescriptor};
/// use remi_server::{Dispatcher, Outcome, Skeleton};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let descriptor = InterfaceDescriptor::new("app.PingServer")
///         .method("ping", &["i32"], "String", &[Fault::TRANSPORT_KIND]);
///     let dispatcher = Dispatcher::new().register("ping", &["i32"], |args| {
///         Outcome::value(format!("pong{}", args[0]))
///     });
///
///     let skeleton = Skeleton::new(descriptor, dispatcher)?;
///     skeleton.start()?;
///     // ... serve until shutdown ...
///     skeleton.stop();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Skeleton {
    core: Arc<Core>,
}

impl std::fmt::Debug for Skeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skeleton").finish_non_exhaustive()
    }
}

impl Skeleton {
    /// Creates a skeleton with no initial address; one is chosen when
    /// `start` is called. For skeletons that do not need a well-known
    /// port.
    pub fn new(descriptor: InterfaceDescriptor, dispatcher: Dispatcher) -> Result<Self> {
        Self::build(descriptor, dispatcher, None, Box::new(NoHooks))
    }

    /// Creates a skeleton that will bind the given address. A port of 0
    /// means OS-assigned.
    pub fn with_address(
        descriptor: InterfaceDescriptor,
        dispatcher: Dispatcher,
        address: SocketAddr,
    ) -> Result<Self> {
        Self::build(descriptor, dispatcher, Some(address), Box::new(NoHooks))
    }

    /// Creates a skeleton with custom lifecycle hooks.
    pub fn with_hooks(
        descriptor: InterfaceDescriptor,
        dispatcher: Dispatcher,
        address: Option<SocketAddr>,
        hooks: impl SkeletonHooks + 'static,
    ) -> Result<Self> {
        Self::build(descriptor, dispatcher, address, Box::new(hooks))
    }

    fn build(
        descriptor: InterfaceDescriptor,
        dispatcher: Dispatcher,
        configured: Option<SocketAddr>,
        hooks: Box<dyn SkeletonHooks>,
    ) -> Result<Self> {
        descriptor.validate_remote()?;

        Ok(Skeleton {
            core: Arc::new(Core {
                descriptor,
                dispatcher,
                hooks,
                configured,
                stop: AtomicBool::new(false),
                inner: Mutex::new(Inner {
                    state: State::Created,
                    bound: None,
                    listener: None,
                }),
            }),
        })
    }

    /// Starts the server.
    ///
    /// Binds the listening socket, spawns the listener thread and returns
    /// immediately. Fails with the transport kind when the skeleton is
    /// already running or the socket cannot be bound; in that case the
    /// state is unchanged and `start` may be retried.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.core.lock();

        match inner.state {
            State::Running | State::Stopping => {
                return Err(RemiError::transport("skeleton is already running"));
            }
            State::Created | State::Stopped => {}
        }

        let bind_addr = self
            .core
            .configured
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 0)));
        let listener = TcpListener::bind(bind_addr)
            .map_err(|e| RemiError::transport(format!("cannot bind {}: {}", bind_addr, e)))?;
        let bound = listener
            .local_addr()
            .map_err(|e| RemiError::transport(format!("cannot read bound address: {}", e)))?;

        self.core.stop.store(false, Ordering::SeqCst);
        let core = Arc::clone(&self.core);
        let handle = thread::Builder::new()
            .name("remi-listener".to_string())
            .spawn(move || listen_loop(core, listener))
            .map_err(|e| RemiError::transport(format!("cannot spawn listener thread: {}", e)))?;

        inner.state = State::Running;
        inner.bound = Some(bound);
        inner.listener = Some(handle);

        tracing::debug!(
            address = %bound,
            interface = self.core.descriptor.name(),
            "skeleton started"
        );
        Ok(())
    }

    /// Stops the server, if it is running.
    ///
    /// The listener thread is signalled, woken and joined; by the time
    /// `stop` returns, `stopped` has been delivered. Service threads
    /// already handling connections run to completion on their own.
    /// Stopping a skeleton that is not running is a no-op.
    pub fn stop(&self) {
        let bound = {
            let mut inner = self.core.lock();
            if inner.state != State::Running {
                return;
            }
            inner.state = State::Stopping;
            inner.bound
        };

        self.core.stop.store(true, Ordering::SeqCst);

        // wake the accept loop; the connection itself is discarded
        if let Some(addr) = bound {
            let nudge = if addr.ip().is_unspecified() {
                SocketAddr::from(([127, 0, 0, 1], addr.port()))
            } else {
                addr
            };
            let _ = TcpStream::connect(nudge);
        }

        let handle = self.core.lock().listener.take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// The skeleton's address: the bound address while running, the
    /// configured address otherwise. Safe to call in any state.
    pub fn address(&self) -> Option<SocketAddr> {
        self.core.lock().bound.or(self.core.configured)
    }

    /// The skeleton's port, if an address is available.
    pub fn port(&self) -> Option<u16> {
        self.address().map(|addr| addr.port())
    }
}

impl Endpoint for Skeleton {
    fn address(&self) -> Option<SocketAddr> {
        Skeleton::address(self)
    }
}

fn listen_loop(core: Arc<Core>, listener: TcpListener) {
    let cause = accept_loop(&core, &listener);
    drop(listener);

    core.hooks.stopped(cause.as_ref());
    core.lock().state = State::Stopped;

    tracing::debug!("skeleton stopped");
}

/// Accepts until stopped or until a fatal error. Returns the terminating
/// error, or `None` for a clean, stop-initiated exit.
fn accept_loop(core: &Arc<Core>, listener: &TcpListener) -> Option<RemiError> {
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                if core.stop.load(Ordering::SeqCst) {
                    return None;
                }
                tracing::debug!(peer = %peer, "connection accepted");

                let service_core = Arc::clone(core);
                let spawned = thread::Builder::new()
                    .name("remi-service".to_string())
                    .spawn(move || serve_connection(service_core, stream));
                if let Err(e) = spawned {
                    let err =
                        RemiError::transport(format!("cannot spawn service thread: {}", e));
                    tracing::error!(error = %err, "listener error");
                    if !core.hooks.listen_error(&err) {
                        return Some(err);
                    }
                }
            }
            Err(e) => {
                if core.stop.load(Ordering::SeqCst) {
                    return None;
                }
                let err = RemiError::transport(format!("accept failed: {}", e));
                tracing::error!(error = %err, "listener error");
                if !core.hooks.listen_error(&err) {
                    return Some(err);
                }
            }
        }
    }
}

/// Handles one connection: one request in, one response out. The socket
/// closes when this thread exits, whatever happened before.
fn serve_connection(core: Arc<Core>, mut stream: TcpStream) {
    let response = match dispatch_one(&core, &mut stream) {
        Ok(response) => response,
        Err(err) => {
            // a wire or dispatch problem, never the user method's failure
            tracing::warn!(error = %err, "service thread failed");
            core.hooks.service_error(&err);
            Response::failed(err.to_fault())
        }
    };

    if let Err(err) = TcpTransport::send_response(&mut stream, &response) {
        core.hooks.service_error(&err);
    }
}

fn dispatch_one(core: &Core, stream: &mut TcpStream) -> Result<Response> {
    let request = TcpTransport::receive_request(stream)?;
    let Request {
        method,
        parameter_types,
        arguments,
        ..
    } = request;

    if core.descriptor.resolve(&method, &parameter_types).is_none() {
        return Err(RemiError::transport(format!(
            "no method {}({}) declared on {}",
            method,
            parameter_types.join(", "),
            core.descriptor.name()
        )));
    }
    if arguments.len() != parameter_types.len() {
        return Err(RemiError::transport(format!(
            "{} takes {} argument(s), got {}",
            method,
            parameter_types.len(),
            arguments.len()
        )));
    }

    tracing::debug!(method = %method, "dispatching");

    let invoked = core
        .dispatcher
        .invoke(&method, &parameter_types, arguments)
        .ok_or_else(|| {
            RemiError::transport(format!("implementation does not provide {}", method))
        })?;

    Ok(match invoked {
        Ok(Outcome::Value(value)) => Response::success(value),
        Ok(Outcome::Void) => Response::void(),
        // the user method's own failure travels verbatim
        Err(fault) => Response::failed(fault),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn marker() -> InterfaceDescriptor {
        InterfaceDescriptor::new("test.Marker")
    }

    #[derive(Default)]
    struct CountingHooks {
        stopped: Arc<AtomicUsize>,
        stopped_with_cause: Arc<AtomicUsize>,
    }

    impl SkeletonHooks for CountingHooks {
        fn stopped(&self, cause: Option<&RemiError>) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
            if cause.is_some() {
                self.stopped_with_cause.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn start_on_a_running_skeleton_fails_with_transport() {
        let skeleton = Skeleton::new(marker(), Dispatcher::new()).unwrap();
        skeleton.start().unwrap();

        let err = skeleton.start().unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("already running"));

        skeleton.stop();
    }

    #[test]
    fn stop_on_a_non_running_skeleton_is_a_noop_without_hooks() {
        let stopped = Arc::new(AtomicUsize::new(0));
        let hooks = CountingHooks {
            stopped: Arc::clone(&stopped),
            ..Default::default()
        };
        let skeleton =
            Skeleton::with_hooks(marker(), Dispatcher::new(), None, hooks).unwrap();

        skeleton.stop();
        skeleton.stop();
        assert_eq!(stopped.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn start_stop_round_trip_delivers_stopped_exactly_once_per_stop() {
        let stopped = Arc::new(AtomicUsize::new(0));
        let with_cause = Arc::new(AtomicUsize::new(0));
        let hooks = CountingHooks {
            stopped: Arc::clone(&stopped),
            stopped_with_cause: Arc::clone(&with_cause),
        };
        let skeleton =
            Skeleton::with_hooks(marker(), Dispatcher::new(), None, hooks).unwrap();

        skeleton.start().unwrap();
        skeleton.stop();
        assert_eq!(stopped.load(Ordering::SeqCst), 1);

        // restartable: a stopped skeleton starts again
        skeleton.start().unwrap();
        skeleton.stop();
        assert_eq!(stopped.load(Ordering::SeqCst), 2);
        assert_eq!(with_cause.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn address_reports_configured_then_bound() {
        let configured: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let skeleton =
            Skeleton::with_address(marker(), Dispatcher::new(), configured).unwrap();
        assert_eq!(skeleton.port(), Some(0));

        skeleton.start().unwrap();
        let port = skeleton.port().unwrap();
        assert_ne!(port, 0);
        skeleton.stop();
    }

    #[test]
    fn bind_conflict_fails_start_but_leaves_the_skeleton_startable() {
        let holder = TcpListener::bind("127.0.0.1:0").unwrap();
        let taken = holder.local_addr().unwrap();

        let skeleton = Skeleton::with_address(marker(), Dispatcher::new(), taken).unwrap();
        let err = skeleton.start().unwrap_err();
        assert!(err.is_transport());

        drop(holder);
        skeleton.start().unwrap();
        skeleton.stop();
    }

    #[test]
    fn constructor_rejects_non_remote_interfaces() {
        let local = InterfaceDescriptor::new("test.Local").method("m", &[], "()", &[]);
        let err = Skeleton::new(local, Dispatcher::new()).unwrap_err();
        assert!(matches!(err, RemiError::BadInterface(_)));
    }
}
