use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use remi_common::descriptor::{InterfaceDescriptor, MethodDescriptor};
use remi_common::endpoint::Endpoint;
use remi_common::protocol::error::{RemiError, Result};
use remi_common::protocol::fault::Fault;
use remi_common::protocol::{Request, Status};
use remi_common::transport::TcpTransport;

/// Network address a stub dials.
///
/// The hostname is kept verbatim rather than resolved, so stub identity
/// (equality, hashing, display) never performs name resolution. The
/// address resolves only when a call actually opens a connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StubAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for StubAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<SocketAddr> for StubAddress {
    fn from(addr: SocketAddr) -> Self {
        StubAddress {
            host: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

impl From<(&str, u16)> for StubAddress {
    fn from((host, port): (&str, u16)) -> Self {
        StubAddress {
            host: host.to_string(),
            port,
        }
    }
}

/// Client-side proxy for a remote interface.
///
/// A stub pairs an [`InterfaceDescriptor`] with the address of the
/// skeleton serving it. Each method invocation becomes one TCP round
/// trip on a fresh connection. Two stubs are equal iff they carry the
/// same descriptor and the same address, and would therefore connect to
/// the same skeleton.
///
/// Stubs are serializable and may be transmitted to another process to
/// bootstrap communication with the same skeleton.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Stub {
    descriptor: InterfaceDescriptor,
    address: StubAddress,
}

impl Stub {
    /// Creates a stub from a skeleton with an assigned address.
    ///
    /// The skeleton must either have been constructed with a fixed
    /// address or have been started; fails with `IllegalState` otherwise.
    /// A wildcard bind address is replaced by the local host, failing
    /// with `UnknownHost` when no local host resolves.
    pub fn create(descriptor: InterfaceDescriptor, skeleton: &dyn Endpoint) -> Result<Self> {
        descriptor.validate_remote()?;

        let addr = skeleton.address().ok_or_else(|| {
            RemiError::IllegalState(
                "skeleton has no address; construct it with one or start it".to_string(),
            )
        })?;

        let address = if addr.ip().is_unspecified() {
            local_host_address(addr.port())?
        } else {
            StubAddress::from(addr)
        };

        Ok(Stub {
            descriptor,
            address,
        })
    }

    /// Creates a stub from a skeleton's port and a caller-supplied
    /// hostname.
    ///
    /// For skeletons reachable only through an externally routable name
    /// the system cannot discover on its own. The skeleton must have an
    /// assigned port (1..=65535); fails with `IllegalState` otherwise.
    pub fn create_with_hostname(
        descriptor: InterfaceDescriptor,
        skeleton: &dyn Endpoint,
        hostname: &str,
    ) -> Result<Self> {
        descriptor.validate_remote()?;

        if hostname.is_empty() {
            return Err(RemiError::NullArgument("hostname"));
        }

        let port = skeleton.port().unwrap_or(0);
        if port == 0 {
            return Err(RemiError::IllegalState(
                "skeleton has not been assigned a port".to_string(),
            ));
        }

        Ok(Stub {
            descriptor,
            address: StubAddress {
                host: hostname.to_string(),
                port,
            },
        })
    }

    /// Creates a stub from a known remote address (the bootstrap case,
    /// when the server is already running somewhere else and no skeleton
    /// value is at hand).
    pub fn create_with_address(
        descriptor: InterfaceDescriptor,
        address: impl Into<StubAddress>,
    ) -> Result<Self> {
        descriptor.validate_remote()?;

        let address = address.into();
        if address.host.is_empty() {
            return Err(RemiError::NullArgument("address host"));
        }

        Ok(Stub {
            descriptor,
            address,
        })
    }

    pub fn descriptor(&self) -> &InterfaceDescriptor {
        &self.descriptor
    }

    pub fn address(&self) -> &StubAddress {
        &self.address
    }

    /// Invokes `method` on the remote implementation, resolving the
    /// signature by name and argument count.
    ///
    /// Returns `Ok(Some(value))` for a value-returning method and
    /// `Ok(None)` for a void one. A failure the remote method raised and
    /// declared is re-raised as [`RemiError::Fault`]; everything else
    /// surfaces as the transport kind. When the name is overloaded at the
    /// same arity, use [`Stub::invoke_as`] to pick the signature.
    pub fn invoke(&self, method: &str, arguments: Vec<Value>) -> Result<Option<Value>> {
        let mut candidates = self
            .descriptor
            .methods()
            .iter()
            .filter(|m| m.name == method && m.parameter_types.len() == arguments.len());

        let resolved = candidates.next().ok_or_else(|| {
            RemiError::transport(format!(
                "no method {} with {} parameter(s) declared on {}",
                method,
                arguments.len(),
                self.descriptor.name()
            ))
        })?;
        if candidates.next().is_some() {
            return Err(RemiError::transport(format!(
                "ambiguous overloads for {} on {}; use invoke_as",
                method,
                self.descriptor.name()
            )));
        }

        self.round_trip(resolved, arguments)
    }

    /// Invokes an exact signature: `method` with the given ordered
    /// parameter type identifiers.
    pub fn invoke_as(
        &self,
        method: &str,
        parameter_types: &[&str],
        arguments: Vec<Value>,
    ) -> Result<Option<Value>> {
        let wanted: Vec<String> = parameter_types.iter().map(|t| t.to_string()).collect();
        let resolved = self.descriptor.resolve(method, &wanted).ok_or_else(|| {
            RemiError::transport(format!(
                "no method {}({}) declared on {}",
                method,
                wanted.join(", "),
                self.descriptor.name()
            ))
        })?;

        self.round_trip(resolved, arguments)
    }

    /// Typed convenience wrapper around [`Stub::invoke`].
    ///
    /// `args` is serialized with serde: pass a tuple, one element per
    /// parameter, `()` for none. The return value is deserialized into
    /// `R`; void methods decode into `()`.
    ///
    /// ```rust,no_run
    /// # use remi_client::Stub;
    /// # fn demo(stub: &Stub) -> remi_common::Result<()> {
    /// let quotient: i32 = stub.call("divide", (10, 2))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn call<A: Serialize, R: DeserializeOwned>(&self, method: &str, args: A) -> Result<R> {
        let encoded = serde_json::to_value(args).map_err(|e| {
            RemiError::transport(format!("arguments are not serializable: {}", e))
        })?;
        let arguments = match encoded {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };

        let value = self.invoke(method, arguments)?.unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| RemiError::transport(format!("cannot decode return value: {}", e)))
    }

    /// One full request/response exchange on a fresh connection.
    fn round_trip(
        &self,
        method: &MethodDescriptor,
        arguments: Vec<Value>,
    ) -> Result<Option<Value>> {
        let parameter_types: Vec<&str> =
            method.parameter_types.iter().map(String::as_str).collect();
        let request = Request::new(
            method.name.clone(),
            &parameter_types,
            arguments,
            method.return_type.clone(),
        );

        tracing::debug!(
            method = %request.method,
            address = %self.address,
            "invoking remote method"
        );

        let mut stream = TcpTransport::connect(&self.address.host, self.address.port)?;
        let response = TcpTransport::call(&mut stream, &request)?;
        drop(stream);

        match response.status {
            Status::Success => {
                let value = response.payload.ok_or_else(|| {
                    RemiError::transport("success response carries no value")
                })?;
                Ok(Some(value))
            }
            Status::Void => Ok(None),
            Status::Failed => Err(reraise(response.fault()?, method)),
        }
    }
}

impl fmt::Display for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.descriptor.name(), self.address)
    }
}

/// Turns a received fault back into the error the caller observes.
///
/// The runtime's transport kind stays the transport kind; a fault whose
/// kind the method declares is re-raised verbatim; anything else is
/// wrapped in the transport kind with the original attached.
fn reraise(fault: Fault, method: &MethodDescriptor) -> RemiError {
    if fault.is_transport() {
        RemiError::Transport {
            message: fault.message.clone(),
            fault: Some(fault),
        }
    } else if method.declares(&fault.kind) {
        RemiError::Fault(fault)
    } else {
        RemiError::wrapping(
            format!("remote method raised undeclared failure {}", fault.kind),
            fault,
        )
    }
}

fn local_host_address(port: u16) -> Result<StubAddress> {
    // resolution is probed here; the stored address stays the name
    let mut resolved = ("localhost", port)
        .to_socket_addrs()
        .map_err(|e| RemiError::UnknownHost(format!("cannot resolve local host: {}", e)))?;
    if resolved.next().is_none() {
        return Err(RemiError::UnknownHost(
            "local host resolves to no addresses".to_string(),
        ));
    }
    Ok(StubAddress {
        host: "localhost".to_string(),
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::net::TcpListener;

    struct FakeEndpoint(Option<SocketAddr>);

    impl Endpoint for FakeEndpoint {
        fn address(&self) -> Option<SocketAddr> {
            self.0
        }
    }

    fn ping_descriptor() -> InterfaceDescriptor {
        InterfaceDescriptor::new("app.PingServer").method(
            "ping",
            &["i32"],
            "String",
            &[Fault::TRANSPORT_KIND],
        )
    }

    fn hash_of(stub: &Stub) -> u64 {
        let mut hasher = DefaultHasher::new();
        stub.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn stub_identity_derives_from_interface_and_address() {
        // unroutable host: identity must not touch the network
        let a = Stub::create_with_address(ping_descriptor(), ("stub-test.invalid", 7099)).unwrap();
        let b = Stub::create_with_address(ping_descriptor(), ("stub-test.invalid", 7099)).unwrap();
        let other_port =
            Stub::create_with_address(ping_descriptor(), ("stub-test.invalid", 7100)).unwrap();

        let other_interface = InterfaceDescriptor::new("app.Other").method(
            "ping",
            &["i32"],
            "String",
            &[Fault::TRANSPORT_KIND],
        );
        let other = Stub::create_with_address(other_interface, ("stub-test.invalid", 7099)).unwrap();

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, other_port);
        assert_ne!(a, other);
    }

    #[test]
    fn display_is_interface_then_address() {
        let stub = Stub::create_with_address(ping_descriptor(), ("stub-test.invalid", 7099)).unwrap();
        assert_eq!(stub.to_string(), "app.PingServer, stub-test.invalid:7099");
    }

    #[test]
    fn non_remote_interface_is_rejected() {
        let local = InterfaceDescriptor::new("app.Local").method("ping", &["i32"], "String", &[]);
        let err = Stub::create_with_address(local, ("localhost", 7099)).unwrap_err();
        assert!(matches!(err, RemiError::BadInterface(_)));
    }

    #[test]
    fn empty_hostname_is_a_missing_argument() {
        let endpoint = FakeEndpoint(Some("127.0.0.1:9000".parse().unwrap()));
        let err =
            Stub::create_with_hostname(ping_descriptor(), &endpoint, "").unwrap_err();
        assert!(matches!(err, RemiError::NullArgument("hostname")));
    }

    #[test]
    fn addressless_skeleton_is_an_illegal_state() {
        let endpoint = FakeEndpoint(None);
        let err = Stub::create(ping_descriptor(), &endpoint).unwrap_err();
        assert!(matches!(err, RemiError::IllegalState(_)));
    }

    #[test]
    fn portless_skeleton_is_an_illegal_state_for_hostname_override() {
        for endpoint in [
            FakeEndpoint(None),
            FakeEndpoint(Some("127.0.0.1:0".parse().unwrap())),
        ] {
            let err = Stub::create_with_hostname(ping_descriptor(), &endpoint, "example.com")
                .unwrap_err();
            assert!(matches!(err, RemiError::IllegalState(_)));
        }
    }

    #[test]
    fn wildcard_skeleton_address_becomes_local_host() {
        let endpoint = FakeEndpoint(Some("0.0.0.0:9000".parse().unwrap()));
        let stub = Stub::create(ping_descriptor(), &endpoint).unwrap();
        assert_eq!(stub.address().host, "localhost");
        assert_eq!(stub.address().port, 9000);
    }

    #[test]
    fn call_against_no_server_is_a_transport_error() {
        // grab a port the OS just handed out, then free it
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let stub = Stub::create_with_address(ping_descriptor(), ("127.0.0.1", port)).unwrap();
        let err = stub.invoke("ping", vec![serde_json::json!(1)]).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn undeclared_method_fails_locally_with_transport() {
        let stub = Stub::create_with_address(ping_descriptor(), ("stub-test.invalid", 7099)).unwrap();
        let err = stub.invoke("pong", vec![]).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn stubs_serialize_for_transmission() {
        let stub = Stub::create_with_address(ping_descriptor(), ("stub-test.invalid", 7099)).unwrap();
        let encoded = serde_json::to_string(&stub).unwrap();
        let decoded: Stub = serde_json::from_str(&encoded).unwrap();
        assert_eq!(stub, decoded);
    }
}
