use std::net::SocketAddr;

/// Something that has, or may eventually have, a bound network address.
///
/// The stub factory accepts any endpoint, which lets a stub be created
/// from a skeleton without the client crate depending on the server
/// crate. A skeleton reports its configured address before `start` and
/// the actual bound address afterwards.
pub trait Endpoint {
    /// The endpoint's address, if one has been configured or bound.
    fn address(&self) -> Option<SocketAddr>;

    /// The endpoint's port, if an address is available.
    fn port(&self) -> Option<u16> {
        self.address().map(|addr| addr.port())
    }
}
