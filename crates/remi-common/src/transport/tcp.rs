use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::protocol::error::{RemiError, Result};
use crate::protocol::{Request, Response};
use crate::transport::codec::JsonCodec;

/// Maximum envelope size (16 MB). An oversized length prefix is treated
/// as a protocol violation rather than an allocation request.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Blocking, framed TCP transport.
///
/// # Wire Protocol
///
/// Each envelope is sent with a 4-byte length prefix (big-endian u32)
/// followed by the JSON-encoded data:
///
/// ```text
/// [4-byte length] [JSON data]
/// ```
///
/// One request and one response travel per connection. The sender always
/// writes and flushes its envelope completely before reading, and the
/// receiver never needs the peer's half-close to make progress, so the
/// two endpoints cannot deadlock on each other's reads.
pub struct TcpTransport;

impl TcpTransport {
    /// Connects to `host:port`, trying each resolved address until one
    /// accepts.
    pub fn connect(host: &str, port: u16) -> Result<TcpStream> {
        let addrs = (host, port).to_socket_addrs().map_err(|e| {
            RemiError::transport(format!("invalid address '{}:{}': {}", host, port, e))
        })?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(RemiError::transport(format!(
            "failed to connect to {}:{}: {}",
            host,
            port,
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// Sends one request and reads the single response, on a stream that
    /// carries no other traffic.
    pub fn call(stream: &mut TcpStream, request: &Request) -> Result<Response> {
        let encoded = JsonCodec::encode_request(request)?;
        Self::send_message(stream, &encoded)?;

        let data = Self::receive_message(stream)?;
        JsonCodec::decode_response(&data)
    }

    /// Reads the single request from an accepted connection.
    pub fn receive_request(stream: &mut TcpStream) -> Result<Request> {
        let data = Self::receive_message(stream)?;
        JsonCodec::decode_request(&data)
    }

    /// Writes and flushes the response on an accepted connection.
    pub fn send_response(stream: &mut TcpStream, response: &Response) -> Result<()> {
        let encoded = JsonCodec::encode_response(response)?;
        Self::send_message(stream, &encoded)
    }

    /// Sends a message with length prefix, flushing before returning.
    pub fn send_message(stream: &mut TcpStream, data: &[u8]) -> Result<()> {
        let len = data.len() as u32;

        stream
            .write_all(&len.to_be_bytes())
            .map_err(|e| Self::io_error(e, "writing length prefix"))?;
        stream
            .write_all(data)
            .map_err(|e| Self::io_error(e, "writing data"))?;
        stream
            .flush()
            .map_err(|e| Self::io_error(e, "flushing stream"))?;

        Ok(())
    }

    /// Receives a message with length prefix.
    pub fn receive_message(stream: &mut TcpStream) -> Result<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        stream
            .read_exact(&mut len_buf)
            .map_err(|e| Self::io_error(e, "reading length prefix"))?;

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(RemiError::transport(format!(
                "message too large: {} bytes (max {} bytes)",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        stream
            .read_exact(&mut buf)
            .map_err(|e| Self::io_error(e, "reading data"))?;

        Ok(buf)
    }

    fn io_error(err: std::io::Error, context: &str) -> RemiError {
        RemiError::transport(format!("{}: {}", context, err))
    }
}
