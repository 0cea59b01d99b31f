use crate::protocol::error::Result;
use crate::protocol::{Request, Response};

/// JSON codec for encoding/decoding wire envelopes.
///
/// JSON keeps the envelopes self-describing, which is what lets argument
/// and return values be arbitrary serializable user types carried as
/// `serde_json::Value`.
///
/// # Example
///
/// ```
/// use remi_common::transport::JsonCodec;
/// use remi_common::protocol::Request;
/// use serde_json::json;
///
/// let request = Request::new("ping", &["i32"], vec![json!(1)], "String");
/// let encoded = JsonCodec::encode_request(&request).unwrap();
/// let decoded = JsonCodec::decode_request(&encoded).unwrap();
/// assert_eq!(request, decoded);
/// ```
pub struct JsonCodec;

impl JsonCodec {
    pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(request)?)
    }

    pub fn decode_request(data: &[u8]) -> Result<Request> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(response)?)
    }

    pub fn decode_response(data: &[u8]) -> Result<Response> {
        Ok(serde_json::from_slice(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Fault, Response};
    use serde_json::json;

    #[test]
    fn request_codec_round_trip() {
        let request = Request::new("ping", &["i32"], vec![json!(42)], "String");

        let encoded = JsonCodec::encode_request(&request).unwrap();
        let decoded = JsonCodec::decode_request(&encoded).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn response_codec_round_trip() {
        let response = Response::failed(Fault::new("test.Arithmetic", "/ by zero"));

        let encoded = JsonCodec::encode_response(&response).unwrap();
        let decoded = JsonCodec::decode_response(&encoded).unwrap();
        assert_eq!(response, decoded);
    }

    #[test]
    fn malformed_request_data_is_rejected() {
        let result = JsonCodec::decode_request(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_response_data_is_rejected() {
        let result = JsonCodec::decode_response(b"{\"status\": \"maybe\"}");
        assert!(result.is_err());
    }
}
