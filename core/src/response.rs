//! Captured outcome of one HTTP round trip.
//!
//! # Design
//! A `ServiceResponse` is built in one step from a finished transport
//! response: status, headers and the whole body are read up front, and the
//! body reader is dropped before construction returns, whether it succeeded
//! or not. After that the value is immutable. There is no partially built
//! state: a missing response or an unreadable body is an error.

use std::fmt;
use std::io::Read;

use ureq::http;

use crate::content::ContentData;
use crate::encoding::{DecodeError, EncodingType};
use crate::error::RestingError;

/// Status, headers and body of a completed request.
#[derive(Debug)]
pub struct ServiceResponse {
    status: u16,
    headers: Vec<(String, String)>,
    content: ContentData,
}

impl ServiceResponse {
    /// Capture a transport response. `None` means the transport produced no
    /// response at all and is reported as a construction error.
    pub fn new<R: Read>(response: Option<http::Response<R>>, encoding: EncodingType) -> Result<Self, RestingError> {
        let response = response.ok_or_else(|| {
            RestingError::Construction("HTTP response is absent; check availability of the endpoint".to_string())
        })?;
        let (parts, mut body) = response.into_parts();

        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes).map_err(RestingError::BodyRead)?;
        drop(body);

        Self::from_parts(parts.status.as_u16(), headers, bytes, encoding)
    }

    /// Assemble a response from already captured parts.
    pub fn from_parts(
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        encoding: EncodingType,
    ) -> Result<Self, RestingError> {
        if !(100..=599).contains(&status) {
            return Err(RestingError::Construction(format!("status code {status} is outside 100..=599")));
        }
        Ok(Self {
            status,
            headers,
            content: ContentData::new(body, encoding),
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header names and values in arrival order. Values are read as UTF-8;
    /// bytes that are not valid UTF-8 become U+FFFD, so the raw value of
    /// such a header is not recoverable from here.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> Result<&str, DecodeError> {
        self.content.text()
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.content.bytes()
    }

    pub fn body_length(&self) -> usize {
        self.content.content_length()
    }

    pub fn content(&self) -> &ContentData {
        &self.content
    }

    /// Multi-line summary of status, headers and body for diagnostics.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ServiceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "ServiceResponse")?;
        writeln!(f, "---------------")?;
        writeln!(f, "HTTP Status: {}", self.status)?;
        writeln!(f, "Headers: ")?;
        for (name, value) in &self.headers {
            writeln!(f, "{name} : {value}")?;
        }
        writeln!(f, "Response body: ")?;
        match self.content.text() {
            Ok(text) => writeln!(f, "{text}")?,
            Err(e) => writeln!(f, "<{} bytes: {e}>", self.content.content_length())?,
        }
        writeln!(f, "----------------")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::{self, Cursor};
    use std::rc::Rc;

    use super::*;

    /// Reader that records being dropped and optionally fails.
    struct TrackedBody {
        inner: Cursor<Vec<u8>>,
        fail: bool,
        closed: Rc<Cell<bool>>,
    }

    impl Read for TrackedBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"));
            }
            self.inner.read(buf)
        }
    }

    impl Drop for TrackedBody {
        fn drop(&mut self) {
            self.closed.set(true);
        }
    }

    fn tracked(body: &str, fail: bool) -> (http::Response<TrackedBody>, Rc<Cell<bool>>) {
        let closed = Rc::new(Cell::new(false));
        let response = http::Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(TrackedBody {
                inner: Cursor::new(body.as_bytes().to_vec()),
                fail,
                closed: closed.clone(),
            })
            .unwrap();
        (response, closed)
    }

    #[test]
    fn captures_status_headers_and_body() {
        let (response, closed) = tracked(r#"{"name":"A"}"#, false);
        let response = ServiceResponse::new(Some(response), EncodingType::Utf8).unwrap();
        assert_eq!(response.status_code(), 200);
        assert!(response.is_success());
        assert_eq!(
            response.headers(),
            &[("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body_text().unwrap(), r#"{"name":"A"}"#);
        assert_eq!(response.body_length(), 12);
        assert_eq!(response.body_bytes(), br#"{"name":"A"}"#);
        assert!(closed.get());
    }

    #[test]
    fn non_utf8_header_value_is_replaced() {
        let response = http::Response::builder()
            .status(200)
            .header("X-Name", http::HeaderValue::from_bytes(&[b'c', b'a', b'f', 0xE9]).unwrap())
            .body(Cursor::new(Vec::new()))
            .unwrap();
        let response = ServiceResponse::new(Some(response), EncodingType::Utf8).unwrap();
        assert_eq!(response.header("x-name"), Some("caf\u{FFFD}"));
    }

    #[test]
    fn absent_response_is_construction_error() {
        let err = ServiceResponse::new(None::<http::Response<Cursor<Vec<u8>>>>, EncodingType::Utf8).unwrap_err();
        assert!(matches!(err, RestingError::Construction(_)));
    }

    #[test]
    fn body_read_failure_is_reported_and_stream_closed() {
        let (response, closed) = tracked("ignored", true);
        let err = ServiceResponse::new(Some(response), EncodingType::Utf8).unwrap_err();
        assert!(matches!(err, RestingError::BodyRead(_)));
        assert!(closed.get());
    }

    #[test]
    fn status_outside_range_is_rejected() {
        let err = ServiceResponse::from_parts(700, Vec::new(), Vec::new(), EncodingType::Utf8).unwrap_err();
        assert!(matches!(err, RestingError::Construction(_)));
        let err = ServiceResponse::from_parts(99, Vec::new(), Vec::new(), EncodingType::Utf8).unwrap_err();
        assert!(matches!(err, RestingError::Construction(_)));
    }

    #[test]
    fn undecodable_body_still_exposes_bytes() {
        let response = ServiceResponse::from_parts(200, Vec::new(), vec![0xFF, 0xFE, 0xFD], EncodingType::Utf8).unwrap();
        assert!(matches!(response.body_text(), Err(DecodeError::Malformed { .. })));
        assert_eq!(response.body_bytes(), &[0xFF, 0xFE, 0xFD]);
    }

    #[test]
    fn describe_lists_status_headers_and_body() {
        let response = ServiceResponse::from_parts(
            404,
            vec![("X-Trace".to_string(), "abc".to_string())],
            b"missing".to_vec(),
            EncodingType::Utf8,
        )
        .unwrap();
        let text = response.describe();
        assert!(!response.is_success());
        assert!(text.contains("HTTP Status: 404"));
        assert!(text.contains("X-Trace : abc"));
        assert!(text.contains("Response body: \nmissing\n"));
    }

    #[test]
    fn describe_marks_binary_body() {
        let response = ServiceResponse::from_parts(200, Vec::new(), vec![1, 2, 3], EncodingType::Binary).unwrap();
        assert!(response.describe().contains("<3 bytes: binary content cannot be decoded as text>"));
    }
}
