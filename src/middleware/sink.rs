//! Response sinks for the payment gate
//!
//! The protected handler's output is captured into a [`BufferedResponse`]
//! and only copied into the outgoing [`ResponseWriter`] once settlement has
//! succeeded. If settlement fails the buffer is dropped and nothing the
//! handler produced reaches the client.

use crate::{Result, X402Error};
use axum::{
    body::{Body, Bytes},
    response::Response,
};
use http::{HeaderMap, StatusCode};

/// Write side of an HTTP response
pub trait ResponseSink {
    /// Set the status code. Only the first call has an effect.
    fn set_status(&mut self, status: StatusCode);

    /// Response headers, writable until the response is produced
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Append body bytes. Commits status 200 if no status was set yet.
    fn write(&mut self, chunk: &[u8]);
}

/// Handler output held back until the payment is settled
#[derive(Debug)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    committed: bool,
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            committed: false,
        }
    }

    /// Drain a handler response into a new buffer.
    ///
    /// The whole body is collected; nothing is forwarded.
    pub async fn capture(response: Response) -> Result<Self> {
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| X402Error::ResponseCapture {
                reason: e.to_string(),
            })?;

        let mut buffer = Self::new();
        buffer.set_status(parts.status);
        *buffer.headers_mut() = parts.headers;
        buffer.write(&bytes);
        Ok(buffer)
    }

    /// Captured status; 200 until one is set
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether a status has been finalized
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Copy status, headers and body into `sink`, in that order.
    ///
    /// Consumes the buffer so it can be flushed at most once. Headers already
    /// present on the sink are kept unless the handler set the same name.
    pub fn flush<S: ResponseSink + ?Sized>(self, sink: &mut S) {
        sink.set_status(self.status);
        let mut current = None;
        for (name, value) in self.headers {
            if let Some(name) = name {
                sink.headers_mut().remove(&name);
                current = Some(name);
            }
            if let Some(name) = &current {
                sink.headers_mut().append(name.clone(), value);
            }
        }
        sink.write(&self.body);
    }
}

impl ResponseSink for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) {
        if !self.committed {
            self.status = status;
            self.committed = true;
        }
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, chunk: &[u8]) {
        if !self.committed {
            self.set_status(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }
}

/// Passthrough sink that becomes the response sent to the client
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish writing and produce the outgoing response
    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(Bytes::from(self.body)));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for ResponseWriter {
    fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_capture_is_idempotent() {
        let mut buffer = BufferedResponse::new();
        assert_eq!(buffer.status(), StatusCode::OK);
        assert!(!buffer.is_committed());

        buffer.set_status(StatusCode::CREATED);
        buffer.set_status(StatusCode::NOT_FOUND);
        buffer.set_status(StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(buffer.status(), StatusCode::CREATED);
        assert!(buffer.is_committed());
    }

    #[test]
    fn test_write_commits_implicit_ok() {
        let mut buffer = BufferedResponse::new();
        buffer.write(b"hello ");
        buffer.set_status(StatusCode::ACCEPTED);
        buffer.write(b"world");

        assert_eq!(buffer.status(), StatusCode::OK);
        assert_eq!(buffer.body(), b"hello world");
    }

    #[test]
    fn test_flush_writes_status_headers_and_body() {
        let mut buffer = BufferedResponse::new();
        buffer.set_status(StatusCode::CREATED);
        buffer
            .headers_mut()
            .insert("content-type", HeaderValue::from_static("text/plain"));
        buffer.write(b"paid content");

        let mut writer = ResponseWriter::new();
        writer
            .headers_mut()
            .insert("x-payment-response", HeaderValue::from_static("receipt"));
        buffer.flush(&mut writer);

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(response.headers()["x-payment-response"], "receipt");
    }

    #[test]
    fn test_flush_keeps_repeated_headers() {
        let mut buffer = BufferedResponse::new();
        buffer
            .headers_mut()
            .append("set-cookie", HeaderValue::from_static("a=1"));
        buffer
            .headers_mut()
            .append("set-cookie", HeaderValue::from_static("b=2"));

        let mut writer = ResponseWriter::new();
        buffer.flush(&mut writer);

        let response = writer.into_response();
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
    }

    #[tokio::test]
    async fn test_capture_handler_response() {
        let response = (StatusCode::IM_A_TEAPOT, "short and stout").into_response();
        let buffer = BufferedResponse::capture(response).await.unwrap();

        assert_eq!(buffer.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(buffer.body(), b"short and stout");
        assert!(buffer.headers().contains_key("content-type"));
    }
}
