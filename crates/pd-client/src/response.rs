//! HTTP response handling.
//!
//! A [`Response`] starts out streaming: only the status line and headers have
//! been read. Affinity discovery and the process poller may buffer the body to
//! inspect it; a buffered body is replayed to the caller unchanged.

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, ErrorKind, Result};

/// The request as it actually went out, after composition.
#[derive(Debug, Clone)]
pub struct SentRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
}

impl SentRequest {
    pub(crate) fn from_reqwest(request: &reqwest::Request) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
        }
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The fully resolved request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Every header sent, defaults and affinity header included.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[derive(Debug)]
enum Body {
    Streaming(reqwest::Response),
    Buffered(Bytes),
}

/// Response returned by an affinity session.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    request: SentRequest,
    body: Body,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response, request: SentRequest) -> Self {
        Self {
            status: inner.status(),
            headers: inner.headers().clone(),
            url: inner.url().clone(),
            request,
            body: Body::Streaming(inner),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// The media type with any parameters (such as charset) removed.
    pub fn media_type(&self) -> Option<&str> {
        self.content_type()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }

    /// Returns true if the media type is `application/json`.
    pub fn is_json(&self) -> bool {
        self.media_type()
            .is_some_and(|mt| mt.eq_ignore_ascii_case("application/json"))
    }

    /// The URL the response came from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request that produced this response.
    pub fn request(&self) -> &SentRequest {
        &self.request
    }

    /// Turn a non-2xx status into an error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::new(ErrorKind::Http {
            status: self.status(),
            message: self
                .status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        }))
    }

    /// Read the next chunk of the body, or `None` once it is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        match &mut self.body {
            Body::Streaming(resp) => resp.chunk().await.map_err(Into::into),
            Body::Buffered(bytes) if bytes.is_empty() => Ok(None),
            Body::Buffered(bytes) => Ok(Some(std::mem::take(bytes))),
        }
    }

    /// Get the response body as bytes.
    pub async fn bytes(self) -> Result<Bytes> {
        match self.body {
            Body::Streaming(resp) => resp.bytes().await.map_err(Into::into),
            Body::Buffered(bytes) => Ok(bytes),
        }
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        match self.body {
            Body::Streaming(resp) => resp.text().await.map_err(Into::into),
            Body::Buffered(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Read the whole body into memory so it can be inspected and replayed.
    pub(crate) async fn buffer(mut self) -> Result<Self> {
        if let Body::Streaming(resp) = self.body {
            self.body = Body::Buffered(resp.bytes().await?);
        }
        Ok(self)
    }

    /// The body, if it has already been buffered.
    pub(crate) fn buffered_body(&self) -> Option<&Bytes> {
        match &self.body {
            Body::Buffered(bytes) => Some(bytes),
            Body::Streaming(_) => None,
        }
    }

    /// Whether the body is still unread on the wire.
    pub fn is_streaming(&self) -> bool {
        matches!(self.body, Body::Streaming(_))
    }
}
