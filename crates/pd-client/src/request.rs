//! Outgoing request description.
//!
//! A [`RequestBuilder`] only describes a request. Nothing is resolved or sent
//! until it is handed to [`AffinitySession::send`](crate::AffinitySession::send),
//! which applies the base address, default headers and affinity token.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::AFFINITY_TOKEN_HEADER;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Head => reqwest::Method::HEAD,
        }
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
}

impl RequestBody {
    /// Content-Type used when the request does not set one.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Text(_) => "text/plain; charset=utf-8",
            RequestBody::Bytes(_) => "application/octet-stream",
        }
    }

    pub(crate) fn into_bytes(self) -> Result<Bytes> {
        Ok(match self {
            RequestBody::Json(value) => Bytes::from(serde_json::to_vec(&value)?),
            RequestBody::Text(text) => Bytes::from(text),
            RequestBody::Bytes(bytes) => bytes,
        })
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

/// Builder for a request sent through an affinity session.
///
/// The path may be relative (`"/v2/contentConverters"`) or absolute; it is
/// resolved against the configured base address at send time.
#[derive(Debug)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<RequestBody>,
    /// Content-Type was filled in from the body rather than set by the caller.
    content_type_from_body: bool,
    /// First header error, reported by `send` before any I/O.
    pub(crate) error: Option<Error>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            content_type_from_body: false,
            error: None,
        }
    }

    /// The request method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The unresolved request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers explicitly set on this request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set a header, replacing any earlier value with the same name.
    ///
    /// Explicit headers always win over the configuration's default headers.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match parse_header(name.as_ref(), value.as_ref()) {
            Ok((name, value)) => {
                if name == CONTENT_TYPE {
                    self.content_type_from_body = false;
                }
                self.headers.insert(name, value);
            }
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Pin this one request to a specific affinity token.
    ///
    /// The session never overwrites an affinity header set this way.
    pub fn affinity_token(self, token: impl AsRef<str>) -> Self {
        self.header(AFFINITY_TOKEN_HEADER, token)
    }

    /// Set JSON body.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)?;
        Ok(self.json_value(value))
    }

    /// Set raw JSON body.
    pub fn json_value(self, body: serde_json::Value) -> Self {
        self.body(RequestBody::Json(body))
    }

    /// Set text body.
    pub fn text(self, body: impl Into<String>) -> Self {
        self.body(RequestBody::Text(body.into()))
    }

    /// Set bytes body, such as the contents of a document to upload.
    pub fn bytes(self, body: impl Into<Bytes>) -> Self {
        self.body(RequestBody::Bytes(body.into()))
    }

    /// Set the body, replacing any earlier one. Content-Type follows the body
    /// unless the caller set it with [`header`](Self::header).
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        let body = body.into();
        if self.content_type_from_body || !self.headers.contains_key(CONTENT_TYPE) {
            self.headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(body.default_content_type()),
            );
            self.content_type_from_body = true;
        }
        self.body = Some(body);
        self
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.as_bytes())?;
    let value = HeaderValue::from_str(value)?;
    Ok((name, value))
}
