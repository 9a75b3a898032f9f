//! Client configuration: base address and default request headers.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::error::{Error, ErrorKind, Result};
use crate::request::parse_header;
use crate::session::AffinitySession;
use crate::transport::SharedTransport;
use crate::API_KEY_HEADER;

/// Environment variable holding the base address for [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "PRIZMDOC_BASE_URL";

/// Environment variable holding an optional API key for [`ClientConfig::from_env`].
pub const API_KEY_ENV: &str = "PRIZMDOC_API_KEY";

#[derive(Debug)]
struct ConfigState {
    base_address: Url,
    default_headers: HeaderMap,
}

/// Base address and default headers for one logical PrizmDoc client.
///
/// Cloning is cheap: clones, and every [`AffinitySession`] created from this
/// configuration, see the same base address and default headers. Changes made
/// by the owner apply to requests sent afterwards. The HTTP transport itself is
/// shared and is never reconfigured per client; the base address and headers
/// are applied to each request instead.
///
/// # Example
///
/// ```rust,ignore
/// use prizmdoc_client::ClientConfig;
///
/// let config = ClientConfig::new("https://api.accusoft.com")?
///     .with_api_key("YOUR_API_KEY")?;
///
/// let session = config.create_affinity_session();
/// let response = session.get("/v2/contentConverters/ElkNzWtrUJp4rXI5YnLUgw").await?;
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    state: Arc<RwLock<ConfigState>>,
    transport: SharedTransport,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        let headers: Vec<(&str, &str)> = state
            .default_headers
            .iter()
            .map(|(name, value)| {
                let shown = if value.is_sensitive() {
                    "[REDACTED]"
                } else {
                    value.to_str().unwrap_or("[non-ascii]")
                };
                (name.as_str(), shown)
            })
            .collect();
        f.debug_struct("ClientConfig")
            .field("base_address", &state.base_address.as_str())
            .field("default_headers", &headers)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a configuration that uses the process-wide transport.
    pub fn new(base_address: impl AsRef<str>) -> Result<Self> {
        Self::with_transport(base_address, SharedTransport::process_default()?)
    }

    /// Create a configuration that sends through an explicitly provided transport.
    pub fn with_transport(base_address: impl AsRef<str>, transport: SharedTransport) -> Result<Self> {
        let base_address = parse_base_address(base_address.as_ref())?;
        Ok(Self::from_url(base_address, transport))
    }

    /// Create a configuration from an already parsed absolute URL.
    pub fn from_url(base_address: Url, transport: SharedTransport) -> Self {
        Self {
            state: Arc::new(RwLock::new(ConfigState {
                base_address,
                default_headers: HeaderMap::new(),
            })),
            transport,
        }
    }

    /// Build a configuration from `PRIZMDOC_BASE_URL` and, when set,
    /// `PRIZMDOC_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base = lookup(BASE_URL_ENV).ok_or_else(|| {
            Error::new(ErrorKind::InvalidArgument(format!(
                "{BASE_URL_ENV} is not set"
            )))
        })?;
        let config = Self::new(base)?;
        match lookup(API_KEY_ENV).filter(|key| !key.is_empty()) {
            Some(key) => config.with_api_key(key),
            None => Ok(config),
        }
    }

    /// Add the `Acs-Api-Key` default header. The value is redacted in Debug output.
    pub fn with_api_key(self, api_key: impl AsRef<str>) -> Result<Self> {
        self.insert_default_header(API_KEY_HEADER, api_key)?;
        Ok(self)
    }

    /// Add a default header, builder style.
    pub fn with_default_header(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        self.insert_default_header(name, value)?;
        Ok(self)
    }

    /// The base address every request path is resolved against.
    pub fn base_address(&self) -> Url {
        self.state.read().base_address.clone()
    }

    /// Replace the base address for subsequent requests.
    pub fn set_base_address(&self, base_address: impl AsRef<str>) -> Result<()> {
        let parsed = parse_base_address(base_address.as_ref())?;
        self.state.write().base_address = parsed;
        Ok(())
    }

    /// A snapshot of the current default headers.
    pub fn default_headers(&self) -> HeaderMap {
        self.state.read().default_headers.clone()
    }

    /// Add or replace a default header. Names are case-insensitive.
    ///
    /// An `Acs-Api-Key` value is marked sensitive however it is added.
    pub fn insert_default_header(&self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
        let (name, mut value) = parse_header(name.as_ref(), value.as_ref())?;
        if name.as_str().eq_ignore_ascii_case(API_KEY_HEADER) {
            value.set_sensitive(true);
        }
        self.state.write().default_headers.insert(name, value);
        Ok(())
    }

    /// Remove a default header. Returns true if it was present.
    pub fn remove_default_header(&self, name: &str) -> bool {
        self.state.write().default_headers.remove(name).is_some()
    }

    /// The transport requests are dispatched through.
    pub fn transport(&self) -> &SharedTransport {
        &self.transport
    }

    /// Create an affinity session that discovers its token from the first
    /// JSON response carrying one.
    pub fn create_affinity_session(&self) -> AffinitySession {
        AffinitySession::new(self.clone(), None)
    }

    /// Create an affinity session pre-locked to an existing token.
    ///
    /// Every request, including the first, carries this token and discovery
    /// never runs. Fails with [`ErrorKind::InvalidHeader`] if the token cannot
    /// be sent as a header value.
    pub fn create_affinity_session_with_token(&self, affinity_token: impl Into<String>) -> Result<AffinitySession> {
        let affinity_token = affinity_token.into();
        HeaderValue::from_str(&affinity_token)?;
        Ok(AffinitySession::new(self.clone(), Some(affinity_token)))
    }

    /// Base address and default headers as of now. The lock is released
    /// before the caller does any I/O.
    pub(crate) fn snapshot(&self) -> (Url, HeaderMap) {
        let state = self.state.read();
        (state.base_address.clone(), state.default_headers.clone())
    }
}

fn parse_base_address(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument(
            "base address is required".to_string(),
        )));
    }
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::InvalidUrl(format!(
            "{url} cannot be used as a base address"
        ))));
    }
    Ok(url)
}
