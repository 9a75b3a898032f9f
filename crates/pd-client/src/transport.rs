//! The process-wide HTTP transport shared by every client configuration.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

static PROCESS_DEFAULT: OnceLock<SharedTransport> = OnceLock::new();

/// Settings applied once, when the shared transport is built.
///
/// Nothing here is per-request: base addresses and default headers live on
/// [`ClientConfig`](crate::ClientConfig) and are applied to each request.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to emit per-request tracing events.
    pub enable_tracing: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            // Work file uploads and downloads can be large.
            timeout: Duration::from_secs(100),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
        }
    }
}

impl TransportConfig {
    /// Create a new transport config builder.
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for TransportConfig.
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Build the transport configuration.
    pub fn build(self) -> TransportConfig {
        self.config
    }
}

/// Handle to a pooled HTTP transport.
///
/// Cloning is cheap and every clone shares one connection pool. Build one per
/// process (or use [`SharedTransport::process_default`]) and hand clones to
/// each [`ClientConfig`](crate::ClientConfig); building a transport per client
/// exhausts sockets under load.
#[derive(Debug, Clone)]
pub struct SharedTransport {
    inner: Arc<reqwest::Client>,
    enable_tracing: bool,
}

impl SharedTransport {
    /// Build a new transport with its own connection pool.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner: Arc::new(inner),
            enable_tracing: config.enable_tracing,
        })
    }

    /// The process-wide transport, built with default settings on first use.
    pub fn process_default() -> Result<Self> {
        if let Some(transport) = PROCESS_DEFAULT.get() {
            return Ok(transport.clone());
        }
        let built = Self::new(TransportConfig::default())?;
        // A concurrent caller may have won the race; either way one pool survives.
        Ok(PROCESS_DEFAULT.get_or_init(|| built).clone())
    }

    /// Returns true if both handles send through the same connection pool.
    pub fn shares_pool_with(&self, other: &SharedTransport) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether per-request tracing events are enabled.
    pub fn tracing_enabled(&self) -> bool {
        self.enable_tracing
    }

    /// Send a fully composed request. Returns once response headers arrive;
    /// the body is left unread.
    pub(crate) async fn dispatch(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        self.inner.execute(request).await.map_err(Into::into)
    }

    pub(crate) fn request(&self, method: reqwest::Method, url: url::Url) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }
}
