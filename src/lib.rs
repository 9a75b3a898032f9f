//! # prizmdoc-rest
//!
//! HTTP client for PrizmDoc Server and PrizmDoc Cloud clusters.
//!
//! Groups of related requests are pinned to one backend node through an
//! affinity session, and long-running conversion or burning processes can be
//! awaited with a single call.
//!
//! ## Security
//!
//! - API keys added with `with_api_key` are redacted in Debug output
//! - Affinity tokens are never written to tracing output
//!
//! ## Crates
//!
//! - **prizmdoc-client** - Affinity sessions, request composition, process polling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prizmdoc_rest::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let session = config.create_affinity_session();
//!
//!     let response = session
//!         .get_final_process_status("/v2/contentConverters/ElkNzWtrUJp4rXI5YnLUgw")
//!         .await?;
//!     println!("{}", response.text().await?);
//!
//!     Ok(())
//! }
//! ```

// Re-export the client crate for convenient access
pub use prizmdoc_client as client;

// Re-export commonly used types at the top level
pub use prizmdoc_client::{
    AffinitySession, ClientConfig, Error, ErrorKind, PollingConfig, RequestMethod, Response,
    Result, SharedTransport, TransportConfig, AFFINITY_TOKEN_HEADER, API_KEY_HEADER,
};
