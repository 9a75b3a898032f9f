//! # prizmdoc-client
//!
//! HTTP client layer for clustered PrizmDoc Server and PrizmDoc Cloud
//! deployments.
//!
//! This crate provides:
//! - Affinity sessions that discover, pin and propagate the affinity token
//! - Per-client base addresses and default headers over one shared transport
//! - Polling of long-running processes with doubling backoff
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    AffinitySession                          │
//! │  - Holds at most one affinity token (write once)            │
//! │  - send / get / post / put / delete                         │
//! │  - get_final_process_status (backoff polling)               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ClientConfig                            │
//! │  - Base address + default headers, applied per request      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SharedTransport                          │
//! │  - One pooled reqwest client for the whole process          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use prizmdoc_client::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), prizmdoc_client::Error> {
//!     let config = ClientConfig::new("https://api.accusoft.com")?
//!         .with_api_key("YOUR_API_KEY")?;
//!     let session = config.create_affinity_session();
//!
//!     let work_file: serde_json::Value = session
//!         .post("/PCCIS/V1/WorkFile", std::fs::read("input.docx").unwrap())
//!         .await?
//!         .error_for_status()?
//!         .json()
//!         .await?;
//!
//!     let process: serde_json::Value = session
//!         .post("/v2/contentConverters", serde_json::json!({
//!             "input": {
//!                 "sources": [{ "fileId": work_file["fileId"] }],
//!                 "dest": { "format": "pdf" }
//!             }
//!         }))
//!         .await?
//!         .error_for_status()?
//!         .json()
//!         .await?;
//!
//!     let done = session
//!         .get_final_process_status(format!("/v2/contentConverters/{}", process["processId"].as_str().unwrap()))
//!         .await?;
//!     println!("{}", done.text().await?);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod poller;
mod request;
mod response;
mod session;
mod transport;

pub use config::{ClientConfig, API_KEY_ENV, BASE_URL_ENV};
pub use error::{Error, ErrorKind, Result};
pub use poller::{
    Backoff, PollState, PollingConfig, ProcessPoller, ProcessStatus, DEFAULT_INITIAL_DELAY,
    DEFAULT_MAX_DELAY, PROCESSING_STATE,
};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::{Response, SentRequest};
pub use session::AffinitySession;
pub use transport::{SharedTransport, TransportConfig, TransportConfigBuilder};

/// Request/response header that pins a request to one backend node.
pub const AFFINITY_TOKEN_HEADER: &str = "Accusoft-Affinity-Token";

/// Request header carrying a PrizmDoc Cloud API key.
pub const API_KEY_HEADER: &str = "Acs-Api-Key";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("prizmdoc-rest/", env!("CARGO_PKG_VERSION"));
