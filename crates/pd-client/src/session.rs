//! Affinity sessions.
//!
//! Every request in a document-processing workflow has to reach the same
//! PrizmDoc Server node. The server hands out an affinity token in the JSON of
//! the first response that pins work to a node; an [`AffinitySession`] picks it
//! up and attaches it to everything it sends afterwards.

use std::sync::OnceLock;

use reqwest::header::{HeaderName, HeaderValue};
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::poller::{PollingConfig, ProcessPoller, ProcessStatus};
use crate::request::{RequestBody, RequestBuilder, RequestMethod};
use crate::response::{Response, SentRequest};

/// Lowercase form of [`AFFINITY_TOKEN_HEADER`](crate::AFFINITY_TOKEN_HEADER).
fn affinity_header() -> HeaderName {
    HeaderName::from_static("accusoft-affinity-token")
}

/// A group of requests that must all be routed to the same backend node.
///
/// The token starts out unset, unless the session was created with
/// [`ClientConfig::create_affinity_session_with_token`]. The first JSON
/// response containing a string `"affinityToken"` property sets it, and it
/// never changes after that. Concurrent first responses race for the single
/// slot; exactly one wins.
///
/// # Example
///
/// ```rust,ignore
/// let session = config.create_affinity_session();
///
/// let work_file: serde_json::Value = session
///     .post("/PCCIS/V1/WorkFile", std::fs::read("input.docx")?)
///     .await?
///     .error_for_status()?
///     .json()
///     .await?;
///
/// // Every later request carries the token from the response above.
/// let process = session
///     .send(session.request(RequestMethod::Post, "/v2/contentConverters").json(&body)?)
///     .await?;
/// ```
#[derive(Debug)]
pub struct AffinitySession {
    config: ClientConfig,
    affinity_token: OnceLock<String>,
}

impl AffinitySession {
    pub(crate) fn new(config: ClientConfig, affinity_token: Option<String>) -> Self {
        let slot = OnceLock::new();
        if let Some(token) = affinity_token {
            let _ = slot.set(token);
        }
        Self {
            config,
            affinity_token: slot,
        }
    }

    /// The affinity token currently in use, if one has been set.
    pub fn affinity_token(&self) -> Option<&str> {
        self.affinity_token.get().map(String::as_str)
    }

    /// The configuration this session resolves requests against.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start building a request to send through this session.
    pub fn request(&self, method: RequestMethod, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    /// Send an HTTP GET to the given path.
    #[instrument(skip(self, path), fields(path = %path.as_ref()))]
    pub async fn get(&self, path: impl AsRef<str>) -> Result<Response> {
        self.send(RequestBuilder::new(RequestMethod::Get, path.as_ref()))
            .await
    }

    /// Send an HTTP POST with a body to the given path.
    #[instrument(skip(self, path, body), fields(path = %path.as_ref()))]
    pub async fn post(&self, path: impl AsRef<str>, body: impl Into<RequestBody>) -> Result<Response> {
        self.send(RequestBuilder::new(RequestMethod::Post, path.as_ref()).body(body))
            .await
    }

    /// Send an HTTP PUT with a body to the given path.
    #[instrument(skip(self, path, body), fields(path = %path.as_ref()))]
    pub async fn put(&self, path: impl AsRef<str>, body: impl Into<RequestBody>) -> Result<Response> {
        self.send(RequestBuilder::new(RequestMethod::Put, path.as_ref()).body(body))
            .await
    }

    /// Send an HTTP DELETE to the given path.
    #[instrument(skip(self, path), fields(path = %path.as_ref()))]
    pub async fn delete(&self, path: impl AsRef<str>) -> Result<Response> {
        self.send(RequestBuilder::new(RequestMethod::Delete, path.as_ref()))
            .await
    }

    /// Send a request through this session.
    ///
    /// Attaches the affinity token unless the request already carries an
    /// affinity header, resolves the path against the base address, fills in
    /// default headers the request does not set itself, and returns as soon as
    /// response headers arrive. While no token is known, a JSON response body
    /// is read to look for one; that body is still fully readable from the
    /// returned response.
    ///
    /// Transport errors are returned unchanged. Problems while looking for a
    /// token are not errors.
    #[instrument(skip(self, request), fields(method = ?request.method, path = %request.path))]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = self.compose(request)?;
        let sent = SentRequest::from_reqwest(&request);
        let transport = self.config.transport();

        if transport.tracing_enabled() {
            debug!(
                url = %sent.url(),
                pinned = sent.headers().contains_key(affinity_header()),
                "Sending request"
            );
        }

        let response = Response::new(transport.dispatch(request).await?, sent);

        if transport.tracing_enabled() {
            debug!(status = response.status(), "Response received");
        }

        if self.affinity_token.get().is_some() {
            return Ok(response);
        }
        self.discover_affinity_token(response).await
    }

    /// Poll a process resource until its `"state"` is anything other than
    /// `"processing"`, then return that final response.
    ///
    /// The first GET goes out immediately. The delay before each later GET
    /// starts at 500 ms and doubles up to 8 s. The final state is not
    /// interpreted: `"complete"`, `"error"` and unknown values all end the
    /// loop. A response that is not a 2xx JSON object with a string `state`
    /// fails the call.
    ///
    /// Dropping the returned future (for example via `tokio::time::timeout`)
    /// abandons any pending wait without sending another request.
    pub async fn get_final_process_status(&self, process_path: impl AsRef<str>) -> Result<Response> {
        self.get_final_process_status_with(process_path, &PollingConfig::default())
            .await
    }

    /// [`get_final_process_status`](Self::get_final_process_status) with a
    /// custom delay schedule.
    #[instrument(skip(self, process_path, polling), fields(path = %process_path.as_ref()))]
    pub async fn get_final_process_status_with(
        &self,
        process_path: impl AsRef<str>,
        polling: &PollingConfig,
    ) -> Result<Response> {
        let mut poller = ProcessPoller::new(polling);

        loop {
            if let Some(delay) = poller.wait_before_next_poll() {
                debug!(delay_ms = delay.as_millis(), "Process still running, waiting");
                sleep(delay).await;
            }

            let response = self.get(process_path.as_ref()).await?;
            let (status, response) = match ProcessStatus::from_response(response).await {
                Ok(validated) => validated,
                Err(err) => {
                    poller.fail();
                    return Err(err);
                }
            };

            if poller.observe(&status).is_terminal() {
                debug!(state = status.state(), "Process finished");
                return Ok(response);
            }
        }
    }

    fn compose(&self, request: RequestBuilder) -> Result<reqwest::Request> {
        let RequestBuilder {
            method,
            path,
            mut headers,
            body,
            error,
            ..
        } = request;

        if let Some(err) = error {
            return Err(err);
        }

        if let Some(token) = self.affinity_token.get() {
            let name = affinity_header();
            if !headers.contains_key(&name) {
                headers.insert(name, HeaderValue::from_str(token)?);
            }
        }

        let (base_address, default_headers) = self.config.snapshot();
        let url = base_address.join(&path)?;

        for (name, value) in default_headers.iter() {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        let mut builder = self
            .config
            .transport()
            .request(method.to_reqwest(), url)
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body.into_bytes()?);
        }
        builder.build().map_err(Into::into)
    }

    async fn discover_affinity_token(&self, response: Response) -> Result<Response> {
        if !response.is_json() {
            return Ok(response);
        }

        let response = response.buffer().await?;
        let found = response.buffered_body().and_then(|body| affinity_token_in(body));
        if let Some(token) = found {
            if self.affinity_token.set(token).is_ok() {
                debug!("Affinity token discovered, session is now pinned");
            }
        }
        Ok(response)
    }
}

/// The `affinityToken` string of a JSON object body. Anything else, including
/// a body that does not parse, yields `None`.
fn affinity_token_in(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let token = value.as_object()?.get("affinityToken")?.as_str()?;
    // A token that cannot travel in a header would break every later request.
    HeaderValue::from_str(token).ok()?;
    Some(token.to_string())
}
