//! Workspace integration tests.
//!
//! Mock-server suites run by default. The slow real-timing backoff test and
//! the live server journey are ignored; run them with:
//!   PRIZMDOC_BASE_URL=... cargo test --test integration -- --ignored --nocapture

#[path = "integration/common.rs"]
mod common;
#[path = "integration/journey.rs"]
mod journey;
#[path = "integration/polling.rs"]
mod polling;
#[path = "integration/live.rs"]
mod live;
