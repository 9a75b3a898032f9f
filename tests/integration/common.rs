use std::sync::Once;

use prizmdoc_rest::{ClientConfig, SharedTransport, TransportConfig};
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Route tracing output to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A configuration pointed at the mock server, carrying an API key.
pub fn mock_config(server: &MockServer) -> ClientConfig {
    init_tracing();
    let transport = SharedTransport::new(TransportConfig::default())
        .expect("transport should build");
    ClientConfig::with_transport(server.uri(), transport)
        .expect("mock server uri is absolute")
        .with_api_key("test-api-key")
        .expect("api key is a valid header value")
}
