//! Backoff timing of `get_final_process_status` at its real schedule.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::mock_config;

const ALLOWED_DELTA_MS: f64 = 500.0;

#[tokio::test]
#[ignore = "slow: waits through ~23.5s of real backoff"]
async fn test_default_backoff_schedule() {
    let server = MockServer::start().await;
    let sent = Arc::new(AtomicU32::new(0));
    let times = Arc::new(Mutex::new(Vec::new()));
    let times_clone = times.clone();

    Mock::given(method("GET"))
        .and(path("/wat/123"))
        .respond_with(move |_: &Request| {
            times_clone.lock().unwrap().push(Instant::now());
            let n = sent.fetch_add(1, Ordering::SeqCst);
            let state = if n < 7 { "processing" } else { "complete" };
            let body = format!(r#"{{ "processId": "123", "state": "{state}" }}"#);
            ResponseTemplate::new(200).set_body_raw(body, "application/json")
        })
        .mount(&server)
        .await;

    let session = mock_config(&server).create_affinity_session();
    let response = session.get_final_process_status("/wat/123").await.unwrap();
    assert!(response.is_success());

    let times = times.lock().unwrap();
    let gaps: Vec<f64> = times
        .windows(2)
        .map(|w| w[1].duration_since(w[0]).as_secs_f64() * 1000.0)
        .collect();
    let expected = [500.0, 1000.0, 2000.0, 4000.0, 8000.0, 8000.0, 8000.0];

    assert_eq!(gaps.len(), expected.len());
    for (got, want) in gaps.iter().zip(expected) {
        assert!(
            (got - want).abs() <= ALLOWED_DELTA_MS,
            "expected ~{want}ms between polls, got {got:.0}ms"
        );
    }
}
