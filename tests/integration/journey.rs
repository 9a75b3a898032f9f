//! Full document conversion workflow against a mock cluster node.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prizmdoc_rest::{PollingConfig, RequestMethod, AFFINITY_TOKEN_HEADER, API_KEY_HEADER};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::common::mock_config;

const AFFINITY_TOKEN: &str = "ejN1wL6C6bX0p3jrUzzwlA";
const PDF_BYTES: &[u8] = b"%PDF-1.7 fake";

async fn mount_conversion_node(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/PCCIS/V1/WorkFile"))
        .and(header(API_KEY_HEADER, "test-api-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    serde_json::json!({
                        "fileId": "input-file",
                        "fileExtension": "docx",
                        "affinityToken": AFFINITY_TOKEN
                    })
                    .to_string(),
                    "application/json; charset=utf-8",
                ),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/contentConverters"))
        .and(header(AFFINITY_TOKEN_HEADER, AFFINITY_TOKEN))
        .and(body_json(serde_json::json!({
            "input": {
                "sources": [{ "fileId": "input-file" }],
                "dest": { "format": "pdf" }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    serde_json::json!({
                        "processId": "converter-1",
                        "state": "processing",
                        "affinityToken": AFFINITY_TOKEN
                    })
                    .to_string(),
                    "application/json",
                ),
        )
        .mount(server)
        .await;

    let polls = Arc::new(AtomicU32::new(0));
    Mock::given(method("GET"))
        .and(path("/v2/contentConverters/converter-1"))
        .and(header(AFFINITY_TOKEN_HEADER, AFFINITY_TOKEN))
        .respond_with(move |_: &Request| {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            let body = if n < 2 {
                serde_json::json!({ "processId": "converter-1", "state": "processing", "percentComplete": n * 40 })
            } else {
                serde_json::json!({
                    "processId": "converter-1",
                    "state": "complete",
                    "percentComplete": 100,
                    "output": { "results": [{ "fileId": "output-file" }] }
                })
            };
            ResponseTemplate::new(200)
                .set_body_raw(body.to_string(), "application/json")
        })
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/PCCIS/V1/WorkFile/output-file"))
        .and(header(AFFINITY_TOKEN_HEADER, AFFINITY_TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(PDF_BYTES, "application/pdf"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_convert_docx_to_pdf() {
    let server = MockServer::start().await;
    mount_conversion_node(&server).await;

    let config = mock_config(&server);
    let session = config.create_affinity_session();

    let work_file: serde_json::Value = session
        .post("/PCCIS/V1/WorkFile", b"PK\x03\x04 fake docx".to_vec())
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session.affinity_token(), Some(AFFINITY_TOKEN));

    let request = session
        .request(RequestMethod::Post, "/v2/contentConverters")
        .json(&serde_json::json!({
            "input": {
                "sources": [{ "fileId": work_file["fileId"] }],
                "dest": { "format": "pdf" }
            }
        }))
        .unwrap();
    let process: serde_json::Value = session
        .send(request)
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .json()
        .await
        .unwrap();
    let process_id = process["processId"].as_str().unwrap();

    let polling = PollingConfig::default()
        .with_initial_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(20));
    let final_status: serde_json::Value = session
        .get_final_process_status_with(format!("/v2/contentConverters/{process_id}"), &polling)
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(final_status["state"], "complete");

    let output_id = final_status["output"]["results"][0]["fileId"].as_str().unwrap();
    let mut download = session
        .get(format!("/PCCIS/V1/WorkFile/{output_id}"))
        .await
        .unwrap()
        .error_for_status()
        .unwrap();
    assert!(download.is_streaming());

    let mut pdf = Vec::new();
    while let Some(chunk) = download.chunk().await.unwrap() {
        pdf.extend_from_slice(&chunk);
    }
    assert_eq!(pdf, PDF_BYTES);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 6);
    assert!(received[0].headers.get(AFFINITY_TOKEN_HEADER).is_none());
    for request in &received {
        assert_eq!(request.headers.get(API_KEY_HEADER).unwrap(), "test-api-key");
    }
    for request in &received[1..] {
        assert_eq!(
            request.headers.get(AFFINITY_TOKEN_HEADER).unwrap(),
            AFFINITY_TOKEN
        );
    }
}

#[tokio::test]
async fn test_independent_sessions_do_not_share_tokens() {
    let server = MockServer::start().await;
    let issued = Arc::new(AtomicU32::new(0));
    Mock::given(method("POST"))
        .and(path("/PCCIS/V1/WorkFile"))
        .respond_with(move |_: &Request| {
            let n = issued.fetch_add(1, Ordering::SeqCst);
            let body = serde_json::json!({ "fileId": n, "affinityToken": format!("node-{n}") });
            ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json")
        })
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let first = config.create_affinity_session();
    let second = config.create_affinity_session();

    first.post("/PCCIS/V1/WorkFile", "a").await.unwrap();
    second.post("/PCCIS/V1/WorkFile", "b").await.unwrap();

    assert_eq!(first.affinity_token(), Some("node-0"));
    assert_eq!(second.affinity_token(), Some("node-1"));
}
