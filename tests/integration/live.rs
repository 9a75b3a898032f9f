//! Round trip against a real PrizmDoc Server or PrizmDoc Cloud.

use prizmdoc_rest::ClientConfig;

#[tokio::test]
#[ignore = "requires PRIZMDOC_BASE_URL (and PRIZMDOC_API_KEY for PrizmDoc Cloud)"]
async fn test_live_text_conversion() {
    crate::common::init_tracing();
    let config = ClientConfig::from_env().expect("PRIZMDOC_BASE_URL must be set");
    let session = config.create_affinity_session();

    let work_file: serde_json::Value = session
        .post("/PCCIS/V1/WorkFile?FileExtension=txt", "Hello from prizmdoc-rest")
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(session.affinity_token().is_some());

    let process: serde_json::Value = session
        .post(
            "/v2/contentConverters",
            serde_json::json!({
                "input": {
                    "sources": [{ "fileId": work_file["fileId"] }],
                    "dest": { "format": "pdf" }
                }
            }),
        )
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .json()
        .await
        .unwrap();

    let process_id = process["processId"].as_str().unwrap();
    let status: serde_json::Value = session
        .get_final_process_status(format!("/v2/contentConverters/{process_id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["state"], "complete", "conversion failed: {status}");
}
