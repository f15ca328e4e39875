//! Integration tests for the HTTP API.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use printhub_entity::job::PrinterType;

use helpers::TestApp;

fn id_of(value: &serde_json::Value) -> i64 {
    value["id"].as_i64().expect("job id")
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(true));
    assert_eq!(response.data()["storage"], json!("available"));
}

#[tokio::test]
async fn test_empty_queue_lists_every_printer() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/queue", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let printers = response.data()["printers"].as_array().unwrap();
    let codes: Vec<_> = printers.iter().map(|p| p["printer"].clone()).collect();
    assert_eq!(codes, vec![json!("H2S"), json!("P1S")]);
    assert!(printers.iter().all(|p| p["active"].is_null()));
}

#[tokio::test]
async fn test_upload_starts_job() {
    let app = TestApp::new().await;

    let response = app
        .upload(
            &[("printer", "h2s"), ("owner", "member-3"), ("notes", "PLA white")],
            Some(("bracket.3mf", b"3mf-bytes".as_slice())),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let job = &response.data()["job"];
    assert_eq!(job["status"], json!("active"));
    assert_eq!(job["printer"], json!("H2S"));
    assert_eq!(job["owner_ref"], json!("member-3"));
    assert_eq!(job["notes"], json!("PLA white"));
    assert_eq!(id_of(&response.data()["dispatched"]), id_of(job));
    assert_eq!(
        response.data()["snapshot"]["printers"][0]["active"]["id"],
        job["id"]
    );
}

#[tokio::test]
async fn test_upload_validation_errors() {
    let app = TestApp::new().await;

    let unknown_printer = app
        .upload(
            &[("printer", "X1C"), ("owner", "m")],
            Some(("a.3mf", b"x".as_slice())),
        )
        .await;
    assert_eq!(unknown_printer.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_printer.body["error"], json!("VALIDATION_ERROR"));

    let missing_file = app
        .upload(&[("printer", "H2S"), ("owner", "m")], None)
        .await;
    assert_eq!(missing_file.status, StatusCode::BAD_REQUEST);

    let wrong_type = app
        .upload(
            &[("printer", "H2S"), ("owner", "m")],
            Some(("model.stl", b"solid".as_slice())),
        )
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);

    assert!(app.launcher.launched().is_empty());
}

#[tokio::test]
async fn test_complete_flow_over_http() {
    let app = TestApp::new().await;
    let j1 = app.submit("P1S", "1.gcode").await;
    let j2 = app.submit("P1S", "2.gcode").await;

    let response = app
        .request("POST", &format!("/api/jobs/{}/complete", j1.id), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["job"]["status"], json!("done"));
    assert_eq!(id_of(&response.data()["dispatched"]), j2.id.into_inner());

    let again = app
        .request("POST", &format!("/api/jobs/{}/complete", j1.id), None)
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["error"], json!("CONFLICT"));
}

#[tokio::test]
async fn test_fail_with_and_without_reason() {
    let app = TestApp::new().await;
    let j1 = app.submit("H2S", "1.3mf").await;
    let j2 = app.submit("H2S", "2.3mf").await;

    let with_reason = app
        .request(
            "POST",
            &format!("/api/jobs/{}/fail", j1.id),
            Some(json!({ "reason": "bed adhesion" })),
        )
        .await;
    assert_eq!(with_reason.status, StatusCode::OK);
    assert_eq!(with_reason.data()["job"]["notes"], json!("bed adhesion"));

    let without_body = app
        .request("POST", &format!("/api/jobs/{}/fail", j2.id), None)
        .await;
    assert_eq!(without_body.status, StatusCode::OK);
    assert_eq!(without_body.data()["job"]["status"], json!("failed"));
    assert!(without_body.data()["job"]["notes"].is_null());
}

#[tokio::test]
async fn test_delete_rules() {
    let app = TestApp::new().await;
    let active = app.submit("H2S", "1.3mf").await;
    let queued = app.submit("H2S", "2.3mf").await;

    let refused = app
        .request("DELETE", &format!("/api/jobs/{}", active.id), None)
        .await;
    assert_eq!(refused.status, StatusCode::CONFLICT);

    let deleted = app
        .request("DELETE", &format!("/api/jobs/{}", queued.id), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(deleted.data()["dispatched"].is_null());
    assert!(app.queued_ids(PrinterType::H2s).await.is_empty());

    let gone = app
        .request("GET", &format!("/api/jobs/{}", queued.id), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_job_and_bad_id() {
    let app = TestApp::new().await;
    let job = app.submit("P1S", "1.3mf").await;

    let found = app
        .request("GET", &format!("/api/jobs/{}", job.id), None)
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(id_of(found.data()), job.id.into_inner());
    assert_eq!(found.data()["file_name"], json!("1.3mf"));

    let bad = app.request("GET", "/api/jobs/not-a-number", None).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let missing = app.request("POST", "/api/jobs/999/complete", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
