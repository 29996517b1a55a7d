//! Backend client and poller against a mock HTTP backend

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use reelcast_client::poller::{JobPoller, NoopObserver, PollError, PollOptions};
use reelcast_client::{BackendClient, ClientError};
use reelcast_core::domain::job::{JobHandle, JobStatus};
use reelcast_core::domain::render::RenderKind;
use serde_json::json;

fn fast_options() -> PollOptions {
    PollOptions::default()
        .with_interval(Duration::from_millis(10))
        .with_max_attempts(Some(3))
}

#[tokio::test]
async fn start_render_returns_job_handle() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/render")
        .match_body(Matcher::Json(json!({ "type": "short" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"job_id":"J1"}"#)
        .create_async()
        .await;

    let client = BackendClient::new(server.url());
    let handle = client.start_render(RenderKind::Short).await.unwrap();

    assert_eq!(handle.as_str(), "J1");
    mock.assert_async().await;
}

#[tokio::test]
async fn start_render_without_job_id_is_a_submission_error() {
    let mut server = mockito::Server::new_async().await;
    let start = server
        .mock("POST", "/api/render")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"queued"}"#)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/api/render/status")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let poller = JobPoller::new(Arc::new(BackendClient::new(server.url())));
    let err = poller
        .start(RenderKind::Long, fast_options(), NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Submission(ClientError::ParseError(_))));
    start.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn non_success_status_surfaces_backend_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/render")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"type must be 'short' or 'long'"}"#)
        .create_async()
        .await;

    let client = BackendClient::new(server.url());
    let err = client.start_render(RenderKind::Short).await.unwrap_err();

    match err {
        ClientError::ApiError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "type must be 'short' or 'long'");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_error_body_is_kept_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let _script = server
        .mock("POST", "/api/script")
        .with_status(502)
        .with_body("upstream timed out")
        .create_async()
        .await;

    let client = BackendClient::new(server.url());
    let err = client.generate_script(RenderKind::Long).await.unwrap_err();

    assert!(err.is_server_error());
    assert_eq!(err.to_string(), "API error (status 502): upstream timed out");
}

#[tokio::test]
async fn render_status_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/render/status")
        .match_query(Matcher::UrlEncoded("job_id".into(), "J 1/2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"job_id":"J 1/2","status":"running"}"#)
        .create_async()
        .await;

    let client = BackendClient::new(server.url());
    let status = client
        .render_status(&JobHandle::new("J 1/2").unwrap())
        .await
        .unwrap();

    assert_eq!(
        status,
        JobStatus::Running {
            label: "running".to_string(),
            message: None
        }
    );
}

#[tokio::test]
async fn poll_reaches_done_over_http() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/render")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"job_id":"J1"}"#)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/api/render/status")
        .match_query(Matcher::UrlEncoded("job_id".into(), "J1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"job_id":"J1","status":"done","video_url":"/api/download/video/J1"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = Arc::new(BackendClient::new(server.url()));
    let poller = JobPoller::new(client.clone());
    let session = poller
        .start(RenderKind::Short, fast_options(), NoopObserver)
        .await
        .unwrap();
    let outcome = session.wait().await.unwrap().unwrap();

    let locator = outcome.result_url.unwrap();
    assert_eq!(locator, "/api/download/video/J1");
    assert_eq!(
        client.absolute_url(&locator),
        format!("{}/api/download/video/J1", server.url())
    );
    status.assert_async().await;
}

#[tokio::test]
async fn poll_stops_on_query_error() {
    let mut server = mockito::Server::new_async().await;
    let status = server
        .mock("GET", "/api/render/status")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"job not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let poller = JobPoller::new(Arc::new(BackendClient::new(server.url())));
    let session = poller
        .poll(JobHandle::new("gone").unwrap(), fast_options(), NoopObserver)
        .unwrap();
    let err = session.wait().await.unwrap().unwrap_err();

    assert!(matches!(err, PollError::Query(ref e) if e.is_not_found()));
    status.assert_async().await;
}

#[tokio::test]
async fn script_and_download() {
    let mut server = mockito::Server::new_async().await;
    let _script = server
        .mock("POST", "/api/script")
        .match_body(Matcher::Json(json!({ "type": "long" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"type":"long","script":"[long script]","download_url":"/api/download/script/S1"}"#,
        )
        .create_async()
        .await;
    let _download = server
        .mock("GET", "/api/download/script/S1")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("[long script]")
        .create_async()
        .await;

    let client = BackendClient::new(server.url());
    let script = client.generate_script(RenderKind::Long).await.unwrap();
    assert_eq!(script.kind, Some(RenderKind::Long));
    assert_eq!(script.script, "[long script]");

    let bytes = client
        .download(script.download_url.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(bytes, b"[long script]");
}

#[tokio::test]
async fn direct_render_returns_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/render")
        .with_status(200)
        .with_header("content-type", "video/mp4")
        .with_body(vec![0u8, 0, 0, 24, b'f', b't', b'y', b'p'])
        .create_async()
        .await;

    let client = BackendClient::new(server.url());
    let video = client.render_direct(RenderKind::Short).await.unwrap();

    assert_eq!(&video[4..], b"ftyp");
}

#[tokio::test]
async fn empty_base_url_fails_without_network() {
    let poller = JobPoller::new(Arc::new(BackendClient::new("")));
    let err = poller
        .start(RenderKind::Short, fast_options(), NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Submission(ClientError::NotConfigured)));
}

#[tokio::test]
async fn absolute_locator_downloads_without_backend() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/cdn/J1.mp4")
        .with_status(200)
        .with_body("video-bytes")
        .create_async()
        .await;

    let client = BackendClient::new("");
    let bytes = client
        .download(&format!("{}/cdn/J1.mp4", server.url()))
        .await
        .unwrap();

    assert_eq!(bytes, b"video-bytes");
    mock.assert_async().await;

    let err = client.download("/api/download/video/J1").await.unwrap_err();
    assert!(matches!(err, ClientError::NotConfigured));
}
