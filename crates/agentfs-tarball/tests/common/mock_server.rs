//! Mock presigned upload endpoints
//!
//! Wiremock servers standing in for object storage PUT URLs.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Path of the mock presigned upload endpoint.
pub const UPLOAD_PATH: &str = "/bucket/agent.tar.gz";

/// Presigned URL for the mock endpoint, including a signature query string.
pub fn presigned_url(server: &MockServer) -> String {
    format!(
        "{}{}?X-Amz-Signature=deadbeef&X-Amz-Expires=900",
        server.uri(),
        UPLOAD_PATH
    )
}

/// Accept gzip PUTs at [`UPLOAD_PATH`] with the given status and body.
pub async fn mock_upload_response(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .and(header("content-type", "application/gzip"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Accept gzip PUTs with 200 OK, expecting exactly one request.
pub async fn mock_successful_upload(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path(UPLOAD_PATH))
        .and(header("content-type", "application/gzip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

/// The single request the server received.
pub async fn single_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one upload request");
    requests.remove(0)
}
