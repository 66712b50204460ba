//! AcoustID client response handling against a local HTTP server

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use shelver::services::acoustid_client::{AcoustIdClient, LookupError, LookupService};
use shelver::services::fingerprinter::AudioFingerprint;

/// Serve one canned lookup response, returning the endpoint URL
async fn serve(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route("/v2/lookup", post(move || async move { (status, body) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v2/lookup", addr)
}

fn client(base_url: String) -> AcoustIdClient {
    AcoustIdClient::new("test-key".to_string())
        .unwrap()
        .with_base_url(base_url)
}

fn fingerprint() -> AudioFingerprint {
    AudioFingerprint {
        fingerprint: "AQADtNQYhYkYnGhw".to_string(),
        duration_seconds: 241,
    }
}

#[tokio::test]
async fn test_unauthorized_is_invalid_api_key() {
    let url = serve(StatusCode::UNAUTHORIZED, "invalid API key").await;

    let result = client(url).lookup(&fingerprint()).await;
    assert!(matches!(result, Err(LookupError::InvalidApiKey)));
}

#[tokio::test]
async fn test_http_error_keeps_status_and_body() {
    let url = serve(StatusCode::SERVICE_UNAVAILABLE, "overloaded").await;

    match client(url).lookup(&fingerprint()).await {
        Err(LookupError::ApiError(code, text)) => {
            assert_eq!(code, 503);
            assert_eq!(text, "overloaded");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_ok_status_is_api_error() {
    let url = serve(
        StatusCode::OK,
        r#"{"status": "error", "error": {"code": 4, "message": "invalid API key"}}"#,
    )
    .await;

    match client(url).lookup(&fingerprint()).await {
        Err(LookupError::ApiError(code, text)) => {
            assert_eq!(code, 200);
            assert_eq!(text, "status error");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let url = serve(StatusCode::OK, "<html>maintenance</html>").await;

    let result = client(url).lookup(&fingerprint()).await;
    assert!(matches!(result, Err(LookupError::ParseError(_))));
}

#[tokio::test]
async fn test_ok_response_yields_candidates() {
    let url = serve(
        StatusCode::OK,
        r#"{
            "status": "ok",
            "results": [{
                "id": "acoustid-1",
                "score": 0.88,
                "recordings": [{
                    "id": "mbid-1",
                    "title": "Teardrop",
                    "artists": [{"id": "a1", "name": "Massive Attack"}],
                    "releases": [{"id": "r1", "title": "Mezzanine",
                                  "mediums": [{"position": 1, "tracks": [{"position": 3}]}]}]
                }]
            }]
        }"#,
    )
    .await;

    let candidates = client(url).lookup(&fingerprint()).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].score, 0.88);
    assert_eq!(candidates[0].tags.artist.as_deref(), Some("Massive Attack"));
    assert_eq!(candidates[0].tags.album.as_deref(), Some("Mezzanine"));
    assert_eq!(candidates[0].tags.track_number, Some(3));
}
