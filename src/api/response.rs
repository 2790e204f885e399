//! Pre-serialized JSON responses.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

/// A 200 response whose body is a JSON document produced elsewhere.
///
/// The bytes are sent exactly as received from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBytes(pub Bytes);

impl IntoResponse for JsonBytes {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            Body::from(self.0),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_json_bytes_are_sent_verbatim() {
        let document = Bytes::from_static(br#"{"limit":1000,"balance":-500}"#);

        let response = JsonBytes(document.clone()).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        assert_eq!(body, document);
    }
}
