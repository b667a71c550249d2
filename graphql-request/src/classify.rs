//! Response classification: content-type negotiation and success/failure.

use graphql_request_transport::FetchResponse;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{ClientError, ErrorRequest, ErrorResponse};
use crate::{BatchResponse, ErrorPolicy, GraphQLResponse, RawResponse, Result};

/// Media types whose bodies are GraphQL JSON.
const JSON_MEDIA_TYPES: [&str; 3] = [
    "application/json",
    "application/graphql+json",
    "application/graphql-response+json",
];

/// Check if a `Content-Type` value denotes a JSON GraphQL response.
///
/// Parameters such as `charset` are ignored and the comparison is
/// case-insensitive.
pub fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    JSON_MEDIA_TYPES
        .iter()
        .any(|candidate| media_type.eq_ignore_ascii_case(candidate))
}

/// Decoded response body.
enum Body {
    Json(Value),
    Text(String),
}

/// Decode the body. Every body gets a JSON attempt; the content type only
/// decides how loudly a failure is reported.
fn parse_body(response: &FetchResponse) -> Body {
    let text = String::from_utf8_lossy(response.bytes()).into_owned();
    match serde_json::from_str(&text) {
        Ok(value) => Body::Json(value),
        Err(e) => {
            if response.content_type().is_some_and(is_json_content_type) {
                warn!(error = %e, "Response declared JSON but did not parse");
            } else {
                trace!(content_type = ?response.content_type(), "Treating response body as text");
            }
            Body::Text(text)
        }
    }
}

fn failure(response: &FetchResponse, body: Body, request: ErrorRequest) -> ClientError {
    let mut error_response = ErrorResponse {
        data: None,
        errors: None,
        extensions: None,
        error: None,
        status: response.status().as_u16(),
        headers: response.headers().clone(),
    };

    match body {
        Body::Json(Value::Object(mut map)) => {
            error_response.data = map.remove("data").filter(|v| !v.is_null());
            error_response.errors = map.remove("errors").filter(|v| !v.is_null());
            error_response.extensions = map.remove("extensions").filter(|v| !v.is_null());
        }
        Body::Json(value @ Value::Array(_)) => error_response.data = Some(value),
        Body::Json(value) => error_response.error = Some(value.to_string()),
        Body::Text(text) => error_response.error = Some(text),
    }

    ClientError {
        response: error_response,
        request,
    }
}

/// Classify the response of a single operation.
pub(crate) fn classify_single(
    response: FetchResponse,
    request: ErrorRequest,
    policy: ErrorPolicy,
) -> Result<RawResponse> {
    let body = parse_body(&response);

    let parsed = match &body {
        Body::Json(value @ Value::Object(_)) => {
            serde_json::from_value::<GraphQLResponse>(value.clone()).ok()
        }
        _ => None,
    };

    let Some(parsed) = parsed else {
        return Err(failure(&response, body, request).into());
    };

    let rejected_by_policy = parsed.has_errors() && policy == ErrorPolicy::None;
    if !response.is_success() || rejected_by_policy {
        return Err(failure(&response, body, request).into());
    }

    let errors = match policy {
        ErrorPolicy::All => parsed.errors,
        _ => None,
    };

    Ok(RawResponse {
        data: parsed.data,
        errors,
        extensions: parsed.extensions,
        status: response.status(),
        headers: response.headers().clone(),
    })
}

/// Classify the response of a batch. Item-level errors stay in their items.
pub(crate) fn classify_batch(
    response: FetchResponse,
    request: ErrorRequest,
    expected: usize,
) -> Result<BatchResponse> {
    let body = parse_body(&response);

    if !response.is_success() {
        return Err(failure(&response, body, request).into());
    }

    let items = match &body {
        Body::Json(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) => serde_json::from_value::<GraphQLResponse>(item.clone()).ok(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>(),
        _ => None,
    };

    let Some(responses) = items else {
        return Err(failure(&response, body, request).into());
    };

    if responses.len() != expected {
        warn!(
            expected,
            received = responses.len(),
            "Batch response length differs from request"
        );
    }

    Ok(BatchResponse::new(
        responses,
        response.status(),
        response.headers().clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryText;
    use crate::GraphQLError;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use serde_json::json;

    fn response(status: u16, content_type: Option<&'static str>, body: &str) -> FetchResponse {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = content_type {
            headers.insert("content-type", HeaderValue::from_static(content_type));
        }
        FetchResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            body.to_string(),
        )
    }

    fn request() -> ErrorRequest {
        ErrorRequest {
            query: QueryText::Single("{ me { id } }".to_string()),
            variables: None,
        }
    }

    fn client_error(result: Result<RawResponse>) -> ClientError {
        match result {
            Err(GraphQLError::Client(error)) => *error,
            other => panic!("expected client error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_content_types() {
        for content_type in [
            "application/json",
            "application/graphql+json",
            "application/graphql-response+json",
            "application/json; charset=utf-8",
            "application/graphql-response+json;charset=UTF-8",
            "apPliCatiON/JSON",
        ] {
            assert!(is_json_content_type(content_type), "{}", content_type);
        }
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type("application/jsonp"));
    }

    #[test]
    fn test_success_returns_data() {
        let raw = classify_single(
            response(200, Some("application/json"), r#"{"data":{"me":{"id":"some-id"}},"extensions":{"v":1}}"#),
            request(),
            ErrorPolicy::None,
        )
        .unwrap();

        assert_eq!(raw.data, Some(json!({"me": {"id": "some-id"}})));
        assert_eq!(raw.extensions, Some(json!({"v": 1})));
        assert_eq!(raw.status, StatusCode::OK);
    }

    #[test]
    fn test_errors_fail_despite_200_and_data() {
        let error = client_error(classify_single(
            response(200, Some("application/json"), r#"{"data":{"me":null},"errors":[{"message":"boom"}]}"#),
            request(),
            ErrorPolicy::None,
        ));

        assert_eq!(error.response.status, 200);
        assert_eq!(error.response.data, Some(json!({"me": null})));
        assert_eq!(error.first_message(), Some("boom"));
    }

    #[test]
    fn test_empty_errors_array_is_success() {
        let raw = classify_single(
            response(200, Some("application/json"), r#"{"data":{"a":1},"errors":[]}"#),
            request(),
            ErrorPolicy::None,
        )
        .unwrap();
        assert_eq!(raw.data, Some(json!({"a": 1})));
    }

    #[test]
    fn test_non_2xx_fails_without_errors() {
        let error = client_error(classify_single(
            response(500, Some("application/json"), r#"{"data":{"a":1}}"#),
            request(),
            ErrorPolicy::All,
        ));
        assert_eq!(error.response.status, 500);
        assert!(error.to_string().starts_with("GraphQL Error (Code: 500)"));
    }

    #[test]
    fn test_unknown_content_type_still_parses_json() {
        let raw = classify_single(
            response(200, None, r#"{"data":{"a":1}}"#),
            request(),
            ErrorPolicy::None,
        )
        .unwrap();
        assert_eq!(raw.data, Some(json!({"a": 1})));
    }

    #[test]
    fn test_text_body_is_wrapped() {
        let error = client_error(classify_single(
            response(200, Some("text/html"), "<html>Bad Gateway</html>"),
            request(),
            ErrorPolicy::None,
        ));
        assert_eq!(error.response.error.as_deref(), Some("<html>Bad Gateway</html>"));
        assert_eq!(error.request.query, QueryText::Single("{ me { id } }".to_string()));
    }

    #[test]
    fn test_error_policies() {
        let body = r#"{"data":{"a":1},"errors":[{"message":"partial"}]}"#;

        let ignored = classify_single(
            response(200, Some("application/json"), body),
            request(),
            ErrorPolicy::Ignore,
        )
        .unwrap();
        assert_eq!(ignored.data, Some(json!({"a": 1})));
        assert!(ignored.errors.is_none());

        let all = classify_single(
            response(200, Some("application/json"), body),
            request(),
            ErrorPolicy::All,
        )
        .unwrap();
        assert!(all.has_errors());
        assert_eq!(all.error_list()[0].message, "partial");
    }

    #[test]
    fn test_batch_keeps_item_errors() {
        let batch = classify_batch(
            response(
                200,
                Some("application/json"),
                r#"[{"data":{"a":1}},{"errors":[{"message":"nope"}]}]"#,
            ),
            request(),
            2,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert!(!batch.responses()[0].has_errors());
        assert!(batch.responses()[1].has_errors());
    }

    #[test]
    fn test_batch_object_body_fails() {
        let result = classify_batch(
            response(200, Some("application/json"), r#"{"errors":[{"message":"batching disabled"}]}"#),
            request(),
            2,
        );
        match result {
            Err(GraphQLError::Client(error)) => {
                assert_eq!(error.first_message(), Some("batching disabled"))
            }
            other => panic!("expected client error, got {:?}", other),
        }
    }
}
