//! HTTP request/response tracing and correlation ids.

use axum::http::{HeaderName, Request};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

use crate::pipeline::context::{CORRELATION_HEADER, correlation_id_from};

/// Reuses a well-formed client `X-Correlation-Id`, otherwise generates one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeCorrelationId;

impl MakeRequestId for MakeCorrelationId {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        correlation_id_from(request.headers())
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

fn correlation_header() -> HeaderName {
    HeaderName::from_static(CORRELATION_HEADER)
}

/// Sets `X-Correlation-Id` on the request before anything else sees it.
pub fn set_correlation_id() -> SetRequestIdLayer<MakeCorrelationId> {
    SetRequestIdLayer::new(correlation_header(), MakeCorrelationId)
}

/// Copies `X-Correlation-Id` from the request to the response.
pub fn propagate_correlation_id() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(correlation_header())
}

fn make_span<B>(request: &Request<B>) -> Span {
    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        version = ?request.version(),
        correlation_id = %correlation_id,
    )
}

/// Creates a tracing middleware for HTTP requests.
///
/// # Logging Behavior
///
/// **On Request:**
/// - Creates a span at `INFO` level with:
///   - HTTP method
///   - URI
///   - HTTP version
///   - Correlation id
///
/// **On Response:**
/// - Logs at `INFO` level with:
///   - Status code
///   - Latency in milliseconds
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET uri=/api/v1/hotels version=HTTP/1.1 correlation_id=9f0c...}: finished processing request latency=3 ms status=200
/// ```
///
/// Must sit inside [`set_correlation_id`] so the id is already on the request.
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, fn(&Request<axum::body::Body>) -> Span>
{
    TraceLayer::new_for_http()
        .make_span_with(make_span::<axum::body::Body> as fn(&Request<axum::body::Body>) -> Span)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_correlation_id_keeps_valid_client_id() {
        let request = Request::builder()
            .header(CORRELATION_HEADER, "client-trace-42")
            .body(())
            .unwrap();

        let id = MakeCorrelationId.make_request_id(&request).unwrap();
        assert_eq!(id.header_value(), "client-trace-42");
    }

    #[test]
    fn test_make_correlation_id_generates_when_absent() {
        let request = Request::builder().body(()).unwrap();
        let id = MakeCorrelationId.make_request_id(&request).unwrap();
        assert_eq!(id.header_value().len(), 32);
    }
}
