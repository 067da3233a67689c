//! The request pipeline.
//!
//! Every `/api` request runs through a fixed sequence of stages:
//!
//! ```text
//! Received → CorsChecked → RateLimited → CacheChecked → Authenticated → Routed → Handled → Responded
//! ```
//!
//! Any stage may short-circuit to `Rejected` with an [`AppError`]. Routes
//! marked public-cacheable are looked up in the cache before
//! authentication; every other route authenticates first, so a cached
//! response is never served to a caller that could not fetch it fresh.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower::ServiceExt;

use super::authentication::{Authenticator, authorize};
use super::context::{
    CORRELATION_HEADER, PipelineState, RequestContext, correlation_id_from, with_correlation_id,
};
use super::cors::{CorsOutcome, CorsPolicy};
use super::fingerprint::{CacheScope, Fingerprint, FingerprintInput};
use super::identity::{ApiKeyRegistry, IdentityResolver};
use super::rate_limiter::{RateDecision, RateLimitPolicy, RateLimiter, WindowUsage};
use super::response_cache::{self, ResponseCache, X_CACHE};
use super::version_router::{
    CacheRule, HandlerGroup, SUPPORTED_VERSIONS_HEADER, VersionRouter, requested_version,
};
use crate::application::services::TokenValidator;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::cache::{CachedResponse, ResponseCacheStore};
use crate::infrastructure::counters::CounterStore;

/// Largest request body read before dispatch.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Collaborators the pipeline is built from.
pub struct PipelineComponents {
    pub counter_store: Arc<dyn CounterStore>,
    pub cache_store: Arc<dyn ResponseCacheStore>,
    pub tokens: Arc<TokenValidator>,
    pub groups: Vec<HandlerGroup>,
}

/// Immutable composition of all pipeline stages, shared by every request.
pub struct Pipeline {
    cors: CorsPolicy,
    identities: IdentityResolver,
    limiter: RateLimiter,
    cache: ResponseCache,
    authenticator: Authenticator,
    router: VersionRouter,
    handler_timeout: Duration,
}

/// Response headers gathered while the request moves through the stages.
#[derive(Default)]
struct Decorations {
    origin: Option<String>,
    usage: Option<WindowUsage>,
}

impl Pipeline {
    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Fails if the handler groups do not cover the configured versions.
    pub fn new(config: &Config, components: PipelineComponents) -> anyhow::Result<Self> {
        let router = VersionRouter::new(
            components.groups,
            &config.api_versions,
            config.default_api_version,
        )
        .context("Failed to build the versioned route registry")?;

        let limiter = RateLimiter::new(
            components.counter_store,
            RateLimitPolicy {
                limit: config.rate_limit_requests,
                window: config.rate_limit_window(),
            },
            config.store_timeout(),
        );
        let cache = ResponseCache::new(
            components.cache_store,
            config.cache_ttl(),
            config.store_timeout(),
        );
        let identities = IdentityResolver::new(
            ApiKeyRegistry::new(&config.jwt_secret, &config.api_keys),
            config.behind_proxy,
        );

        Ok(Self {
            cors: CorsPolicy::from_origins(&config.cors_allowed_origins),
            identities,
            limiter,
            cache,
            authenticator: Authenticator::new(components.tokens),
            router,
            handler_timeout: config.handler_timeout(),
        })
    }

    pub fn router(&self) -> &VersionRouter {
        &self.router
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Runs one request through every stage and always produces a response.
    pub async fn process(&self, request: Request, peer: Option<SocketAddr>) -> Response {
        let correlation_id = correlation_id_from(request.headers());

        with_correlation_id(correlation_id.clone(), async move {
            let mut ctx = RequestContext::new(
                correlation_id,
                request.method().clone(),
                request.uri().path().to_string(),
            );
            let mut decorations = Decorations::default();

            let (mut response, outcome) =
                match self.run(&mut ctx, &mut decorations, request, peer).await {
                    Ok(response) => {
                        ctx.advance(PipelineState::Responded);
                        (response, "responded")
                    }
                    Err(err) => {
                        ctx.reject(&err);
                        let code = err.code();
                        (err.into_response(), code)
                    }
                };

            self.decorate(&ctx, &decorations, response.headers_mut());
            metrics::counter!("pipeline_requests_total", "outcome" => outcome).increment(1);
            tracing::debug!(
                correlation_id = %ctx.correlation_id,
                status = response.status().as_u16(),
                elapsed_ms = ctx.elapsed_ms() as u64,
                "pipeline finished"
            );

            response
        })
        .await
    }

    async fn run(
        &self,
        ctx: &mut RequestContext,
        decorations: &mut Decorations,
        request: Request,
        peer: Option<SocketAddr>,
    ) -> Result<Response, AppError> {
        let (mut parts, body) = request.into_parts();

        match self.cors.evaluate(&parts.method, &parts.headers) {
            CorsOutcome::SameOrigin => {}
            CorsOutcome::Allowed(origin) => decorations.origin = Some(origin),
            CorsOutcome::Preflight(origin) => {
                ctx.advance(PipelineState::CorsChecked);
                return Ok(self.cors.preflight_response(&origin, &parts.headers));
            }
            CorsOutcome::Rejected(origin) => {
                return Err(AppError::forbidden(
                    "Origin is not allowed",
                    json!({ "origin": origin }),
                ));
            }
        }
        ctx.advance(PipelineState::CorsChecked);

        let credential = self.authenticator.credential(&mut parts).await;
        let identity = self.identities.resolve(
            &parts.headers,
            peer,
            credential.as_ref().and_then(|c| c.as_ref().ok()),
        );
        match self.limiter.check(&identity.key()).await {
            RateDecision::Allowed { usage } => decorations.usage = usage,
            RateDecision::Throttled { retry_after, usage } => {
                decorations.usage = Some(usage);
                return Err(AppError::throttled(retry_after));
            }
        }
        ctx.advance(PipelineState::RateLimited);

        let requested = requested_version(&parts.headers, parts.uri.query());
        let resolution = self.router.resolve(
            requested.as_ref().map(|(label, source)| (label.as_str(), *source)),
            parts.uri.path(),
            &parts.method,
        )?;
        let route = resolution.route;

        // Public-cacheable routes are looked up before authentication.
        let authenticate_first = !matches!(route.cache, CacheRule::Public(_));
        let principal = if authenticate_first {
            let principal = authorize(&route.access, credential)?;
            ctx.advance(PipelineState::Authenticated);
            principal
        } else {
            None
        };

        let cache_plan = match route.cache {
            CacheRule::NoStore => None,
            CacheRule::Public(ttl) => Some((CacheScope::Shared, ttl)),
            CacheRule::Private(ttl) => principal
                .as_ref()
                .map(|p| (CacheScope::Principal(p.subject.clone()), ttl)),
        };
        let cache_plan = cache_plan.map(|(scope, ttl)| {
            let fingerprint = Fingerprint::compute(&FingerprintInput {
                method: &parts.method,
                version: resolution.version,
                route_path: &resolution.route_path,
                query: parts.uri.query(),
                headers: &parts.headers,
                scope: &scope,
            });
            (fingerprint, scope, ttl.unwrap_or(self.cache.default_ttl()))
        });

        if let Some((fingerprint, scope, _)) = &cache_plan
            && let Some(entry) = self.cache.lookup(fingerprint).await
        {
            ctx.advance(PipelineState::CacheChecked);
            tracing::debug!(correlation_id = %ctx.correlation_id, "served from cache");
            return Ok(serve_cached(&entry, &parts, scope));
        }
        ctx.advance(PipelineState::CacheChecked);

        if !authenticate_first {
            ctx.advance(PipelineState::Authenticated);
        }

        ctx.advance(PipelineState::Routed);
        tracing::debug!(
            correlation_id = %ctx.correlation_id,
            version = %resolution.version,
            version_source = resolution.source.as_str(),
            route = route.path,
            "route resolved"
        );

        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|_| {
                AppError::bad_request(
                    "Request body is too large or unreadable",
                    json!({ "limit_bytes": MAX_BODY_BYTES }),
                )
            })?;
        if let Some(validate) = route.validator {
            validate(&body)?;
        }

        let method = parts.method.clone();
        let request_headers = parts.headers.clone();
        parts.uri = dispatch_uri(&resolution.route_path, parts.uri.query())?;
        parts.extensions.insert(resolution.version);
        if let Some(principal) = principal {
            parts.extensions.insert(principal);
        }

        // Snapshot before the handler reads, so a write that lands meanwhile
        // keeps this response out of the cache.
        let generation = self.cache.generation(&resolution.route_path);
        let response = self
            .dispatch(resolution.group, Request::from_parts(parts, Body::from(body)))
            .await?;
        ctx.advance(PipelineState::Handled);

        let status = response.status();
        if route.is_mutating() && status.is_success() {
            self.cache
                .invalidate(&route.invalidation_prefixes(&resolution.route_path))
                .await;
        }

        match cache_plan {
            Some((fingerprint, scope, ttl))
                if response_cache::is_cacheable(&method, status, response.headers()) =>
            {
                let (mut head, body) = response.into_parts();
                let bytes = axum::body::to_bytes(body, usize::MAX)
                    .await
                    .map_err(|e| AppError::internal(format!("failed to buffer response: {}", e)))?;

                let entry = response_cache::capture(
                    status,
                    &head.headers,
                    bytes.clone(),
                    &resolution.route_path,
                    ttl,
                );
                set_cache_headers(&mut head.headers, &entry.etag, &scope, ttl, "MISS");
                let not_modified = response_cache::etag_matches(&request_headers, &entry.etag);
                self.cache.store(&fingerprint, entry, ttl, generation).await;

                if not_modified {
                    return Ok(not_modified_response(head.headers));
                }
                Ok(Response::from_parts(head, Body::from(bytes)))
            }
            _ => Ok(response),
        }
    }

    async fn dispatch(&self, group: &HandlerGroup, request: Request) -> Result<Response, AppError> {
        let call = group.router.clone().oneshot(request);
        match tokio::time::timeout(self.handler_timeout, call).await {
            Ok(result) => Ok(result.unwrap_or_else(|never| match never {})),
            Err(_) => Err(AppError::dependency(format!(
                "handler did not complete within {}ms",
                self.handler_timeout.as_millis()
            ))),
        }
    }

    fn decorate(&self, ctx: &RequestContext, decorations: &Decorations, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&ctx.correlation_id) {
            headers.insert(CORRELATION_HEADER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.router.supported_header()) {
            headers.insert(SUPPORTED_VERSIONS_HEADER, value);
        }
        if let Some(origin) = &decorations.origin {
            self.cors.decorate(headers, origin);
        }
        if let Some(usage) = &decorations.usage {
            usage.apply(headers);
        }
    }
}

/// Entry point mounted on `/api` and `/api/{*rest}`.
pub async fn handle(State(pipeline): State<Arc<Pipeline>>, request: Request) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    pipeline.process(request, peer).await
}

fn dispatch_uri(route_path: &str, query: Option<&str>) -> Result<Uri, AppError> {
    let path_and_query = match query {
        Some(q) => format!("{}?{}", route_path, q),
        None => route_path.to_string(),
    };
    path_and_query
        .parse::<Uri>()
        .map_err(|e| AppError::internal(format!("invalid dispatch uri: {}", e)))
}

fn cache_control(scope: &CacheScope, max_age: Duration) -> String {
    let visibility = match scope {
        CacheScope::Shared => "public",
        CacheScope::Principal(_) => "private",
    };
    format!("{}, max-age={}", visibility, max_age.as_secs())
}

fn set_cache_headers(
    headers: &mut HeaderMap,
    etag: &str,
    scope: &CacheScope,
    max_age: Duration,
    x_cache: &'static str,
) {
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert(header::ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&cache_control(scope, max_age)) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers.insert(X_CACHE, HeaderValue::from_static(x_cache));
}

fn serve_cached(entry: &CachedResponse, parts: &Parts, scope: &CacheScope) -> Response {
    let mut response = response_cache::replay(entry, &parts.method);
    set_cache_headers(
        response.headers_mut(),
        &entry.etag,
        scope,
        entry.remaining_ttl(),
        "HIT",
    );

    if response_cache::etag_matches(&parts.headers, &entry.etag) {
        let (head, _) = response.into_parts();
        return not_modified_response(head.headers);
    }
    response
}

fn not_modified_response(mut headers: HeaderMap) -> Response {
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::CONTENT_TYPE);

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_MODIFIED;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::MemoryCacheStore;
    use crate::infrastructure::counters::{MemoryCounterStore, MockCounterStore};
    use crate::infrastructure::StoreError;
    use crate::pipeline::version_router::{ApiVersion, RouteSpec};
    use axum::Router;
    use axum::http::Method;
    use axum::routing::get;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn config() -> Config {
        Config {
            jwt_secret: "pipeline-secret".to_string(),
            rate_limit_requests: 3,
            api_versions: vec![ApiVersion::new(1, 0)],
            default_api_version: ApiVersion::new(1, 0),
            ..Config::default()
        }
    }

    fn pipeline_for(
        counter_store: Arc<dyn CounterStore>,
        router: Router,
        routes: Vec<RouteSpec>,
    ) -> Pipeline {
        let config = config();
        let group = HandlerGroup::new(ApiVersion::new(1, 0), router, routes);

        Pipeline::new(
            &config,
            PipelineComponents {
                counter_store,
                cache_store: Arc::new(MemoryCacheStore::new(1 << 20)),
                tokens: Arc::new(TokenValidator::new(&config.jwt_secret, None, 0)),
                groups: vec![group],
            },
        )
        .unwrap()
    }

    fn pipeline_with(counter_store: Arc<dyn CounterStore>, calls: Arc<AtomicUsize>) -> Pipeline {
        let router = Router::new().route(
            "/hotels",
            get(move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    axum::Json(json!([{ "id": 1 }]))
                }
            }),
        );
        pipeline_for(
            counter_store,
            router,
            vec![RouteSpec::get("/hotels", "List hotels").public_cache()],
        )
    }

    /// A hotel whose first read can be held open until the test releases it.
    struct GatedHotel {
        name: std::sync::Mutex<&'static str>,
        hold_next_read: AtomicBool,
        read: Notify,
        release: Notify,
    }

    fn gated_pipeline(hotel: Arc<GatedHotel>) -> Pipeline {
        let reader = Arc::clone(&hotel);
        let router = Router::new().route(
            "/hotels/{id}",
            get(move || {
                let hotel = Arc::clone(&reader);
                async move {
                    let name = *hotel.name.lock().unwrap();
                    if hotel.hold_next_read.swap(false, Ordering::SeqCst) {
                        hotel.read.notify_one();
                        hotel.release.notified().await;
                    }
                    axum::Json(json!({ "name": name }))
                }
            })
            .put(move || {
                let hotel = Arc::clone(&hotel);
                async move {
                    *hotel.name.lock().unwrap() = "new";
                    StatusCode::OK
                }
            }),
        );
        pipeline_for(
            Arc::new(MemoryCounterStore::new()),
            router,
            vec![
                RouteSpec::get("/hotels/{id}", "Get hotel").public_cache(),
                RouteSpec::put("/hotels/{id}", "Update hotel").protected(&["Administrator"]),
            ],
        )
    }

    fn bearer(subject: &str, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let token = TokenValidator::new("pipeline-secret", None, 0)
            .issue(subject, &roles, Duration::from_secs(60))
            .unwrap();
        format!("Bearer {}", token)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Runs the stages directly and returns the states the request visited.
    async fn visited(pipeline: &Pipeline, request: Request) -> Vec<PipelineState> {
        let mut ctx = RequestContext::new(
            "history-test".to_string(),
            request.method().clone(),
            request.uri().path().to_string(),
        );
        let mut decorations = Decorations::default();
        let result = pipeline.run(&mut ctx, &mut decorations, request, peer()).await;
        assert!(result.is_ok());
        ctx.history().to_vec()
    }

    fn get_hotels() -> Request {
        Request::builder()
            .uri("/api/v1/hotels")
            .body(Body::empty())
            .unwrap()
    }

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:40000".parse().unwrap())
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(Arc::new(MemoryCounterStore::new()), Arc::clone(&calls));

        let first = pipeline.process(get_hotels(), peer()).await;
        let second = pipeline.process(get_hotels(), peer()).await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[X_CACHE], "MISS");
        assert_eq!(second.headers()[X_CACHE], "HIT");
        assert_eq!(first.headers()[header::ETAG], second.headers()[header::ETAG]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_throttled_request_skips_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(Arc::new(MemoryCounterStore::new()), Arc::clone(&calls));

        for _ in 0..3 {
            pipeline.process(get_hotels(), peer()).await;
        }
        let throttled = pipeline.process(get_hotels(), peer()).await;

        assert_eq!(throttled.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(throttled.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(throttled.headers()["x-ratelimit-remaining"], "0");
    }

    #[tokio::test]
    async fn test_counter_store_outage_fails_open() {
        let mut store = MockCounterStore::new();
        store
            .expect_hit()
            .returning(|_, _| Err(StoreError::Connection("refused".to_string())));

        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(Arc::new(store), Arc::clone(&calls));
        let response = pipeline.process(get_hotels(), peer()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key("x-ratelimit-limit"));
    }

    #[tokio::test]
    async fn test_correlation_id_is_echoed() {
        let pipeline = pipeline_with(Arc::new(MemoryCounterStore::new()), Arc::default());
        let request = Request::builder()
            .uri("/api/v9/hotels")
            .header(CORRELATION_HEADER, "trace-0001")
            .body(Body::empty())
            .unwrap();

        let response = pipeline.process(request, peer()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CORRELATION_HEADER], "trace-0001");
        assert_eq!(response.headers()[SUPPORTED_VERSIONS_HEADER], "v1");
    }

    #[tokio::test]
    async fn test_if_none_match_yields_not_modified() {
        let pipeline = pipeline_with(Arc::new(MemoryCounterStore::new()), Arc::default());
        let first = pipeline.process(get_hotels(), peer()).await;
        let etag = first.headers()[header::ETAG].clone();

        let request = Request::builder()
            .uri("/api/v1/hotels")
            .header(header::IF_NONE_MATCH, etag)
            .body(Body::empty())
            .unwrap();
        let response = pipeline.process(request, peer()).await;

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_read_overlapping_a_write_is_not_cached() {
        let hotel = Arc::new(GatedHotel {
            name: std::sync::Mutex::new("old"),
            hold_next_read: AtomicBool::new(true),
            read: Notify::new(),
            release: Notify::new(),
        });
        let pipeline = Arc::new(gated_pipeline(Arc::clone(&hotel)));
        let get_hotel = || {
            Request::builder()
                .uri("/api/v1/hotels/1")
                .body(Body::empty())
                .unwrap()
        };

        let in_flight = tokio::spawn({
            let pipeline = Arc::clone(&pipeline);
            let request = get_hotel();
            async move { pipeline.process(request, peer()).await }
        });
        hotel.read.notified().await;

        let update = Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/hotels/1")
            .header(header::AUTHORIZATION, bearer("admin", &["Administrator"]))
            .body(Body::empty())
            .unwrap();
        let updated = pipeline.process(update, peer()).await;
        assert_eq!(updated.status(), StatusCode::OK);

        hotel.release.notify_one();
        let stale = in_flight.await.unwrap();
        assert_eq!(stale.headers()[X_CACHE], "MISS");
        assert_eq!(json_body(stale).await["name"], "old");

        let fresh = pipeline.process(get_hotel(), peer()).await;
        assert_eq!(fresh.headers()[X_CACHE], "MISS");
        assert_eq!(json_body(fresh).await["name"], "new");
    }

    #[tokio::test]
    async fn test_public_route_checks_cache_before_authenticating() {
        let pipeline = pipeline_with(Arc::new(MemoryCounterStore::new()), Arc::default());

        let history = visited(&pipeline, get_hotels()).await;
        assert_eq!(
            history,
            [
                PipelineState::Received,
                PipelineState::CorsChecked,
                PipelineState::RateLimited,
                PipelineState::CacheChecked,
                PipelineState::Authenticated,
                PipelineState::Routed,
                PipelineState::Handled,
            ]
        );

        let hit = visited(&pipeline, get_hotels()).await;
        assert_eq!(hit.last(), Some(&PipelineState::CacheChecked));
        assert!(!hit.contains(&PipelineState::Authenticated));
    }

    #[tokio::test]
    async fn test_protected_route_authenticates_before_cache() {
        let router = Router::new().route("/bookings", get(|| async { axum::Json(json!([])) }));
        let pipeline = pipeline_for(
            Arc::new(MemoryCounterStore::new()),
            router,
            vec![
                RouteSpec::get("/bookings", "List bookings")
                    .protected(&["Guest"])
                    .private_cache(),
            ],
        );
        let request = Request::builder()
            .uri("/api/v1/bookings")
            .header(header::AUTHORIZATION, bearer("alice", &["Guest"]))
            .body(Body::empty())
            .unwrap();

        let history = visited(&pipeline, request).await;

        assert_eq!(
            history,
            [
                PipelineState::Received,
                PipelineState::CorsChecked,
                PipelineState::RateLimited,
                PipelineState::Authenticated,
                PipelineState::CacheChecked,
                PipelineState::Routed,
                PipelineState::Handled,
            ]
        );
    }

    #[test]
    fn test_missing_group_fails_startup() {
        let config = Config {
            api_versions: vec![ApiVersion::new(1, 0), ApiVersion::new(2, 0)],
            ..config()
        };
        let result = Pipeline::new(
            &config,
            PipelineComponents {
                counter_store: Arc::new(MemoryCounterStore::new()),
                cache_store: Arc::new(MemoryCacheStore::new(1024)),
                tokens: Arc::new(TokenValidator::new("s", None, 0)),
                groups: Vec::new(),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_control_value() {
        assert_eq!(
            cache_control(&CacheScope::Shared, Duration::from_secs(120)),
            "public, max-age=120"
        );
        assert_eq!(
            cache_control(&CacheScope::Principal("a".into()), Duration::from_secs(5)),
            "private, max-age=5"
        );
    }
}
