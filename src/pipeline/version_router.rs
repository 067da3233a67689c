//! Versioned route registry and version resolution.
//!
//! Handler groups are registered once at startup and never change. A request
//! is resolved to a group by its declared version (header, then query
//! parameter), else the `/api/vN/` path segment, else the default version.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, bail};
use axum::Router;
use axum::http::{HeaderMap, Method};
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::error::AppError;
use crate::infrastructure::cache::resource_root;

/// Header and query parameter carrying an explicit version.
pub const VERSION_HEADER: &str = "api-version";
pub const VERSION_QUERY_PARAM: &str = "api-version";
/// Response header listing the exposed versions.
pub const SUPPORTED_VERSIONS_HEADER: &str = "api-supported-versions";

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[vV]?(\d{1,4})(?:\.(\d{1,4}))?$").unwrap());

/// API version label such as `v1` or `v2.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    major: u16,
    minor: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid API version '{0}'")]
pub struct InvalidVersion(pub String);

impl ApiVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    /// Parses a path segment; unlike [`FromStr`] the `v` prefix is required.
    pub fn from_segment(segment: &str) -> Option<Self> {
        if !segment.starts_with(['v', 'V']) {
            return None;
        }
        segment.parse().ok()
    }
}

impl FromStr for ApiVersion {
    type Err = InvalidVersion;

    /// Accepts `1`, `1.0`, `v1` and `V1.0`.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        let caps = VERSION_PATTERN
            .captures(label)
            .ok_or_else(|| InvalidVersion(label.to_string()))?;

        let major = caps[1]
            .parse()
            .map_err(|_| InvalidVersion(label.to_string()))?;
        let minor = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| InvalidVersion(label.to_string()))?,
            None => 0,
        };

        Ok(Self { major, minor })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor == 0 {
            write!(f, "v{}", self.major)
        } else {
            write!(f, "v{}.{}", self.major, self.minor)
        }
    }
}

/// Where the resolved version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    Header,
    Query,
    Path,
    Default,
}

impl VersionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionSource::Header => "header",
            VersionSource::Query => "query",
            VersionSource::Path => "path",
            VersionSource::Default => "default",
        }
    }
}

/// Explicitly requested version label, header first.
pub fn requested_version(headers: &HeaderMap, query: Option<&str>) -> Option<(String, VersionSource)> {
    if let Some(label) = headers
        .get(VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some((label.to_string(), VersionSource::Header));
    }

    url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
        .find(|(key, value)| key == VERSION_QUERY_PARAM && !value.trim().is_empty())
        .map(|(_, value)| (value.trim().to_string(), VersionSource::Query))
}

/// Who may call a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires a valid bearer token; an empty list accepts any role.
    Protected(Vec<&'static str>),
}

/// Caching behaviour of a route. `None` ttl means the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheRule {
    NoStore,
    /// Same response for every caller; looked up before authentication.
    Public(Option<Duration>),
    /// Response depends on the caller; keyed by subject, looked up after authentication.
    Private(Option<Duration>),
}

/// Checks a raw request body before dispatch.
pub type RequestValidator = fn(&[u8]) -> Result<(), AppError>;

/// Metadata for one registered route.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub method: Method,
    /// axum-style pattern, e.g. `/hotels/{id}`.
    pub path: &'static str,
    pub summary: &'static str,
    pub access: Access,
    pub cache: CacheRule,
    pub validator: Option<RequestValidator>,
    /// Extra path prefixes invalidated after a successful mutation.
    pub invalidates: Vec<&'static str>,
}

impl RouteSpec {
    pub fn new(method: Method, path: &'static str, summary: &'static str) -> Self {
        Self {
            method,
            path,
            summary,
            access: Access::Public,
            cache: CacheRule::NoStore,
            validator: None,
            invalidates: Vec::new(),
        }
    }

    pub fn get(path: &'static str, summary: &'static str) -> Self {
        Self::new(Method::GET, path, summary)
    }

    pub fn post(path: &'static str, summary: &'static str) -> Self {
        Self::new(Method::POST, path, summary)
    }

    pub fn put(path: &'static str, summary: &'static str) -> Self {
        Self::new(Method::PUT, path, summary)
    }

    pub fn delete(path: &'static str, summary: &'static str) -> Self {
        Self::new(Method::DELETE, path, summary)
    }

    pub fn public_cache(mut self) -> Self {
        self.cache = CacheRule::Public(None);
        self
    }

    pub fn public_cache_for(mut self, ttl: Duration) -> Self {
        self.cache = CacheRule::Public(Some(ttl));
        self
    }

    pub fn private_cache(mut self) -> Self {
        self.cache = CacheRule::Private(None);
        self
    }

    pub fn protected(mut self, roles: &[&'static str]) -> Self {
        self.access = Access::Protected(roles.to_vec());
        self
    }

    pub fn validate_with(mut self, validator: RequestValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn invalidates(mut self, prefix: &'static str) -> Self {
        self.invalidates.push(prefix);
        self
    }

    /// GET routes also answer HEAD.
    pub fn accepts(&self, method: &Method) -> bool {
        self.method == method || (method == Method::HEAD && self.method == Method::GET)
    }

    pub fn is_mutating(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
    }

    /// Matches `path` segment by segment; `{param}` matches any segment and
    /// literals compare case-insensitively. Returns the canonical path.
    pub fn match_path(&self, path: &str) -> Option<String> {
        let pattern: Vec<&str> = split_segments(self.path);
        let actual: Vec<&str> = split_segments(path);
        if pattern.len() != actual.len() {
            return None;
        }

        let mut canonical = Vec::with_capacity(pattern.len());
        for (expected, given) in pattern.iter().zip(&actual) {
            if is_param(expected) {
                canonical.push(*given);
            } else if expected.eq_ignore_ascii_case(given) {
                canonical.push(*expected);
            } else {
                return None;
            }
        }

        Some(format!("/{}", canonical.join("/")))
    }

    /// Prefixes to invalidate after a successful mutation of `route_path`.
    ///
    /// Always includes the whole resource collection, so `PUT /hotels/7`
    /// also clears `/hotels` listings.
    pub fn invalidation_prefixes(&self, route_path: &str) -> Vec<String> {
        let mut prefixes = vec![format!("/{}", resource_root(route_path))];
        prefixes.extend(self.invalidates.iter().map(|p| p.to_string()));
        prefixes.dedup();
        prefixes
    }

    fn describe(&self, default_ttl: Duration) -> Value {
        let tag = resource_root(self.path).to_string();
        let mut op = json!({
            "summary": self.summary,
            "tags": [tag],
            "responses": responses_for(self),
        });

        let params: Vec<Value> = split_segments(self.path)
            .into_iter()
            .filter(|s| is_param(s))
            .map(|s| {
                json!({
                    "name": s.trim_matches(['{', '}']),
                    "in": "path",
                    "required": true,
                    "schema": { "type": "integer", "format": "int64" }
                })
            })
            .collect();
        if !params.is_empty() {
            op["parameters"] = Value::Array(params);
        }
        if self.validator.is_some() {
            op["requestBody"] = json!({
                "required": true,
                "content": { "application/json": { "schema": { "type": "object" } } }
            });
        }
        if let Access::Protected(roles) = &self.access {
            op["security"] = json!([{ "Bearer": [] }]);
            op["x-roles"] = json!(roles);
        }
        match self.cache {
            CacheRule::NoStore => {}
            CacheRule::Public(ttl) => {
                op["x-cache"] = json!({
                    "scope": "public",
                    "ttl_seconds": ttl.unwrap_or(default_ttl).as_secs()
                });
            }
            CacheRule::Private(ttl) => {
                op["x-cache"] = json!({
                    "scope": "private",
                    "ttl_seconds": ttl.unwrap_or(default_ttl).as_secs()
                });
            }
        }

        op
    }
}

fn responses_for(route: &RouteSpec) -> Value {
    let mut responses = Map::new();
    let success = if route.method == Method::POST {
        ("201", "Created")
    } else if route.method == Method::DELETE {
        ("204", "No Content")
    } else {
        ("200", "OK")
    };
    responses.insert(success.0.into(), json!({ "description": success.1 }));
    if route.validator.is_some() {
        responses.insert("400".into(), json!({ "description": "Validation error" }));
    }
    if let Access::Protected(_) = route.access {
        responses.insert("401".into(), json!({ "description": "Unauthorized" }));
        responses.insert("403".into(), json!({ "description": "Forbidden" }));
    }
    responses.insert("404".into(), json!({ "description": "Not Found" }));
    responses.insert("429".into(), json!({ "description": "Too Many Requests" }));
    Value::Object(responses)
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_param(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

/// Routes of one API version plus the router that serves them.
#[derive(Clone)]
pub struct HandlerGroup {
    pub version: ApiVersion,
    pub routes: Vec<RouteSpec>,
    pub router: Router,
}

impl HandlerGroup {
    pub fn new(version: ApiVersion, router: Router, routes: Vec<RouteSpec>) -> Self {
        Self {
            version,
            routes,
            router,
        }
    }

    /// First route accepting `method` at `path`, with its canonical path.
    pub fn route_for(&self, method: &Method, path: &str) -> Option<(&RouteSpec, String)> {
        self.routes
            .iter()
            .filter(|r| r.accepts(method))
            .find_map(|r| r.match_path(path).map(|canonical| (r, canonical)))
    }

    fn check(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for route in &self.routes {
            if !seen.insert((route.method.clone(), route.path)) {
                bail!("{} registers {} {} twice", self.version, route.method, route.path);
            }
            match (&route.access, route.cache) {
                (Access::Protected(_), CacheRule::Public(_)) => bail!(
                    "{} {} {} is protected and cannot use the public cache",
                    self.version,
                    route.method,
                    route.path
                ),
                (Access::Public, CacheRule::Private(_)) => bail!(
                    "{} {} {} uses the private cache but is not protected",
                    self.version,
                    route.method,
                    route.path
                ),
                _ => {}
            }
            if route.is_mutating() && route.cache != CacheRule::NoStore {
                bail!("{} {} {} mutates and cannot be cached", self.version, route.method, route.path);
            }
        }
        Ok(())
    }

    /// OpenAPI-style description of the group.
    pub fn describe(&self, default_ttl: Duration) -> Value {
        let mut paths = Map::new();
        for route in &self.routes {
            let entry = paths
                .entry(route.path.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            entry[route.method.as_str().to_ascii_lowercase()] = route.describe(default_ttl);
        }

        json!({
            "openapi": "3.0.1",
            "info": {
                "title": "Hotel Listing API",
                "version": self.version.to_string(),
            },
            "servers": [{ "url": format!("/api/{}", self.version) }],
            "paths": paths,
            "components": {
                "securitySchemes": {
                    "Bearer": {
                        "type": "http",
                        "scheme": "bearer",
                        "bearerFormat": "JWT",
                        "description": "JWT Authorization header using the Bearer scheme."
                    }
                }
            }
        })
    }
}

/// Outcome of a successful resolution.
pub struct Resolution<'a> {
    pub version: ApiVersion,
    pub source: VersionSource,
    pub group: &'a HandlerGroup,
    pub route: &'a RouteSpec,
    /// Version-less canonical path, e.g. `/hotels/7`.
    pub route_path: String,
}

/// Immutable registry of handler groups keyed by version.
pub struct VersionRouter {
    groups: BTreeMap<ApiVersion, HandlerGroup>,
    default: ApiVersion,
}

impl VersionRouter {
    /// Builds the registry exposing exactly `supported`.
    ///
    /// # Errors
    ///
    /// Fails if a supported version has no handler group, `default` is not
    /// supported, or a group's route table is inconsistent.
    pub fn new(
        groups: Vec<HandlerGroup>,
        supported: &[ApiVersion],
        default: ApiVersion,
    ) -> anyhow::Result<Self> {
        if !supported.contains(&default) {
            bail!("default API version {} is not in the supported list", default);
        }

        let mut available: BTreeMap<ApiVersion, HandlerGroup> =
            groups.into_iter().map(|g| (g.version, g)).collect();

        let mut exposed = BTreeMap::new();
        for version in supported {
            let group = available
                .remove(version)
                .with_context(|| format!("no handler group registered for {}", version))?;
            group.check()?;
            exposed.insert(*version, group);
        }

        for version in available.keys() {
            tracing::info!(version = %version, "handler group registered but not exposed");
        }

        Ok(Self {
            groups: exposed,
            default,
        })
    }

    pub fn default_version(&self) -> ApiVersion {
        self.default
    }

    pub fn supported_versions(&self) -> Vec<ApiVersion> {
        self.groups.keys().copied().collect()
    }

    /// Value for the `api-supported-versions` response header.
    pub fn supported_header(&self) -> String {
        self.groups
            .keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn group(&self, version: ApiVersion) -> Option<&HandlerGroup> {
        self.groups.get(&version)
    }

    /// Resolves a request to a handler group and route.
    ///
    /// `requested` is an explicit version label; `path` is the full request
    /// path including the `/api` prefix.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] when the version is unknown or unsupported or no
    /// route of that version matches `method` and `path`.
    pub fn resolve(
        &self,
        requested: Option<(&str, VersionSource)>,
        path: &str,
        method: &Method,
    ) -> Result<Resolution<'_>, AppError> {
        let rest = path
            .strip_prefix("/api")
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| route_not_found(path))?;

        let trimmed = rest.trim_start_matches('/');
        let (first, remainder) = trimmed.split_once('/').unwrap_or((trimmed, ""));
        let (path_version, route_path) = match ApiVersion::from_segment(first) {
            Some(version) => (Some(version), remainder),
            None => (None, rest),
        };

        let (version, source) = match requested {
            Some((label, source)) => {
                let version = label.parse::<ApiVersion>().map_err(|_| version_not_found(label))?;
                (version, source)
            }
            None => match path_version {
                Some(version) => (version, VersionSource::Path),
                None => (self.default, VersionSource::Default),
            },
        };

        let group = self
            .groups
            .get(&version)
            .ok_or_else(|| version_not_found(&version.to_string()))?;

        let (route, route_path) = group
            .route_for(method, route_path)
            .ok_or_else(|| route_not_found(path))?;

        Ok(Resolution {
            version,
            source,
            group,
            route,
            route_path,
        })
    }
}

fn version_not_found(label: &str) -> AppError {
    AppError::not_found(
        "API version is not supported",
        json!({ "version": label }),
    )
}

fn route_not_found(path: &str) -> AppError {
    AppError::not_found("No route matches the request", json!({ "path": path }))
}
