//! Cache keys and the request data they are derived from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownField;

/// A cache key derived from a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// The computed key string.
    key: String,
    /// Rule that produced the key.
    rule: String,
    /// Context values the template was evaluated against (for debugging).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
}

impl CacheKey {
    /// Create a cache key.
    pub fn new(key: impl Into<String>, rule: impl Into<String>, components: Vec<String>) -> Self {
        Self {
            key: key.into(),
            rule: rule.into(),
            components,
        }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Name of the rule that produced the key.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Get the key components (for debugging).
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Whether the key carries a sentinel marker from a misconfigured rule.
    pub fn has_sentinel(&self) -> bool {
        edge_expr::Sentinel::is_present_in(&self.key)
    }

    /// Consume into the key string.
    pub fn into_string(self) -> String {
        self.key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Request data available to cache key rules.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyContext {
    /// HTTP method, uppercase.
    pub method: String,
    /// Route path.
    pub path: String,
    /// Query parameters.
    pub query_params: BTreeMap<String, String>,
    /// HTTP headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Cookies.
    pub cookies: BTreeMap<String, String>,
    /// User ID (if authenticated).
    pub user_id: Option<String>,
    /// Geographic info.
    pub geo: Option<GeoContext>,
    /// Device type.
    pub device_type: Option<DeviceType>,
}

impl CacheKeyContext {
    /// Create a context for a method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Add a header. The name is stored lowercased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Add a cookie.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Set the authenticated user.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set geographic info.
    pub fn with_geo(mut self, geo: GeoContext) -> Self {
        self.geo = Some(geo);
        self
    }

    /// Set the device type.
    pub fn with_device_type(mut self, device: DeviceType) -> Self {
        self.device_type = Some(device);
        self
    }

    /// Header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Non-empty path segments.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Query parameters as a sorted `k=v&k=v` string.
    pub fn canonical_query(&self) -> String {
        self.query_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Geographic context.
#[derive(Debug, Clone, Default)]
pub struct GeoContext {
    /// Country code.
    pub country: Option<String>,
    /// Region/state.
    pub region: Option<String>,
    /// City.
    pub city: Option<String>,
}

/// Device type for cache variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
    Bot,
    Unknown,
}

impl DeviceType {
    /// Detect device type from User-Agent header. A blank agent is unknown.
    pub fn from_user_agent(ua: &str) -> Self {
        if ua.trim().is_empty() {
            return Self::Unknown;
        }
        let ua_lower = ua.to_lowercase();

        if ua_lower.contains("bot") || ua_lower.contains("crawler") || ua_lower.contains("spider") {
            return Self::Bot;
        }

        if ua_lower.contains("mobile") || ua_lower.contains("android") {
            if ua_lower.contains("tablet") || ua_lower.contains("ipad") {
                return Self::Tablet;
            }
            return Self::Mobile;
        }

        if ua_lower.contains("tablet") || ua_lower.contains("ipad") {
            return Self::Tablet;
        }

        Self::Desktop
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desktop => write!(f, "desktop"),
            Self::Mobile => write!(f, "mobile"),
            Self::Tablet => write!(f, "tablet"),
            Self::Bot => write!(f, "bot"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One positional input of a cache key rule.
///
/// A rule's inputs are resolved in order to build the template context, so the
/// first input is `{0}`, the second `{1}`, and so on. Missing request data
/// resolves to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContextField {
    /// `method`
    Method,
    /// `path`
    Path,
    /// `segment:N`, the Nth non-empty path segment.
    PathSegment(usize),
    /// `query`, all query parameters in canonical order.
    Query,
    /// `query:NAME`
    QueryParam(String),
    /// `header:NAME`
    Header(String),
    /// `cookie:NAME`
    Cookie(String),
    /// `user`
    UserId,
    /// `country`
    Country,
    /// `region`
    Region,
    /// `city`
    City,
    /// `device`
    DeviceType,
    /// `literal:TEXT`
    Literal(String),
}

impl ContextField {
    /// Resolve the field against request data.
    pub fn resolve(&self, ctx: &CacheKeyContext) -> String {
        let geo = ctx.geo.as_ref();
        let value = match self {
            Self::Method => Some(ctx.method.clone()),
            Self::Path => Some(ctx.path.clone()),
            Self::PathSegment(n) => ctx.path_segments().nth(*n).map(str::to_string),
            Self::Query => Some(ctx.canonical_query()),
            Self::QueryParam(name) => ctx.query_params.get(name).cloned(),
            Self::Header(name) => ctx.header(name).map(str::to_string),
            Self::Cookie(name) => ctx.cookies.get(name).cloned(),
            Self::UserId => ctx.user_id.clone(),
            Self::Country => geo.and_then(|g| g.country.clone()),
            Self::Region => geo.and_then(|g| g.region.clone()),
            Self::City => geo.and_then(|g| g.city.clone()),
            Self::DeviceType => ctx.device_type.map(|d| d.to_string()),
            Self::Literal(text) => Some(text.clone()),
        };
        value.unwrap_or_default()
    }
}

impl FromStr for ContextField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownField(s.to_string());
        let field = match s.split_once(':') {
            None => match s {
                "method" => Self::Method,
                "path" => Self::Path,
                "query" => Self::Query,
                "user" => Self::UserId,
                "country" => Self::Country,
                "region" => Self::Region,
                "city" => Self::City,
                "device" => Self::DeviceType,
                _ => return Err(unknown()),
            },
            Some(("segment", n)) => Self::PathSegment(n.parse().map_err(|_| unknown())?),
            Some(("query", name)) if !name.is_empty() => Self::QueryParam(name.to_string()),
            Some(("header", name)) if !name.is_empty() => Self::Header(name.to_ascii_lowercase()),
            Some(("cookie", name)) if !name.is_empty() => Self::Cookie(name.to_string()),
            Some(("literal", text)) => Self::Literal(text.to_string()),
            Some(_) => return Err(unknown()),
        };
        Ok(field)
    }
}

impl TryFrom<String> for ContextField {
    type Error = UnknownField;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContextField> for String {
    fn from(field: ContextField) -> Self {
        field.to_string()
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method => write!(f, "method"),
            Self::Path => write!(f, "path"),
            Self::PathSegment(n) => write!(f, "segment:{}", n),
            Self::Query => write!(f, "query"),
            Self::QueryParam(name) => write!(f, "query:{}", name),
            Self::Header(name) => write!(f, "header:{}", name),
            Self::Cookie(name) => write!(f, "cookie:{}", name),
            Self::UserId => write!(f, "user"),
            Self::Country => write!(f, "country"),
            Self::Region => write!(f, "region"),
            Self::City => write!(f, "city"),
            Self::DeviceType => write!(f, "device"),
            Self::Literal(text) => write!(f, "literal:{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context() -> CacheKeyContext {
        CacheKeyContext::new("get", "/products/42/reviews")
            .with_query("sort", "new")
            .with_query("page", "2")
            .with_header("Accept-Language", "de-DE")
            .with_cookie("ab", "B")
            .with_geo(GeoContext {
                country: Some("DE".to_string()),
                ..Default::default()
            })
            .with_device_type(DeviceType::Mobile)
    }

    #[test]
    fn test_field_parsing_round_trips() {
        for text in [
            "method",
            "path",
            "segment:1",
            "query",
            "query:page",
            "header:accept-language",
            "cookie:ab",
            "user",
            "country",
            "region",
            "city",
            "device",
            "literal:v2",
        ] {
            let field: ContextField = text.parse().unwrap();
            assert_eq!(field.to_string(), text);
        }
    }

    #[test]
    fn test_unknown_fields() {
        for text in ["", "verb", "segment:x", "header:", "geo:country"] {
            assert_eq!(
                text.parse::<ContextField>(),
                Err(UnknownField(text.to_string()))
            );
        }
    }

    #[test]
    fn test_resolve_fields() {
        let ctx = sample_context();
        let resolve = |s: &str| s.parse::<ContextField>().unwrap().resolve(&ctx);

        assert_eq!(resolve("method"), "GET");
        assert_eq!(resolve("segment:0"), "products");
        assert_eq!(resolve("segment:1"), "42");
        assert_eq!(resolve("segment:9"), "");
        assert_eq!(resolve("query"), "page=2&sort=new");
        assert_eq!(resolve("query:sort"), "new");
        assert_eq!(resolve("header:ACCEPT-LANGUAGE"), "de-DE");
        assert_eq!(resolve("cookie:ab"), "B");
        assert_eq!(resolve("user"), "");
        assert_eq!(resolve("country"), "DE");
        assert_eq!(resolve("city"), "");
        assert_eq!(resolve("device"), "mobile");
        assert_eq!(resolve("literal:v2"), "v2");
    }

    #[test]
    fn test_device_detection() {
        assert_eq!(DeviceType::from_user_agent("Googlebot/2.1"), DeviceType::Bot);
        assert_eq!(
            DeviceType::from_user_agent("Mozilla/5.0 (Linux; Android 14) Mobile"),
            DeviceType::Mobile
        );
        assert_eq!(DeviceType::from_user_agent("Mozilla/5.0 (iPad)"), DeviceType::Tablet);
        assert_eq!(
            DeviceType::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)"),
            DeviceType::Desktop
        );
        assert_eq!(DeviceType::from_user_agent("  "), DeviceType::Unknown);
        assert_eq!(DeviceType::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_cache_key_sentinel_detection() {
        assert!(CacheKey::new("GET:<ARGN>", "r", Vec::new()).has_sentinel());
        assert!(!CacheKey::new("GET:/", "r", Vec::new()).has_sentinel());
    }
}
