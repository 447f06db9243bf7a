//! Cache key debugging headers.

use serde::{Deserialize, Serialize};

use crate::key::{CacheKey, CacheKeyContext};

/// Header names for cache key debugging.
pub mod header_names {
    /// Cache key used for lookup.
    pub const X_CACHE_KEY: &str = "X-Cache-Key";
    /// Rule that produced the key.
    pub const X_CACHE_KEY_RULE: &str = "X-Cache-Key-Rule";
    /// Context values the rule evaluated against.
    pub const X_CACHE_KEY_INPUTS: &str = "X-Cache-Key-Inputs";
    /// Set when the key contains a sentinel marker.
    pub const X_CACHE_KEY_SENTINEL: &str = "X-Cache-Key-Sentinel";
    /// Request header that enables debug headers.
    pub const X_DEBUG_CACHE: &str = "X-Debug-Cache";
}

/// Explains how a response's cache key was derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheKeyHeaders {
    /// Cache key used.
    pub cache_key: Option<String>,
    /// Rule name.
    pub rule: Option<String>,
    /// Inputs the template saw, in order.
    pub inputs: Vec<String>,
    /// Whether the key carries a sentinel.
    pub has_sentinel: bool,
}

impl CacheKeyHeaders {
    /// Create empty explain headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a derived key.
    pub fn from_key(key: &CacheKey) -> Self {
        Self {
            cache_key: Some(key.as_str().to_string()),
            rule: Some(key.rule().to_string()),
            inputs: key.components().to_vec(),
            has_sentinel: key.has_sentinel(),
        }
    }

    /// Convert to HTTP headers.
    pub fn to_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        if let Some(key) = &self.cache_key {
            headers.push((header_names::X_CACHE_KEY.to_string(), key.clone()));
        }

        if let Some(rule) = &self.rule {
            headers.push((header_names::X_CACHE_KEY_RULE.to_string(), rule.clone()));
        }

        if !self.inputs.is_empty() {
            headers.push((header_names::X_CACHE_KEY_INPUTS.to_string(), self.inputs.join(", ")));
        }

        if self.has_sentinel {
            headers.push((header_names::X_CACHE_KEY_SENTINEL.to_string(), "true".to_string()));
        }

        headers
    }

    /// Convert to JSON for debugging endpoint.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl CacheKeyContext {
    /// Whether the request asked for debug headers (`X-Debug-Cache: 1`).
    pub fn wants_debug_headers(&self) -> bool {
        self.header(header_names::X_DEBUG_CACHE) == Some("1")
    }
}
