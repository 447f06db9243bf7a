//! Building key contexts from HTTP requests.

use http::header::{COOKIE, USER_AGENT};
use http::Request;

use crate::key::{CacheKeyContext, DeviceType};

impl CacheKeyContext {
    /// Extract key inputs from an HTTP request.
    ///
    /// The query string is form-decoded, the `Cookie` header is split into
    /// name/value pairs, and the device type is detected from `User-Agent`.
    /// Header values that are not valid visible ASCII are skipped.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let mut ctx = Self::new(req.method().as_str(), req.uri().path());

        if let Some(query) = req.uri().query() {
            ctx.query_params = url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
        }

        for (name, value) in req.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            if *name == COOKIE {
                ctx.cookies.extend(parse_cookies(value));
            }
            ctx.headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        ctx.device_type = ctx.header(USER_AGENT.as_str()).map(DeviceType::from_user_agent);

        ctx
    }
}

/// Parse a `Cookie` header value into name/value pairs.
pub fn parse_cookies(header: &str) -> impl Iterator<Item = (String, String)> + '_ {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), value.trim().trim_matches('"').to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request() {
        let req = Request::builder()
            .method("GET")
            .uri("https://shop.example/search?q=red%20shoes&page=2")
            .header("Accept-Language", "fr")
            .header("Cookie", "session=abc; ab=\"B\"")
            .header("User-Agent", "Mozilla/5.0 (iPhone) Mobile")
            .body(())
            .unwrap();

        let ctx = CacheKeyContext::from_request(&req);
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.path, "/search");
        assert_eq!(ctx.query_params.get("q").map(String::as_str), Some("red shoes"));
        assert_eq!(ctx.header("accept-language"), Some("fr"));
        assert_eq!(ctx.cookies.get("ab").map(String::as_str), Some("B"));
        assert_eq!(ctx.cookies.get("session").map(String::as_str), Some("abc"));
        assert_eq!(ctx.device_type, Some(DeviceType::Mobile));
    }

    #[test]
    fn test_debug_switch_and_blank_agent() {
        let req = Request::builder()
            .uri("/")
            .header("X-Debug-Cache", "1")
            .header("User-Agent", "")
            .body(())
            .unwrap();

        let ctx = CacheKeyContext::from_request(&req);
        assert!(ctx.wants_debug_headers());
        assert_eq!(ctx.device_type, Some(DeviceType::Unknown));
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let req = Request::builder()
            .uri("/")
            .header("Accept", "text/html")
            .header("Accept", "*/*")
            .body(())
            .unwrap();

        let ctx = CacheKeyContext::from_request(&req);
        assert_eq!(ctx.header("Accept"), Some("text/html, */*"));
        assert_eq!(ctx.device_type, None);
    }

    #[test]
    fn test_parse_cookies_skips_malformed_pairs() {
        let cookies: Vec<_> = parse_cookies("a=1; broken; =2; b = 3 ").collect();
        assert_eq!(
            cookies,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "3".to_string())
            ]
        );
    }
}
