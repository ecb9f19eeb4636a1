//! Decoration eligibility rules for rendered responses.

use std::collections::HashSet;

use axum::http::{HeaderMap, Response, StatusCode, header};
use regex::Regex;

/// Response header a handler sets to opt a response out of decoration.
///
/// Values `false` and `0` (ASCII case-insensitive) disable decoration;
/// anything else, including absence, leaves the response eligible.
pub const DECORABLE_HEADER: &str = "x-telaio-decorable";

const XHR_HEADER: &str = "x-requested-with";
const XHR_VALUE: &[u8] = b"XMLHttpRequest";
const HTML_MEDIA_TYPE: &str = "text/html";

/// Position of a request within the handling pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// The top-level request.
    Primary,
    /// An embedded fragment rendered inside another request; never decorated.
    Sub,
}

/// Read-only view of the request attributes the strategy consults.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub route_name: Option<&'a str>,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

/// Decides whether a response may be wrapped with site chrome.
///
/// Configured once with three ignore-rule sets; holds no mutable state after
/// construction and may be shared freely across threads and requests.
#[derive(Debug, Default)]
pub struct DecorationStrategy {
    ignore_routes: HashSet<String>,
    ignore_route_patterns: Vec<Regex>,
    ignore_uri_patterns: Vec<Regex>,
}

impl DecorationStrategy {
    pub fn new(
        ignore_routes: impl IntoIterator<Item = String>,
        ignore_route_patterns: Vec<Regex>,
        ignore_uri_patterns: Vec<Regex>,
    ) -> Self {
        Self {
            ignore_routes: ignore_routes.into_iter().collect(),
            ignore_route_patterns,
            ignore_uri_patterns,
        }
    }

    /// Evaluates every eligibility rule in order, short-circuiting on the
    /// first refusal.
    pub fn is_decorable<B>(
        &self,
        request: RequestView<'_>,
        kind: RequestKind,
        response: &Response<B>,
    ) -> bool {
        if kind != RequestKind::Primary {
            return false;
        }

        // A missing content type counts as html.
        let html = response
            .headers()
            .get(header::CONTENT_TYPE)
            .is_none_or(|value| is_html(value.as_bytes()));
        if !html {
            return false;
        }

        if response.status() != StatusCode::OK {
            return false;
        }

        if request
            .headers
            .get(XHR_HEADER)
            .is_some_and(|value| value.as_bytes() == XHR_VALUE)
        {
            return false;
        }

        if response
            .headers()
            .get(DECORABLE_HEADER)
            .is_some_and(|value| opts_out(value.as_bytes()))
        {
            return false;
        }

        self.is_request_decorable(request)
    }

    pub fn is_request_decorable(&self, request: RequestView<'_>) -> bool {
        self.is_route_name_decorable(request.route_name)
            && self.is_route_uri_decorable(request.path)
    }

    /// False for absent or empty names, exact ignore-list hits, and
    /// route-pattern matches. Patterns are unanchored.
    pub fn is_route_name_decorable(&self, route_name: Option<&str>) -> bool {
        let Some(route_name) = route_name.filter(|name| !name.is_empty()) else {
            return false;
        };

        if self.ignore_routes.contains(route_name) {
            return false;
        }

        !self
            .ignore_route_patterns
            .iter()
            .any(|pattern| pattern.is_match(route_name))
    }

    /// False when any configured uri pattern matches, unanchored.
    pub fn is_route_uri_decorable(&self, uri: &str) -> bool {
        !self
            .ignore_uri_patterns
            .iter()
            .any(|pattern| pattern.is_match(uri))
    }
}

/// Media-type comparison: parameters and case are ignored, so
/// `text/html; charset=utf-8` counts as html.
fn is_html(content_type: &[u8]) -> bool {
    let Ok(value) = std::str::from_utf8(content_type) else {
        return false;
    };
    let media_type = value.split(';').next().unwrap_or_default().trim();
    media_type.eq_ignore_ascii_case(HTML_MEDIA_TYPE)
}

fn opts_out(value: &[u8]) -> bool {
    value.eq_ignore_ascii_case(b"false") || value == b"0"
}
