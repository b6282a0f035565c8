//! Request inspection.
//!
//! # Responsibilities
//! - Extract the admission-relevant metadata (origin, peer address)
//! - Extract the identity header and cookie
//! - Classify requests as item or administrative
//! - Wire request IDs onto every request and response

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{header, request::Parts, HeaderMap, Method};
use cookie::Cookie;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::content::ContentKind;
use crate::identity::{CLIENT_COOKIE, CLIENT_HEADER};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Everything the access filter, identity resolver and lifecycle need to
/// know about a request, detached from its body.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub path: String,
    pub origin: Option<String>,
    pub peer: Option<IpAddr>,
    pub client_header: Option<String>,
    pub client_cookie: Option<String>,
    pub input_kind: ContentKind,
    pub requested_kind: Option<ContentKind>,
    pub request_id: Option<String>,
}

impl RequestMeta {
    pub fn from_parts(parts: &Parts) -> Self {
        let headers = &parts.headers;
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            origin: header_str(headers, header::ORIGIN.as_str()).map(str::to_owned),
            peer,
            client_header: header_str(headers, CLIENT_HEADER).map(str::to_owned),
            client_cookie: cookie(headers, CLIENT_COOKIE),
            input_kind: ContentKind::from_content_type(header_str(
                headers,
                header::CONTENT_TYPE.as_str(),
            )),
            requested_kind: ContentKind::from_accept(header_str(headers, header::ACCEPT.as_str())),
            request_id: header_str(headers, X_REQUEST_ID).map(str::to_owned),
        }
    }

    /// Whether the request addresses an item (as opposed to the root).
    pub fn is_item_request(&self) -> bool {
        is_item_path(&self.path)
    }
}

/// A path addresses an item unless it is empty or the root.
pub fn is_item_path(path: &str) -> bool {
    !path.is_empty() && path != "/"
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Value of cookie `name` across all `Cookie` headers.
pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().trim_matches('"').to_owned())
        .filter(|v| !v.is_empty())
}

/// Layer assigning a UUID request ID to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn parts(request: Request<Body>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_item_path_classification() {
        assert!(!is_item_path(""));
        assert!(!is_item_path("/"));
        assert!(is_item_path("/greeting"));
        assert!(is_item_path("/a/b"));
    }

    #[test]
    fn test_meta_extraction() {
        let mut request = Request::builder()
            .method("POST")
            .uri("http://store.local/greeting?x=1")
            .header("Origin", "https://app.example")
            .header("X-Servo-Client", "abc")
            .header("Cookie", "theme=dark; Servo-Client=def")
            .header("Content-Type", "application/json")
            .header("Accept", "application/octet-stream")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 5000))));

        let meta = RequestMeta::from_parts(&parts(request));
        assert_eq!(meta.method, Method::POST);
        assert_eq!(meta.path, "/greeting");
        assert_eq!(meta.origin.as_deref(), Some("https://app.example"));
        assert_eq!(meta.peer, Some(IpAddr::from([10, 0, 0, 7])));
        assert_eq!(meta.client_header.as_deref(), Some("abc"));
        assert_eq!(meta.client_cookie.as_deref(), Some("def"));
        assert_eq!(meta.input_kind, ContentKind::Json);
        assert_eq!(meta.requested_kind, Some(ContentKind::Blob));
        assert!(meta.is_item_request());
    }

    #[test]
    fn test_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, "a=1".parse().unwrap());
        headers.append(header::COOKIE, "Servo-Client=\"tok\"; b=2".parse().unwrap());

        assert_eq!(cookie(&headers, "Servo-Client").as_deref(), Some("tok"));
        assert_eq!(cookie(&headers, "b").as_deref(), Some("2"));
        assert_eq!(cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_identity_values_are_absent() {
        let request = Request::builder()
            .uri("/k")
            .header("X-Servo-Client", "")
            .header("Cookie", "Servo-Client=")
            .body(Body::empty())
            .unwrap();
        let meta = RequestMeta::from_parts(&parts(request));
        assert_eq!(meta.client_header, None);
        assert_eq!(meta.client_cookie, None);
        assert_eq!(meta.peer, None);
    }
}
