//! Resolution and echo of the client token.

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::Cookie;
use uuid::Uuid;

use crate::identity::{CLIENT_COOKIE, CLIENT_HEADER};

/// Tokens longer than this are ignored and replaced.
const MAX_TOKEN_LEN: usize = 128;

/// Where a request's client token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Header,
    Cookie,
    Generated,
}

/// The resolved identity of the requesting client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client_id: String,
    pub source: IdentitySource,
}

/// Resolve from the identity header, then the cookie, then a fresh UUID.
pub fn resolve(header_token: Option<&str>, cookie_token: Option<&str>) -> ClientIdentity {
    resolve_with(header_token, cookie_token, || Uuid::new_v4().to_string())
}

/// [`resolve`] with an explicit token generator.
pub fn resolve_with(
    header_token: Option<&str>,
    cookie_token: Option<&str>,
    generate: impl FnOnce() -> String,
) -> ClientIdentity {
    if let Some(token) = header_token.filter(|t| is_usable(t)) {
        return ClientIdentity {
            client_id: token.to_owned(),
            source: IdentitySource::Header,
        };
    }
    if let Some(token) = cookie_token.filter(|t| is_usable(t)) {
        return ClientIdentity {
            client_id: token.to_owned(),
            source: IdentitySource::Cookie,
        };
    }

    let client_id = generate();
    tracing::debug!(client = %client_id, "new client without identifier");
    ClientIdentity {
        client_id,
        source: IdentitySource::Generated,
    }
}

fn is_usable(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b';' && b != b',' && b != b'"')
}

/// Echo the token back as a response header and a cookie.
pub fn echo(identity: &ClientIdentity, headers: &mut HeaderMap, ttl_secs: u64) {
    let max_age = time::Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX));
    let cookie = Cookie::build((CLIENT_COOKIE, identity.client_id.as_str()))
        .path("/")
        .max_age(max_age)
        .secure(true)
        .http_only(true)
        .build();

    // Tokens are validated or generated, so both values are legal header text.
    if let Ok(value) = HeaderValue::from_str(&identity.client_id) {
        headers.insert(CLIENT_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.append(header::SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_wins_over_cookie() {
        let identity = resolve(Some("from-header"), Some("from-cookie"));
        assert_eq!(identity.client_id, "from-header");
        assert_eq!(identity.source, IdentitySource::Header);
    }

    #[test]
    fn test_cookie_used_without_header() {
        let identity = resolve(None, Some("from-cookie"));
        assert_eq!(identity.client_id, "from-cookie");
        assert_eq!(identity.source, IdentitySource::Cookie);
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let first = resolve(None, None);
        let second = resolve(None, None);
        assert_eq!(first.source, IdentitySource::Generated);
        assert_ne!(first.client_id, second.client_id);
        assert!(Uuid::parse_str(&first.client_id).is_ok());
    }

    #[test]
    fn test_unusable_tokens_are_replaced() {
        let long = "x".repeat(MAX_TOKEN_LEN + 1);
        let identity = resolve_with(Some(&long), Some("a b"), || "fresh".into());
        assert_eq!(identity.client_id, "fresh");
        assert_eq!(identity.source, IdentitySource::Generated);
    }

    #[test]
    fn test_echo_sets_header_and_cookie() {
        let identity = resolve_with(None, None, || "tok-1".into());
        let mut headers = HeaderMap::new();
        echo(&identity, &mut headers, 300);

        assert_eq!(headers.get(CLIENT_HEADER).unwrap(), "tok-1");
        let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        let cookie = Cookie::parse(set_cookie).unwrap();
        assert_eq!(cookie.name(), "Servo-Client");
        assert_eq!(cookie.value(), "tok-1");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(300)));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
