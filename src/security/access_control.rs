//! Request admission policy.

use std::net::IpAddr;

use crate::config::AccessConfig;
use crate::http::request::RequestMeta;

/// Outcome of the admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny { status: u16, message: &'static str },
}

/// Apply the origin and client address rules to an item request.
pub fn check_access(meta: &RequestMeta, policy: &AccessConfig) -> Access {
    if !meta.is_item_request() {
        return Access::Allow;
    }

    if let Some(allowed) = &policy.allow_origin {
        match meta.origin.as_deref() {
            None if !policy.public_mode => {
                tracing::info!(path = %meta.path, "disallow access - no 'Origin' header sent");
                return Access::Deny {
                    status: 403,
                    message: "'Origin' header is not found",
                };
            }
            Some(origin) if origin != allowed => {
                tracing::info!(
                    origin = %origin,
                    allowed = %allowed,
                    "disallow access - 'Origin' header mismatch"
                );
                return Access::Deny {
                    status: 403,
                    message: "Origin Access Denied",
                };
            }
            _ => {}
        }
    }

    if let Some(allowed) = &policy.allow_ipaddr {
        let matches = match (meta.peer, allowed.parse::<IpAddr>()) {
            (Some(peer), Ok(allowed)) => normalize(peer) == normalize(allowed),
            _ => false,
        };
        if !matches {
            tracing::info!(
                peer = ?meta.peer,
                allowed = %allowed,
                "disallow access - client IP mismatch"
            );
            return Access::Deny {
                status: 403,
                message: "Client Access Denied",
            };
        }
    }

    Access::Allow
}

/// Compare IPv4-mapped IPv6 peers against plain IPv4 policies.
fn normalize(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
        IpAddr::V4(_) => addr,
    }
}
