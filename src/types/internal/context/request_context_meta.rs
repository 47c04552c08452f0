use std::net::IpAddr;

use poem::Request;
use poem_openapi::auth::{Bearer, BearerAuthorization};

use super::{request_id::RequestId, request_source::RequestSource};

/// Raw request facts gathered before access control runs
#[derive(Debug, Clone)]
pub struct RequestContextMeta {
    pub request_id: RequestId,
    pub ip: Option<IpAddr>,
    /// Bearer token from the Authorization header, if any
    pub bearer: Option<String>,
    pub source: RequestSource,
}

impl RequestContextMeta {
    pub fn from_request(req: &Request) -> Self {
        let bearer = Bearer::from_request(req)
            .ok()
            .map(|bearer| bearer.token)
            .filter(|token| !token.trim().is_empty());

        Self {
            request_id: RequestId::new(),
            ip: Self::extract_ip_address(req),
            bearer,
            source: RequestSource::API,
        }
    }

    /// Build meta for a request that carries the given bearer token
    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            ip: None,
            bearer: Some(token.into()),
            source: RequestSource::API,
        }
    }

    /// Meta for a request without credentials
    pub fn anonymous() -> Self {
        Self {
            request_id: RequestId::new(),
            ip: None,
            bearer: None,
            source: RequestSource::API,
        }
    }

    /// Extract IP address from request headers
    ///
    /// Checks X-Forwarded-For, X-Real-IP, and falls back to remote address.
    fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        // Check X-Forwarded-For header (proxy/load balancer)
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().parse().ok();
            }
        }

        // Check X-Real-IP header (nginx)
        if let Some(real_ip) = req.header("X-Real-IP") {
            return real_ip.parse().ok();
        }

        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }
}
