use std::net::IpAddr;

use crate::types::internal::auth::{AuthenticatedUser, Claims, Role};

use super::{
    request_context_meta::RequestContextMeta, request_id::RequestId,
    request_source::RequestSource,
};

/// Request context that flows through all layers
///
/// Carries the identity resolved by access control, so coordinators never
/// read ambient request state.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Resolved user, present once access control accepted the token
    pub user: Option<AuthenticatedUser>,

    /// Verified JWT claims if authenticated
    pub claims: Option<Claims>,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation
    pub actor_id: String,
}

impl RequestContext {
    /// Unauthenticated context for an API request
    pub fn anonymous(meta: &RequestContextMeta) -> Self {
        Self {
            ip_address: meta.ip,
            request_id: meta.request_id.clone(),
            user: None,
            claims: None,
            source: meta.source,
            actor_id: "anonymous".to_owned(),
        }
    }

    /// Context for an API request whose token resolved to `user`
    pub fn authenticated(meta: &RequestContextMeta, user: AuthenticatedUser, claims: Claims) -> Self {
        Self {
            ip_address: meta.ip,
            request_id: meta.request_id.clone(),
            actor_id: user.id.clone(),
            user: Some(user),
            claims: Some(claims),
            source: meta.source,
        }
    }

    /// Create a RequestContext for CLI operations
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            user: None,
            claims: None,
            source: RequestSource::CLI,
            actor_id: format!("cli:{}", command_name),
        }
    }

    /// Create a RequestContext for system operations
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            user: None,
            claims: None,
            source: RequestSource::System,
            actor_id: format!("system:{}", operation_name),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| roles.contains(&user.role))
    }
}
