use std::sync::Arc;

use crate::errors::InternalError;
use crate::errors::internal::AccessError;
use crate::providers::TokenProvider;
use crate::stores::CredentialStore;
use crate::types::internal::auth::{AuthenticatedUser, Role};
use crate::types::internal::context::{ContextResult, RequestContext, RequestContextMeta};

/// Resolves bearer tokens into request contexts and enforces roles
pub struct AccessControlProvider {
    token_provider: Arc<TokenProvider>,
    credential_store: Arc<CredentialStore>,
}

impl AccessControlProvider {
    pub fn new(token_provider: Arc<TokenProvider>, credential_store: Arc<CredentialStore>) -> Self {
        Self {
            token_provider,
            credential_store,
        }
    }

    /// Run the authentication steps for one request
    ///
    /// Rejections are returned as `ContextResult::Rejected`; only
    /// infrastructure failures while loading the user surface as `Err`.
    pub async fn authenticate(&self, meta: &RequestContextMeta) -> Result<ContextResult, InternalError> {
        let Some(token) = meta.bearer.as_deref() else {
            return Ok(ContextResult::Rejected(AccessError::NoToken));
        };

        let claims = match self.token_provider.validate_jwt(token) {
            Ok(claims) => claims,
            Err(reason) => {
                tracing::debug!(request_id = %meta.request_id, reason = reason.code(), "Token rejected");
                return Ok(ContextResult::Rejected(reason));
            }
        };

        let user = self
            .credential_store
            .find_by_id(self.credential_store.db(), &claims.sub)
            .await?;
        let Some(user) = user else {
            tracing::debug!(request_id = %meta.request_id, user_id = %claims.sub, "Token subject no longer exists");
            return Ok(ContextResult::Rejected(AccessError::UserGone));
        };

        if let Some(changed_at) = user.password_changed_at {
            if claims.iat < changed_at {
                tracing::debug!(request_id = %meta.request_id, user_id = %user.id, "Token predates password change");
                return Ok(ContextResult::Rejected(AccessError::PasswordChanged));
            }
        }

        let identity = AuthenticatedUser {
            id: user.id,
            username: user.username,
            role: Role::parse(&user.role).unwrap_or_default(),
        };
        Ok(ContextResult::Authenticated(RequestContext::authenticated(
            meta, identity, claims,
        )))
    }

    /// Require the context's user to hold one of `roles`
    pub fn authorize(&self, ctx: &RequestContext, roles: &[Role]) -> Result<(), InternalError> {
        if !ctx.is_authenticated() {
            return Err(AccessError::NoToken.into());
        }
        if ctx.has_role(roles) {
            Ok(())
        } else {
            Err(AccessError::Forbidden.into())
        }
    }
}
