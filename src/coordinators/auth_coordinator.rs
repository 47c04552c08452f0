use std::sync::Arc;

use chrono::Utc;

use crate::app_data::AppData;
use crate::config::database::{begin_transaction, commit_transaction};
use crate::coordinators::require_user_id;
use crate::errors::InternalError;
use crate::errors::internal::{AccessError, CredentialError};
use crate::providers::{EmailMessage, Notifier, TokenProvider};
use crate::stores::{CredentialStore, NewUser};
use crate::types::db::user;
use crate::types::internal::context::RequestContext;

/// A user together with a freshly issued session token
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: user::Model,
}

/// Orchestrates signup, login and the password flows
pub struct AuthCoordinator {
    credential_store: Arc<CredentialStore>,
    token_provider: Arc<TokenProvider>,
    notifier: Arc<dyn Notifier>,
    public_base_url: String,
}

impl AuthCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            credential_store: app_data.credential_store.clone(),
            token_provider: app_data.token_provider.clone(),
            notifier: app_data.notifier.clone(),
            public_base_url: app_data.settings.public_base_url().to_string(),
        }
    }

    fn session(&self, user: user::Model) -> Result<Session, InternalError> {
        let token = self.token_provider.generate_jwt(&user.id)?;
        Ok(Session { token, user })
    }

    /// Register an account and sign the user in
    pub async fn signup(&self, ctx: &RequestContext, new_user: NewUser) -> Result<Session, InternalError> {
        let user = self
            .credential_store
            .create_user(self.credential_store.db(), new_user)
            .await?;
        tracing::info!(request_id = %ctx.request_id, user_id = %user.id, "User signed up");
        self.session(user)
    }

    pub async fn login(
        &self,
        ctx: &RequestContext,
        identifier: &str,
        password: &str,
    ) -> Result<Session, InternalError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(InternalError::validation("Please provide email and password!"));
        }
        let user = self
            .credential_store
            .verify_credentials(self.credential_store.db(), identifier, password)
            .await?;
        tracing::debug!(request_id = %ctx.request_id, user_id = %user.id, "User logged in");
        self.session(user)
    }

    /// Mint a reset token for `email` and mail the reset link
    ///
    /// When delivery fails the stored token is cleared again so no usable
    /// reset state outlives the failed request.
    pub async fn forgot_password(&self, ctx: &RequestContext, email: &str) -> Result<(), InternalError> {
        let db = self.credential_store.db();
        let user = self
            .credential_store
            .find_by_email(db, email)
            .await?
            .ok_or_else(|| CredentialError::UserNotFound("email address".to_string()))?;

        let reset = self.token_provider.generate_reset_token()?;
        self.credential_store
            .store_reset_token(db, &user.id, reset.hash, reset.expires_at)
            .await?;

        let reset_url = format!(
            "{}/api/v1/users/reset-password/{}",
            self.public_base_url, reset.raw
        );
        let message = EmailMessage {
            to: user.email.clone(),
            subject: format!(
                "Reset password link, valid for {}mins",
                self.token_provider.reset_token_ttl_minutes()
            ),
            body: format!(
                "Forgot your password? Submit a PATCH request with your new password and passwordConfirm to {}",
                reset_url
            ),
        };

        if let Err(e) = self.notifier.send(message).await {
            tracing::warn!(request_id = %ctx.request_id, user_id = %user.id, error = %e, "Reset email failed, clearing reset token");
            self.credential_store.clear_reset_token(db, &user.id).await?;
            return Err(e.into());
        }

        tracing::info!(request_id = %ctx.request_id, user_id = %user.id, "Password reset token sent");
        Ok(())
    }

    /// Consume a reset token and set a new password
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        raw_token: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Session, InternalError> {
        let token_hash = self.token_provider.hash_reset_token(raw_token)?;

        let txn = begin_transaction(self.credential_store.db()).await?;
        let user = self
            .credential_store
            .find_by_reset_token(&txn, &token_hash, Utc::now().timestamp())
            .await?
            .ok_or_else(|| CredentialError::invalid_token("reset_token", "unknown or expired"))?;

        let user = self
            .credential_store
            .set_password(&txn, &user.id, password, password_confirm)
            .await?;
        commit_transaction(txn).await?;

        tracing::info!(request_id = %ctx.request_id, user_id = %user.id, "Password reset");
        self.session(user)
    }

    /// Change the signed-in user's password after checking the current one
    pub async fn update_password(
        &self,
        ctx: &RequestContext,
        password_current: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Session, InternalError> {
        let user_id = require_user_id(ctx)?;
        let db = self.credential_store.db();
        let user = self
            .credential_store
            .find_by_id(db, user_id)
            .await?
            .ok_or_else(|| AccessError::UserGone)?;

        if !self.credential_store.verify_password(&user, password_current)? {
            return Err(CredentialError::IncorrectPassword.into());
        }

        let user = self
            .credential_store
            .set_password(db, &user.id, password, password_confirm)
            .await?;
        tracing::info!(request_id = %ctx.request_id, user_id = %user.id, "Password updated");
        self.session(user)
    }
}
