use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::{ensure_image, require_user_id};
use crate::errors::InternalError;
use crate::errors::internal::AccessError;
use crate::providers::{BlobStore, CleanupQueue};
use crate::stores::CredentialStore;
use crate::types::db::user;
use crate::types::internal::context::RequestContext;

const AVATAR_FOLDER: &str = "users";

/// Profile edits accepted by `update_me`
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub fullname: Option<String>,
    pub username: Option<String>,
    /// Present only so the request can be refused
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Self-service account operations for the signed-in user
pub struct UserCoordinator {
    credential_store: Arc<CredentialStore>,
    blob_store: Arc<dyn BlobStore>,
    cleanup_queue: CleanupQueue,
}

impl UserCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            credential_store: app_data.credential_store.clone(),
            blob_store: app_data.blob_store.clone(),
            cleanup_queue: app_data.cleanup_queue.clone(),
        }
    }

    pub async fn me(&self, ctx: &RequestContext) -> Result<user::Model, InternalError> {
        let user_id = require_user_id(ctx)?;
        self.credential_store
            .find_by_id(self.credential_store.db(), user_id)
            .await?
            .ok_or_else(|| AccessError::UserGone.into())
    }

    pub async fn update_me(
        &self,
        ctx: &RequestContext,
        changes: ProfileChanges,
    ) -> Result<user::Model, InternalError> {
        let user_id = require_user_id(ctx)?;
        if changes.password.is_some() || changes.password_confirm.is_some() {
            return Err(InternalError::validation("This route is not for password updates"));
        }

        let user = self
            .credential_store
            .update_profile(
                self.credential_store.db(),
                user_id,
                changes.fullname,
                changes.username,
            )
            .await?;
        tracing::info!(request_id = %ctx.request_id, user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Upload a new avatar, then swap it in and retire the previous one
    pub async fn set_avatar(
        &self,
        ctx: &RequestContext,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<user::Model, InternalError> {
        let user_id = require_user_id(ctx)?;
        ensure_image(content_type)?;

        let blob = self.blob_store.upload(bytes, AVATAR_FOLDER, content_type).await?;

        let result = self
            .credential_store
            .set_avatar(self.credential_store.db(), user_id, blob.url.clone())
            .await;
        match result {
            Ok((user, previous)) => {
                if let Some(previous) = previous {
                    self.cleanup_queue.enqueue_urls(&[previous]);
                }
                tracing::info!(request_id = %ctx.request_id, user_id = %user.id, "Avatar updated");
                Ok(user)
            }
            Err(e) => {
                self.cleanup_queue.enqueue_public_ids(vec![blob.public_id]);
                Err(e)
            }
        }
    }

    pub async fn delete_me(&self, ctx: &RequestContext) -> Result<(), InternalError> {
        let user = self.me(ctx).await?;
        self.credential_store
            .delete_user(self.credential_store.db(), &user.id)
            .await?;
        if let Some(avatar) = user.avatar {
            self.cleanup_queue.enqueue_urls(&[avatar]);
        }
        tracing::info!(request_id = %ctx.request_id, user_id = %user.id, "Account deleted");
        Ok(())
    }
}
