use std::sync::Arc;

use crate::app_data::AppData;
use crate::config::database::{begin_transaction, commit_transaction};
use crate::errors::InternalError;
use crate::stores::{CommentStore, ReviewStore};
use crate::types::db::comment;
use crate::types::internal::context::RequestContext;
use crate::types::internal::pagination::PageRequest;

/// Comment writes keep the parent review's `comment_ids` in step
pub struct CommentCoordinator {
    comment_store: Arc<CommentStore>,
    review_store: Arc<ReviewStore>,
}

impl CommentCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            comment_store: app_data.comment_store.clone(),
            review_store: app_data.review_store.clone(),
        }
    }

    pub async fn list_for_review(
        &self,
        review_id: &str,
        page: PageRequest,
    ) -> Result<Vec<comment::Model>, InternalError> {
        self.comment_store
            .list_for_review(self.comment_store.db(), review_id, page)
            .await
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        review_id: &str,
        text: &str,
        user: Option<String>,
    ) -> Result<comment::Model, InternalError> {
        let txn = begin_transaction(self.comment_store.db()).await?;

        let review = self
            .review_store
            .find_by_id(&txn, review_id)
            .await?
            .ok_or_else(|| InternalError::reference_not_found("review", review_id))?;

        let comment = self
            .comment_store
            .insert(&txn, &review.id, text, user.as_deref().unwrap_or_default())
            .await?;
        self.review_store
            .append_comment_id(&txn, &review.id, &comment.id)
            .await?;

        commit_transaction(txn).await?;
        tracing::info!(request_id = %ctx.request_id, comment_id = %comment.id, review_id = %review.id, "Comment created");
        Ok(comment)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), InternalError> {
        let txn = begin_transaction(self.comment_store.db()).await?;

        let comment = self
            .comment_store
            .find_by_id(&txn, id)
            .await?
            .ok_or_else(|| InternalError::not_found("comment", id))?;

        self.comment_store.delete(&txn, &comment.id).await?;
        self.review_store
            .remove_comment_id(&txn, &comment.review_id, &comment.id)
            .await?;

        commit_transaction(txn).await?;
        tracing::info!(request_id = %ctx.request_id, comment_id = %comment.id, "Comment deleted");
        Ok(())
    }
}
