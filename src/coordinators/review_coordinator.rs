use std::sync::Arc;

use crate::app_data::AppData;
use crate::config::database::{begin_transaction, commit_transaction};
use crate::coordinators::ensure_image;
use crate::errors::InternalError;
use crate::providers::{BlobStore, CleanupQueue, StoredBlob};
use crate::stores::{CommentStore, NewReview, PlaceStore, ReviewStore};
use crate::types::db::{decode_list, place, review};
use crate::types::internal::context::RequestContext;
use crate::types::internal::pagination::PageRequest;

/// Most images accepted by one media upload
pub const MAX_MEDIA_PER_UPLOAD: usize = 4;

const MEDIA_FOLDER: &str = "reviews";

/// Reject an upload of zero files or more than `MAX_MEDIA_PER_UPLOAD`
///
/// Callers holding unread multipart parts check this before buffering them.
pub fn ensure_media_count(count: usize) -> Result<(), InternalError> {
    if count == 0 {
        return Err(InternalError::validation("Please upload at least one image"));
    }
    if count > MAX_MEDIA_PER_UPLOAD {
        return Err(InternalError::validation(format!(
            "You can upload at most {} images at once",
            MAX_MEDIA_PER_UPLOAD
        )));
    }
    Ok(())
}

/// One uploaded file
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Review writes that span places, comments and stored media
///
/// Multi-row writes run on a single transaction handle; returning early drops
/// the handle and rolls the transaction back. Blob destruction happens only
/// after commit, through the cleanup queue.
pub struct ReviewCoordinator {
    review_store: Arc<ReviewStore>,
    place_store: Arc<PlaceStore>,
    comment_store: Arc<CommentStore>,
    blob_store: Arc<dyn BlobStore>,
    cleanup_queue: CleanupQueue,
}

impl ReviewCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            review_store: app_data.review_store.clone(),
            place_store: app_data.place_store.clone(),
            comment_store: app_data.comment_store.clone(),
            blob_store: app_data.blob_store.clone(),
            cleanup_queue: app_data.cleanup_queue.clone(),
        }
    }

    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Vec<(review::Model, Option<place::Model>)>, InternalError> {
        self.review_store.list(self.review_store.db(), page).await
    }

    pub async fn get(&self, id: &str) -> Result<(review::Model, Option<place::Model>), InternalError> {
        self.review_store
            .find_with_place(self.review_store.db(), id)
            .await?
            .ok_or_else(|| InternalError::not_found("review", id))
    }

    /// Reviews of one place; an unknown place simply has none
    pub async fn list_for_place(
        &self,
        place_id: &str,
        page: PageRequest,
    ) -> Result<Vec<review::Model>, InternalError> {
        self.review_store
            .list_for_place(self.review_store.db(), place_id, page)
            .await
    }

    /// Insert a review and bump its place's counter in one transaction
    pub async fn create(
        &self,
        ctx: &RequestContext,
        new_review: NewReview,
    ) -> Result<(review::Model, Option<place::Model>), InternalError> {
        let txn = begin_transaction(self.review_store.db()).await?;

        let place = self
            .place_store
            .find_by_id(&txn, &new_review.place_id)
            .await?
            .ok_or_else(|| InternalError::reference_not_found("place", new_review.place_id.clone()))?;

        let review = self.review_store.insert(&txn, new_review).await?;

        let touched = self.place_store.increment_reviews_count(&txn, &place.id).await?;
        if touched == 0 {
            tracing::warn!(request_id = %ctx.request_id, place_id = %place.id, "Place vanished during review creation");
            return Err(InternalError::reference_not_found("place", place.id));
        }

        commit_transaction(txn).await?;
        tracing::info!(request_id = %ctx.request_id, review_id = %review.id, place_id = %place.id, "Review created");
        Ok((review, Some(place)))
    }

    pub async fn edit(
        &self,
        ctx: &RequestContext,
        id: &str,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<review::Model, InternalError> {
        let review = self
            .review_store
            .update_details(self.review_store.db(), id, title, description)
            .await?;
        tracing::info!(request_id = %ctx.request_id, review_id = %review.id, "Review edited");
        Ok(review)
    }

    /// Like (`increase == true`) or unlike a review
    pub async fn adjust_likes(
        &self,
        ctx: &RequestContext,
        id: &str,
        increase: bool,
    ) -> Result<review::Model, InternalError> {
        let delta = if increase { 1 } else { -1 };
        let review = self
            .review_store
            .adjust_likes(self.review_store.db(), id, delta)
            .await?;
        tracing::debug!(request_id = %ctx.request_id, review_id = %review.id, likes = review.likes, "Review likes adjusted");
        Ok(review)
    }

    /// Upload images and append their URLs to the review
    ///
    /// Uploaded blobs are queued for cleanup whenever the review write does not
    /// commit.
    pub async fn attach_media(
        &self,
        ctx: &RequestContext,
        id: &str,
        files: Vec<MediaFile>,
    ) -> Result<review::Model, InternalError> {
        ensure_media_count(files.len())?;
        for file in &files {
            ensure_image(file.content_type.as_deref())?;
        }
        if self.review_store.find_by_id(self.review_store.db(), id).await?.is_none() {
            return Err(InternalError::not_found("review", id));
        }

        let mut uploaded: Vec<StoredBlob> = Vec::with_capacity(files.len());
        for file in files {
            match self
                .blob_store
                .upload(file.bytes, MEDIA_FOLDER, file.content_type.as_deref())
                .await
            {
                Ok(blob) => uploaded.push(blob),
                Err(e) => {
                    self.compensate(ctx, uploaded);
                    return Err(e.into());
                }
            }
        }

        let urls: Vec<String> = uploaded.iter().map(|blob| blob.url.clone()).collect();
        match self.append_media(id, &urls).await {
            Ok(review) => {
                tracing::info!(request_id = %ctx.request_id, review_id = %review.id, count = urls.len(), "Review media attached");
                Ok(review)
            }
            Err(e) => {
                self.compensate(ctx, uploaded);
                Err(e)
            }
        }
    }

    async fn append_media(&self, id: &str, urls: &[String]) -> Result<review::Model, InternalError> {
        let txn = begin_transaction(self.review_store.db()).await?;
        let review = self.review_store.append_media(&txn, id, urls).await?;
        commit_transaction(txn).await?;
        Ok(review)
    }

    fn compensate(&self, ctx: &RequestContext, uploaded: Vec<StoredBlob>) {
        if uploaded.is_empty() {
            return;
        }
        tracing::warn!(request_id = %ctx.request_id, count = uploaded.len(), "Discarding uploaded media after failed write");
        self.cleanup_queue
            .enqueue_public_ids(uploaded.into_iter().map(|blob| blob.public_id).collect());
    }

    /// Delete a review with its comments, decrement the place counter, then
    /// queue its media for destruction
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), InternalError> {
        let txn = begin_transaction(self.review_store.db()).await?;

        let review = self
            .review_store
            .find_by_id(&txn, id)
            .await?
            .ok_or_else(|| InternalError::not_found("review", id))?;
        let media = decode_list("media", &review.media)?;

        let comments_removed = self.comment_store.delete_for_review(&txn, &review.id).await?;
        self.review_store.delete(&txn, &review.id).await?;
        self.place_store
            .decrement_reviews_count(&txn, &review.place_id)
            .await?;

        commit_transaction(txn).await?;
        tracing::info!(
            request_id = %ctx.request_id,
            review_id = %review.id,
            comments_removed,
            media = media.len(),
            "Review deleted"
        );

        self.cleanup_queue.enqueue_urls(&media);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinators::CommentCoordinator;
    use crate::errors::internal::{BlobStoreError, EntityError};
    use crate::test::utils::{TestApp, remove_db_files, temp_db_path};
    use tokio::task::JoinSet;

    fn new_review(place_id: &str) -> NewReview {
        NewReview {
            place_id: place_id.to_string(),
            title: "Great spot".to_string(),
            description: "Clean water and friendly staff".to_string(),
            author: String::new(),
        }
    }

    fn png(byte: u8) -> MediaFile {
        MediaFile {
            bytes: vec![byte],
            content_type: Some("image/png".to_string()),
        }
    }

    async fn reviews_count(app: &TestApp, place_id: &str) -> i64 {
        app.data
            .place_store
            .find_by_id(app.data.db(), place_id)
            .await
            .unwrap()
            .unwrap()
            .reviews_count
    }

    #[tokio::test]
    async fn test_create_increments_place_counter() {
        let app = TestApp::new().await;
        let reviews = ReviewCoordinator::new(app.data.clone());
        let ctx = app.signup_context("jane").await;
        let place_id = app.create_place("Lekki Beach").await;

        let (review, place) = reviews.create(&ctx, new_review(&place_id)).await.unwrap();

        assert_eq!(review.place_id, place_id);
        assert!(place.is_some());
        assert_eq!(reviews_count(&app, &place_id).await, 1);
    }

    #[tokio::test]
    async fn test_create_for_missing_place_leaves_nothing_behind() {
        let app = TestApp::new().await;
        let reviews = ReviewCoordinator::new(app.data.clone());
        let ctx = app.signup_context("jane").await;

        let result = reviews.create(&ctx, new_review("missing")).await;
        assert!(matches!(
            result,
            Err(InternalError::Entity(EntityError::ReferenceNotFound { entity: "place", .. }))
        ));
        assert!(reviews.list(PageRequest::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_review_does_not_touch_counter() {
        let app = TestApp::new().await;
        let reviews = ReviewCoordinator::new(app.data.clone());
        let ctx = app.signup_context("jane").await;
        let place_id = app.create_place("Lekki Beach").await;

        let mut invalid = new_review(&place_id);
        invalid.description = String::new();
        assert!(reviews.create(&ctx, invalid).await.is_err());
        assert_eq!(reviews_count(&app, &place_id).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_count_exactly() {
        let path = temp_db_path();
        let app = TestApp::with_file_db(&path).await;
        let reviews = Arc::new(ReviewCoordinator::new(app.data.clone()));
        let ctx = app.signup_context("jane").await;
        let place_id = app.create_place("Lekki Beach").await;

        let mut tasks = JoinSet::new();
        for _ in 0..16 {
            let reviews = reviews.clone();
            let ctx = ctx.clone();
            let review = new_review(&place_id);
            tasks.spawn(async move { reviews.create(&ctx, review).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let count = reviews_count(&app, &place_id).await;
        let listed = reviews
            .list_for_place(&place_id, PageRequest::new(Some(1), Some(100)))
            .await
            .unwrap()
            .len();
        app.data.db().clone().close().await.unwrap();
        remove_db_files(&path);

        assert_eq!(count, 16);
        assert_eq!(listed, 16);
    }

    #[tokio::test]
    async fn test_likes_move_both_ways() {
        let app = TestApp::new().await;
        let reviews = ReviewCoordinator::new(app.data.clone());
        let ctx = app.signup_context("jane").await;
        let place_id = app.create_place("Lekki Beach").await;
        let (review, _) = reviews.create(&ctx, new_review(&place_id)).await.unwrap();

        reviews.adjust_likes(&ctx, &review.id, true).await.unwrap();
        reviews.adjust_likes(&ctx, &review.id, true).await.unwrap();
        let updated = reviews.adjust_likes(&ctx, &review.id, false).await.unwrap();
        assert_eq!(updated.likes, 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_comments_and_media() {
        let app = TestApp::new().await;
        let reviews = ReviewCoordinator::new(app.data.clone());
        let comments = CommentCoordinator::new(app.data.clone());
        let ctx = app.signup_context("jane").await;
        let admin = app.admin_context("root").await;
        let place_id = app.create_place("Lekki Beach").await;

        let (review, _) = reviews.create(&ctx, new_review(&place_id)).await.unwrap();
        reviews
            .attach_media(&ctx, &review.id, vec![png(1), png(2)])
            .await
            .unwrap();
        let comment = comments
            .create(&ctx, &review.id, "Agreed", None)
            .await
            .unwrap();

        reviews.delete(&admin, &review.id).await.unwrap();
        app.data.cleanup_queue.flush().await;

        assert!(matches!(
            reviews.get(&review.id).await,
            Err(InternalError::Entity(EntityError::NotFound { .. }))
        ));
        assert!(
            app.data
                .comment_store
                .find_by_id(app.data.db(), &comment.id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(reviews_count(&app, &place_id).await, 0);
        assert!(app.blob_store.stored().is_empty());
        assert_eq!(app.blob_store.destroyed().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_blob_cleanup_fails() {
        let app = TestApp::new().await;
        let reviews = ReviewCoordinator::new(app.data.clone());
        let ctx = app.signup_context("jane").await;
        let admin = app.admin_context("root").await;
        let place_id = app.create_place("Lekki Beach").await;
        let (review, _) = reviews.create(&ctx, new_review(&place_id)).await.unwrap();
        reviews.attach_media(&ctx, &review.id, vec![png(1)]).await.unwrap();

        app.blob_store.set_fail_destroys(true);
        reviews.delete(&admin, &review.id).await.unwrap();
        app.data.cleanup_queue.flush().await;

        assert_eq!(app.blob_store.stored().len(), 1);
        assert!(reviews.get(&review.id).await.is_err());
    }

    #[test]
    fn test_media_count_bounds() {
        assert!(ensure_media_count(0).is_err());
        assert!(ensure_media_count(1).is_ok());
        assert!(ensure_media_count(MAX_MEDIA_PER_UPLOAD).is_ok());
        assert!(matches!(
            ensure_media_count(MAX_MEDIA_PER_UPLOAD + 1),
            Err(e) if e.to_string() == "You can upload at most 4 images at once"
        ));
    }

    #[tokio::test]
    async fn test_attach_media_limits_and_failures() {
        let app = TestApp::new().await;
        let reviews = ReviewCoordinator::new(app.data.clone());
        let ctx = app.signup_context("jane").await;
        let place_id = app.create_place("Lekki Beach").await;
        let (review, _) = reviews.create(&ctx, new_review(&place_id)).await.unwrap();

        let too_many = (0..5).map(png).collect();
        assert!(matches!(
            reviews.attach_media(&ctx, &review.id, too_many).await,
            Err(InternalError::Entity(EntityError::Validation(_)))
        ));

        app.blob_store.set_fail_uploads(true);
        assert!(matches!(
            reviews.attach_media(&ctx, &review.id, vec![png(1)]).await,
            Err(InternalError::BlobStore(BlobStoreError::Upload { .. }))
        ));
        app.blob_store.set_fail_uploads(false);

        let updated = reviews
            .attach_media(&ctx, &review.id, vec![png(1), png(2)])
            .await
            .unwrap();
        assert_eq!(decode_list("media", &updated.media).unwrap().len(), 2);
    }
}
