use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::{MediaFile, ensure_image};
use crate::errors::InternalError;
use crate::providers::{BlobStore, CleanupQueue, StoredBlob};
use crate::stores::{CategoryStore, NewPlace, PlaceChanges, PlaceStore};
use crate::types::db::{category, place};
use crate::types::internal::context::RequestContext;
use crate::types::internal::pagination::PageRequest;

const CATEGORY_FOLDER: &str = "categories";

/// Categories and places
pub struct CatalogCoordinator {
    category_store: Arc<CategoryStore>,
    place_store: Arc<PlaceStore>,
    blob_store: Arc<dyn BlobStore>,
    cleanup_queue: CleanupQueue,
}

impl CatalogCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            category_store: app_data.category_store.clone(),
            place_store: app_data.place_store.clone(),
            blob_store: app_data.blob_store.clone(),
            cleanup_queue: app_data.cleanup_queue.clone(),
        }
    }

    async fn upload_image(&self, image: MediaFile) -> Result<StoredBlob, InternalError> {
        ensure_image(image.content_type.as_deref())?;
        Ok(self
            .blob_store
            .upload(image.bytes, CATEGORY_FOLDER, image.content_type.as_deref())
            .await?)
    }

    pub async fn list_categories(&self, page: PageRequest) -> Result<Vec<category::Model>, InternalError> {
        self.category_store.list(self.category_store.db(), page).await
    }

    /// Create a category, uploading its image first when one is given
    ///
    /// An uploaded image is queued for deletion if the insert fails.
    pub async fn create_category(
        &self,
        ctx: &RequestContext,
        name: &str,
        image: Option<MediaFile>,
    ) -> Result<category::Model, InternalError> {
        if name.trim().is_empty() {
            return Err(InternalError::validation("Category name is required"));
        }
        let blob = match image {
            Some(image) => Some(self.upload_image(image).await?),
            None => None,
        };

        let result = self
            .category_store
            .create(
                self.category_store.db(),
                name,
                blob.as_ref().map(|b| b.url.clone()),
            )
            .await;
        match result {
            Ok(category) => {
                tracing::info!(request_id = %ctx.request_id, category_id = %category.id, "Category created");
                Ok(category)
            }
            Err(e) => {
                if let Some(blob) = blob {
                    self.cleanup_queue.enqueue_public_ids(vec![blob.public_id]);
                }
                Err(e)
            }
        }
    }

    /// Replace the category image; only the image of a category is editable
    pub async fn update_category(
        &self,
        ctx: &RequestContext,
        id: &str,
        image: MediaFile,
    ) -> Result<category::Model, InternalError> {
        let blob = self.upload_image(image).await?;

        let result = self
            .category_store
            .set_image(self.category_store.db(), id, blob.url.clone())
            .await;
        match result {
            Ok((category, previous)) => {
                if let Some(previous) = previous {
                    self.cleanup_queue.enqueue_urls(&[previous]);
                }
                tracing::info!(request_id = %ctx.request_id, category_id = %category.id, "Category edited");
                Ok(category)
            }
            Err(e) => {
                self.cleanup_queue.enqueue_public_ids(vec![blob.public_id]);
                Err(e)
            }
        }
    }

    pub async fn list_places(
        &self,
        page: PageRequest,
    ) -> Result<Vec<(place::Model, Option<category::Model>)>, InternalError> {
        self.place_store.list(self.place_store.db(), page).await
    }

    pub async fn get_place(
        &self,
        id: &str,
    ) -> Result<(place::Model, Option<category::Model>), InternalError> {
        self.place_store
            .find_with_category(self.place_store.db(), id)
            .await?
            .ok_or_else(|| InternalError::not_found("place", id))
    }

    pub async fn create_place(
        &self,
        ctx: &RequestContext,
        new_place: NewPlace,
    ) -> Result<(place::Model, Option<category::Model>), InternalError> {
        let place = self.place_store.create(self.place_store.db(), new_place).await?;
        tracing::info!(request_id = %ctx.request_id, place_id = %place.id, "Place created");
        self.get_place(&place.id).await
    }

    pub async fn update_place(
        &self,
        ctx: &RequestContext,
        id: &str,
        changes: PlaceChanges,
    ) -> Result<(place::Model, Option<category::Model>), InternalError> {
        let place = self.place_store.update(self.place_store.db(), id, changes).await?;
        tracing::info!(request_id = %ctx.request_id, place_id = %place.id, "Place edited");
        self.get_place(&place.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::EntityError;
    use crate::test::utils::TestApp;

    fn png(bytes: Vec<u8>) -> MediaFile {
        MediaFile {
            bytes,
            content_type: Some("image/png".to_string()),
        }
    }

    #[tokio::test]
    async fn test_place_is_returned_with_its_category() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());
        let ctx = app.admin_context("root").await;

        let category = catalog
            .create_category(&ctx, "Beaches", Some(png(vec![1])))
            .await
            .unwrap();
        let (place, place_category) = catalog
            .create_place(
                &ctx,
                NewPlace {
                    name: "Tarkwa Bay".to_string(),
                    category_id: category.id.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(place.reviews_count, 0);
        assert_eq!(place_category.map(|c| c.name), Some("Beaches".to_string()));
        assert_eq!(catalog.list_places(PageRequest::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_place_to_missing_category() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());
        let ctx = app.admin_context("root").await;
        let category = catalog.create_category(&ctx, "Beaches", None).await.unwrap();
        let (place, _) = catalog
            .create_place(
                &ctx,
                NewPlace {
                    name: "Tarkwa Bay".to_string(),
                    category_id: category.id,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = catalog
            .update_place(
                &ctx,
                &place.id,
                PlaceChanges {
                    category_id: Some("missing".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(InternalError::Entity(EntityError::ReferenceNotFound { entity: "category", .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_place() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());

        let result = catalog.get_place("missing").await;
        assert!(matches!(result, Err(e) if e.to_string() == "No place found with that ID"));
    }

    #[tokio::test]
    async fn test_category_image_goes_through_blob_store() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());
        let ctx = app.admin_context("root").await;

        let category = catalog
            .create_category(&ctx, "Museums", Some(png(vec![1])))
            .await
            .unwrap();

        let stored = app.blob_store.stored();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].starts_with("categories/"));
        assert_eq!(
            category.image,
            Some(format!("memory://blobs/{}", stored[0]))
        );
    }

    #[tokio::test]
    async fn test_replacing_category_image_cleans_up_previous() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());
        let ctx = app.admin_context("root").await;
        let category = catalog
            .create_category(&ctx, "Museums", Some(png(vec![1])))
            .await
            .unwrap();
        let first_id = app.blob_store.stored()[0].clone();

        let updated = catalog
            .update_category(&ctx, &category.id, png(vec![2]))
            .await
            .unwrap();
        app.data.cleanup_queue.flush().await;

        assert_ne!(updated.image, category.image);
        assert_eq!(app.blob_store.destroyed(), vec![first_id]);
        assert_eq!(app.blob_store.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_category_insert_queues_uploaded_image() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());
        let ctx = app.admin_context("root").await;
        catalog.create_category(&ctx, "Museums", None).await.unwrap();

        let result = catalog
            .create_category(&ctx, "museums", Some(png(vec![1])))
            .await;
        app.data.cleanup_queue.flush().await;

        assert!(matches!(
            result,
            Err(InternalError::Entity(EntityError::Duplicate { entity: "category", .. }))
        ));
        assert!(app.blob_store.stored().is_empty());
        assert_eq!(app.blob_store.destroyed().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_category_queues_uploaded_image() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());
        let ctx = app.admin_context("root").await;

        let result = catalog.update_category(&ctx, "missing", png(vec![1])).await;
        app.data.cleanup_queue.flush().await;

        assert!(matches!(result, Err(InternalError::Entity(EntityError::NotFound { .. }))));
        assert!(app.blob_store.stored().is_empty());
    }

    #[tokio::test]
    async fn test_category_image_must_be_an_image() {
        let app = TestApp::new().await;
        let catalog = CatalogCoordinator::new(app.data.clone());
        let ctx = app.admin_context("root").await;

        let result = catalog
            .create_category(
                &ctx,
                "Museums",
                Some(MediaFile {
                    bytes: vec![1],
                    content_type: Some("text/plain".to_string()),
                }),
            )
            .await;

        assert!(matches!(result, Err(InternalError::Entity(EntityError::Validation(_)))));
        assert!(app.blob_store.stored().is_empty());
        assert!(catalog.list_categories(PageRequest::default()).await.unwrap().is_empty());
    }
}
