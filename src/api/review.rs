use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    ApiResponse, OpenApi, Tags,
    param::{Path, Query},
    payload::Json,
};

use crate::api::helpers::{api_error, authenticate, authorize, read_upload};
use crate::app_data::AppData;
use crate::coordinators::{ReviewCoordinator, ensure_media_count};
use crate::errors::{ApiError, InternalError};
use crate::stores::NewReview;
use crate::types::db::{place, review};
use crate::types::dto::common::{Envelope, NoContentResponse};
use crate::types::dto::review::{
    CreateReviewRequest, ReviewData, ReviewDto, ReviewMediaUpload, ReviewsData,
    UpdateReviewRequest,
};
use crate::types::internal::auth::Role;
use crate::types::internal::pagination::PageRequest;

pub struct ReviewApi {
    app_data: Arc<AppData>,
    reviews: ReviewCoordinator,
}

impl ReviewApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            reviews: ReviewCoordinator::new(app_data.clone()),
            app_data,
        }
    }

    fn review_data(
        &self,
        review: review::Model,
        place: Option<place::Model>,
    ) -> Result<ReviewData, ApiError> {
        let review = ReviewDto::from_model(review, place).map_err(|e| api_error(&self.app_data, e))?;
        Ok(ReviewData { review })
    }

    fn reviews_envelope(
        &self,
        message: &str,
        rows: Vec<(review::Model, Option<place::Model>)>,
    ) -> Result<Json<Envelope<ReviewsData>>, ApiError> {
        let reviews = rows
            .into_iter()
            .map(|(review, place)| ReviewDto::from_model(review, place))
            .collect::<Result<Vec<_>, InternalError>>()
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::list(message, reviews.len(), ReviewsData { reviews })))
    }
}

#[derive(Tags)]
enum ReviewTags {
    Reviews,
}

#[derive(ApiResponse)]
enum CreateReviewResponse {
    #[oai(status = 201)]
    Created(Json<Envelope<ReviewData>>),
}

#[OpenApi]
impl ReviewApi {
    #[oai(path = "/reviews", method = "get", tag = "ReviewTags::Reviews")]
    async fn list(
        &self,
        page: Query<Option<u64>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<Envelope<ReviewsData>>, ApiError> {
        let rows = self
            .reviews
            .list(PageRequest::new(page.0, limit.0))
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        self.reviews_envelope("reviews fetched successfully", rows)
    }

    /// Post a review; the place's review count goes up by one
    #[oai(path = "/reviews", method = "post", tag = "ReviewTags::Reviews")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateReviewRequest>,
    ) -> Result<CreateReviewResponse, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let body = body.0;
        let (review, place) = self
            .reviews
            .create(
                &ctx,
                NewReview {
                    place_id: body.place,
                    title: body.title,
                    description: body.description,
                    author: body.author.unwrap_or_default(),
                },
            )
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(CreateReviewResponse::Created(Json(Envelope::success(
            "Review created successfully",
            self.review_data(review, place)?,
        ))))
    }

    #[oai(path = "/reviews/:id", method = "get", tag = "ReviewTags::Reviews")]
    async fn get(&self, id: Path<String>) -> Result<Json<Envelope<ReviewData>>, ApiError> {
        let (review, place) = self
            .reviews
            .get(&id.0)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Review fetched successfully",
            self.review_data(review, place)?,
        )))
    }

    /// Reviews of one place, newest first
    #[oai(path = "/reviews/places-review/:id", method = "get", tag = "ReviewTags::Reviews")]
    async fn list_for_place(
        &self,
        id: Path<String>,
        page: Query<Option<u64>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<Envelope<ReviewsData>>, ApiError> {
        let rows = self
            .reviews
            .list_for_place(&id.0, PageRequest::new(page.0, limit.0))
            .await
            .map_err(|e| api_error(&self.app_data, e))?
            .into_iter()
            .map(|review| (review, None))
            .collect();
        self.reviews_envelope("reviews for place fetched successfully", rows)
    }

    /// `?increase=true` likes, `?increase=false` unlikes
    #[oai(path = "/reviews/edit-likes/:id", method = "patch", tag = "ReviewTags::Reviews")]
    async fn edit_likes(
        &self,
        req: &Request,
        id: Path<String>,
        increase: Query<Option<bool>>,
    ) -> Result<Json<Envelope<ReviewData>>, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let Some(increase) = increase.0 else {
            return Err(api_error(
                &self.app_data,
                InternalError::validation("Query parameter 'increase' must be true or false"),
            ));
        };
        let review = self
            .reviews
            .adjust_likes(&ctx, &id.0, increase)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Review edited successfully",
            self.review_data(review, None)?,
        )))
    }

    /// Edit title or description
    #[oai(path = "/reviews/:id", method = "patch", tag = "ReviewTags::Reviews")]
    async fn edit(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<UpdateReviewRequest>,
    ) -> Result<Json<Envelope<ReviewData>>, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let body = body.0;
        let review = self
            .reviews
            .edit(&ctx, &id.0, body.title, body.description)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Review edited successfully",
            self.review_data(review, None)?,
        )))
    }

    /// Attach up to four images
    #[oai(path = "/reviews/:id/media", method = "post", tag = "ReviewTags::Reviews")]
    async fn attach_media(
        &self,
        req: &Request,
        id: Path<String>,
        upload: ReviewMediaUpload,
    ) -> Result<Json<Envelope<ReviewData>>, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        ensure_media_count(upload.images.len()).map_err(|e| api_error(&self.app_data, e))?;
        let mut files = Vec::with_capacity(upload.images.len());
        for image in upload.images {
            files.push(read_upload(&self.app_data, image).await?);
        }
        let review = self
            .reviews
            .attach_media(&ctx, &id.0, files)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Review media uploaded successfully",
            self.review_data(review, None)?,
        )))
    }

    /// Admin only; removes the review's comments and queues its media for deletion
    #[oai(path = "/reviews/:id", method = "delete", tag = "ReviewTags::Reviews")]
    async fn delete(&self, req: &Request, id: Path<String>) -> Result<NoContentResponse, ApiError> {
        let ctx = authorize(&self.app_data, req, &[Role::Admin]).await?;
        self.reviews
            .delete(&ctx, &id.0)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(NoContentResponse::NoContent)
    }
}
