use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    ApiResponse, OpenApi, Tags,
    param::{Path, Query},
    payload::Json,
};

use crate::api::helpers::{api_error, authenticate, authorize};
use crate::app_data::AppData;
use crate::coordinators::CommentCoordinator;
use crate::errors::ApiError;
use crate::types::dto::comment::{CommentData, CommentDto, CommentsData, CreateCommentRequest};
use crate::types::dto::common::{Envelope, NoContentResponse};
use crate::types::internal::auth::Role;
use crate::types::internal::pagination::PageRequest;

pub struct CommentApi {
    app_data: Arc<AppData>,
    comments: CommentCoordinator,
}

impl CommentApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            comments: CommentCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum CommentTags {
    Comments,
}

#[derive(ApiResponse)]
enum CreateCommentResponse {
    #[oai(status = 201)]
    Created(Json<Envelope<CommentData>>),
}

#[OpenApi]
impl CommentApi {
    #[oai(path = "/comments/review/:id", method = "get", tag = "CommentTags::Comments")]
    async fn list_for_review(
        &self,
        id: Path<String>,
        page: Query<Option<u64>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<Envelope<CommentsData>>, ApiError> {
        let comments: Vec<CommentDto> = self
            .comments
            .list_for_review(&id.0, PageRequest::new(page.0, limit.0))
            .await
            .map_err(|e| api_error(&self.app_data, e))?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(Json(Envelope::list(
            "comments fetched successfully",
            comments.len(),
            CommentsData { comments },
        )))
    }

    #[oai(path = "/comments", method = "post", tag = "CommentTags::Comments")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateCommentRequest>,
    ) -> Result<CreateCommentResponse, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let body = body.0;
        let comment = self
            .comments
            .create(&ctx, &body.review, &body.text, body.user)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(CreateCommentResponse::Created(Json(Envelope::success(
            "Comment created successfully",
            CommentData {
                comment: comment.into(),
            },
        ))))
    }

    /// Admin only
    #[oai(path = "/comments/:id", method = "delete", tag = "CommentTags::Comments")]
    async fn delete(&self, req: &Request, id: Path<String>) -> Result<NoContentResponse, ApiError> {
        let ctx = authorize(&self.app_data, req, &[Role::Admin]).await?;
        self.comments
            .delete(&ctx, &id.0)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(NoContentResponse::NoContent)
    }
}
