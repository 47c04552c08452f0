use poem_openapi::Object;

use crate::types::db::comment;
use crate::types::dto::common::to_rfc3339;

#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    pub text: String,
    pub user: String,
    pub review_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<comment::Model> for CommentDto {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            user: model.user,
            review_id: model.review_id,
            created_at: to_rfc3339(model.created_at),
            updated_at: to_rfc3339(model.updated_at),
        }
    }
}

#[derive(Object, Debug)]
pub struct CommentData {
    pub comment: CommentDto,
}

#[derive(Object, Debug)]
pub struct CommentsData {
    pub comments: Vec<CommentDto>,
}

#[derive(Object, Debug)]
pub struct CreateCommentRequest {
    pub text: String,
    /// Review id
    pub review: String,
    pub user: Option<String>,
}
