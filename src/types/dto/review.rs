use poem_openapi::{Multipart, Object, types::multipart::Upload};

use crate::errors::InternalError;
use crate::types::db::{decode_list, place, review};
use crate::types::dto::common::to_rfc3339;

#[derive(Object, Debug, Clone)]
pub struct PlaceSummary {
    pub id: String,
    pub name: String,
}

#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: String,
    pub place_id: String,
    #[oai(skip_serializing_if_is_none)]
    pub place: Option<PlaceSummary>,
    pub title: String,
    pub description: String,
    pub author: String,
    pub likes: i64,
    pub media: Vec<String>,
    pub comment_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ReviewDto {
    pub fn from_model(model: review::Model, place: Option<place::Model>) -> Result<Self, InternalError> {
        Ok(Self {
            media: decode_list("media", &model.media)?,
            comment_ids: decode_list("comment_ids", &model.comment_ids)?,
            place: place.map(|p| PlaceSummary { id: p.id, name: p.name }),
            id: model.id,
            place_id: model.place_id,
            title: model.title,
            description: model.description,
            author: model.author,
            likes: model.likes,
            created_at: to_rfc3339(model.created_at),
            updated_at: to_rfc3339(model.updated_at),
        })
    }
}

#[derive(Object, Debug)]
pub struct ReviewData {
    pub review: ReviewDto,
}

#[derive(Object, Debug)]
pub struct ReviewsData {
    pub reviews: Vec<ReviewDto>,
}

#[derive(Object, Debug)]
pub struct CreateReviewRequest {
    /// Place id
    pub place: String,
    pub title: String,
    pub description: String,
    pub author: Option<String>,
}

/// Only title and description are editable
#[derive(Object, Debug, Default)]
pub struct UpdateReviewRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Multipart)]
pub struct ReviewMediaUpload {
    pub images: Vec<Upload>,
}
