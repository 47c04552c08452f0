use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::review::{self, ActiveModel, Entity as Review};
use crate::types::db::{decode_list, encode_list, place};
use crate::types::internal::pagination::PageRequest;

#[derive(Debug, Clone)]
pub struct NewReview {
    pub place_id: String,
    pub title: String,
    pub description: String,
    pub author: String,
}

/// Persistence for reviews, their media list and their comment id list
pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list<C: ConnectionTrait>(
        &self,
        conn: &C,
        page: PageRequest,
    ) -> Result<Vec<(review::Model, Option<place::Model>)>, InternalError> {
        Review::find()
            .find_also_related(place::Entity)
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .paginate(conn, page.limit)
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_reviews", e))
    }

    pub async fn list_for_place<C: ConnectionTrait>(
        &self,
        conn: &C,
        place_id: &str,
        page: PageRequest,
    ) -> Result<Vec<review::Model>, InternalError> {
        Review::find()
            .filter(review::Column::PlaceId.eq(place_id))
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .paginate(conn, page.limit)
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_reviews_for_place", e))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> Result<Option<review::Model>, InternalError> {
        Review::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_review", e))
    }

    pub async fn find_with_place<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> Result<Option<(review::Model, Option<place::Model>)>, InternalError> {
        Review::find_by_id(id.to_string())
            .find_also_related(place::Entity)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_review_with_place", e))
    }

    async fn require<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> Result<review::Model, InternalError> {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| InternalError::not_found("review", id))
    }

    /// Insert the review row only; the place counter is the caller's concern
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        new_review: NewReview,
    ) -> Result<review::Model, InternalError> {
        let title = new_review.title.trim().to_string();
        let description = new_review.description.trim().to_string();
        if title.is_empty() {
            return Err(InternalError::validation("A review must have a title"));
        }
        if description.is_empty() {
            return Err(InternalError::validation("A review must have a description"));
        }

        let now = Utc::now().timestamp();
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            place_id: Set(new_review.place_id),
            title: Set(title),
            description: Set(description),
            author: Set(new_review.author.trim().to_string()),
            likes: Set(0),
            media: Set("[]".to_string()),
            comment_ids: Set("[]".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_review", e))
    }

    pub async fn update_details<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<review::Model, InternalError> {
        let review = self.require(conn, id).await?;
        let mut active = review.into_active_model();

        if let Some(title) = title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(InternalError::validation("A review must have a title"));
            }
            active.title = Set(title);
        }
        if let Some(description) = description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(InternalError::validation("A review must have a description"));
            }
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_review", e))
    }

    /// Apply `likes = likes + delta` in the database; the result may be negative
    pub async fn adjust_likes<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        delta: i64,
    ) -> Result<review::Model, InternalError> {
        let result = Review::update_many()
            .col_expr(review::Column::Likes, Expr::col(review::Column::Likes).add(delta))
            .filter(review::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("adjust_likes", e))?;

        if result.rows_affected == 0 {
            return Err(InternalError::not_found("review", id));
        }
        self.require(conn, id).await
    }

    /// Append media URLs to the review's media list, preserving order
    pub async fn append_media<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        urls: &[String],
    ) -> Result<review::Model, InternalError> {
        let review = self.require(conn, id).await?;
        let mut media = decode_list("media", &review.media)?;
        media.extend(urls.iter().cloned());

        let mut active = review.into_active_model();
        active.media = Set(encode_list("media", &media)?);
        active.updated_at = Set(Utc::now().timestamp());
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("append_review_media", e))
    }

    pub async fn append_comment_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        comment_id: &str,
    ) -> Result<review::Model, InternalError> {
        let review = self.require(conn, id).await?;
        let mut comment_ids = decode_list("comment_ids", &review.comment_ids)?;
        comment_ids.push(comment_id.to_string());

        let mut active = review.into_active_model();
        active.comment_ids = Set(encode_list("comment_ids", &comment_ids)?);
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("append_comment_id", e))
    }

    /// Remove a comment id from the list; a missing review is not an error
    pub async fn remove_comment_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        comment_id: &str,
    ) -> Result<(), InternalError> {
        let Some(review) = self.find_by_id(conn, id).await? else {
            return Ok(());
        };
        let mut comment_ids = decode_list("comment_ids", &review.comment_ids)?;
        let before = comment_ids.len();
        comment_ids.retain(|c| c != comment_id);
        if comment_ids.len() == before {
            return Ok(());
        }

        let mut active = review.into_active_model();
        active.comment_ids = Set(encode_list("comment_ids", &comment_ids)?);
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("remove_comment_id", e))?;
        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> Result<(), InternalError> {
        let result = Review::delete_by_id(id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_review", e))?;
        if result.rows_affected == 0 {
            return Err(InternalError::not_found("review", id));
        }
        Ok(())
    }
}
