use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::comment::{self, ActiveModel, Entity as Comment};
use crate::types::internal::pagination::PageRequest;

pub struct CommentStore {
    db: DatabaseConnection,
}

impl CommentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list_for_review<C: ConnectionTrait>(
        &self,
        conn: &C,
        review_id: &str,
        page: PageRequest,
    ) -> Result<Vec<comment::Model>, InternalError> {
        Comment::find()
            .filter(comment::Column::ReviewId.eq(review_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .paginate(conn, page.limit)
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_comments", e))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> Result<Option<comment::Model>, InternalError> {
        Comment::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_comment", e))
    }

    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        review_id: &str,
        text: &str,
        user: &str,
    ) -> Result<comment::Model, InternalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InternalError::validation("A comment must have a text"));
        }

        let now = Utc::now().timestamp();
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            text: Set(text.to_string()),
            user: Set(user.trim().to_string()),
            review_id: Set(review_id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_comment", e))
    }

    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> Result<(), InternalError> {
        let result = Comment::delete_by_id(id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_comment", e))?;
        if result.rows_affected == 0 {
            return Err(InternalError::not_found("comment", id));
        }
        Ok(())
    }

    /// Remove every comment attached to a review, returning how many went
    pub async fn delete_for_review<C: ConnectionTrait>(
        &self,
        conn: &C,
        review_id: &str,
    ) -> Result<u64, InternalError> {
        let result = Comment::delete_many()
            .filter(comment::Column::ReviewId.eq(review_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_comments_for_review", e))?;
        Ok(result.rows_affected)
    }
}
