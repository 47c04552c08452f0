use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::database::is_unique_violation;
use crate::types::db::category::{self, ActiveModel, Entity as Category};
use crate::types::db::name_key;
use crate::types::internal::pagination::PageRequest;

/// Persistence for place categories
pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
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
    ) -> Result<Vec<category::Model>, InternalError> {
        Category::find()
            .order_by_desc(category::Column::CreatedAt)
            .order_by_asc(category::Column::Name)
            .paginate(conn, page.limit)
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_categories", e))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> Result<Option<category::Model>, InternalError> {
        Category::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_category", e))
    }

    /// Insert a category; names are unique ignoring case and surrounding whitespace
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        name: &str,
        image: Option<String>,
    ) -> Result<category::Model, InternalError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InternalError::validation("Category name is required"));
        }
        let key = name_key(name);

        let existing = Category::find()
            .filter(category::Column::NameKey.eq(key.clone()))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_category_by_name", e))?;
        if existing.is_some() {
            return Err(InternalError::duplicate("category", "name"));
        }

        let now = Utc::now().timestamp();
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            name_key: Set(key),
            image: Set(image.filter(|i| !i.trim().is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                InternalError::duplicate("category", "name")
            } else {
                InternalError::database("insert_category", e)
            }
        })
    }

    /// Point the category at a new image, returning the updated row and the
    /// URL it replaced
    pub async fn set_image<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        image_url: String,
    ) -> Result<(category::Model, Option<String>), InternalError> {
        let category = self
            .find_by_id(conn, id)
            .await?
            .ok_or_else(|| InternalError::not_found("category", id))?;
        let previous = category.image.clone();

        let mut active = category.into_active_model();
        active.image = Set(Some(image_url));
        active.updated_at = Set(Utc::now().timestamp());

        let updated = active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_category_image", e))?;
        Ok((updated, previous))
    }
}
