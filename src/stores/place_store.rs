use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::database::is_unique_violation;
use crate::types::db::place::{self, ActiveModel, Entity as Place};
use crate::types::db::{category, name_key};
use crate::types::internal::pagination::PageRequest;

#[derive(Debug, Clone, Default)]
pub struct NewPlace {
    pub name: String,
    pub category_id: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Editable place fields; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct PlaceChanges {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Persistence for places and their denormalized review counter
pub struct PlaceStore {
    db: DatabaseConnection,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PlaceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Newest first, each with its category when it still exists
    pub async fn list<C: ConnectionTrait>(
        &self,
        conn: &C,
        page: PageRequest,
    ) -> Result<Vec<(place::Model, Option<category::Model>)>, InternalError> {
        Place::find()
            .find_also_related(category::Entity)
            .order_by_desc(place::Column::CreatedAt)
            .order_by_asc(place::Column::Name)
            .paginate(conn, page.limit)
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_places", e))
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> Result<Option<place::Model>, InternalError> {
        Place::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_place", e))
    }

    pub async fn find_with_category<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> Result<Option<(place::Model, Option<category::Model>)>, InternalError> {
        Place::find_by_id(id.to_string())
            .find_also_related(category::Entity)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_place_with_category", e))
    }

    async fn ensure_category_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        category_id: &str,
    ) -> Result<(), InternalError> {
        let found = category::Entity::find_by_id(category_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_category", e))?;
        match found {
            Some(_) => Ok(()),
            None => Err(InternalError::reference_not_found("category", category_id)),
        }
    }

    async fn ensure_name_available<C: ConnectionTrait>(
        &self,
        conn: &C,
        key: &str,
        except_id: Option<&str>,
    ) -> Result<(), InternalError> {
        let existing = Place::find()
            .filter(place::Column::NameKey.eq(key))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_place_by_name", e))?;
        match existing {
            Some(found) if Some(found.id.as_str()) != except_id => {
                Err(InternalError::duplicate("place", "name"))
            }
            _ => Ok(()),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        new_place: NewPlace,
    ) -> Result<place::Model, InternalError> {
        let name = new_place.name.trim().to_string();
        if name.is_empty() {
            return Err(InternalError::validation("Place name is required"));
        }
        if new_place.category_id.trim().is_empty() {
            return Err(InternalError::validation("Place category is required"));
        }
        let key = name_key(&name);

        self.ensure_name_available(conn, &key, None).await?;
        self.ensure_category_exists(conn, &new_place.category_id).await?;

        let now = Utc::now().timestamp();
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
            name_key: Set(key),
            category_id: Set(new_place.category_id),
            address: Set(non_blank(new_place.address)),
            phone: Set(non_blank(new_place.phone)),
            email: Set(non_blank(new_place.email)),
            reviews_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                InternalError::duplicate("place", "name")
            } else {
                InternalError::database("insert_place", e)
            }
        })
    }

    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        changes: PlaceChanges,
    ) -> Result<place::Model, InternalError> {
        let place = self
            .find_by_id(conn, id)
            .await?
            .ok_or_else(|| InternalError::not_found("place", id))?;

        let mut active = place.into_active_model();

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(InternalError::validation("Place name is required"));
            }
            let key = name_key(&name);
            self.ensure_name_available(conn, &key, Some(id)).await?;
            active.name = Set(name);
            active.name_key = Set(key);
        }
        if let Some(category_id) = changes.category_id {
            self.ensure_category_exists(conn, &category_id).await?;
            active.category_id = Set(category_id);
        }
        if changes.address.is_some() {
            active.address = Set(non_blank(changes.address));
        }
        if changes.phone.is_some() {
            active.phone = Set(non_blank(changes.phone));
        }
        if changes.email.is_some() {
            active.email = Set(non_blank(changes.email));
        }
        active.updated_at = Set(Utc::now().timestamp());

        active.update(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                InternalError::duplicate("place", "name")
            } else {
                InternalError::database("update_place", e)
            }
        })
    }

    /// `reviews_count = reviews_count + 1`, evaluated by the database
    ///
    /// Returns the number of rows touched; zero means the place is gone.
    pub async fn increment_reviews_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        place_id: &str,
    ) -> Result<u64, InternalError> {
        let result = Place::update_many()
            .col_expr(place::Column::ReviewsCount, Expr::col(place::Column::ReviewsCount).add(1))
            .filter(place::Column::Id.eq(place_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("increment_reviews_count", e))?;
        Ok(result.rows_affected)
    }

    /// `reviews_count = reviews_count - 1`, never going below zero
    pub async fn decrement_reviews_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        place_id: &str,
    ) -> Result<u64, InternalError> {
        let result = Place::update_many()
            .col_expr(place::Column::ReviewsCount, Expr::col(place::Column::ReviewsCount).sub(1))
            .filter(place::Column::Id.eq(place_id))
            .filter(place::Column::ReviewsCount.gt(0))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("decrement_reviews_count", e))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::EntityError;
    use crate::stores::CategoryStore;
    use crate::test::utils::setup_test_db;

    async fn setup() -> (DatabaseConnection, PlaceStore, String) {
        let db = setup_test_db().await;
        let category = CategoryStore::new(db.clone())
            .create(&db, "Parks", None)
            .await
            .unwrap();
        (db.clone(), PlaceStore::new(db), category.id)
    }

    fn new_place(name: &str, category_id: &str) -> NewPlace {
        NewPlace {
            name: name.to_string(),
            category_id: category_id.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_category() {
        let (db, store, _category_id) = setup().await;

        let result = store.create(&db, new_place("Central Park", "missing")).await;
        assert!(matches!(
            result,
            Err(InternalError::Entity(EntityError::ReferenceNotFound { entity: "category", .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let (db, store, category_id) = setup().await;
        store.create(&db, new_place("Central Park", &category_id)).await.unwrap();

        let result = store.create(&db, new_place("CENTRAL PARK", &category_id)).await;
        assert!(matches!(result, Err(InternalError::Entity(EntityError::Duplicate { .. }))));
    }

    #[tokio::test]
    async fn test_counter_is_floored_at_zero() {
        let (db, store, category_id) = setup().await;
        let place = store.create(&db, new_place("Central Park", &category_id)).await.unwrap();

        assert_eq!(store.increment_reviews_count(&db, &place.id).await.unwrap(), 1);
        assert_eq!(store.decrement_reviews_count(&db, &place.id).await.unwrap(), 1);
        assert_eq!(store.decrement_reviews_count(&db, &place.id).await.unwrap(), 0);

        let reloaded = store.find_by_id(&db, &place.id).await.unwrap().unwrap();
        assert_eq!(reloaded.reviews_count, 0);
    }

    #[tokio::test]
    async fn test_increment_on_missing_place_touches_nothing() {
        let (db, store, _category_id) = setup().await;
        assert_eq!(store.increment_reviews_count(&db, "missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_own_name() {
        let (db, store, category_id) = setup().await;
        let place = store.create(&db, new_place("Central Park", &category_id)).await.unwrap();

        let updated = store
            .update(
                &db,
                &place.id,
                PlaceChanges {
                    name: Some("central park".to_string()),
                    phone: Some("+1 555 0100".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "central park");
        assert_eq!(updated.phone.as_deref(), Some("+1 555 0100"));
    }
}
