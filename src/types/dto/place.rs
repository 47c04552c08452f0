use poem_openapi::Object;

use crate::types::db::{category, place};
use crate::types::dto::common::to_rfc3339;

#[derive(Object, Debug, Clone)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    #[oai(skip_serializing_if_is_none)]
    pub image: Option<String>,
}

#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct PlaceDto {
    pub id: String,
    pub name: String,
    pub category_id: String,
    #[oai(skip_serializing_if_is_none)]
    pub category: Option<CategorySummary>,
    #[oai(skip_serializing_if_is_none)]
    pub address: Option<String>,
    #[oai(skip_serializing_if_is_none)]
    pub phone: Option<String>,
    #[oai(skip_serializing_if_is_none)]
    pub email: Option<String>,
    pub reviews_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PlaceDto {
    pub fn with_category(model: place::Model, category: Option<category::Model>) -> Self {
        Self {
            category: category.map(|c| CategorySummary {
                id: c.id,
                name: c.name,
                image: c.image,
            }),
            ..Self::from(model)
        }
    }
}

impl From<place::Model> for PlaceDto {
    fn from(model: place::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category_id: model.category_id,
            category: None,
            address: model.address,
            phone: model.phone,
            email: model.email,
            reviews_count: model.reviews_count,
            created_at: to_rfc3339(model.created_at),
            updated_at: to_rfc3339(model.updated_at),
        }
    }
}

#[derive(Object, Debug)]
pub struct PlaceData {
    pub place: PlaceDto,
}

#[derive(Object, Debug)]
pub struct PlacesData {
    pub places: Vec<PlaceDto>,
}

#[derive(Object, Debug)]
pub struct CreatePlaceRequest {
    pub name: String,
    /// Category id
    pub category: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Object, Debug, Default)]
pub struct UpdatePlaceRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
