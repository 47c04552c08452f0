use poem_openapi::{Multipart, Object, types::multipart::Upload};

use crate::types::db::category;
use crate::types::dto::common::to_rfc3339;

#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    #[oai(skip_serializing_if_is_none)]
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<category::Model> for CategoryDto {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image: model.image,
            created_at: to_rfc3339(model.created_at),
            updated_at: to_rfc3339(model.updated_at),
        }
    }
}

#[derive(Object, Debug)]
pub struct CategoryData {
    pub category: CategoryDto,
}

#[derive(Object, Debug)]
pub struct CategoriesData {
    pub categories: Vec<CategoryDto>,
}

/// Multipart form; `image` is optional
#[derive(Multipart, Debug)]
pub struct CreateCategoryForm {
    pub name: String,
    pub image: Option<Upload>,
}

/// Only the image of a category is editable
#[derive(Multipart, Debug)]
pub struct UpdateCategoryForm {
    pub image: Upload,
}
