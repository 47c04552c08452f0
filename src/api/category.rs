use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    ApiResponse, OpenApi, Tags,
    param::{Path, Query},
    payload::Json,
};

use crate::api::helpers::{api_error, authorize, read_upload};
use crate::app_data::AppData;
use crate::coordinators::CatalogCoordinator;
use crate::errors::ApiError;
use crate::types::dto::category::{
    CategoriesData, CategoryData, CategoryDto, CreateCategoryForm, UpdateCategoryForm,
};
use crate::types::dto::common::Envelope;
use crate::types::internal::auth::Role;
use crate::types::internal::pagination::PageRequest;

pub struct CategoryApi {
    app_data: Arc<AppData>,
    catalog: CatalogCoordinator,
}

impl CategoryApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            catalog: CatalogCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum CategoryTags {
    Categories,
}

#[derive(ApiResponse)]
enum CreateCategoryResponse {
    #[oai(status = 201)]
    Created(Json<Envelope<CategoryData>>),
}

#[OpenApi]
impl CategoryApi {
    #[oai(path = "/category", method = "get", tag = "CategoryTags::Categories")]
    async fn list(
        &self,
        page: Query<Option<u64>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<Envelope<CategoriesData>>, ApiError> {
        let categories = self
            .catalog
            .list_categories(PageRequest::new(page.0, limit.0))
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        let categories: Vec<CategoryDto> = categories.into_iter().map(Into::into).collect();
        Ok(Json(Envelope::list(
            "categories fetched successfully",
            categories.len(),
            CategoriesData { categories },
        )))
    }

    /// Admin only; multipart with `name` and an optional `image`
    #[oai(path = "/category", method = "post", tag = "CategoryTags::Categories")]
    async fn create(
        &self,
        req: &Request,
        form: CreateCategoryForm,
    ) -> Result<CreateCategoryResponse, ApiError> {
        let ctx = authorize(&self.app_data, req, &[Role::Admin]).await?;
        let image = match form.image {
            Some(upload) => Some(read_upload(&self.app_data, upload).await?),
            None => None,
        };
        let category = self
            .catalog
            .create_category(&ctx, &form.name, image)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(CreateCategoryResponse::Created(Json(Envelope::success(
            "Category created successfully",
            CategoryData {
                category: category.into(),
            },
        ))))
    }

    /// Admin only; the image is the only editable field
    #[oai(path = "/category/:id", method = "patch", tag = "CategoryTags::Categories")]
    async fn update(
        &self,
        req: &Request,
        id: Path<String>,
        form: UpdateCategoryForm,
    ) -> Result<Json<Envelope<CategoryData>>, ApiError> {
        let ctx = authorize(&self.app_data, req, &[Role::Admin]).await?;
        let image = read_upload(&self.app_data, form.image).await?;
        let category = self
            .catalog
            .update_category(&ctx, &id.0, image)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Category edited successfully",
            CategoryData {
                category: category.into(),
            },
        )))
    }
}
