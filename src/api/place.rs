use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    ApiResponse, OpenApi, Tags,
    param::{Path, Query},
    payload::Json,
};

use crate::api::helpers::{api_error, authorize};
use crate::app_data::AppData;
use crate::coordinators::CatalogCoordinator;
use crate::errors::ApiError;
use crate::stores::{NewPlace, PlaceChanges};
use crate::types::dto::common::Envelope;
use crate::types::dto::place::{
    CreatePlaceRequest, PlaceData, PlaceDto, PlacesData, UpdatePlaceRequest,
};
use crate::types::internal::auth::Role;
use crate::types::internal::pagination::PageRequest;

pub struct PlaceApi {
    app_data: Arc<AppData>,
    catalog: CatalogCoordinator,
}

impl PlaceApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            catalog: CatalogCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum PlaceTags {
    Places,
}

#[derive(ApiResponse)]
enum CreatePlaceResponse {
    #[oai(status = 201)]
    Created(Json<Envelope<PlaceData>>),
}

#[OpenApi]
impl PlaceApi {
    #[oai(path = "/places", method = "get", tag = "PlaceTags::Places")]
    async fn list(
        &self,
        page: Query<Option<u64>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<Envelope<PlacesData>>, ApiError> {
        let places: Vec<PlaceDto> = self
            .catalog
            .list_places(PageRequest::new(page.0, limit.0))
            .await
            .map_err(|e| api_error(&self.app_data, e))?
            .into_iter()
            .map(|(place, category)| PlaceDto::with_category(place, category))
            .collect();
        Ok(Json(Envelope::list(
            "places fetched successfully",
            places.len(),
            PlacesData { places },
        )))
    }

    /// Admin only
    #[oai(path = "/places", method = "post", tag = "PlaceTags::Places")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreatePlaceRequest>,
    ) -> Result<CreatePlaceResponse, ApiError> {
        let ctx = authorize(&self.app_data, req, &[Role::Admin]).await?;
        let body = body.0;
        let (place, category) = self
            .catalog
            .create_place(
                &ctx,
                NewPlace {
                    name: body.name,
                    category_id: body.category,
                    address: body.address,
                    phone: body.phone,
                    email: body.email,
                },
            )
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(CreatePlaceResponse::Created(Json(Envelope::success(
            "Place created successfully",
            PlaceData {
                place: PlaceDto::with_category(place, category),
            },
        ))))
    }

    #[oai(path = "/places/:id", method = "get", tag = "PlaceTags::Places")]
    async fn get(&self, id: Path<String>) -> Result<Json<Envelope<PlaceData>>, ApiError> {
        let (place, category) = self
            .catalog
            .get_place(&id.0)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Place fetched successfully",
            PlaceData {
                place: PlaceDto::with_category(place, category),
            },
        )))
    }

    /// Admin only
    #[oai(path = "/places/:id", method = "patch", tag = "PlaceTags::Places")]
    async fn update(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<UpdatePlaceRequest>,
    ) -> Result<Json<Envelope<PlaceData>>, ApiError> {
        let ctx = authorize(&self.app_data, req, &[Role::Admin]).await?;
        let body = body.0;
        let (place, category) = self
            .catalog
            .update_place(
                &ctx,
                &id.0,
                PlaceChanges {
                    name: body.name,
                    category_id: body.category,
                    address: body.address,
                    phone: body.phone,
                    email: body.email,
                },
            )
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Place edited successfully",
            PlaceData {
                place: PlaceDto::with_category(place, category),
            },
        )))
    }
}
