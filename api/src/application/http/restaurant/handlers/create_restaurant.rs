use axum::extract::State;
use foodwatch_core::domain::catalog::{
    entities::Restaurant, ports::CatalogService, value_objects::CreateRestaurantInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::auth::RequiredIdentity;
use crate::application::http::restaurant::validators::CreateRestaurantValidator;
use crate::application::http::server::api_entities::api_error::{ApiError, ValidateJson};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateRestaurantResponse {
    pub data: Restaurant,
}

#[utoipa::path(
    post,
    path = "",
    tag = "restaurant",
    summary = "Create restaurant",
    request_body = CreateRestaurantValidator,
    responses(
        (status = 201, body = CreateRestaurantResponse),
        (status = 403, description = "Caller is not a supervisor"),
        (status = 409, description = "A restaurant with this name already exists"),
    )
)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<CreateRestaurantValidator>,
) -> Result<Response<CreateRestaurantResponse>, ApiError> {
    let restaurant = state
        .service
        .create_restaurant(
            identity,
            CreateRestaurantInput {
                name: payload.name,
                cuisine: payload.cuisine,
                description: payload.description,
                image: payload.image,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Response::Created(CreateRestaurantResponse { data: restaurant }))
}
