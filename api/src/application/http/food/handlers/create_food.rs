use axum::extract::State;
use foodwatch_core::domain::catalog::{
    entities::Food, ports::CatalogService, value_objects::CreateFoodInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::auth::RequiredIdentity;
use crate::application::http::food::validators::CreateFoodValidator;
use crate::application::http::server::api_entities::api_error::{ApiError, ValidateJson};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateFoodResponse {
    pub data: Food,
}

#[utoipa::path(
    post,
    path = "",
    tag = "food",
    summary = "Create food",
    description = "Adds an unpublished food. It becomes visible once enough supervisors approve it; a supervisor's own submission counts as the first approval.",
    request_body = CreateFoodValidator,
    responses(
        (status = 201, body = CreateFoodResponse),
        (status = 400, description = "Invalid fields or unknown ingredient"),
        (status = 404, description = "Restaurant not found"),
        (status = 409, description = "The restaurant already lists a food with this name"),
    )
)]
pub async fn create_food(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<CreateFoodValidator>,
) -> Result<Response<CreateFoodResponse>, ApiError> {
    let food = state
        .service
        .create_food(
            identity,
            CreateFoodInput {
                restaurant_id: payload.restaurant_id,
                name: payload.name,
                macro_table: payload.macro_table,
                serving_size: payload.serving_size,
                is_organic: payload.is_organic,
                is_gluten_free: payload.is_gluten_free,
                is_alcohol_free: payload.is_alcohol_free,
                is_lactose_free: payload.is_lactose_free,
                image: payload.image,
                ingredient_ids: payload.ingredient_ids,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Response::Created(CreateFoodResponse { data: food }))
}
