use axum::extract::State;
use foodwatch_core::domain::catalog::{
    entities::Ingredient, ports::CatalogService, value_objects::CreateIngredientInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::auth::RequiredIdentity;
use crate::application::http::ingredient::validators::CreateIngredientValidator;
use crate::application::http::server::api_entities::api_error::{ApiError, ValidateJson};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateIngredientResponse {
    pub data: Ingredient,
}

#[utoipa::path(
    post,
    path = "",
    tag = "ingredient",
    summary = "Create ingredient",
    request_body = CreateIngredientValidator,
    responses(
        (status = 201, body = CreateIngredientResponse),
        (status = 403, description = "Caller is not a supervisor"),
        (status = 409, description = "An ingredient with this name already exists"),
    )
)]
pub async fn create_ingredient(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<CreateIngredientValidator>,
) -> Result<Response<CreateIngredientResponse>, ApiError> {
    let ingredient = state
        .service
        .create_ingredient(
            identity,
            CreateIngredientInput {
                name: payload.name,
                description: payload.description,
                hazard_level: payload.hazard_level,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Response::Created(CreateIngredientResponse { data: ingredient }))
}
