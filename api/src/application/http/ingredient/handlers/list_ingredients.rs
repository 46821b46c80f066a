use axum::extract::State;
use foodwatch_core::domain::catalog::{entities::Ingredient, ports::CatalogService};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ListIngredientsResponse {
    pub data: Vec<Ingredient>,
}

#[utoipa::path(
    get,
    path = "",
    tag = "ingredient",
    summary = "List ingredients",
    responses(
        (status = 200, body = ListIngredientsResponse)
    )
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Response<ListIngredientsResponse>, ApiError> {
    let ingredients = state
        .service
        .list_ingredients()
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(ListIngredientsResponse { data: ingredients }))
}
