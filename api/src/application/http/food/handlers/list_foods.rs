use axum::extract::{Query, State};
use foodwatch_core::domain::catalog::{
    entities::Food, ports::CatalogService, value_objects::FoodFilter,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFoodsQuery {
    pub restaurant_id: Option<Uuid>,
    /// Defaults to published foods only.
    pub is_approved: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ListFoodsResponse {
    pub data: Vec<Food>,
}

#[utoipa::path(
    get,
    path = "",
    tag = "food",
    summary = "List foods",
    params(ListFoodsQuery),
    responses(
        (status = 200, body = ListFoodsResponse)
    )
)]
pub async fn list_foods(
    Query(query): Query<ListFoodsQuery>,
    State(state): State<AppState>,
) -> Result<Response<ListFoodsResponse>, ApiError> {
    let foods = state
        .service
        .list_foods(FoodFilter {
            restaurant_id: query.restaurant_id,
            is_approved: Some(query.is_approved.unwrap_or(true)),
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(ListFoodsResponse { data: foods }))
}
