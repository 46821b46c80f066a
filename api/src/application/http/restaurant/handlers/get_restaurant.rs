use axum::extract::{Path, Query, State};
use foodwatch_core::domain::catalog::{
    entities::{Food, Restaurant},
    ports::CatalogService,
    value_objects::FoodFilter,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetRestaurantQuery {
    /// Embed the restaurant's published foods.
    pub include_foods: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foods: Option<Vec<Food>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GetRestaurantResponse {
    pub data: RestaurantDetail,
}

#[utoipa::path(
    get,
    path = "/{restaurant_id}",
    tag = "restaurant",
    summary = "Get restaurant",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant id"),
        GetRestaurantQuery
    ),
    responses(
        (status = 200, body = GetRestaurantResponse),
        (status = 404, description = "Restaurant not found"),
    )
)]
pub async fn get_restaurant(
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<GetRestaurantQuery>,
    State(state): State<AppState>,
) -> Result<Response<GetRestaurantResponse>, ApiError> {
    let restaurant = state
        .service
        .get_restaurant(restaurant_id)
        .await
        .map_err(ApiError::from)?;

    let foods = if query.include_foods.unwrap_or(false) {
        let foods = state
            .service
            .list_foods(FoodFilter {
                restaurant_id: Some(restaurant_id),
                is_approved: Some(true),
            })
            .await
            .map_err(ApiError::from)?;
        Some(foods)
    } else {
        None
    };

    Ok(Response::OK(GetRestaurantResponse {
        data: RestaurantDetail { restaurant, foods },
    }))
}
