use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

use super::handlers::create_restaurant::{__path_create_restaurant, create_restaurant};
use super::handlers::get_restaurant::{__path_get_restaurant, get_restaurant};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_restaurant, create_restaurant))]
pub struct RestaurantApiDoc;

pub fn restaurant_routes(state: AppState) -> Router<AppState> {
    let root_path = &state.args.server.root_path;

    Router::new()
        .route(&format!("{root_path}/restaurants"), post(create_restaurant))
        .route(
            &format!("{root_path}/restaurants/{{restaurant_id}}"),
            get(get_restaurant),
        )
}
