use axum::{Router, routing::get};
use utoipa::OpenApi;

use super::handlers::create_ingredient::{__path_create_ingredient, create_ingredient};
use super::handlers::list_ingredients::{__path_list_ingredients, list_ingredients};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_ingredients, create_ingredient))]
pub struct IngredientApiDoc;

pub fn ingredient_routes(state: AppState) -> Router<AppState> {
    Router::new().route(
        &format!("{}/ingredients", state.args.server.root_path),
        get(list_ingredients).post(create_ingredient),
    )
}
