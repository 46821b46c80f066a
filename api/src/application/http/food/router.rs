use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

use super::handlers::approve_food::{__path_approve_food, approve_food};
use super::handlers::create_food::{__path_create_food, create_food};
use super::handlers::get_food::{__path_get_food, get_food};
use super::handlers::list_approvable::{__path_list_approvable, list_approvable};
use super::handlers::list_foods::{__path_list_foods, list_foods};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_foods, get_food, create_food, approve_food, list_approvable))]
pub struct FoodApiDoc;

pub fn food_routes(state: AppState) -> Router<AppState> {
    let root_path = &state.args.server.root_path;

    Router::new()
        .route(
            &format!("{root_path}/foods"),
            get(list_foods).post(create_food),
        )
        .route(&format!("{root_path}/foods/approvable"), get(list_approvable))
        .route(&format!("{root_path}/foods/{{food_id}}"), get(get_food))
        .route(
            &format!("{root_path}/foods/{{food_id}}/approvals"),
            post(approve_food),
        )
}
