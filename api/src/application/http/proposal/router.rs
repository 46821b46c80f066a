use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

use super::handlers::cast_vote::{__path_cast_vote, cast_vote};
use super::handlers::get_proposal::{__path_get_proposal, get_proposal};
use super::handlers::list_pending::{__path_list_pending, list_pending};
use super::handlers::submit_change::{__path_submit_change, submit_change};
use super::handlers::submit_removal::{__path_submit_removal, submit_removal};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_pending, get_proposal, cast_vote))]
pub struct ProposalApiDoc;

#[derive(OpenApi)]
#[openapi(paths(submit_change, submit_removal))]
pub struct FoodProposalApiDoc;

pub fn proposal_routes(state: AppState) -> Router<AppState> {
    let root_path = &state.args.server.root_path;

    Router::new()
        .route(&format!("{root_path}/proposals"), get(list_pending))
        .route(
            &format!("{root_path}/proposals/{{proposal_id}}"),
            get(get_proposal),
        )
        .route(
            &format!("{root_path}/proposals/{{proposal_id}}/votes"),
            post(cast_vote),
        )
        .route(
            &format!("{root_path}/foods/{{food_id}}/proposals"),
            post(submit_change),
        )
        .route(
            &format!("{root_path}/foods/{{food_id}}/removals"),
            post(submit_removal),
        )
}
