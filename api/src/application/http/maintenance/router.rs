use axum::{Router, routing::post};
use utoipa::OpenApi;

use super::handlers::process_pending_changes::{
    __path_process_pending_changes, process_pending_changes,
};
use super::handlers::recalculate_hazards::{__path_recalculate_hazards, recalculate_hazards};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(recalculate_hazards, process_pending_changes))]
pub struct MaintenanceApiDoc;

pub fn maintenance_routes(state: AppState) -> Router<AppState> {
    let root_path = &state.args.server.root_path;

    Router::new()
        .route(
            &format!("{root_path}/maintenance/hazards"),
            post(recalculate_hazards),
        )
        .route(
            &format!("{root_path}/maintenance/pending-changes"),
            post(process_pending_changes),
        )
}
