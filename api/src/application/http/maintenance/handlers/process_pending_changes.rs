use axum::extract::State;
use foodwatch_core::domain::approval::{
    ports::ApprovalService, value_objects::PendingChangesReport,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::auth::RequiredIdentity;
use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProcessPendingChangesResponse {
    pub data: PendingChangesReport,
}

#[utoipa::path(
    post,
    path = "/pending-changes",
    tag = "maintenance",
    summary = "Apply proposals at quorum",
    description = "Applies pending proposals whose vote count already meets the configured quorum, e.g. after the quorum was lowered.",
    responses(
        (status = 200, body = ProcessPendingChangesResponse),
        (status = 403, description = "Caller is not a supervisor"),
    )
)]
pub async fn process_pending_changes(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
) -> Result<Response<ProcessPendingChangesResponse>, ApiError> {
    let report = state
        .service
        .process_pending_changes(identity)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(ProcessPendingChangesResponse { data: report }))
}
