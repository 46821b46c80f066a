use axum::extract::{Path, State};
use foodwatch_core::domain::proposal::{ports::ProposalService, value_objects::ProposalView};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GetProposalResponse {
    pub data: ProposalView,
}

#[utoipa::path(
    get,
    path = "/{proposal_id}",
    tag = "proposal",
    summary = "Get proposal",
    params(
        ("proposal_id" = Uuid, Path, description = "Proposal id"),
    ),
    responses(
        (status = 200, body = GetProposalResponse),
        (status = 404, description = "Proposal not found"),
    )
)]
pub async fn get_proposal(
    Path(proposal_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Response<GetProposalResponse>, ApiError> {
    let view = state
        .service
        .get_proposal(proposal_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(GetProposalResponse { data: view }))
}
