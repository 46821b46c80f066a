use axum::extract::{Path, State};
use foodwatch_core::domain::approval::{ports::ApprovalService, value_objects::VoteResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::auth::RequiredIdentity;
use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CastVoteResponse {
    pub data: VoteResult,
}

#[utoipa::path(
    post,
    path = "/{proposal_id}/votes",
    tag = "proposal",
    summary = "Vote for a proposal",
    description = "Records the calling supervisor's approval. The vote that reaches quorum applies the proposal to the catalog in the same transaction.",
    params(
        ("proposal_id" = Uuid, Path, description = "Proposal id"),
    ),
    responses(
        (status = 200, body = CastVoteResponse),
        (status = 403, description = "Caller is not a supervisor"),
        (status = 404, description = "Proposal not found"),
        (status = 409, description = "Proposal was already applied"),
        (status = 500, description = "Proposal approved but its target food no longer exists"),
    )
)]
pub async fn cast_vote(
    Path(proposal_id): Path<Uuid>,
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
) -> Result<Response<CastVoteResponse>, ApiError> {
    let result = state
        .service
        .cast_vote(identity, proposal_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(CastVoteResponse { data: result }))
}
