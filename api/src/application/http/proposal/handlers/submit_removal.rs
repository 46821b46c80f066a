use axum::extract::{Path, State};
use foodwatch_core::domain::proposal::{
    entities::ChangeProposal, ports::ProposalService, value_objects::SubmitRemovalInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::auth::RequiredIdentity;
use crate::application::http::proposal::validators::SubmitRemovalValidator;
use crate::application::http::server::api_entities::api_error::{ApiError, ValidateJson};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SubmitRemovalResponse {
    pub data: ChangeProposal,
}

#[utoipa::path(
    post,
    path = "/removals",
    tag = "proposal",
    summary = "Propose a removal",
    description = "Submits a deletion proposal for a food. Only one removal proposal per food can be pending at a time.",
    params(
        ("food_id" = Uuid, Path, description = "Food to remove"),
    ),
    request_body = SubmitRemovalValidator,
    responses(
        (status = 201, body = SubmitRemovalResponse),
        (status = 404, description = "Food not found"),
        (status = 409, description = "A removal proposal for this food is already pending"),
    )
)]
pub async fn submit_removal(
    Path(food_id): Path<Uuid>,
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<SubmitRemovalValidator>,
) -> Result<Response<SubmitRemovalResponse>, ApiError> {
    let proposal = state
        .service
        .submit_removal(
            identity,
            SubmitRemovalInput {
                food_id,
                reason: payload.reason,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Response::Created(SubmitRemovalResponse { data: proposal }))
}
