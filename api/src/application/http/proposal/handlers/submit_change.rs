use axum::extract::{Path, State};
use foodwatch_core::domain::proposal::{
    entities::ChangeProposal, ports::ProposalService, value_objects::SubmitChangeInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::auth::RequiredIdentity;
use crate::application::http::proposal::validators::SubmitChangeValidator;
use crate::application::http::server::api_entities::api_error::{ApiError, ValidateJson};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SubmitChangeResponse {
    pub data: ChangeProposal,
}

#[utoipa::path(
    post,
    path = "/proposals",
    tag = "proposal",
    summary = "Propose an edit",
    description = "Submits a change proposal for an existing food. Omitted fields keep their current value; the proposed hazard level is computed from the resulting ingredients.",
    params(
        ("food_id" = Uuid, Path, description = "Food to edit"),
    ),
    request_body = SubmitChangeValidator,
    responses(
        (status = 201, body = SubmitChangeResponse),
        (status = 400, description = "Invalid fields or unknown ingredient"),
        (status = 404, description = "Food not found"),
    )
)]
pub async fn submit_change(
    Path(food_id): Path<Uuid>,
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<SubmitChangeValidator>,
) -> Result<Response<SubmitChangeResponse>, ApiError> {
    let (fields, reason) = payload.into_fields();

    let proposal = state
        .service
        .submit_change(
            identity,
            SubmitChangeInput {
                food_id,
                fields,
                reason,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Response::Created(SubmitChangeResponse { data: proposal }))
}
