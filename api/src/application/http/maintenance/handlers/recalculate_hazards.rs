use axum::extract::State;
use foodwatch_core::domain::hazard::ports::{HazardReport, HazardService};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::auth::RequiredIdentity;
use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecalculateHazardsResponse {
    pub data: HazardReport,
}

#[utoipa::path(
    post,
    path = "/hazards",
    tag = "maintenance",
    summary = "Recalculate hazard levels",
    description = "Recomputes every food's hazard level from its ingredients, then every restaurant's from its published foods.",
    responses(
        (status = 200, body = RecalculateHazardsResponse),
        (status = 403, description = "Caller is not a supervisor"),
    )
)]
pub async fn recalculate_hazards(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
) -> Result<Response<RecalculateHazardsResponse>, ApiError> {
    let report = state
        .service
        .recalculate_all_hazards(identity)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(RecalculateHazardsResponse { data: report }))
}
