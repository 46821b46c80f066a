use axum::extract::State;
use foodwatch_core::domain::catalog::{ports::CatalogService, value_objects::ApprovableFood};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::auth::RequiredIdentity;
use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ListApprovableResponse {
    pub data: Vec<ApprovableFood>,
}

#[utoipa::path(
    get,
    path = "/approvable",
    tag = "food",
    summary = "List foods awaiting approval",
    description = "Unpublished foods the calling supervisor has not approved yet.",
    responses(
        (status = 200, body = ListApprovableResponse),
        (status = 403, description = "Caller is not a supervisor"),
    )
)]
pub async fn list_approvable(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
) -> Result<Response<ListApprovableResponse>, ApiError> {
    let foods = state
        .service
        .list_approvable_foods(identity)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(ListApprovableResponse { data: foods }))
}
