use axum::extract::{Path, State};
use foodwatch_core::domain::catalog::{ports::CatalogService, value_objects::FoodApproval};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::auth::RequiredIdentity;
use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApproveFoodResponse {
    pub data: FoodApproval,
}

#[utoipa::path(
    post,
    path = "/{food_id}/approvals",
    tag = "food",
    summary = "Approve a new food",
    params(
        ("food_id" = Uuid, Path, description = "Food id"),
    ),
    responses(
        (status = 200, body = ApproveFoodResponse),
        (status = 403, description = "Caller is not a supervisor"),
        (status = 404, description = "Food not found"),
    )
)]
pub async fn approve_food(
    Path(food_id): Path<Uuid>,
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
) -> Result<Response<ApproveFoodResponse>, ApiError> {
    let approval = state
        .service
        .approve_food(identity, food_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(ApproveFoodResponse { data: approval }))
}
