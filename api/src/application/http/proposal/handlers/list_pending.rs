use axum::extract::{Query, State};
use foodwatch_core::domain::proposal::{
    entities::ProposalKind,
    ports::ProposalService,
    value_objects::{PendingProposalFilter, ProposalView},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPendingQuery {
    /// `edit` or `deletion`; both when omitted.
    pub kind: Option<ProposalKind>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ListPendingResponse {
    pub data: Vec<ProposalView>,
}

#[utoipa::path(
    get,
    path = "",
    tag = "proposal",
    summary = "List pending proposals",
    description = "Proposals that are not approved yet, oldest first, with their current vote count.",
    params(ListPendingQuery),
    responses(
        (status = 200, body = ListPendingResponse)
    )
)]
pub async fn list_pending(
    Query(query): Query<ListPendingQuery>,
    State(state): State<AppState>,
) -> Result<Response<ListPendingResponse>, ApiError> {
    let proposals = state
        .service
        .list_pending(PendingProposalFilter {
            kind: query.kind,
            offset: query.offset,
            limit: query.limit,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(ListPendingResponse { data: proposals }))
}
