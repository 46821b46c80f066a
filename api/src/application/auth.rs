use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{HeaderName, HeaderValue, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{self, Header},
};
use foodwatch_core::domain::authentication::{ports::IdentityService, value_objects::Identity};
use tracing::{error, warn};
use uuid::Uuid;

use super::http::server::{api_entities::api_error::ApiError, app_state::AppState};

static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// `X-User-Id: <uuid>`, set by the gateway in front of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdHeader(pub Uuid);

impl Header for UserIdHeader {
    fn name() -> &'static HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(UserIdHeader)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0.to_string()) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Extractor for handlers that act on behalf of a known user.
pub struct RequiredIdentity(pub Identity);

impl<S> FromRequestParts<S> for RequiredIdentity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(RequiredIdentity(identity));
        }

        let TypedHeader(UserIdHeader(user_id)) = parts
            .extract::<TypedHeader<UserIdHeader>>()
            .await
            .map_err(|_| {
                ApiError::Unauthorized(
                    "Authentication required: provide a valid X-User-Id header".to_string(),
                )
            })?;

        let app_state = AppState::from_ref(state);
        let identity = app_state
            .service
            .resolve_identity(user_id)
            .await
            .map_err(|e| {
                error!("Failed to resolve identity: {}", e);
                ApiError::from(e)
            })?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "request from unknown user");
                ApiError::Unauthorized("Unknown user".to_string())
            })?;

        parts.extensions.insert(identity.clone());

        Ok(RequiredIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &'static str) -> Result<UserIdHeader, headers::Error> {
        let value = HeaderValue::from_static(raw);
        UserIdHeader::decode(&mut std::iter::once(&value))
    }

    #[test]
    fn user_id_header_parses_uuids() {
        let id = Uuid::parse_str("0192f3a4-5b6c-7d8e-9f01-23456789abcd").expect("uuid");

        assert_eq!(
            decode("0192f3a4-5b6c-7d8e-9f01-23456789abcd").ok(),
            Some(UserIdHeader(id))
        );
        assert!(decode("alice").is_err());
    }
}
