use std::sync::Arc;

use axum::Router;
use axum::http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum_extra::headers::Header;
use axum_prometheus::PrometheusMetricLayer;
use foodwatch_core::{application::create_service, domain::common::FoodwatchConfig};
use tower_http::cors::CorsLayer;
use tracing::{debug, info_span, warn};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::auth::UserIdHeader;
use crate::application::http::food::router::food_routes;
use crate::application::http::health::health_routes;
use crate::application::http::ingredient::router::ingredient_routes;
use crate::application::http::maintenance::router::maintenance_routes;
use crate::application::http::proposal::router::proposal_routes;
use crate::application::http::restaurant::router::restaurant_routes;
use crate::application::http::server::app_state::AppState;
use crate::application::http::server::openapi::ApiDoc;
use crate::args::Args;

pub async fn state(args: Arc<Args>) -> Result<AppState, anyhow::Error> {
    let config = FoodwatchConfig::from(args.as_ref().clone());
    let service = create_service(config).await?;

    Ok(AppState::new(args, service))
}

///  Returns the [`Router`] of this application.
pub fn router(state: AppState) -> Result<Router, anyhow::Error> {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri: String = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        },
    );

    let allowed_origins = state
        .args
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid allowed origin: {}", origin);
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    debug!("Allowed origins: {:?}", allowed_origins);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allowed_origins)
        .allow_headers([
            CONTENT_TYPE,
            CONTENT_LENGTH,
            ACCEPT,
            LOCATION,
            UserIdHeader::name().clone(),
        ])
        .allow_credentials(true);

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let mut openapi = ApiDoc::openapi();
    let mut paths = openapi.paths.clone();
    paths.paths = openapi
        .paths
        .paths
        .into_iter()
        .map(|(path, item)| (format!("{}{path}", state.args.server.root_path), item))
        .collect();
    openapi.paths = paths;

    let root_path = state.args.server.root_path.clone();
    let api_docs_url = format!("{}/api-docs/openapi.json", root_path);

    let router = axum::Router::new()
        .merge(Scalar::with_url(
            format!("{}/scalar", root_path),
            openapi.clone(),
        ))
        .merge(
            SwaggerUi::new(format!("{}/swagger-ui", root_path))
                .url(api_docs_url.clone(), openapi.clone()),
        )
        .merge(Redoc::with_url(format!("{}/redoc", root_path), openapi))
        .merge(RapiDoc::new(api_docs_url).path(format!("{}/rapidoc", root_path)))
        .merge(proposal_routes(state.clone()))
        .merge(food_routes(state.clone()))
        .merge(restaurant_routes(state.clone()))
        .merge(ingredient_routes(state.clone()))
        .merge(maintenance_routes(state.clone()))
        .merge(health_routes(&root_path))
        .route(
            &format!("{}/metrics", root_path),
            get(|| async move { metric_handle.render() }),
        )
        .layer(trace_layer)
        .layer(cors)
        .layer(prometheus_layer)
        .with_state(state);
    Ok(router)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, StatusCode};
    use axum_test::TestServer;
    use clap::Parser;
    use foodwatch_core::{
        domain::common::{ApprovalConfig, services::Service},
        infrastructure::{audit::TracingAuditSink, postgres::PostgresStore},
    };
    use sea_orm::DatabaseConnection;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn disconnected_state() -> AppState {
        let args = Args::try_parse_from(["foodwatch"]).expect("default arguments");
        let service = Service::new(
            PostgresStore::new(DatabaseConnection::default()),
            TracingAuditSink,
            ApprovalConfig::default(),
        );

        AppState::new(Arc::new(args), service)
    }

    // The metrics recorder is process-global, so the router is built once.
    #[tokio::test]
    async fn router_serves_health_checks_and_requires_a_user() {
        let app = router(disconnected_state()).expect("router");
        let server = TestServer::new(app).expect("test server");

        let live = server.get("/health/live").await;
        live.assert_status_ok();
        live.assert_json(&json!({ "status": "UP" }));

        server
            .get("/health/ready")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let anonymous = server
            .post(&format!("/foods/{}/removals", Uuid::new_v4()))
            .json(&json!({}))
            .await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(anonymous.json::<serde_json::Value>()["code"], "E_UNAUTHORIZED");

        server
            .post(&format!("/proposals/{}/votes", Uuid::new_v4()))
            .add_header(
                HeaderName::from_static("x-user-id"),
                HeaderValue::from_static("not-a-uuid"),
            )
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .get("/api-docs/openapi.json")
            .await
            .assert_status_ok();
    }
}
