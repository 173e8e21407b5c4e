//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod contact;

use crate::config::Settings;
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use std::any::Any;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{error, Level};

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack. OPTIONS is answered by the CORS layer and never
    // reaches a handler; the outer middleware turns that answer into a 204.
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(preflight_no_content))
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .propagate_x_request_id();

    // A known path with an unsupported method is reported as 404, not 405
    Router::new()
        // Health check
        .route("/health", get(health_check).fallback(route_not_found))
        // Contact form
        .route(
            "/api/contact",
            post(contact::submit_contact).fallback(route_not_found),
        )
        .route(
            "/api/contact/messages",
            get(contact::list_messages).fallback(route_not_found),
        )
        .route(
            "/api/contact/{id}",
            put(contact::update_status).fallback(route_not_found),
        )
        .fallback(route_not_found)
        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(86400));

    if origins.is_empty() {
        cors.allow_origin(AnyOrigin)
    } else {
        cors.allow_origin(origins)
    }
}

/// Any OPTIONS request gets an empty 204, whatever the path
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_options {
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.body_mut() = Body::empty();
        response.headers_mut().remove(header::CONTENT_TYPE);
        response.headers_mut().remove(header::CONTENT_LENGTH);
    }
    response
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!("Request handler panicked: {}", details);

    AppError::Internal(details).into_response()
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
