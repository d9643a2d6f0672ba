//! HTTP routes for registration and login.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use idgate_auth::{CredentialsInput, IdentityService};
use idgate_core::store::IdentityStore;
use serde::Serialize;
use tracing::debug;

pub const REGISTER_PATH: &str = "/api/identity/register";
pub const LOGIN_PATH: &str = "/api/identity/login";

/// Failure body: `{ "errors": [ ... ] }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<String>,
}

pub fn router<S: IdentityStore + 'static>(service: Arc<IdentityService<S>>) -> Router {
    Router::new()
        .route(REGISTER_PATH, post(register::<S>))
        .route(LOGIN_PATH, post(login::<S>))
        .with_state(service)
}

async fn register<S: IdentityStore + 'static>(
    State(service): State<Arc<IdentityService<S>>>,
    payload: Result<Json<CredentialsInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return rejected_body(rejection),
    };
    match service.register(input).await {
        Ok(token) => Json(token).into_response(),
        Err(errors) => bad_request(errors.into_inner()),
    }
}

async fn login<S: IdentityStore + 'static>(
    State(service): State<Arc<IdentityService<S>>>,
    payload: Result<Json<CredentialsInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return rejected_body(rejection),
    };
    match service.login(input).await {
        Ok(token) => Json(token).into_response(),
        Err(errors) => bad_request(errors.into_inner()),
    }
}

/// Unreadable bodies get the same 400 shape as refused credentials.
fn rejected_body(rejection: JsonRejection) -> Response {
    debug!(status = %rejection.status(), "request body rejected");
    bad_request(vec![rejection.body_text()])
}

fn bad_request(errors: Vec<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { errors })).into_response()
}
