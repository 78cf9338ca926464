use crate::domain::views::{AuthSession, UserProfile};
use crate::transport::http::error::ApiError;
use crate::transport::http::extract::AuthUser;
use crate::transport::http::types::{
    json_422, respond, ApiResponse, AppState, LoginRequest, NameUpdated, RegisterRequest,
    UpdatePasswordRequest, UpdateProfileRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created, session issued", body = AuthSession),
        (status = 400, description = "Missing email or short password", body = ApiResponse),
        (status = 409, description = "Email already registered", body = ApiResponse),
        (status = 422, description = "Invalid JSON body", body = ApiResponse)
    )
)]
pub async fn register_handler(
    State(state): State<AppState>,
    request: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"email": "...", "password": "...", "name": "..."}"#)),
    };
    let session = state
        .auth
        .register(&request.email, &request.password, &request.name)
        .await?;
    Ok(respond(StatusCode::CREATED, session))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = AuthSession),
        (status = 401, description = "Invalid credentials", body = ApiResponse),
        (status = 422, description = "Invalid JSON body", body = ApiResponse)
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"email": "...", "password": "..."}"#)),
    };
    let session = state.auth.login(&request.email, &request.password).await?;
    Ok(respond(StatusCode::OK, session))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Caller's profile", body = UserProfile),
        (status = 401, description = "Missing or invalid session", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn me_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    let profile = state.auth.me(user_id).await?;
    Ok(respond(StatusCode::OK, profile))
}

#[utoipa::path(
    patch,
    path = "/api/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Name updated", body = NameUpdated),
        (status = 400, description = "Empty name", body = ApiResponse),
        (status = 401, description = "Missing or invalid session", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    request: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"name": "..."}"#)),
    };
    let name = state.auth.update_name(user_id, &request.name).await?;
    Ok(respond(StatusCode::OK, NameUpdated { name }))
}

#[utoipa::path(
    patch,
    path = "/api/me/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse),
        (status = 400, description = "Password too short", body = ApiResponse),
        (status = 401, description = "Missing or invalid session", body = ApiResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_password_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    request: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return Ok(json_422(e, r#"{"password": "..."}"#)),
    };
    state.auth.update_password(user_id, &request.password).await?;
    Ok(respond(StatusCode::OK, serde_json::json!({ "status": "ok" })))
}
