use crate::{
    auth::{AuthUser, LoginRequest, RegisterRequest, TokenResponse},
    entities::customer::Model as CustomerModel,
    errors::ServiceError,
    events::Event,
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

/// Registration result: the new account plus its first token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub customer: CustomerModel,
    pub token: TokenResponse,
}

/// Register a customer account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let (customer, token) = state.auth.register(request).await?;

    if let Err(e) = state
        .event_sender
        .send(Event::CustomerRegistered(customer.id))
        .await
    {
        warn!(error = %e, "Failed to send event");
    }

    Ok(Json(ApiResponse::message(
        RegisterResponse { customer, token },
        "Register successfully",
    )))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let token = state.auth.login(request).await?;
    Ok(Json(ApiResponse::success(token)))
}

/// Return the authenticated customer's profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current customer", body = ApiResponse<CustomerModel>),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<CustomerModel> {
    let customer = state
        .auth
        .get_customer(user.customer_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;
    Ok(Json(ApiResponse::success(customer)))
}
