use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::combos::{ComboListResponse, ComboResponse, CreateComboRequest},
    ApiResponse, ApiResult, AppState, ListQuery,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

/// Browse combos. No authentication required.
#[utoipa::path(
    get,
    path = "/api/v1/combos",
    params(
        ("pageIndex" = Option<u64>, Query, description = "1-based page index"),
        ("pageSize" = Option<u64>, Query, description = "Page size"),
        ("keyword" = Option<String>, Query, description = "Filter by combo name")
    ),
    responses(
        (status = 200, description = "Paged combos", body = ApiResponse<ComboListResponse>)
    ),
    tag = "combos"
)]
pub async fn list_combos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ComboListResponse> {
    let combos = state.services.combos.list_combos(&query).await?;
    Ok(Json(ApiResponse::success(combos)))
}

/// Get one combo with its constituent items
#[utoipa::path(
    get,
    path = "/api/v1/combos/{id}",
    params(("id" = Uuid, Path, description = "Combo id")),
    responses(
        (status = 200, description = "The combo", body = ApiResponse<ComboResponse>),
        (status = 404, description = "Combo not found", body = crate::errors::ErrorResponse)
    ),
    tag = "combos"
)]
pub async fn get_combo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ComboResponse> {
    let combo = state.services.combos.get_combo(id).await?;
    Ok(Json(ApiResponse::success(combo)))
}

/// Create a combo with its items. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/combos",
    request_body = CreateComboRequest,
    responses(
        (status = 200, description = "Combo created", body = ApiResponse<ComboResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not an admin", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "combos"
)]
pub async fn create_combo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateComboRequest>,
) -> ApiResult<ComboResponse> {
    require_admin(&user)?;
    let combo = state.services.combos.create_combo(request).await?;
    Ok(Json(ApiResponse::message(
        combo,
        "Create combo successfully",
    )))
}

/// Soft-delete a combo. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/combos/{id}",
    params(("id" = Uuid, Path, description = "Combo id")),
    responses(
        (status = 200, description = "Combo deleted"),
        (status = 404, description = "Combo not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "combos"
)]
pub async fn delete_combo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_admin(&user)?;
    state.services.combos.delete_combo(id).await?;
    Ok(Json(ApiResponse::message((), "Delete combo successfully")))
}

fn require_admin(user: &AuthUser) -> Result<(), ServiceError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "Administrator role required".to_string(),
        ))
    }
}
