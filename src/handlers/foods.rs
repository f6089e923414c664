use crate::{
    auth::AuthUser,
    entities::food::Model as FoodModel,
    errors::ServiceError,
    services::foods::{CreateFoodRequest, FoodListResponse, UpdateFoodRequest},
    ApiResponse, ApiResult, AppState, ListQuery,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

/// Browse the food catalog. No authentication required.
#[utoipa::path(
    get,
    path = "/api/v1/foods",
    params(
        ("pageIndex" = Option<u64>, Query, description = "1-based page index"),
        ("pageSize" = Option<u64>, Query, description = "Page size"),
        ("keyword" = Option<String>, Query, description = "Filter by food name")
    ),
    responses(
        (status = 200, description = "Paged foods", body = ApiResponse<FoodListResponse>)
    ),
    tag = "foods"
)]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<FoodListResponse> {
    let foods = state.services.foods.list_foods(&query).await?;
    Ok(Json(ApiResponse::success(foods)))
}

/// Get one food
#[utoipa::path(
    get,
    path = "/api/v1/foods/{id}",
    params(("id" = Uuid, Path, description = "Food id")),
    responses(
        (status = 200, description = "The food", body = ApiResponse<FoodModel>),
        (status = 404, description = "Food not found", body = crate::errors::ErrorResponse)
    ),
    tag = "foods"
)]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<FoodModel> {
    let food = state.services.foods.get_food(id).await?;
    Ok(Json(ApiResponse::success(food)))
}

/// Add a food to the catalog. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/foods",
    request_body = CreateFoodRequest,
    responses(
        (status = 200, description = "Food created", body = ApiResponse<FoodModel>),
        (status = 403, description = "Not an admin", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "foods"
)]
pub async fn create_food(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateFoodRequest>,
) -> ApiResult<FoodModel> {
    require_admin(&user)?;
    let food = state.services.foods.create_food(request).await?;
    Ok(Json(ApiResponse::message(food, "Create food successfully")))
}

/// Replace a food's attributes. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/foods/{id}",
    params(("id" = Uuid, Path, description = "Food id")),
    request_body = UpdateFoodRequest,
    responses(
        (status = 200, description = "Updated food", body = ApiResponse<FoodModel>),
        (status = 404, description = "Food not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "foods"
)]
pub async fn update_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFoodRequest>,
) -> ApiResult<FoodModel> {
    require_admin(&user)?;
    let food = state.services.foods.update_food(id, request).await?;
    Ok(Json(ApiResponse::message(food, "Update food successfully")))
}

/// Soft-delete a food. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/foods/{id}",
    params(("id" = Uuid, Path, description = "Food id")),
    responses(
        (status = 200, description = "Food deleted"),
        (status = 404, description = "Food not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "foods"
)]
pub async fn delete_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    require_admin(&user)?;
    state.services.foods.delete_food(id).await?;
    Ok(Json(ApiResponse::message((), "Delete food successfully")))
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
