use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::orders::{
        CreateOrderRequest, OrderItemView, OrderListResponse, OrderResponse, UpdateOrderRequest,
    },
    ApiResponse, ApiResult, AppState, ListQuery,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

/// Create an order for the authenticated customer
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown food or combo", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .create_order(user.customer_id, request)
        .await?;
    Ok(Json(ApiResponse::message(
        order,
        "Create order successfully",
    )))
}

/// List all orders. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(
        ("pageIndex" = Option<u64>, Query, description = "1-based page index"),
        ("pageSize" = Option<u64>, Query, description = "Page size, max 100"),
        ("keyword" = Option<String>, Query, description = "Filter by customer name")
    ),
    responses(
        (status = 200, description = "Paged orders", body = ApiResponse<OrderListResponse>),
        (status = 403, description = "Not an admin", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<OrderListResponse> {
    require_admin(&user)?;
    let orders = state.services.orders.list_orders(&query).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// List the authenticated customer's own orders
#[utoipa::path(
    get,
    path = "/api/v1/orders/mine",
    params(
        ("pageIndex" = Option<u64>, Query, description = "1-based page index"),
        ("pageSize" = Option<u64>, Query, description = "Page size, max 100")
    ),
    responses(
        (status = 200, description = "Paged orders", body = ApiResponse<OrderListResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<OrderListResponse> {
    let orders = state
        .services
        .orders
        .list_customer_orders(user.customer_id, &query)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Get one order. Customers may only see their own.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.get_order(id).await?;
    require_owner_or_admin(&user, order.customer_id)?;
    Ok(Json(ApiResponse::success(order)))
}

/// Update a pending order
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order already closed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> ApiResult<OrderResponse> {
    let existing = state.services.orders.get_order(id).await?;
    require_owner_or_admin(&user, existing.customer_id)?;

    let order = state.services.orders.update_order(id, request).await?;
    Ok(Json(ApiResponse::message(
        order,
        "Update order successfully",
    )))
}

/// Soft-delete an order with its details and transaction
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let existing = state.services.orders.get_order(id).await?;
    require_owner_or_admin(&user, existing.customer_id)?;

    state.services.orders.delete_order(id).await?;
    Ok(Json(ApiResponse::message((), "Delete order successfully")))
}

/// List an order's line items joined with their foods
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Line items", body = ApiResponse<Vec<OrderItemView>>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order_items(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<OrderItemView>> {
    let existing = state.services.orders.get_order(id).await?;
    require_owner_or_admin(&user, existing.customer_id)?;

    let items = state.services.orders.get_order_items(id).await?;
    Ok(Json(ApiResponse::success(items)))
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

fn require_owner_or_admin(user: &AuthUser, owner_id: Uuid) -> Result<(), ServiceError> {
    if user.is_admin() || user.customer_id == owner_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "You do not have access to this order".to_string(),
        ))
    }
}
