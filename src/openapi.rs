//! OpenAPI documentation assembled from the handler annotations.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{auth, entities, errors, handlers, services};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QuickBite API",
        description = "Food-ordering backend: catalog, combos and transactional order processing"
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::list_my_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
        handlers::orders::get_order_items,
        handlers::foods::list_foods,
        handlers::foods::get_food,
        handlers::foods::create_food,
        handlers::foods::update_food,
        handlers::foods::delete_food,
        handlers::combos::list_combos,
        handlers::combos::get_combo,
        handlers::combos::create_combo,
        handlers::combos::delete_combo,
    ),
    components(schemas(
        errors::ErrorResponse,
        crate::Pagination,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::TokenResponse,
        handlers::auth::RegisterResponse,
        handlers::health::HealthStatus,
        entities::customer::Model,
        entities::food::Model,
        entities::combo::Model,
        entities::order::OrderStatus,
        services::orders::OrderDetailInput,
        services::orders::CreateOrderRequest,
        services::orders::UpdateOrderRequest,
        services::orders::OrderResponse,
        services::orders::OrderListResponse,
        services::orders::OrderItemView,
        services::foods::CreateFoodRequest,
        services::foods::UpdateFoodRequest,
        services::foods::FoodListResponse,
        services::combos::ComboItemInput,
        services::combos::CreateComboRequest,
        services::combos::ComboItemView,
        services::combos::ComboResponse,
        services::combos::ComboListResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness checks"),
        (name = "auth", description = "Registration, login and identity"),
        (name = "orders", description = "Order creation and lifecycle"),
        (name = "foods", description = "Food catalog"),
        (name = "combos", description = "Combo catalog")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
