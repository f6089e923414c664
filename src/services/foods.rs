use crate::{
    entities::food::{self, Entity as FoodEntity, Model as FoodModel},
    errors::ServiceError,
    events::{Event, EventSender},
    ListQuery, Pagination,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate(range(min = 0, message = "Calories cannot be negative"))]
    #[serde(default)]
    pub calories: i32,
    #[serde(default)]
    pub image: String,
}

/// Full-replacement update payload; catalog edits are PUT-style
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate(range(min = 0, message = "Calories cannot be negative"))]
    #[serde(default)]
    pub calories: i32,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodListResponse {
    pub foods: Vec<FoodModel>,
    pub pagination: Pagination,
}

/// Catalog service for individual food items
#[derive(Clone)]
pub struct FoodService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl FoodService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_food(&self, request: CreateFoodRequest) -> Result<FoodModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_price(request.price)?;

        let food = food::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            calories: Set(request.calories),
            image: Set(request.image),
            is_deleted: Set(false),
        }
        .insert(&*self.db)
        .await?;

        info!(food_id = %food.id, "Food created");
        self.emit(Event::FoodCreated(food.id)).await;
        Ok(food)
    }

    #[instrument(skip(self), fields(food_id = %food_id))]
    pub async fn get_food(&self, food_id: Uuid) -> Result<FoodModel, ServiceError> {
        self.find_active(food_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_foods(&self, query: &ListQuery) -> Result<FoodListResponse, ServiceError> {
        if query.page_index < 1 || query.page_size < 1 {
            return Err(ServiceError::ValidationError(
                "pageIndex and pageSize start at 1".to_string(),
            ));
        }

        let mut select = FoodEntity::find()
            .filter(food::Column::IsDeleted.eq(false))
            .order_by_asc(food::Column::Name);

        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            select = select.filter(food::Column::Name.contains(keyword.trim()));
        }

        let paginator = select.paginate(&*self.db, query.page_size);
        let total = paginator.num_items().await?;
        let foods = paginator.fetch_page(query.page_index - 1).await?;

        Ok(FoodListResponse {
            foods,
            pagination: Pagination {
                page_index: query.page_index,
                page_size: query.page_size,
                total_pages: total.div_ceil(query.page_size),
            },
        })
    }

    #[instrument(skip(self, request), fields(food_id = %food_id))]
    pub async fn update_food(
        &self,
        food_id: Uuid,
        request: UpdateFoodRequest,
    ) -> Result<FoodModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_price(request.price)?;

        let food = self.find_active(food_id).await?;

        let mut model: food::ActiveModel = food.into();
        model.name = Set(request.name);
        model.description = Set(request.description);
        model.price = Set(request.price);
        model.calories = Set(request.calories);
        model.image = Set(request.image);
        let updated = model.update(&*self.db).await?;

        info!(food_id = %food_id, "Food updated");
        Ok(updated)
    }

    /// Soft-deletes a food. Existing order details keep their price
    /// snapshots; only future pricing and listing stop seeing it.
    #[instrument(skip(self), fields(food_id = %food_id))]
    pub async fn delete_food(&self, food_id: Uuid) -> Result<(), ServiceError> {
        let food = self.find_active(food_id).await?;

        let mut model: food::ActiveModel = food.into();
        model.is_deleted = Set(true);
        model.update(&*self.db).await?;

        info!(food_id = %food_id, "Food soft-deleted");
        Ok(())
    }

    async fn find_active(&self, food_id: Uuid) -> Result<FoodModel, ServiceError> {
        FoodEntity::find_by_id(food_id)
            .filter(food::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Food {} not found", food_id)))
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send event");
            }
        }
    }
}

fn validate_price(price: Decimal) -> Result<(), ServiceError> {
    if price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Price cannot be negative".to_string(),
        ));
    }
    Ok(())
}
