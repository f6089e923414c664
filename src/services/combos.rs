use crate::{
    entities::combo::{self, Entity as ComboEntity, Model as ComboModel},
    entities::combo_item::{self, Entity as ComboItemEntity},
    entities::food::{self, Entity as FoodEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    ListQuery, Pagination,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComboItemInput {
    #[serde(rename = "foodID")]
    pub food_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComboRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate]
    pub items: Vec<ComboItemInput>,
}

/// A combo item joined with its food record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComboItemView {
    pub food_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComboResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub items: Vec<ComboItemView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComboListResponse {
    pub combos: Vec<ComboModel>,
    pub pagination: Pagination,
}

/// Catalog service for combos and their constituent items
#[derive(Clone)]
pub struct ComboService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl ComboService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a combo and its item rows atomically. Every referenced food
    /// must exist and be active; one bad reference rejects the whole combo.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_combo(
        &self,
        request: CreateComboRequest,
    ) -> Result<ComboResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
        if request.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "A combo needs at least one item".to_string(),
            ));
        }

        let food_ids: Vec<Uuid> = request.items.iter().map(|i| i.food_id).collect();
        let foods: HashMap<Uuid, food::Model> = FoodEntity::find()
            .filter(food::Column::Id.is_in(food_ids.clone()))
            .filter(food::Column::IsDeleted.eq(false))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();
        for food_id in &food_ids {
            if !foods.contains_key(food_id) {
                return Err(ServiceError::NotFound(format!(
                    "Food {} not found",
                    food_id
                )));
            }
        }

        let combo_id = Uuid::new_v4();
        let txn = self.db.begin().await?;

        let combo = combo::ActiveModel {
            id: Set(combo_id),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            is_deleted: Set(false),
        }
        .insert(&txn)
        .await?;

        for item in &request.items {
            combo_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                combo_id: Set(combo_id),
                food_id: Set(item.food_id),
                quantity: Set(item.quantity),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(combo_id = %combo_id, "Combo created");
        self.emit(Event::ComboCreated(combo_id)).await;

        let items = request
            .items
            .iter()
            .map(|item| {
                let food = &foods[&item.food_id];
                ComboItemView {
                    food_id: item.food_id,
                    name: food.name.clone(),
                    quantity: item.quantity,
                    price: food.price,
                }
            })
            .collect();

        Ok(combo_to_response(combo, items))
    }

    #[instrument(skip(self), fields(combo_id = %combo_id))]
    pub async fn get_combo(&self, combo_id: Uuid) -> Result<ComboResponse, ServiceError> {
        let combo = self.find_active(combo_id).await?;

        let items = ComboItemEntity::find()
            .filter(combo_item::Column::ComboId.eq(combo_id))
            .all(&*self.db)
            .await?;

        let food_ids: Vec<Uuid> = items.iter().map(|i| i.food_id).collect();
        let foods: HashMap<Uuid, food::Model> = FoodEntity::find()
            .filter(food::Column::Id.is_in(food_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        let items = items
            .into_iter()
            .map(|item| {
                let food = foods.get(&item.food_id).ok_or_else(|| {
                    ServiceError::NotFound(format!("Food {} not found", item.food_id))
                })?;
                Ok(ComboItemView {
                    food_id: item.food_id,
                    name: food.name.clone(),
                    quantity: item.quantity,
                    price: food.price,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(combo_to_response(combo, items))
    }

    #[instrument(skip(self))]
    pub async fn list_combos(&self, query: &ListQuery) -> Result<ComboListResponse, ServiceError> {
        if query.page_index < 1 || query.page_size < 1 {
            return Err(ServiceError::ValidationError(
                "pageIndex and pageSize start at 1".to_string(),
            ));
        }

        let mut select = ComboEntity::find()
            .filter(combo::Column::IsDeleted.eq(false))
            .order_by_asc(combo::Column::Name);

        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            select = select.filter(combo::Column::Name.contains(keyword.trim()));
        }

        let paginator = select.paginate(&*self.db, query.page_size);
        let total = paginator.num_items().await?;
        let combos = paginator.fetch_page(query.page_index - 1).await?;

        Ok(ComboListResponse {
            combos,
            pagination: Pagination {
                page_index: query.page_index,
                page_size: query.page_size,
                total_pages: total.div_ceil(query.page_size),
            },
        })
    }

    /// Soft-deletes a combo. Item rows stay; they are unreachable once the
    /// combo itself is hidden.
    #[instrument(skip(self), fields(combo_id = %combo_id))]
    pub async fn delete_combo(&self, combo_id: Uuid) -> Result<(), ServiceError> {
        let combo = self.find_active(combo_id).await?;

        let mut model: combo::ActiveModel = combo.into();
        model.is_deleted = Set(true);
        model.update(&*self.db).await?;

        info!(combo_id = %combo_id, "Combo soft-deleted");
        Ok(())
    }

    async fn find_active(&self, combo_id: Uuid) -> Result<ComboModel, ServiceError> {
        ComboEntity::find_by_id(combo_id)
            .filter(combo::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Combo {} not found", combo_id)))
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send event");
            }
        }
    }
}

fn combo_to_response(combo: ComboModel, items: Vec<ComboItemView>) -> ComboResponse {
    ComboResponse {
        id: combo.id,
        name: combo.name,
        description: combo.description,
        price: combo.price,
        items,
    }
}
