use crate::{
    entities::combo::{self, Entity as ComboEntity},
    entities::combo_item::{self, Entity as ComboItemEntity},
    entities::food::{self, Entity as FoodEntity},
    entities::order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus},
    entities::order_detail::{self, Entity as OrderDetailEntity},
    entities::transaction::{self, Entity as TransactionEntity, TransactionStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    ListQuery, Pagination,
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const MAX_PAGE_SIZE: u64 = 100;

/// One requested line item: a food and how many of it
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailInput {
    #[serde(rename = "foodID")]
    pub food_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Payload for creating an order
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate]
    #[serde(default)]
    pub order_details: Vec<OrderDetailInput>,
    #[serde(rename = "comboID", default)]
    pub combo_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
}

/// Payload for updating an order while it is still pending.
/// Every omitted field keeps its prior value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub order_status: Option<OrderStatus>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub customer_name: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub phone_number: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub pagination: Pagination,
}

/// One line of an order joined with the food it references
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub food_id: Uuid,
    pub name: String,
    pub description: String,
    pub calories: i32,
    pub quantity: i32,
    pub price: Decimal,
}

/// A combo constituent resolved to its food and quantity
#[derive(Debug, Clone)]
pub struct ComboConstituent {
    pub food_id: Uuid,
    pub quantity: i32,
}

/// Service owning the order workflow: pricing, combo expansion, assembly
/// and the status lifecycle
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Computes the exact decimal total of quantity x unit price over the
    /// given line items. Lookups run concurrently; the accumulation is
    /// commutative so the result does not depend on completion order.
    pub async fn calculate_items_total<C: ConnectionTrait>(
        conn: &C,
        details: &[OrderDetailInput],
    ) -> Result<Decimal, ServiceError> {
        if let Some(bad) = details.iter().find(|d| d.quantity < 1) {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for food {} must be at least 1",
                bad.food_id
            )));
        }

        let lookups = details.iter().map(|detail| {
            let food_id = detail.food_id;
            let quantity = detail.quantity;
            async move {
                let food = find_active_food(conn, food_id).await?;
                Ok::<Decimal, ServiceError>(food.price * Decimal::from(quantity))
            }
        });

        let prices = try_join_all(lookups).await?;
        Ok(prices.into_iter().fold(Decimal::ZERO, |acc, p| acc + p))
    }

    /// Resolves a combo into its price and constituent food items. All
    /// constituents are validated before any order state is written.
    pub async fn expand_combo<C: ConnectionTrait>(
        conn: &C,
        combo_id: Uuid,
    ) -> Result<(Decimal, Vec<ComboConstituent>), ServiceError> {
        let combo = ComboEntity::find_by_id(combo_id)
            .filter(combo::Column::IsDeleted.eq(false))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Combo {} not found", combo_id)))?;

        let items = ComboItemEntity::find()
            .filter(combo_item::Column::ComboId.eq(combo_id))
            .all(conn)
            .await?;
        if items.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Combo {} has no items",
                combo_id
            )));
        }

        let checks = items.iter().map(|item| {
            let food_id = item.food_id;
            async move {
                find_active_food(conn, food_id).await?;
                Ok::<(), ServiceError>(())
            }
        });
        try_join_all(checks).await?;

        let constituents = items
            .into_iter()
            .map(|item| ComboConstituent {
                food_id: item.food_id,
                quantity: item.quantity,
            })
            .collect();

        Ok((combo.price, constituents))
    }

    /// Creates an order together with its detail rows and its payment
    /// transaction as one atomic unit. Any failure rolls the whole write
    /// sequence back; no partial rows remain.
    #[instrument(skip(self, request), fields(customer_id = %customer_id))]
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.order_details.is_empty() && request.combo_id.is_none() {
            return Err(ServiceError::ValidationError(
                "Order must contain at least one item or a combo".to_string(),
            ));
        }

        // Read-only pricing and combo validation happen against the pool,
        // concurrently where possible, before any row is written.
        let mut total_price =
            Self::calculate_items_total(&*self.db, &request.order_details).await?;

        let mut combo_constituents = Vec::new();
        if let Some(combo_id) = request.combo_id {
            let (combo_price, constituents) = Self::expand_combo(&*self.db, combo_id).await?;
            // The combo's own price counts once; constituents are priced
            // per food below.
            total_price += combo_price;
            combo_constituents = constituents;
        }

        let order_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let order_model = order::ActiveModel {
            id: Set(order_id),
            customer_id: Set(customer_id),
            customer_name: Set(request.customer_name.clone()),
            address: Set(request.address.clone()),
            phone_number: Set(request.phone_number.clone()),
            total_price: Set(total_price),
            status: Set(OrderStatus::Pending),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await?;

        // One detail row per requested item and per combo constituent,
        // each snapshotting the food's current price.
        let lines = request
            .order_details
            .iter()
            .map(|d| (d.food_id, d.quantity))
            .chain(combo_constituents.iter().map(|c| (c.food_id, c.quantity)));

        for (food_id, quantity) in lines {
            let food = find_active_food(&txn, food_id).await?;
            order_detail::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                food_id: Set(food_id),
                quantity: Set(quantity),
                price: Set(food.price),
                is_deleted: Set(false),
            }
            .insert(&txn)
            .await?;
        }

        transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            payment_method: Set(request.payment_method.clone()),
            amount: Set(total_price),
            status: Set(TransactionStatus::Pending),
            transaction_date: Set(now),
            is_deleted: Set(false),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(order_id = %order_id, total = %total_price, "Order created");
        self.emit(Event::OrderCreated(order_id)).await;

        Ok(model_to_response(
            order_model,
            Some(request.payment_method),
        ))
    }

    /// Retrieves a single order, hiding soft-deleted rows
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = self.find_active_order(&*self.db, order_id).await?;

        let payment_method = TransactionEntity::find()
            .filter(transaction::Column::OrderId.eq(order_id))
            .filter(transaction::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .map(|t| t.payment_method);

        Ok(model_to_response(order, payment_method))
    }

    /// Lists orders with pagination and an optional customer-name keyword
    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: &ListQuery) -> Result<OrderListResponse, ServiceError> {
        self.list_orders_filtered(query, None).await
    }

    /// Lists the acting customer's own orders
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn list_customer_orders(
        &self,
        customer_id: Uuid,
        query: &ListQuery,
    ) -> Result<OrderListResponse, ServiceError> {
        self.list_orders_filtered(query, Some(customer_id)).await
    }

    async fn list_orders_filtered(
        &self,
        query: &ListQuery,
        customer_id: Option<Uuid>,
    ) -> Result<OrderListResponse, ServiceError> {
        if query.page_index < 1 {
            return Err(ServiceError::ValidationError(
                "pageIndex starts at 1".to_string(),
            ));
        }
        if query.page_size < 1 || query.page_size > MAX_PAGE_SIZE {
            return Err(ServiceError::ValidationError(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let mut select = OrderEntity::find()
            .filter(order::Column::IsDeleted.eq(false))
            .order_by_desc(order::Column::CreatedAt);

        if let Some(customer_id) = customer_id {
            select = select.filter(order::Column::CustomerId.eq(customer_id));
        }
        if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            select = select.filter(order::Column::CustomerName.contains(keyword.trim()));
        }

        let paginator = select.paginate(&*self.db, query.page_size);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(query.page_index - 1).await?;

        // One batched lookup replaces a per-order transaction query.
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut payment_methods: HashMap<Uuid, String> = TransactionEntity::find()
            .filter(transaction::Column::OrderId.is_in(order_ids))
            .filter(transaction::Column::IsDeleted.eq(false))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|t| (t.order_id, t.payment_method))
            .collect();

        let orders = orders
            .into_iter()
            .map(|o| {
                let payment_method = payment_methods.remove(&o.id);
                model_to_response(o, payment_method)
            })
            .collect();

        Ok(OrderListResponse {
            orders,
            pagination: Pagination {
                page_index: query.page_index,
                page_size: query.page_size,
                total_pages: total.div_ceil(query.page_size),
            },
        })
    }

    /// Returns the line items of an order joined with their food records
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemView>, ServiceError> {
        self.find_active_order(&*self.db, order_id).await?;

        let details = OrderDetailEntity::find()
            .filter(order_detail::Column::OrderId.eq(order_id))
            .filter(order_detail::Column::IsDeleted.eq(false))
            .all(&*self.db)
            .await?;

        let food_ids: Vec<Uuid> = details.iter().map(|d| d.food_id).collect();
        let foods: HashMap<Uuid, food::Model> = FoodEntity::find()
            .filter(food::Column::Id.is_in(food_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        details
            .into_iter()
            .map(|detail| {
                let food = foods.get(&detail.food_id).ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Food {} of order detail {} not found",
                        detail.food_id, detail.id
                    ))
                })?;
                Ok(OrderItemView {
                    food_id: detail.food_id,
                    name: food.name.clone(),
                    description: food.description.clone(),
                    calories: food.calories,
                    quantity: detail.quantity,
                    price: detail.price,
                })
            })
            .collect()
    }

    /// Updates a pending order and keeps its transaction in sync.
    ///
    /// Pending -> Finished and Pending -> Cancelled are the only status
    /// transitions; both are terminal. The order update and the transaction
    /// sync share one database transaction, so a missing payment
    /// transaction rolls the order change back as well.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let txn = self.db.begin().await?;

        let order = self.find_active_order(&txn, order_id).await?;
        if order.status.is_terminal() {
            return Err(ServiceError::OrderClosed(format!(
                "Order {} is already {}",
                order_id,
                order.status.as_str()
            )));
        }

        let old_status = order.status;
        let new_status = request.order_status.unwrap_or(old_status);
        let now = Utc::now();

        let mut order_model: order::ActiveModel = order.clone().into();
        order_model.status = Set(new_status);
        order_model.address = Set(request.address.unwrap_or(order.address));
        order_model.phone_number = Set(request.phone_number.unwrap_or(order.phone_number));
        order_model.customer_name = Set(request.customer_name.unwrap_or(order.customer_name));
        order_model.updated_at = Set(Some(now));
        let updated_order = order_model.update(&txn).await?;

        let tx_row = TransactionEntity::find()
            .filter(transaction::Column::OrderId.eq(order_id))
            .filter(transaction::Column::IsDeleted.eq(false))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "No transaction linked to order; rolling back");
                ServiceError::NotFound(format!("Transaction not found for order {}", order_id))
            })?;

        let payment_method = request
            .payment_method
            .unwrap_or_else(|| tx_row.payment_method.clone());
        let mut tx_model: transaction::ActiveModel = tx_row.into();
        tx_model.payment_method = Set(payment_method.clone());
        tx_model.status = Set(TransactionStatus::from(new_status));
        tx_model.update(&txn).await?;

        txn.commit().await?;

        if new_status != old_status {
            info!(
                order_id = %order_id,
                old_status = old_status.as_str(),
                new_status = new_status.as_str(),
                "Order status updated"
            );
            self.emit(Event::OrderStatusChanged {
                order_id,
                old_status: old_status.as_str().to_string(),
                new_status: new_status.as_str().to_string(),
            })
            .await;
        }

        Ok(model_to_response(updated_order, Some(payment_method)))
    }

    /// Soft-deletes an order together with its details and its transaction,
    /// in that sequence, inside one database transaction. Rows stay in the
    /// store for audit but disappear from every find path.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let order = self.find_active_order(&txn, order_id).await?;

        OrderDetailEntity::update_many()
            .col_expr(order_detail::Column::IsDeleted, Expr::value(true))
            .filter(order_detail::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;

        TransactionEntity::update_many()
            .col_expr(transaction::Column::IsDeleted, Expr::value(true))
            .filter(transaction::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;

        let mut order_model: order::ActiveModel = order.into();
        order_model.is_deleted = Set(true);
        order_model.updated_at = Set(Some(Utc::now()));
        order_model.update(&txn).await?;

        txn.commit().await?;

        info!(order_id = %order_id, "Order soft-deleted");
        self.emit(Event::OrderDeleted(order_id)).await;

        Ok(())
    }

    async fn find_active_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(order_id)
            .filter(order::Column::IsDeleted.eq(false))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send event");
            }
        }
    }
}

async fn find_active_food<C: ConnectionTrait>(
    conn: &C,
    food_id: Uuid,
) -> Result<food::Model, ServiceError> {
    FoodEntity::find_by_id(food_id)
        .filter(food::Column::IsDeleted.eq(false))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Food {} not found", food_id)))
}

fn model_to_response(model: OrderModel, payment_method: Option<String>) -> OrderResponse {
    OrderResponse {
        id: model.id,
        customer_id: model.customer_id,
        customer_name: model.customer_name,
        address: model.address,
        phone_number: model.phone_number,
        total_price: model.total_price,
        status: model.status,
        payment_method,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
