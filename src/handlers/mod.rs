//! HTTP handlers. Thin axum wrappers that authenticate, authorize and
//! delegate to the services, returning the common [`ApiResponse`] envelope.
//!
//! [`ApiResponse`]: crate::ApiResponse

pub mod auth;
pub mod combos;
pub mod foods;
pub mod health;
pub mod orders;

use crate::events::EventSender;
use crate::services::{ComboService, FoodService, OrderService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Service instances shared across handlers via [`crate::AppState`]
#[derive(Clone)]
pub struct AppServices {
    pub orders: OrderService,
    pub foods: FoodService,
    pub combos: ComboService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            orders: OrderService::new(db.clone(), event_sender.clone()),
            foods: FoodService::new(db.clone(), event_sender.clone()),
            combos: ComboService::new(db, event_sender),
        }
    }
}
