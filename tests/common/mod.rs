#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use quickbite_api::{
    api_v1_routes,
    auth::{self, AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::customer,
    entities::food::Model as FoodModel,
    events,
    handlers::{self, AppServices},
    services::combos::{ComboItemInput, ComboResponse, CreateComboRequest},
    services::foods::CreateFoodRequest,
    AppState,
};

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

/// Builds a fully wired application backed by an in-memory SQLite database.
/// A single connection keeps every query on the same in-memory instance.
pub async fn spawn_app() -> TestApp {
    let db = Arc::new(
        db::establish_connection_with_config(&db::DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("sqlite connection"),
    );
    db::run_migrations(&db).await.expect("migrations");

    let config = AppConfig::new(
        "sqlite::memory:".into(),
        "test_secret_key_for_testing_purposes_only_32chars".into(),
        3600,
        "127.0.0.1".into(),
        0,
        "test".into(),
    );

    let (event_tx, event_rx) = mpsc::channel(64);
    tokio::spawn(events::process_events(event_rx));
    let event_sender = events::EventSender::new(event_tx);

    let auth = Arc::new(AuthService::new(
        AuthConfig::new(config.jwt_secret.clone(), config.jwt_expiration),
        db.clone(),
    ));
    let services = AppServices::new(db.clone(), Some(Arc::new(event_sender.clone())));

    let state = AppState {
        db,
        config,
        event_sender,
        auth,
        services,
    };

    let router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        .with_state(state.clone());

    TestApp { state, router }
}

impl TestApp {
    /// Registers a customer account and returns its id and bearer token
    pub async fn register_customer(&self, email: &str) -> (Uuid, String) {
        let (customer, token) = self
            .state
            .auth
            .register(serde_json::from_value(serde_json::json!({
                "email": email,
                "password": "customer-password-1",
                "fullName": "Test Customer",
                "address": "1 Test Lane",
                "phoneNumber": "555-0100",
            }))
            .expect("register payload"))
            .await
            .expect("register");
        (customer.id, token.access_token)
    }

    /// Inserts an admin account directly and returns a token for it
    pub async fn admin_token(&self) -> String {
        let admin = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(format!("admin-{}@quickbite.test", Uuid::new_v4())),
            full_name: Set("Admin".to_string()),
            password_hash: Set(auth::hash_password("admin-password-123").expect("hash")),
            address: Set(String::new()),
            phone_number: Set(String::new()),
            role: Set(customer::ROLE_ADMIN.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("insert admin");

        self.state
            .auth
            .generate_token(&admin)
            .expect("admin token")
            .access_token
    }

    pub async fn seed_food(&self, name: &str, price: Decimal) -> FoodModel {
        self.state
            .services
            .foods
            .create_food(CreateFoodRequest {
                name: name.to_string(),
                description: format!("{} description", name),
                price,
                calories: 100,
                image: String::new(),
            })
            .await
            .expect("seed food")
    }

    pub async fn seed_combo(
        &self,
        name: &str,
        price: Decimal,
        items: &[(Uuid, i32)],
    ) -> ComboResponse {
        self.state
            .services
            .combos
            .create_combo(CreateComboRequest {
                name: name.to_string(),
                description: format!("{} description", name),
                price,
                items: items
                    .iter()
                    .map(|(food_id, quantity)| ComboItemInput {
                        food_id: *food_id,
                        quantity: *quantity,
                    })
                    .collect(),
            })
            .await
            .expect("seed combo")
    }

    /// Sends one request through the router and decodes the JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router oneshot");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };

        (status, json)
    }
}

/// Decimal fields serialize as JSON strings; parse them back for comparison
pub fn decimal_field(value: &serde_json::Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {}", value))
        .parse()
        .expect("decimal parse")
}
