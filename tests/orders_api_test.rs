mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, spawn_app};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_reports_database_up() {
    let app = spawn_app().await;

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "up");
}

#[tokio::test]
async fn creating_an_order_requires_a_token() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            None,
            Some(json!({
                "orderDetails": [],
                "paymentMethod": "card",
                "address": "1 Test Lane",
                "phoneNumber": "555-0100",
                "customerName": "Nobody"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn full_order_flow_over_http() {
    let app = spawn_app().await;
    let (_, token) = app.register_customer("flow@quickbite.test").await;
    let food = app.seed_food("Burger", dec!(10.00)).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "orderDetails": [{"foodID": food.id, "quantity": 2}],
                "paymentMethod": "card",
                "address": "1 Test Lane",
                "phoneNumber": "555-0100",
                "customerName": "Flow Tester"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Create order successfully");
    assert_eq!(decimal_field(&body["data"]["totalPrice"]), dec!(20.00));
    assert_eq!(body["data"]["status"], "Pending");
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paymentMethod"], "card");

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}/items", order_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Burger");

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/orders/{}", order_id),
            Some(&token),
            Some(json!({"orderStatus": "Finished"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Finished");

    // Terminal orders reject further edits with 400
    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/orders/{}", order_id),
            Some(&token),
            Some(json!({"orderStatus": "Cancelled"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("closed order"));
}

#[tokio::test]
async fn documented_id_keys_are_accepted() {
    let app = spawn_app().await;
    let (_, token) = app.register_customer("wire@quickbite.test").await;
    let fries = app.seed_food("Fries", dec!(3.00)).await;
    let combo = app
        .seed_combo("Snack Deal", dec!(5.00), &[(fries.id, 1)])
        .await;

    // A combo-only order: `orderDetails` may be omitted entirely
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "comboID": combo.id,
                "paymentMethod": "cash",
                "address": "1 Test Lane",
                "phoneNumber": "555-0100",
                "customerName": "Wire Tester"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&body["data"]["totalPrice"]), dec!(5.00));

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "orderDetails": [{"foodID": fries.id, "quantity": 2}],
                "paymentMethod": "cash",
                "address": "1 Test Lane",
                "phoneNumber": "555-0100",
                "customerName": "Wire Tester"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&body["data"]["totalPrice"]), dec!(6.00));
}

#[tokio::test]
async fn customers_cannot_read_each_others_orders() {
    let app = spawn_app().await;
    let (_, alice_token) = app.register_customer("alice@quickbite.test").await;
    let (_, bob_token) = app.register_customer("bob@quickbite.test").await;
    let food = app.seed_food("Burger", dec!(10.00)).await;

    let (_, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&alice_token),
            Some(json!({
                "orderDetails": [{"foodID": food.id, "quantity": 1}],
                "paymentMethod": "cash",
                "address": "1 Test Lane",
                "phoneNumber": "555-0100",
                "customerName": "Alice"
            })),
        )
        .await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            Some(&bob_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins can
    let admin_token = app.admin_token().await;
    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn order_listing_is_admin_only_and_paginated() {
    let app = spawn_app().await;
    let (_, customer_token) = app.register_customer("pages@quickbite.test").await;

    let (status, _) = app
        .request(Method::GET, "/api/v1/orders", Some(&customer_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = app.admin_token().await;
    let (status, body) = app
        .request(
            Method::GET,
            "/api/v1/orders?pageIndex=1&pageSize=5",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["pageIndex"], 1);
    assert_eq!(body["data"]["pagination"]["pageSize"], 5);
    assert_eq!(body["data"]["pagination"]["totalPages"], 0);
    assert!(body["data"]["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn customers_see_only_their_own_orders_under_mine() {
    let app = spawn_app().await;
    let (_, alice_token) = app.register_customer("mine-a@quickbite.test").await;
    let (_, bob_token) = app.register_customer("mine-b@quickbite.test").await;
    let food = app.seed_food("Burger", dec!(10.00)).await;

    app.request(
        Method::POST,
        "/api/v1/orders",
        Some(&alice_token),
        Some(json!({
            "orderDetails": [{"foodID": food.id, "quantity": 1}],
            "paymentMethod": "cash",
            "address": "1 Test Lane",
            "phoneNumber": "555-0100",
            "customerName": "Alice"
        })),
    )
    .await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/orders/mine", Some(&alice_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["orders"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .request(Method::GET, "/api/v1/orders/mine", Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_an_order_hides_it_from_reads() {
    let app = spawn_app().await;
    let (_, token) = app.register_customer("delete@quickbite.test").await;
    let food = app.seed_food("Burger", dec!(10.00)).await;

    let (_, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(&token),
            Some(json!({
                "orderDetails": [{"foodID": food.id, "quantity": 1}],
                "paymentMethod": "cash",
                "address": "1 Test Lane",
                "phoneNumber": "555-0100",
                "customerName": "Deleter"
            })),
        )
        .await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/orders/{}", order_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Delete order successfully");

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_login_and_me_roundtrip() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "roundtrip@quickbite.test",
                "password": "a-long-password",
                "fullName": "Round Trip"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"]["access_token"].is_string());
    // The stored hash never leaves the server
    assert!(body["data"]["customer"].get("passwordHash").is_none());
    assert!(body["data"]["customer"].get("password_hash").is_none());

    // Duplicate email conflicts
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "roundtrip@quickbite.test",
                "password": "a-long-password",
                "fullName": "Round Trip"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({
                "email": "roundtrip@quickbite.test",
                "password": "a-long-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(Method::GET, "/api/v1/auth/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "roundtrip@quickbite.test");

    // Bad password is rejected without detail
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({
                "email": "roundtrip@quickbite.test",
                "password": "wrong-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
