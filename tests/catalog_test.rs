mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, spawn_app};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn catalog_browsing_is_public() {
    let app = spawn_app().await;
    app.seed_food("Burger", dec!(10.00)).await;

    let (status, body) = app.request(Method::GET, "/api/v1/foods", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["foods"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["foods"][0]["name"], "Burger");

    let (status, body) = app.request(Method::GET, "/api/v1/combos", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["combos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn food_mutations_require_an_admin() {
    let app = spawn_app().await;
    let (_, customer_token) = app.register_customer("caterer@quickbite.test").await;

    let payload = json!({
        "name": "Salad",
        "description": "Green",
        "price": "4.00",
        "calories": 120
    });

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/foods",
            Some(&customer_token),
            Some(payload.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = app.admin_token().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/foods",
            Some(&admin_token),
            Some(payload),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&body["data"]["price"]), dec!(4.00));
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/foods",
            Some(&admin_token),
            Some(json!({
                "name": "Broken",
                "price": "-1.00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_and_deleting_a_food() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;
    let food = app.seed_food("Burger", dec!(10.00)).await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/v1/foods/{}", food.id),
            Some(&admin_token),
            Some(json!({
                "name": "Double Burger",
                "description": "Twice the burger",
                "price": "12.00",
                "calories": 900
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Double Burger");
    assert_eq!(decimal_field(&body["data"]["price"]), dec!(12.00));

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/foods/{}", food.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(Method::GET, &format!("/api/v1/foods/{}", food.id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.request(Method::GET, "/api/v1/foods", None, None).await;
    assert!(body["data"]["foods"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn combo_creation_validates_its_items() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;
    let fries = app.seed_food("Fries", dec!(3.00)).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/combos",
            Some(&admin_token),
            Some(json!({
                "name": "Empty Deal",
                "price": "5.00",
                "items": []
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/combos",
            Some(&admin_token),
            Some(json!({
                "name": "Ghost Deal",
                "price": "5.00",
                "items": [{"foodID": uuid::Uuid::new_v4(), "quantity": 1}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/combos",
            Some(&admin_token),
            Some(json!({
                "name": "Snack Deal",
                "price": "5.00",
                "items": [{"foodID": fries.id, "quantity": 2}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["items"][0]["name"], "Fries");
    assert_eq!(body["data"]["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn combo_read_and_soft_delete() {
    let app = spawn_app().await;
    let fries = app.seed_food("Fries", dec!(3.00)).await;
    let combo = app
        .seed_combo("Snack Deal", dec!(5.00), &[(fries.id, 1)])
        .await;

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/combos/{}", combo.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&body["data"]["price"]), dec!(5.00));
    assert_eq!(body["data"]["items"][0]["foodId"], fries.id.to_string());

    let admin_token = app.admin_token().await;
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/combos/{}", combo.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/combos/{}", combo.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn food_keyword_search_matches_names() {
    let app = spawn_app().await;
    app.seed_food("Cheese Burger", dec!(10.00)).await;
    app.seed_food("Veggie Burger", dec!(9.00)).await;
    app.seed_food("Fries", dec!(3.00)).await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/foods?keyword=Burger", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["foods"].as_array().unwrap().len(), 2);
}
