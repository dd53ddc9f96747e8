mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{get, request, send, settings, test_app, SHARED_SECRET};

const AUTH: (&str, &str) = ("x-shared-secret", SHARED_SECRET);

async fn create(app: &axum::Router, body: Value) -> Value {
    let (status, response) = send(app, request("POST", "/api/holdings", &[AUTH], Some(body))).await;
    assert_eq!(status, StatusCode::CREATED, "{response}");
    response["data"].clone()
}

#[tokio::test]
async fn create_show_update_delete() {
    let (app, _) = test_app(settings());

    let created = create(
        &app,
        json!({ "kind": "stock", "name": "Acme", "symbol": "acme", "quantity": 10, "unit_value": "12.5" }),
    )
    .await;
    assert_eq!(created["symbol"], "ACME");
    assert_eq!(created["currency"], "USD");
    assert_eq!(created["user_id"], 1);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, shown) = send(&app, get(&format!("/api/holdings/{id}"), &[AUTH])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["data"]["name"], "Acme");

    let (status, updated) = send(
        &app,
        request(
            "PUT",
            &format!("/api/holdings/{id}"),
            &[AUTH],
            Some(json!({ "kind": "stock", "name": "Acme Holdings", "quantity": 12, "unit_value": 13 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["data"]["name"], "Acme Holdings");
    assert_eq!(updated["data"]["symbol"], Value::Null);

    let (status, body) = send(&app, request("DELETE", &format!("/api/holdings/{id}"), &[AUTH], None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, get(&format!("/api/holdings/{id}"), &[AUTH])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_kind() {
    let (app, _) = test_app(settings());
    create(&app, json!({ "kind": "bond", "name": "Treasury 2030", "quantity": 5, "unit_value": 1000 })).await;
    create(&app, json!({ "kind": "cash", "name": "Checking", "quantity": 1, "unit_value": 2500 })).await;
    create(&app, json!({ "kind": "bond", "name": "Muni", "quantity": 2, "unit_value": 500 })).await;

    let (status, all) = send(&app, get("/api/holdings", &[AUTH])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["data"].as_array().unwrap().len(), 3);

    let (status, bonds) = send(&app, get("/api/holdings?kind=bond", &[AUTH])).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = bonds["data"].as_array().unwrap().iter().map(|h| h["name"].clone()).collect();
    assert_eq!(names, vec![json!("Muni"), json!("Treasury 2030")]);

    let (status, body) = send(&app, get("/api/holdings?kind=crypto", &[AUTH])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("crypto"));
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let (app, _) = test_app(settings());

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/holdings",
            &[AUTH],
            Some(json!({ "kind": "cash", "name": " ", "quantity": -1, "unit_value": 1, "currency": "usdollars" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["name"].is_string());
    assert!(body["field_errors"]["quantity"].is_string());
    assert!(body["field_errors"]["currency"].is_string());

    let (status, body) = send(
        &app,
        request("POST", "/api/holdings", &[AUTH], Some(json!({ "kind": "yacht", "name": "Boat" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let (app, _) = test_app(settings());

    let (status, _) = send(&app, get("/api/holdings/not-a-uuid", &[AUTH])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = uuid::Uuid::new_v4();
    let (status, _) = send(&app, get(&format!("/api/holdings/{unknown}"), &[AUTH])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("DELETE", &format!("/api/holdings/{unknown}"), &[AUTH], None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn holdings_require_credentials() {
    let (app, _) = test_app(settings());

    let (status, _) = send(
        &app,
        request("POST", "/api/holdings", &[], Some(json!({ "kind": "cash", "name": "x", "quantity": 1, "unit_value": 1 }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn summary_nets_liabilities() {
    let (app, _) = test_app(settings());
    create(&app, json!({ "kind": "stock", "name": "Index fund", "quantity": 100, "unit_value": 50 })).await;
    create(&app, json!({ "kind": "private_equity", "name": "Fund III", "quantity": 1, "unit_value": 20000 })).await;
    create(&app, json!({ "kind": "liability", "name": "Mortgage", "quantity": 1, "unit_value": 15000 })).await;
    create(&app, json!({ "kind": "cash", "name": "Euro account", "quantity": 1, "unit_value": 300, "currency": "eur" })).await;

    let (status, body) = send(&app, get("/api/portfolio/summary", &[AUTH])).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let summary = &body["data"];
    assert_eq!(summary["holding_count"], 4);

    let currencies = summary["currencies"].as_array().unwrap();
    assert_eq!(currencies.len(), 2);
    assert_eq!(currencies[0]["currency"], "EUR");

    let usd = &currencies[1];
    assert_eq!(usd["currency"], "USD");
    let net: f64 = usd["net_worth"].as_str().unwrap().parse().unwrap();
    assert_eq!(net, 10_000.0);
    let liabilities: f64 = usd["liabilities"].as_str().unwrap().parse().unwrap();
    assert_eq!(liabilities, 15_000.0);
}
