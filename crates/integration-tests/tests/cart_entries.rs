//! HTTP tests for the cart entry endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use cart_entries_core::{LocationName, ProductCode, SiteId, StockStatus};
use cart_entries_integration_tests::{SITE, TestContext, entries_path, entry};
use cart_entries_storefront::platform::InMemoryStockFacade;

fn site() -> SiteId {
    SiteId::parse(SITE).unwrap()
}

fn product(code: &str) -> ProductCode {
    ProductCode::parse(code).unwrap()
}

fn store(name: &str) -> LocationName {
    LocationName::parse(name).unwrap()
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::with_entries(Vec::new(), InMemoryStockFacade::new());
    let response = ctx.send(Method::GET, "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.request_id.is_some());
}

#[tokio::test]
async fn test_list_entries_uses_default_fields() {
    let ctx = TestContext::with_entries(
        vec![entry(0, "A", 1, None), entry(1, "B", 2, Some("Store1"))],
        InMemoryStockFacade::new(),
    );

    let response = ctx.send(Method::GET, &entries_path(""), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "orderEntries": [
                { "entryNumber": 0, "quantity": 1, "product": { "code": "A" } },
                {
                    "entryNumber": 1,
                    "quantity": 2,
                    "product": { "code": "B" },
                    "deliveryPointOfService": { "name": "Store1" }
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_fields_levels_and_lists() {
    let ctx = TestContext::with_entries(vec![entry(0, "A", 3, None)], InMemoryStockFacade::new());

    let response = ctx
        .send(Method::GET, &entries_path("/0?fields=BASIC"), None)
        .await;
    assert_eq!(response.body, json!({ "entryNumber": 0, "quantity": 3 }));

    let response = ctx
        .send(Method::GET, &entries_path("/0?fields=product(code)"), None)
        .await;
    assert_eq!(response.body, json!({ "product": { "code": "A" } }));

    let response = ctx
        .send(Method::GET, &entries_path("/0?fields=product(code"), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["subject"], "fields");
}

#[tokio::test]
async fn test_deeply_nested_fields_are_rejected() {
    let ctx = TestContext::with_entries(vec![entry(0, "A", 3, None)], InMemoryStockFacade::new());

    for depth in [17, 20_000] {
        let fields = format!("{}a{}", "a(".repeat(depth), ")".repeat(depth));
        let response = ctx
            .send(Method::GET, &entries_path(&format!("/0?fields={fields}")), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["errors"][0]["type"], "ValidationError");
        assert_eq!(response.body["errors"][0]["subject"], "fields");
    }

    let response = ctx.send(Method::GET, "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_unknown_entry() {
    let ctx = TestContext::with_entries(vec![entry(0, "A", 1, None)], InMemoryStockFacade::new());

    let response = ctx.send(Method::GET, &entries_path("/5"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body,
        json!({
            "errors": [{
                "type": "CartEntryError",
                "reason": "notFound",
                "subject": "5",
                "message": "Entry not found"
            }]
        })
    );
}

#[tokio::test]
async fn test_non_numeric_entry_number() {
    let ctx = TestContext::with_entries(Vec::new(), InMemoryStockFacade::new());

    let response = ctx.send(Method::GET, &entries_path("/first"), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["subject"], "entryNumber");
}

#[tokio::test]
async fn test_patch_quantity() {
    let ctx = TestContext::with_entries(vec![entry(0, "A", 2, None)], InMemoryStockFacade::new());

    let response = ctx
        .send(Method::PATCH, &entries_path("/0"), Some(json!({ "quantity": 5 })))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["statusCode"], "success");
    assert_eq!(response.body["quantity"], 5);
    assert_eq!(response.body["quantityAdded"], 3);
    assert_eq!(response.body["deliveryModeChanged"], false);
}

#[tokio::test]
async fn test_put_moves_entry_to_free_store() {
    let ctx = TestContext::with_entries(
        vec![entry(0, "A", 1, Some("Store1"))],
        InMemoryStockFacade::new(),
    );

    let response = ctx
        .send(
            Method::PUT,
            &entries_path("/0"),
            Some(json!({ "deliveryPointOfService": { "name": "Store2" } })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["deliveryModeChanged"], true);
    assert_eq!(
        response.body["entry"]["deliveryPointOfService"]["name"],
        "Store2"
    );
}

#[tokio::test]
async fn test_put_onto_occupied_store_is_ambiguous() {
    let ctx = TestContext::with_entries(
        vec![
            entry(0, "A", 1, Some("Store1")),
            entry(1, "A", 1, Some("Store2")),
        ],
        InMemoryStockFacade::new(),
    );

    let response = ctx
        .send(
            Method::PUT,
            &entries_path("/0"),
            Some(json!({ "deliveryPointOfService": { "name": "Store2" } })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["errors"][0]["reason"], "ambiguousEntry");
    assert_eq!(response.body["errors"][0]["subject"], "1");
    assert_eq!(ctx.carts.write_count(), 0);
}

#[tokio::test]
async fn test_put_without_location_switches_to_shipping() {
    let ctx = TestContext::with_entries(
        vec![entry(0, "A", 1, Some("Store1"))],
        InMemoryStockFacade::new(),
    );

    let response = ctx
        .send(
            Method::PUT,
            &entries_path("/0"),
            Some(json!({ "quantity": 1, "deliveryPointOfService": { "name": "" } })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(ctx.entries().await[0].location.is_none());
}

#[tokio::test]
async fn test_put_with_other_product_code() {
    let ctx = TestContext::with_entries(vec![entry(0, "A", 1, None)], InMemoryStockFacade::new());

    let response = ctx
        .send(
            Method::PUT,
            &entries_path("/0"),
            Some(json!({ "product": { "code": "B" }, "quantity": 2 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["reason"], "productCodeNotMatch");
}

#[tokio::test]
async fn test_post_out_of_stock_online() {
    let stock = InMemoryStockFacade::new().with_site_stock(site(), product("B"), StockStatus::OutOfStock);
    let ctx = TestContext::with_entries(Vec::new(), stock);

    let response = ctx
        .send(
            Method::POST,
            &entries_path(""),
            Some(json!({ "product": { "code": "B" }, "quantity": 1 })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.body["errors"][0],
        json!({
            "type": "ProductLowStockError",
            "reason": "noStock",
            "subject": "B",
            "message": "Product [B] is currently out of stock"
        })
    );
    assert!(ctx.entries().await.is_empty());
}

#[tokio::test]
async fn test_post_low_stock_pickup_rejected_but_shipping_accepted() {
    let stock = InMemoryStockFacade::new()
        .with_location_stock(store("Store1"), product("B"), StockStatus::LowStock)
        .with_site_stock(site(), product("B"), StockStatus::LowStock);
    let ctx = TestContext::with_entries(Vec::new(), stock);

    let response = ctx
        .send(
            Method::POST,
            &entries_path(""),
            Some(json!({
                "product": { "code": "B" },
                "quantity": 1,
                "deliveryPointOfService": { "name": "Store1" }
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["errors"][0]["reason"], "lowStock");

    let response = ctx
        .send(
            Method::POST,
            &entries_path(""),
            Some(json!({ "product": { "code": "B" } })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["quantity"], 1);
}

#[tokio::test]
async fn test_post_with_stock_system_disabled() {
    let stock = InMemoryStockFacade::new().with_disabled_site(site());
    let ctx = TestContext::with_entries(Vec::new(), stock);

    let response = ctx
        .send(
            Method::POST,
            &entries_path(""),
            Some(json!({ "product": { "code": "B" } })),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["errors"][0]["type"], "StockSystemError");
    assert_eq!(response.body["errors"][0]["subject"], SITE);
}

#[tokio::test]
async fn test_post_with_malformed_body() {
    let ctx = TestContext::with_entries(Vec::new(), InMemoryStockFacade::new());

    let response = ctx
        .send(
            Method::POST,
            &entries_path(""),
            Some(json!({ "product": { "code": "B" }, "quantity": "two" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["type"], "ValidationError");

    let response = ctx
        .send(
            Method::POST,
            &entries_path(""),
            Some(json!({ "product": { "code": "B" }, "quantity": 0 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["subject"], "quantity");
}

#[tokio::test]
async fn test_delete_entry() {
    let ctx = TestContext::with_entries(
        vec![entry(2, "A", 1, None), entry(3, "B", 1, None)],
        InMemoryStockFacade::new(),
    );

    let response = ctx.send(Method::DELETE, &entries_path("/3"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::Value::Null);

    let remaining = ctx.entries().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].entry_number.as_u32(), 2);

    let response = ctx.send(Method::DELETE, &entries_path("/3"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let ctx = TestContext::with_entries(Vec::new(), InMemoryStockFacade::new());

    let response = ctx.send(Method::GET, &entries_path(""), None).await;
    let id = response.request_id.unwrap();
    assert!(!id.is_empty());
}
