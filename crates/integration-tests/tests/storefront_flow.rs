//! End-to-end storefront flows against an in-memory catalog.
//!
//! Run with: `cargo test -p emporium-integration-tests`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};

use emporium_integration_tests::{TestStorefront, location, product};

async fn storefront() -> TestStorefront {
    TestStorefront::start(vec![
        product("a1", "Desk Lamp", 100),
        product("b2", "Reading Chair", 250),
    ])
    .await
}

async fn body(client: &Client, url: String) -> (StatusCode, String) {
    let response = client.get(url).send().await.expect("GET failed");
    let status = response.status();
    (status, response.text().await.expect("Failed to read body"))
}

async fn add_to_cart(shop: &TestStorefront, client: &Client, id: &str) {
    let response = client
        .post(shop.url("/cart/add"))
        .form(&[("product_id", id), ("return_to", "/products")])
        .send()
        .await
        .expect("Add to cart failed");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products");
}

async fn cart_count(shop: &TestStorefront, client: &Client) -> String {
    let (status, html) = body(client, shop.url("/cart/count")).await;
    assert_eq!(status, StatusCode::OK);
    html.trim().to_string()
}

/// The clear form as submitted before the visitor has answered.
const NO_ANSWER: &[(&str, &str)] = &[];

fn badge(count: u32) -> String {
    format!(r#"<span class="badge" id="cart-count">{count}</span>"#)
}

// ============================================================================
// Route Guard & Sign-in
// ============================================================================

#[tokio::test]
async fn test_guard_redirects_then_login_returns_to_page() {
    let shop = storefront().await;
    let client = shop.visitor();

    let response = client.get(shop.url("/cart")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fcart");

    let response = client
        .post(shop.url("/login?next=%2Fcart"))
        .form(&[("email", "ada@example.com"), ("password", "pw")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    let (status, html) = body(&client, shop.url("/cart")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Your cart is empty"));
    assert!(html.contains(r#"<span class="avatar" title="ada@example.com">A</span>"#));
}

#[tokio::test]
async fn test_login_requires_fields() {
    let shop = storefront().await;
    let response = shop
        .visitor()
        .post(shop.url("/login"))
        .form(&[("email", ""), ("password", "")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text().await.unwrap();
    assert!(html.contains("Email is required"));
    assert!(html.contains("Password is required"));
}

#[tokio::test]
async fn test_login_accepts_long_identifier() {
    let shop = storefront().await;
    let client = shop.visitor();
    let long = "a".repeat(300);

    let response = client
        .post(shop.url("/login"))
        .form(&[("email", long.as_str()), ("password", "pw")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let (status, html) = body(&client, shop.url("/cart")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&format!(r#"title="{long}""#)));
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let shop = storefront().await;
    let response = shop
        .visitor()
        .post(shop.url("/login?next=%2F%2Fevil.example"))
        .form(&[("email", "ada"), ("password", "pw")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_signup_password_mismatch() {
    let shop = storefront().await;
    let client = shop.visitor();

    let response = client
        .post(shop.url("/signup"))
        .form(&[
            ("name", "Grace"),
            ("email", "grace@example.com"),
            ("password", "one"),
            ("confirm_password", "two"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text().await.unwrap();
    assert!(html.contains("Passwords do not match"));
    assert!(html.contains(r#"value="grace@example.com""#));

    // Nothing was signed in.
    let response = client.get(shop.url("/checkout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_signup_signs_in() {
    let shop = storefront().await;
    let client = shop.visitor();

    let response = client
        .post(shop.url("/signup"))
        .form(&[
            ("name", "Grace"),
            ("email", "grace@example.com"),
            ("password", "same"),
            ("confirm_password", "same"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let (_, html) = body(&client, shop.url("/")).await;
    assert!(html.contains(r#"<span class="avatar" title="grace@example.com">G</span>"#));
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;
    add_to_cart(&shop, &client, "a1").await;

    let response = client.post(shop.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = client.get(shop.url("/cart")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(cart_count(&shop, &client).await, badge(1));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_anonymous_add_and_badge() {
    let shop = storefront().await;
    let client = shop.visitor();

    assert_eq!(cart_count(&shop, &client).await, badge(0));
    add_to_cart(&shop, &client, "a1").await;
    assert_eq!(cart_count(&shop, &client).await, badge(1));

    // Each visitor has their own cart.
    assert_eq!(cart_count(&shop, &shop.visitor()).await, badge(0));
}

#[tokio::test]
async fn test_add_duplicate_appends_entry() {
    let shop = storefront().await;
    let client = shop.visitor();

    add_to_cart(&shop, &client, "a1").await;
    add_to_cart(&shop, &client, "a1").await;
    assert_eq!(cart_count(&shop, &client).await, badge(2));
}

#[tokio::test]
async fn test_add_unknown_product_is_404() {
    let shop = storefront().await;
    let response = shop
        .visitor()
        .post(shop.url("/cart/add"))
        .form(&[("product_id", "missing")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_ignores_offsite_return_to() {
    let shop = storefront().await;
    let response = shop
        .visitor()
        .post(shop.url("/cart/add"))
        .form(&[("product_id", "a1"), ("return_to", "https://evil.example/")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products");
}

#[tokio::test]
async fn test_quantity_and_checkout_totals() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;
    add_to_cart(&shop, &client, "a1").await;

    let response = client
        .post(shop.url("/cart/quantity"))
        .form(&[("product_id", "a1"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    // Below one is ignored.
    client
        .post(shop.url("/cart/quantity"))
        .form(&[("product_id", "a1"), ("quantity", "0")])
        .send()
        .await
        .unwrap();

    let (status, html) = body(&client, shop.url("/checkout")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("₹200.00"));
    assert!(html.contains("₹36.00"));
    assert!(html.contains("₹236.00"));
}

#[tokio::test]
async fn test_remove_deletes_product() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;
    add_to_cart(&shop, &client, "a1").await;
    add_to_cart(&shop, &client, "b2").await;

    let response = client
        .post(shop.url("/cart/remove"))
        .form(&[("product_id", "a1")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, html) = body(&client, shop.url("/cart")).await;
    assert!(!html.contains("Desk Lamp"));
    assert!(html.contains("Reading Chair"));
}

#[tokio::test]
async fn test_clear_asks_for_confirmation() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;
    add_to_cart(&shop, &client, "a1").await;

    let response = client
        .post(shop.url("/cart/clear"))
        .form(NO_ANSWER)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Clear your cart?"));

    let response = client
        .post(shop.url("/cart/clear"))
        .form(&[("confirm", "no")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/cart");
    assert_eq!(cart_count(&shop, &client).await, badge(1));

    let response = client
        .post(shop.url("/cart/clear"))
        .form(&[("confirm", "yes")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/cart");
    assert_eq!(cart_count(&shop, &client).await, badge(0));
}

#[tokio::test]
async fn test_clear_empty_cart_skips_confirmation() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;

    let response = client
        .post(shop.url("/cart/clear"))
        .form(NO_ANSWER)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_checkout_empty_cart_goes_to_cart() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;

    let response = client.get(shop.url("/checkout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_buy_now_single_product() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;

    let (status, html) = body(&client, shop.url("/buy-now/b2")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Reading Chair"));
    assert!(html.contains("₹295.00"));

    let (status, _) = body(&client, shop.url("/buy-now/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_listing_and_detail() {
    let shop = storefront().await;
    let client = shop.visitor();

    let (status, html) = body(&client, shop.url("/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Desk Lamp"));
    assert!(html.contains("₹130.00"));

    let (status, html) = body(&client, shop.url("/products/a1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Desk Lamp for every room"));

    let (status, html) = body(&client, shop.url("/products/zzz")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Product not found"));
}

#[tokio::test]
async fn test_delete_success_updates_listing_without_refetch() {
    let shop = storefront().await;
    let client = shop.visitor();

    body(&client, shop.url("/products")).await;
    let calls = shop.catalog.list_calls();

    let response = client
        .post(shop.url("/products/a1/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products?success=deleted");

    let (_, html) = body(&client, shop.url("/products?success=deleted")).await;
    assert!(html.contains("Product deleted successfully"));
    assert!(!html.contains("Desk Lamp"));
    assert_eq!(shop.catalog.list_calls(), calls);
    assert_eq!(shop.catalog.products().len(), 1);
}

#[tokio::test]
async fn test_delete_failure_reconciles_listing() {
    let shop = storefront().await;
    let client = shop.visitor();

    body(&client, shop.url("/products")).await;
    let calls = shop.catalog.list_calls();
    shop.catalog.fail_deletes(true);

    let response = client
        .post(shop.url("/products/a1/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products?error=delete_failed");

    let (_, html) = body(&client, shop.url("/products?error=delete_failed")).await;
    assert!(html.contains("Error deleting product"));
    assert!(html.contains("Desk Lamp"));
    assert_eq!(shop.catalog.list_calls(), calls + 1);
}

#[tokio::test]
async fn test_create_product_validation_and_success() {
    let shop = storefront().await;
    let client = shop.signed_in_visitor("ada").await;

    let response = client
        .post(shop.url("/products/new"))
        .form(&[("name", ""), ("price", "abc"), ("category", "home")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text().await.unwrap();
    assert!(html.contains("Product name is required"));
    assert!(html.contains("Valid price is required"));
    assert!(shop.catalog.created().is_empty());

    let response = client
        .post(shop.url("/products/new"))
        .form(&[
            ("name", "Floor Lamp"),
            ("description", "Tall and warm"),
            ("price", "49.50"),
            ("image", "https://img.example/floor.jpg"),
            ("category", "home"),
            ("stock", "5"),
            ("brand", ""),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products/new?success=created");

    let created = shop.catalog.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["name"], "Floor Lamp");
    assert_eq!(created[0]["price"], 49.5);
    assert_eq!(created[0]["category"], "home");

    // The cached listing was invalidated.
    let (_, html) = body(&client, shop.url("/products")).await;
    assert!(html.contains("Floor Lamp"));
}
