//! Shopper journeys through the storefront against the fake backend.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use shopfront_integration_tests::{
    Backend, PASSWORD, SHOPPER_EMAIL, browser, location, spawn_storefront,
};

async fn get_text(client: &reqwest::Client, url: String) -> String {
    client.get(url).send().await.unwrap().text().await.unwrap()
}

/// Post a form the way htmx does.
async fn hx_post(
    client: &reqwest::Client,
    url: String,
    form: &[(&str, &str)],
) -> reqwest::Response {
    client
        .post(url)
        .header("HX-Request", "true")
        .form(form)
        .send()
        .await
        .unwrap()
}

fn hx_trigger(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("hx-trigger")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_catalog_hides_drafts() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    let body = client
        .get(format!("{store}/products"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Canvas Tote"));
    assert!(body.contains("Enamel Mug"));
    assert!(!body.contains("Prototype Kettle"));

    let draft = client
        .get(format!("{store}/products/4"))
        .send()
        .await
        .unwrap();
    assert_eq!(draft.status(), StatusCode::NOT_FOUND);

    let detail = client
        .get(format!("{store}/products/2"))
        .send()
        .await
        .unwrap();
    assert_eq!(detail.status(), StatusCode::OK);
    let body = detail.text().await.unwrap();
    assert!(body.contains("Leather Satchel"));
    assert!(body.contains("$89.00"));
}

#[tokio::test]
async fn test_add_to_cart_then_checkout() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    let added = client
        .post(format!("{store}/cart/add"))
        .form(&[
            ("product_id", "1"),
            ("quantity", "2"),
            ("return_to", "/products/1"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(added.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&added), "/products/1");

    let cart = client
        .get(format!("{store}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains("Canvas Tote"));
    assert!(cart.contains("$39.98"));

    // Missing fields re-render the form instead of placing the order
    let incomplete = client
        .post(format!("{store}/checkout"))
        .form(&[("name", "Ada Lovelace"), ("email", "not-an-email")])
        .send()
        .await
        .unwrap();
    assert_eq!(incomplete.status(), StatusCode::OK);
    assert!(!incomplete.text().await.unwrap().contains("has been placed"));

    let placed = client
        .post(format!("{store}/checkout"))
        .form(&[
            ("name", "Ada Lovelace"),
            ("email", "ada@example.com"),
            ("address", "12 Analytical Way"),
            ("city", "London"),
            ("postal_code", "N1 9GU"),
            ("country", "UK"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(placed.status(), StatusCode::OK);
    let body = placed.text().await.unwrap();
    assert!(body.contains("has been placed"));

    // The cart is emptied by a successful checkout
    let again = client
        .post(format!("{store}/checkout"))
        .form(&[("name", "Ada Lovelace")])
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&again), "/cart");
}

#[tokio::test]
async fn test_out_of_stock_and_draft_products_stay_out_of_cart() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    for id in ["3", "4"] {
        let response = client
            .post(format!("{store}/cart/add"))
            .form(&[("product_id", id)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/cart");
    }

    let cart = client
        .get(format!("{store}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains("Your cart is empty."));
    assert!(cart.contains("Enamel Mug is out of stock"));
}

#[tokio::test]
async fn test_add_clamps_to_stock() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    let added = client
        .post(format!("{store}/cart/add"))
        .form(&[("product_id", "1"), ("quantity", "9")])
        .send()
        .await
        .unwrap();
    assert_eq!(added.status(), StatusCode::SEE_OTHER);

    let count = get_text(&client, format!("{store}/cart/count")).await;
    assert!(count.contains(">5</span>"));
    let cart = get_text(&client, format!("{store}/cart")).await;
    assert!(cart.contains("Only 5 of Canvas Tote available"));

    // Raising the line from the cart page cannot pass the stock level either
    client
        .post(format!("{store}/cart/increase"))
        .form(&[("product_id", "1")])
        .send()
        .await
        .unwrap();
    client
        .post(format!("{store}/cart/update"))
        .form(&[("product_id", "1"), ("quantity", "40")])
        .send()
        .await
        .unwrap();
    let count = get_text(&client, format!("{store}/cart/count")).await;
    assert!(count.contains(">5</span>"));

    let lowered = client
        .post(format!("{store}/cart/update"))
        .form(&[("product_id", "1"), ("quantity", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&lowered), "/cart");
    let count = get_text(&client, format!("{store}/cart/count")).await;
    assert!(count.contains(">3</span>"));
}

#[tokio::test]
async fn test_htmx_cart_actions_return_badge() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    let added = hx_post(&client, format!("{store}/cart/add"), &[("product_id", "2")]).await;
    assert_eq!(added.status(), StatusCode::OK);
    assert!(hx_trigger(&added).contains("cart-updated"));
    let body = added.text().await.unwrap();
    assert!(body.contains("id=\"cart-count\""));
    assert!(body.contains(">1</span>"));

    // A refused add still answers with the badge, and the toast rides on the trigger
    let refused = hx_post(&client, format!("{store}/cart/add"), &[("product_id", "3")]).await;
    assert_eq!(refused.status(), StatusCode::OK);
    let trigger = hx_trigger(&refused);
    assert!(trigger.contains("cart-updated"));
    assert!(trigger.contains("Enamel Mug is out of stock"));
    assert!(refused.text().await.unwrap().contains(">1</span>"));

    let increased = hx_post(
        &client,
        format!("{store}/cart/increase"),
        &[("product_id", "2")],
    )
    .await;
    assert_eq!(increased.status(), StatusCode::OK);
    assert!(increased.text().await.unwrap().contains(">2</span>"));

    // Leather Satchel has two in stock
    let capped = hx_post(
        &client,
        format!("{store}/cart/increase"),
        &[("product_id", "2")],
    )
    .await;
    assert!(hx_trigger(&capped).contains("Only 2 of Leather Satchel available"));
    assert!(capped.text().await.unwrap().contains(">2</span>"));

    let missing = hx_post(&client, format!("{store}/cart/remove"), &[("product_id", "9")]).await;
    assert_eq!(missing.status(), StatusCode::OK);
    assert!(hx_trigger(&missing).contains("no longer in your cart"));

    let cleared = hx_post(&client, format!("{store}/cart/clear"), &[]).await;
    assert_eq!(cleared.status(), StatusCode::OK);
    assert!(cleared.text().await.unwrap().contains(">0</span>"));

    let toggled = hx_post(
        &client,
        format!("{store}/wishlist/toggle"),
        &[("product_id", "1")],
    )
    .await;
    assert_eq!(toggled.status(), StatusCode::OK);
    assert!(hx_trigger(&toggled).contains("Saved Canvas Tote to your wishlist"));
}

#[tokio::test]
async fn test_wishlist_save_move_and_remove() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();
    let toggle = |id: &'static str| {
        client
            .post(format!("{store}/wishlist/toggle"))
            .form(&[("product_id", id), ("return_to", "/products")])
            .send()
    };

    for id in ["1", "3"] {
        let saved = toggle(id).await.unwrap();
        assert_eq!(saved.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&saved), "/products");
    }
    let draft = toggle("4").await.unwrap();
    assert_eq!(location(&draft), "/products");

    let page = get_text(&client, format!("{store}/wishlist")).await;
    assert!(page.contains("Canvas Tote"));
    assert!(page.contains("Enamel Mug"));
    assert!(!page.contains("Prototype Kettle"));
    assert!(page.contains("That product is no longer available"));

    // Sold out: refused like a direct add, and the mug stays saved
    let refused = client
        .post(format!("{store}/wishlist/move-to-cart"))
        .form(&[("product_id", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&refused), "/wishlist");
    let page = get_text(&client, format!("{store}/wishlist")).await;
    assert!(page.contains("Enamel Mug is out of stock"));
    assert!(page.contains("href=\"/products/3\""));
    let count = get_text(&client, format!("{store}/cart/count")).await;
    assert!(count.contains(">0</span>"));

    let moved = client
        .post(format!("{store}/wishlist/move-to-cart"))
        .form(&[("product_id", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&moved), "/wishlist");
    // The toast is queued for whichever page renders next
    let page = get_text(&client, format!("{store}/wishlist")).await;
    assert!(page.contains("Moved Canvas Tote to your cart"));
    assert!(!page.contains("href=\"/products/1\""));
    let cart = get_text(&client, format!("{store}/cart")).await;
    assert!(cart.contains("Canvas Tote"));
    assert!(cart.contains("$19.99"));
    assert!(!cart.contains("Moved Canvas Tote to your cart"));

    let removed = client
        .post(format!("{store}/wishlist/remove"))
        .form(&[("product_id", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&removed), "/wishlist");
    let page = get_text(&client, format!("{store}/wishlist")).await;
    assert!(page.contains("Nothing saved yet."));

    // Toggling a saved product unsaves it
    toggle("2").await.unwrap();
    toggle("2").await.unwrap();
    let page = get_text(&client, format!("{store}/wishlist")).await;
    assert!(page.contains("Nothing saved yet."));

    toggle("1").await.unwrap();
    toggle("2").await.unwrap();
    let cleared = client
        .post(format!("{store}/wishlist/clear"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&cleared), "/wishlist");
    let page = get_text(&client, format!("{store}/wishlist")).await;
    assert!(page.contains("Your wishlist is empty"));
    assert!(page.contains("Nothing saved yet."));
}

#[tokio::test]
async fn test_return_to_must_be_local() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    for target in ["//evil.example", "https://evil.example/", "/\\evil.example"] {
        let added = client
            .post(format!("{store}/cart/add"))
            .form(&[("product_id", "1"), ("return_to", target)])
            .send()
            .await
            .unwrap();
        assert_eq!(location(&added), "/cart", "{target}");

        let saved = client
            .post(format!("{store}/wishlist/remove"))
            .form(&[("product_id", "1"), ("return_to", target)])
            .send()
            .await
            .unwrap();
        assert_eq!(location(&saved), "/wishlist", "{target}");
    }
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    let anonymous = client.get(format!("{store}/account")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&anonymous), "/auth/login");

    let rejected = client
        .post(format!("{store}/auth/login"))
        .form(&[("email", SHOPPER_EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::OK);
    assert!(rejected.text().await.unwrap().contains(SHOPPER_EMAIL));

    // The domain is matched case-insensitively
    let signed_in = client
        .post(format!("{store}/auth/login"))
        .form(&[("email", " shopper@EXAMPLE.com "), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(signed_in.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&signed_in), "/account");

    let account = get_text(&client, format!("{store}/account")).await;
    assert!(account.contains("Hello, Sam Shopper"));
    assert!(account.contains(SHOPPER_EMAIL));

    // A signed-in shopper is sent past the login page
    let login_page = client
        .get(format!("{store}/auth/login"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&login_page), "/account");

    let signed_out = client
        .post(format!("{store}/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&signed_out), "/");
    let again = client.get(format!("{store}/account")).send().await.unwrap();
    assert_eq!(location(&again), "/auth/login");
}

#[tokio::test]
async fn test_register_signs_in_or_reports_conflict() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    let taken = client
        .post(format!("{store}/auth/register"))
        .form(&[
            ("name", "Sam Again"),
            ("email", SHOPPER_EMAIL),
            ("password", "correct horse"),
            ("password_confirm", "correct horse"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(taken.status(), StatusCode::OK);
    assert!(taken.text().await.unwrap().contains("Email already registered"));

    let invalid = client
        .post(format!("{store}/auth/register"))
        .form(&[
            ("name", "Ada"),
            ("email", "ada@localhost"),
            ("password", "short"),
            ("password_confirm", "short"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::OK);
    let body = invalid.text().await.unwrap();
    assert!(body.contains("Invalid email"));
    assert!(body.contains("Password must be at least 8 characters"));

    let created = client
        .post(format!("{store}/auth/register"))
        .form(&[
            ("name", "Ada Lovelace"),
            ("email", "ada@example.com"),
            ("password", "correct horse"),
            ("password_confirm", "correct horse"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), "/account");
    let account = get_text(&client, format!("{store}/account")).await;
    assert!(account.contains("Hello, Ada Lovelace"));
}

#[tokio::test]
async fn test_theme_css_defaults_without_file() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;

    let response = browser()
        .get(format!("{store}/theme.css"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"));
    assert!(response.text().await.unwrap().contains("--color-primary"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let backend = Backend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let store = spawn_storefront(&backend, &dir.path().join("theme.json")).await;
    let client = browser();

    let live = client.get(format!("{store}/health")).send().await.unwrap();
    assert_eq!(live.status(), StatusCode::OK);

    let ready = client
        .get(format!("{store}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}
