mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::StubCatalog;
use serde_json::Value;
use sql_chat_console::backend::HttpBackend;
use sql_chat_console::config::{
    AppConfig, BackendConfig, LogConfig, LogFormat, ServerConfig, UiConfig, ViewsConfig,
};
use sql_chat_console::{AppState, server};
use url::Url;

async fn app(stub: &StubCatalog, show_dashboard_errors: bool) -> TestServer {
    let base_url = stub.spawn().await;
    let config = Arc::new(AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".into(),
        },
        backend: BackendConfig {
            base_url: Url::parse(&base_url).unwrap(),
        },
        views: ViewsConfig {
            idle_timeout_secs: 1800,
            sweep_interval_secs: 60,
        },
        ui: UiConfig {
            htmx_src: "/static/htmx.min.js".into(),
            show_dashboard_errors,
        },
        log: LogConfig {
            format: LogFormat::Compact,
        },
    });
    let backend = Arc::new(HttpBackend::new(&base_url).unwrap());
    let state = AppState::new(config, backend).unwrap();
    TestServer::new(server::build_router(state)).unwrap()
}

/// Pull the view id out of the first `hx-post="<prefix><id>/..."` in a page.
fn view_id(html: &str, prefix: &str) -> String {
    let marker = format!(r#"hx-post="{prefix}"#);
    let start = html.find(&marker).expect("view route in page") + marker.len();
    html[start..].split('/').next().unwrap().to_string()
}

/// Pull the reply URL out of a chat exchange fragment.
fn reply_url(html: &str) -> String {
    attribute_after(html, r#"hx-post=""#)
}

/// Value of the first attribute starting with `marker`, entities decoded.
fn attribute_after(html: &str, marker: &str) -> String {
    let start = html.find(marker).expect("attribute in fragment") + marker.len();
    html[start..]
        .split('"')
        .next()
        .unwrap()
        .replace("&amp;", "&")
}

fn row_count(html: &str) -> usize {
    html.matches(r#"class="row""#).count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Navigation and landing
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_home_page() {
    let server = app(&StubCatalog::default(), false).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Welcome to AI ChatBot"));
    assert!(html.contains("Get Started"));
    for label in ["Home", "Chat", "Dashboard"] {
        assert!(html.contains(&format!(">{label}</a>")), "missing {label} link");
    }
}

#[tokio::test]
async fn test_nav_toggle_fragment() {
    let server = app(&StubCatalog::default(), false).await;

    let closed = server.get("/partials/nav").await.text();
    assert!(!closed.contains("nav-mobile"));
    assert!(closed.contains("open=true"));

    let open = server.get("/partials/nav?open=true&active=chat").await.text();
    assert!(open.contains("nav-mobile"));
    assert!(open.contains("open=false"));
    assert!(open.contains(r#"href="/go/chat""#));
}

#[tokio::test]
async fn test_nav_toggle_round_trip_from_page() {
    let server = app(&StubCatalog::default(), false).await;

    let page = server.get("/").await.text();
    assert!(page.contains(r#"aria-expanded="false""#));
    let open_url = attribute_after(&page, r#"hx-get="/partials/nav"#);
    let opened = server.get(&format!("/partials/nav{open_url}")).await;
    opened.assert_status_ok();
    let opened = opened.text();
    assert!(opened.contains("nav-mobile"));
    assert!(opened.contains(r#"aria-expanded="true""#));

    let close_url = attribute_after(&opened, r#"hx-get="/partials/nav"#);
    let closed = server.get(&format!("/partials/nav{close_url}")).await;
    closed.assert_status_ok();
    assert!(!closed.text().contains("nav-mobile"));
}

#[tokio::test]
async fn test_mobile_link_redirects() {
    let server = app(&StubCatalog::default(), false).await;

    let response = server.get("/go/dashboard").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/dashboard");

    server.get("/go/nowhere").await.assert_status_not_ok();
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_question_and_answer() {
    let stub = StubCatalog::answering("5");
    let server = app(&stub, false).await;

    let page = server.get("/chat").await.text();
    assert!(page.contains("Ask a natural language query about your database"));
    let view = view_id(&page, "/chat/");

    let exchange = server
        .post(&format!("/chat/{view}/messages"))
        .form(&[("message", "How many suppliers are there?")])
        .await;
    exchange.assert_status_ok();
    let exchange = exchange.text();
    assert!(exchange.contains("How many suppliers are there?"));
    assert!(exchange.contains("Thinking..."));

    let transcript: Vec<Value> = server
        .get(&format!("/api/chat/{view}/messages"))
        .await
        .json();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0]["role"], "user");

    let reply = server.post(&reply_url(&exchange)).await;
    reply.assert_status_ok();
    assert!(reply.text().contains("Answer: 5"));

    let transcript: Vec<Value> = server
        .get(&format!("/api/chat/{view}/messages"))
        .await
        .json();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1]["role"], "bot");
    assert_eq!(transcript[1]["text"], "Answer: 5");

    // The same reply cannot be fetched twice.
    server
        .post(&reply_url(&exchange))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    // Replies are never produced by a GET.
    server
        .get(&reply_url(&exchange))
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_chat_failure_shows_fallback() {
    let stub = StubCatalog::default();
    let server = app(&stub, false).await;
    let view = view_id(&server.get("/chat").await.text(), "/chat/");

    let exchange = server
        .post(&format!("/chat/{view}/messages"))
        .form(&[("message", "Which products are cheapest?")])
        .await
        .text();
    let reply = server.post(&reply_url(&exchange)).await.text();
    assert!(reply.contains("Something went wrong!"));
}

#[tokio::test]
async fn test_chat_blank_input_adds_nothing() {
    let stub = StubCatalog::answering("unused");
    let server = app(&stub, false).await;
    let view = view_id(&server.get("/chat").await.text(), "/chat/");

    let response = server
        .post(&format!("/chat/{view}/messages"))
        .form(&[("message", "   ")])
        .await;
    response.assert_status_ok();
    assert!(response.text().is_empty());

    let transcript: Vec<Value> = server
        .get(&format!("/api/chat/{view}/messages"))
        .await
        .json();
    assert!(transcript.is_empty());
    assert!(stub.questions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_each_page_load_starts_a_new_transcript() {
    let stub = StubCatalog::answering("ok");
    let server = app(&stub, false).await;

    let first = view_id(&server.get("/chat").await.text(), "/chat/");
    server
        .post(&format!("/chat/{first}/messages"))
        .form(&[("message", "hello")])
        .await
        .assert_status_ok();

    let second = view_id(&server.get("/chat").await.text(), "/chat/");
    assert_ne!(first, second);
    let transcript: Vec<Value> = server
        .get(&format!("/api/chat/{second}/messages"))
        .await
        .json();
    assert!(transcript.is_empty());
}

#[tokio::test]
async fn test_unknown_view_is_not_found() {
    let server = app(&StubCatalog::default(), false).await;

    server
        .post("/chat/missing/messages")
        .form(&[("message", "hi")])
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/chat/missing/messages")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/dashboard/missing/supplier-options")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard
// ─────────────────────────────────────────────────────────────────────────────

const ACME: [(&str, &str); 3] = [
    ("name", "Acme"),
    ("contact_info", "a@acme.com"),
    ("product_category", "Tools"),
];

#[tokio::test]
async fn test_dashboard_add_supplier() {
    let stub = StubCatalog::default();
    let server = app(&stub, false).await;

    let page = server.get("/dashboard").await;
    page.assert_status_ok();
    let page = page.text();
    assert!(page.contains("Supplier &amp; Product Dashboard"));
    assert_eq!(row_count(&page), 0);
    let view = view_id(&page, "/dashboard/");

    let response = server
        .post(&format!("/dashboard/{view}/suppliers"))
        .form(&ACME)
        .await;
    response.assert_status_ok();
    assert_eq!(response.headers()["hx-trigger"], "suppliers-changed");

    let panel = response.text();
    assert_eq!(row_count(&panel), 1);
    assert!(panel.contains("Acme - a@acme.com - Tools"));
    // Buffer reset after success.
    assert!(panel.contains(r#"name="name" placeholder="Name" value="""#));
    assert_eq!(stub.supplier_count(), 1);

    let options = server
        .get(&format!("/dashboard/{view}/supplier-options"))
        .await
        .text();
    assert!(options.contains(r#"<option value="1">Acme</option>"#));
}

#[tokio::test]
async fn test_dashboard_failed_supplier_keeps_input() {
    let stub = StubCatalog::default();
    stub.fail_writes(true);
    let server = app(&stub, false).await;
    let view = view_id(&server.get("/dashboard").await.text(), "/dashboard/");

    let response = server
        .post(&format!("/dashboard/{view}/suppliers"))
        .form(&ACME)
        .await;
    response.assert_status_ok();
    assert!(response.headers().get("hx-trigger").is_none());

    let panel = response.text();
    assert!(panel.contains(r#"value="Acme""#));
    assert!(panel.contains(r#"value="a@acme.com""#));
    assert!(panel.contains(r#"value="Tools""#));
    assert_eq!(row_count(&panel), 0);
    // Log-only unless inline notices are enabled.
    assert!(!panel.contains(r#"role="alert""#));
}

#[tokio::test]
async fn test_dashboard_failure_notice_when_enabled() {
    let stub = StubCatalog::default();
    stub.fail_writes(true);
    let server = app(&stub, true).await;
    let view = view_id(&server.get("/dashboard").await.text(), "/dashboard/");

    let panel = server
        .post(&format!("/dashboard/{view}/suppliers"))
        .form(&ACME)
        .await
        .text();
    assert!(panel.contains(r#"role="alert""#));
    assert!(panel.contains(r#"value="Acme""#));
}

#[tokio::test]
async fn test_dashboard_add_product_for_selected_supplier() {
    let stub = StubCatalog::default();
    let server = app(&stub, false).await;
    let view = view_id(&server.get("/dashboard").await.text(), "/dashboard/");

    server
        .post(&format!("/dashboard/{view}/suppliers"))
        .form(&ACME)
        .await
        .assert_status_ok();

    server
        .post(&format!("/dashboard/{view}/supplier-selection"))
        .form(&[("supplier_id", "1")])
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let options = server
        .get(&format!("/dashboard/{view}/supplier-options"))
        .await
        .text();
    assert!(options.contains(r#"<option value="1" selected>Acme</option>"#));

    let panel = server
        .post(&format!("/dashboard/{view}/products"))
        .form(&[
            ("name", "Hammer"),
            ("brand", "Acme"),
            ("price", "12.5"),
            ("category", "Tools"),
            ("description", "Claw hammer"),
            ("supplier_id", "1"),
        ])
        .await
        .text();
    assert_eq!(row_count(&panel), 1);
    assert!(panel.contains("Hammer - Acme - $12.5 - Tools (Supplier: 1)"));
    assert!(!panel.contains(" selected>"));
}

#[tokio::test]
async fn test_dashboard_shows_existing_records() {
    let stub = StubCatalog::default();
    let server = app(&stub, false).await;

    let view = view_id(&server.get("/dashboard").await.text(), "/dashboard/");
    server
        .post(&format!("/dashboard/{view}/suppliers"))
        .form(&ACME)
        .await
        .assert_status_ok();

    // A fresh page load renders placeholders, and its list fragment fetches
    // the collection again.
    let page = server.get("/dashboard").await.text();
    assert_eq!(row_count(&page), 0);
    let fresh = view_id(&page, "/dashboard/");
    assert_ne!(fresh, view);

    let list = server.get(&format!("/dashboard/{fresh}/suppliers")).await;
    list.assert_status_ok();
    assert_eq!(list.headers()["hx-trigger"], "suppliers-changed");
    let list = list.text();
    assert_eq!(row_count(&list), 1);
    assert!(list.contains("Acme - a@acme.com - Tools"));

    let options = server
        .get(&format!("/dashboard/{fresh}/supplier-options"))
        .await
        .text();
    assert!(options.contains(r#"<option value="1">Acme</option>"#));
}

#[tokio::test]
async fn test_dashboard_renders_while_backend_stalls() {
    let stub = StubCatalog::default();
    stub.stall_suppliers(true);
    let server = app(&stub, false).await;

    let page = tokio::time::timeout(Duration::from_secs(3), server.get("/dashboard"))
        .await
        .expect("dashboard page waited on the catalog service");
    page.assert_status_ok();
    let page = page.text();
    assert!(page.contains("Add Supplier"));
    assert!(page.contains("Add Product"));
    let view = view_id(&page, "/dashboard/");
    assert!(page.contains(&format!(r#"hx-get="/dashboard/{view}/suppliers""#)));

    // The product list is read independently of the stalled supplier list.
    let products = tokio::time::timeout(
        Duration::from_secs(3),
        server.get(&format!("/dashboard/{view}/products")),
    )
    .await
    .expect("product list waited on the supplier read");
    products.assert_status_ok();
}

#[tokio::test]
async fn test_dashboard_renders_when_reads_fail() {
    let stub = StubCatalog::default();
    stub.fail_reads(true);
    let server = app(&stub, false).await;

    let page = server.get("/dashboard").await;
    page.assert_status_ok();
    let page = page.text();
    assert!(page.contains("Supplier &amp; Product Dashboard"));
    let view = view_id(&page, "/dashboard/");

    let suppliers = server.get(&format!("/dashboard/{view}/suppliers")).await;
    suppliers.assert_status_ok();
    assert!(suppliers.headers().get("hx-trigger").is_none());
    assert_eq!(row_count(&suppliers.text()), 0);

    let products = server.get(&format!("/dashboard/{view}/products")).await;
    products.assert_status_ok();
    assert_eq!(row_count(&products.text()), 0);
}

#[tokio::test]
async fn test_dashboard_failed_product_keeps_input() {
    let stub = StubCatalog::default();
    let server = app(&stub, false).await;
    let view = view_id(&server.get("/dashboard").await.text(), "/dashboard/");

    server
        .post(&format!("/dashboard/{view}/suppliers"))
        .form(&ACME)
        .await
        .assert_status_ok();

    stub.fail_writes(true);
    let response = server
        .post(&format!("/dashboard/{view}/products"))
        .form(&[
            ("name", "Hammer"),
            ("brand", "Acme"),
            ("price", "12.5"),
            ("category", "Tools"),
            ("description", "Claw hammer"),
            ("supplier_id", "1"),
        ])
        .await;
    response.assert_status_ok();

    let panel = response.text();
    assert!(panel.contains(r#"value="Hammer""#));
    assert!(panel.contains(r#"value="12.5""#));
    assert!(panel.contains(r#"value="Claw hammer""#));
    assert!(panel.contains(r#"<option value="1" selected>Acme</option>"#));
    assert_eq!(row_count(&panel), 0);
    assert!(!panel.contains(r#"role="alert""#));
}
