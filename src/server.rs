use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::AppState;
use crate::backend::HttpBackend;
use crate::chat::{self, ChatView, PendingId};
use crate::config::AppConfig;
use crate::dashboard::{self, DashboardView};
use crate::domain::{ChatMessage, EntityId, ProductForm, SupplierForm};
use crate::nav::{Destination, NavMenu};
use crate::session::{View, ViewStore};
use crate::ui::RenderError;

/// Event fired (via `HX-Trigger`) after the supplier snapshot changes.
pub const SUPPLIERS_CHANGED: &str = "suppliers-changed";

/// Errors a handler can return.
#[derive(Error, Debug)]
pub enum AppError {
    /// View id not mounted (never existed or swept after going idle).
    #[error("unknown view: {0}")]
    UnknownView(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::UnknownView(_) => {
                (StatusCode::NOT_FOUND, "This view has expired. Reload the page.").into_response()
            }
            AppError::Render(e) => {
                error!(name: "ui.render.failed", error = %e, "Template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Rendering failed").into_response()
            }
        }
    }
}

type HandlerResult<T> = Result<T, AppError>;

fn find_view<T>(store: &ViewStore<T>, id: &str) -> HandlerResult<View<T>> {
    store
        .get(id)
        .ok_or_else(|| AppError::UnknownView(id.to_string()))
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "backend.config.loaded",
        base_url = %config.backend.base_url,
        "Catalog service configured"
    );

    let backend = Arc::new(HttpBackend::new(config.backend.base_url.as_str())?);
    let state = AppState::new(Arc::clone(&config), backend)?;

    spawn_view_sweeper(&state);

    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(name: "server.signal.failed", error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(name: "server.stopping", "Shutdown signal received");
}

/// Periodically drop views nobody has touched for the idle timeout.
fn spawn_view_sweeper(state: &AppState) {
    let chats = state.chats.clone();
    let dashboards = state.dashboards.clone();
    let idle = state.config.views.idle_timeout();
    let period = state.config.views.sweep_interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = chats.sweep_idle(idle) + dashboards.sweep_idle(idle);
            if removed > 0 {
                debug!(name: "views.swept", removed, "Idle views removed");
            }
        }
    });
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(home_handler))
        .route("/chat", get(chat_page_handler))
        .route("/dashboard", get(dashboard_page_handler))
        // Navigation shell
        .route("/partials/nav", get(nav_partial_handler))
        .route("/go/{destination}", get(go_handler))
        // Chat fragments
        .route("/chat/{view}/messages", post(chat_submit_handler))
        .route("/chat/{view}/replies/{pending}", post(chat_reply_handler))
        .route("/api/chat/{view}/messages", get(chat_transcript_handler))
        // Dashboard fragments
        .route(
            "/dashboard/{view}/suppliers",
            get(supplier_list_handler).post(supplier_submit_handler),
        )
        .route(
            "/dashboard/{view}/products",
            get(product_list_handler).post(product_submit_handler),
        )
        .route(
            "/dashboard/{view}/supplier-options",
            get(supplier_options_handler),
        )
        .route(
            "/dashboard/{view}/supplier-selection",
            post(supplier_selection_handler),
        )
        // Static assets
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Navigation
// ─────────────────────────────────────────────────────────────────────────────

async fn home_handler(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    Ok(Html(state.renderer.home()?))
}

#[derive(Debug, Deserialize)]
struct NavQuery {
    #[serde(default)]
    open: bool,
    #[serde(default)]
    active: Option<Destination>,
}

async fn nav_partial_handler(
    State(state): State<AppState>,
    Query(query): Query<NavQuery>,
) -> HandlerResult<Html<String>> {
    Ok(Html(
        state.renderer.nav(query.active, NavMenu::new(query.open))?,
    ))
}

/// Link target of the small-viewport menu: selecting closes the menu.
async fn go_handler(Path(destination): Path<Destination>) -> Redirect {
    let mut menu = NavMenu::new(true);
    Redirect::to(menu.select(destination))
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

async fn chat_page_handler(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    let view = state.chats.mount();
    debug!(name: "chat.view.mounted", view = %view.id(), "Chat view mounted");
    let html = view.read(|chat| state.renderer.chat_page(view.id(), chat))?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
struct ChatInput {
    #[serde(default)]
    message: String,
}

async fn chat_submit_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Form(input): Form<ChatInput>,
) -> HandlerResult<Html<String>> {
    let view = find_view(&state.chats, &view_id)?;
    match chat::submit(&view, &input.message) {
        Some(submitted) => Ok(Html(state.renderer.chat_exchange(view.id(), &submitted)?)),
        None => Ok(Html(String::new())),
    }
}

async fn chat_reply_handler(
    State(state): State<AppState>,
    Path((view_id, pending)): Path<(String, PendingId)>,
) -> HandlerResult<Response> {
    let view = find_view(&state.chats, &view_id)?;
    match chat::answer(&view, state.backend.as_ref(), pending).await {
        Some(reply) => Ok(Html(state.renderer.chat_message(&reply)?).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn chat_transcript_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> HandlerResult<Json<Vec<ChatMessage>>> {
    let view: View<ChatView> = find_view(&state.chats, &view_id)?;
    Ok(Json(view.read(|chat| chat.transcript().messages().to_vec())))
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard
// ─────────────────────────────────────────────────────────────────────────────

async fn dashboard_page_handler(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    let view = state.dashboards.mount();
    debug!(name: "dashboard.view.mounted", view = %view.id(), "Dashboard view mounted");
    let html = view.read(|d| state.renderer.dashboard_page(view.id(), d))?;
    Ok(Html(html))
}

fn suppliers_changed(response: &mut Response) {
    response.headers_mut().insert(
        HeaderName::from_static("hx-trigger"),
        HeaderValue::from_static(SUPPLIERS_CHANGED),
    );
}

async fn supplier_list_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> HandlerResult<Response> {
    let view = find_view(&state.dashboards, &view_id)?;
    let refreshed = dashboard::refresh_suppliers(&view, state.backend.as_ref()).await;
    let html = view.read(|d| state.renderer.supplier_list(view.id(), d))?;

    let mut response = Html(html).into_response();
    if refreshed {
        suppliers_changed(&mut response);
    }
    Ok(response)
}

async fn product_list_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> HandlerResult<Html<String>> {
    let view = find_view(&state.dashboards, &view_id)?;
    dashboard::refresh_products(&view, state.backend.as_ref()).await;
    let html = view.read(|d| state.renderer.product_list(view.id(), d))?;
    Ok(Html(html))
}

async fn supplier_submit_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Form(form): Form<SupplierForm>,
) -> HandlerResult<Response> {
    let view = find_view(&state.dashboards, &view_id)?;
    let outcome = dashboard::submit_supplier(&view, state.backend.as_ref(), form).await;
    let html = view.read(|d| state.renderer.supplier_panel(view.id(), d))?;

    let mut response = Html(html).into_response();
    if outcome.is_created() {
        suppliers_changed(&mut response);
    }
    Ok(response)
}

async fn product_submit_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Form(form): Form<ProductForm>,
) -> HandlerResult<Html<String>> {
    let view = find_view(&state.dashboards, &view_id)?;
    dashboard::submit_product(&view, state.backend.as_ref(), form).await;
    let html = view.read(|d| state.renderer.product_panel(view.id(), d))?;
    Ok(Html(html))
}

async fn supplier_options_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> HandlerResult<Html<String>> {
    let view = find_view(&state.dashboards, &view_id)?;
    let html = view.read(|d| state.renderer.supplier_options(view.id(), d))?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
struct SupplierSelection {
    #[serde(default)]
    supplier_id: String,
}

async fn supplier_selection_handler(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    Form(selection): Form<SupplierSelection>,
) -> HandlerResult<StatusCode> {
    let view: View<DashboardView> = find_view(&state.dashboards, &view_id)?;
    view.update(|d| d.select_supplier(&EntityId::new(selection.supplier_id)));
    Ok(StatusCode::NO_CONTENT)
}
