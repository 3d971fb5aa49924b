//! SQL Chat Console
//!
//! A server-rendered web front end for a natural-language-to-SQL service and
//! its supplier / product catalog. Questions typed into the chat are relayed
//! to the service's SQL agent; the dashboard lists and creates suppliers and
//! products through the same service's REST API.
//!
//! # Architecture
//!
//! - **Server**: Axum routes serving full pages and HTMX fragments
//! - **Views**: per-page-load state (transcript, snapshots, form buffers) held
//!   in memory and swept when idle
//! - **Backend**: `reqwest` client for the external service behind a trait
//! - **UI**: `minijinja` templates compiled into the binary
//!
//! # Modules
//!
//! - [`backend`]: catalog / SQL-agent client
//! - [`chat`]: chat view state and submission flow
//! - [`dashboard`]: dashboard view state, loading and form submission
//! - [`domain`]: records shared by the views and the client
//! - [`nav`]: navigation shell destinations and menu state
//! - [`session`]: store of mounted views
//! - [`ui`]: page and fragment rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod nav;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod ui;

use std::sync::Arc;

use backend::Backend;
use chat::ChatView;
use config::AppConfig;
use dashboard::DashboardView;
use session::ViewStore;
use ui::{RenderError, Renderer};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Client for the catalog / SQL-agent service.
    pub backend: Arc<dyn Backend>,
    /// Page and fragment renderer.
    pub renderer: Arc<Renderer>,
    /// Mounted chat views.
    pub chats: ViewStore<ChatView>,
    /// Mounted dashboard views.
    pub dashboards: ViewStore<DashboardView>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state with empty view stores.
    pub fn new(config: Arc<AppConfig>, backend: Arc<dyn Backend>) -> Result<Self, RenderError> {
        let renderer = Renderer::new(config.ui.clone())?;
        Ok(Self {
            backend,
            renderer: Arc::new(renderer),
            chats: ViewStore::new(),
            dashboards: ViewStore::new(),
            config,
        })
    }
}
