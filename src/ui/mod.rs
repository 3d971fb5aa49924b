//! HTML rendering for pages and HTMX fragments.
//!
//! Templates are compiled into the binary and rendered with `minijinja`.
//! Every template name ends in `.html`, so all interpolated values are
//! HTML-escaped.
//!
//! # Pages
//!
//! - landing (`home.html`), chat (`chat.html`), dashboard (`dashboard.html`),
//!   all wrapped in `layout.html` with the navigation shell
//!
//! # Fragments
//!
//! - navigation bar, chat exchange / reply bubbles, dashboard panels and the
//!   supplier selector

use std::fmt;

use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

use crate::chat::{ChatView, PendingId, Submitted};
use crate::config::UiConfig;
use crate::dashboard::DashboardView;
use crate::domain::{ChatMessage, Product, ProductForm, Supplier, SupplierForm, SupplierOption};
use crate::nav::{self, Destination, NavLink, NavMenu};

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("templates/layout.html")),
    ("nav.html", include_str!("templates/nav.html")),
    ("home.html", include_str!("templates/home.html")),
    ("chat.html", include_str!("templates/chat.html")),
    ("chat_message.html", include_str!("templates/chat_message.html")),
    ("chat_pending.html", include_str!("templates/chat_pending.html")),
    ("chat_exchange.html", include_str!("templates/chat_exchange.html")),
    ("dashboard.html", include_str!("templates/dashboard.html")),
    ("supplier_panel.html", include_str!("templates/supplier_panel.html")),
    ("product_panel.html", include_str!("templates/product_panel.html")),
    ("supplier_list.html", include_str!("templates/supplier_list.html")),
    ("product_list.html", include_str!("templates/product_list.html")),
    ("supplier_options.html", include_str!("templates/supplier_options.html")),
];

/// Template lookup or rendering failed.
#[derive(Error, Debug)]
#[error("template error: {0}")]
pub struct RenderError(#[from] minijinja::Error);

/// Navigation shell values shared by every full page and the nav fragment.
#[derive(Debug, Serialize)]
struct Shell {
    title: &'static str,
    htmx_src: String,
    links: Vec<NavLink>,
    active: Option<Destination>,
    menu_open: bool,
    /// `menu_open` as it must appear in attributes and query strings.
    expanded: &'static str,
    toggle_to: &'static str,
}

/// Lowercase boolean text. minijinja prints `bool` as `True`/`False`.
fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[derive(Debug, Serialize)]
struct ChatContext<'a> {
    view_id: &'a str,
    messages: &'a [ChatMessage],
    pending_ids: Vec<PendingId>,
}

#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    name: &'a str,
    brand: &'a str,
    price: String,
    category: &'a str,
    supplier_id: &'a str,
}

impl<'a> From<&'a Product> for ProductRow<'a> {
    fn from(p: &'a Product) -> Self {
        Self {
            name: &p.name,
            brand: &p.brand,
            price: p.price.to_string(),
            category: &p.category,
            supplier_id: p.supplier_id.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DashboardContext<'a> {
    view_id: &'a str,
    suppliers: &'a [Supplier],
    products: Vec<ProductRow<'a>>,
    supplier_form: &'a SupplierForm,
    product_form: &'a ProductForm,
    supplier_options: Vec<SupplierOption>,
    selected_supplier: &'a str,
    supplier_error: Option<&'a str>,
    product_error: Option<&'a str>,
    /// Render list placeholders that fetch the snapshots after the page loads.
    lists_pending: bool,
}

#[derive(Debug, Serialize)]
struct Page<C> {
    #[serde(flatten)]
    shell: Shell,
    #[serde(flatten)]
    content: C,
}

/// Renders pages and fragments.
pub struct Renderer {
    env: Environment<'static>,
    ui: UiConfig,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("templates", &TEMPLATES.len())
            .field("ui", &self.ui)
            .finish()
    }
}

impl Renderer {
    /// Compile all templates.
    pub fn new(ui: UiConfig) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env, ui })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, RenderError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    fn shell(&self, title: &'static str, active: Option<Destination>, menu: NavMenu) -> Shell {
        let mut toggled = menu;
        toggled.toggle();
        Shell {
            title,
            htmx_src: self.ui.htmx_src.clone(),
            links: nav::links(active),
            active,
            menu_open: menu.is_open(),
            expanded: flag(menu.is_open()),
            toggle_to: flag(toggled.is_open()),
        }
    }

    fn dashboard_context<'a>(
        &self,
        view_id: &'a str,
        d: &'a DashboardView,
        lists_pending: bool,
    ) -> DashboardContext<'a> {
        let show = self.ui.show_dashboard_errors;
        DashboardContext {
            view_id,
            suppliers: d.suppliers(),
            products: d.products().iter().map(ProductRow::from).collect(),
            supplier_form: d.supplier_form(),
            product_form: d.product_form(),
            supplier_options: d.supplier_options(),
            selected_supplier: &d.product_form().supplier_id,
            supplier_error: d.supplier_error().filter(|_| show),
            product_error: d.product_error().filter(|_| show),
            lists_pending,
        }
    }

    /// Navigation bar in the given menu state.
    pub fn nav(&self, active: Option<Destination>, menu: NavMenu) -> Result<String, RenderError> {
        self.render("nav.html", self.shell("", active, menu))
    }

    /// Landing page.
    pub fn home(&self) -> Result<String, RenderError> {
        self.render(
            "home.html",
            self.shell("Home", Some(Destination::Home), NavMenu::default()),
        )
    }

    /// Full chat page for a mounted view.
    pub fn chat_page(&self, view_id: &str, chat: &ChatView) -> Result<String, RenderError> {
        self.render(
            "chat.html",
            Page {
                shell: self.shell("Chat", Some(Destination::Chat), NavMenu::default()),
                content: ChatContext {
                    view_id,
                    messages: chat.transcript().messages(),
                    pending_ids: chat.pending_ids(),
                },
            },
        )
    }

    /// User bubble plus the "Thinking..." placeholder that fetches the reply.
    pub fn chat_exchange(&self, view_id: &str, submitted: &Submitted) -> Result<String, RenderError> {
        self.render(
            "chat_exchange.html",
            minijinja::context! {
                view_id => view_id,
                message => &submitted.message,
                pending => submitted.pending,
            },
        )
    }

    /// A single transcript bubble.
    pub fn chat_message(&self, message: &ChatMessage) -> Result<String, RenderError> {
        self.render("chat_message.html", minijinja::context! { message => message })
    }

    /// Full dashboard page for a mounted view.
    ///
    /// Both lists start as placeholders, so the page never waits on the
    /// catalog service.
    pub fn dashboard_page(&self, view_id: &str, d: &DashboardView) -> Result<String, RenderError> {
        self.render(
            "dashboard.html",
            Page {
                shell: self.shell("Dashboard", Some(Destination::Dashboard), NavMenu::default()),
                content: self.dashboard_context(view_id, d, true),
            },
        )
    }

    /// Supplier form and list.
    pub fn supplier_panel(&self, view_id: &str, d: &DashboardView) -> Result<String, RenderError> {
        self.render("supplier_panel.html", self.dashboard_context(view_id, d, false))
    }

    pub fn supplier_list(&self, view_id: &str, d: &DashboardView) -> Result<String, RenderError> {
        self.render("supplier_list.html", self.dashboard_context(view_id, d, false))
    }

    pub fn product_list(&self, view_id: &str, d: &DashboardView) -> Result<String, RenderError> {
        self.render("product_list.html", self.dashboard_context(view_id, d, false))
    }

    /// Product form and list.
    pub fn product_panel(&self, view_id: &str, d: &DashboardView) -> Result<String, RenderError> {
        self.render("product_panel.html", self.dashboard_context(view_id, d, false))
    }

    /// Supplier selector for the product form.
    pub fn supplier_options(&self, view_id: &str, d: &DashboardView) -> Result<String, RenderError> {
        self.render("supplier_options.html", self.dashboard_context(view_id, d, false))
    }
}
