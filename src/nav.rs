//! Navigation shell: fixed destinations and the small-viewport menu toggle.

use serde::{Deserialize, Serialize};

/// Pages reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Landing page.
    #[default]
    Home,
    /// Natural-language query chat.
    Chat,
    /// Supplier and product dashboard.
    Dashboard,
}

impl Destination {
    /// Get all destinations in display order.
    pub fn all() -> &'static [Destination] {
        &[Destination::Home, Destination::Chat, Destination::Dashboard]
    }

    pub fn path(self) -> &'static str {
        match self {
            Destination::Home => "/",
            Destination::Chat => "/chat",
            Destination::Dashboard => "/dashboard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Destination::Home => "Home",
            Destination::Chat => "Chat",
            Destination::Dashboard => "Dashboard",
        }
    }

    pub fn aria_label(self) -> &'static str {
        match self {
            Destination::Home => "Go to Homepage",
            Destination::Chat => "Query Chatbot",
            Destination::Dashboard => "Go to Dashboard",
        }
    }
}

/// Small-viewport menu state. The only state the shell owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavMenu {
    open: bool,
}

impl NavMenu {
    #[must_use]
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Follow a link: closes the menu and returns where to go.
    pub fn select(&mut self, destination: Destination) -> &'static str {
        self.open = false;
        destination.path()
    }
}

/// One rendered link in the navigation bar.
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub key: Destination,
    pub path: &'static str,
    pub label: &'static str,
    pub aria_label: &'static str,
    pub active: bool,
}

/// Links for every destination, flagging the active one.
pub fn links(active: Option<Destination>) -> Vec<NavLink> {
    Destination::all()
        .iter()
        .map(|&d| NavLink {
            key: d,
            path: d.path(),
            label: d.label(),
            aria_label: d.aria_label(),
            active: active == Some(d),
        })
        .collect()
}
