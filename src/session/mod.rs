//! In-memory state for mounted views.
//!
//! Every page render mounts a fresh view instance with its own id. The view's
//! state (chat transcript, dashboard snapshots and form buffers) lives here
//! until the view goes idle for longer than the configured timeout.
//!
//! # Architecture
//!
//! - [`View`]: shared handle to one mounted view's state
//! - [`ViewStore`]: thread-safe map of view id to [`View`]
//!
//! # Example
//!
//! ```rust
//! use sql_chat_console::session::ViewStore;
//!
//! let store: ViewStore<Vec<String>> = ViewStore::new();
//! let view = store.mount();
//! view.update(|lines| lines.push("hello".to_string()));
//!
//! let again = store.get(view.id()).unwrap();
//! assert_eq!(again.read(Vec::len), 1);
//! ```

mod store;

pub use store::{View, ViewStore};
