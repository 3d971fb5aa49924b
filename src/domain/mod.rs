//! Records exchanged with the catalog service and held by the views.
//!
//! - [`chat`]: transcript entries for the chat view
//! - [`catalog`]: suppliers, products and their form buffers

pub mod catalog;
pub mod chat;

pub use catalog::{
    EntityId, NewProduct, NewSupplier, Price, Product, ProductForm, Supplier, SupplierForm,
    SupplierOption,
};
pub use chat::{ChatMessage, ChatRole, Transcript};
