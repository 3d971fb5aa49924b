//! Dashboard view: supplier and product snapshots plus their creation forms.
//!
//! Snapshots are only ever replaced by a fresh read from the catalog service.
//! A successful write clears the form buffer and re-fetches the matching
//! collection; nothing is inserted into a snapshot locally. A failed write
//! leaves the buffer as the user typed it and is only logged.
//!
//! The two collections are read independently, so a slow supplier read never
//! holds back the product list.

use serde::Serialize;
use tracing::{error, info};

use crate::backend::Backend;
use crate::domain::{
    EntityId, Product, ProductForm, Supplier, SupplierForm, SupplierOption,
};
use crate::session::View;

/// State owned by one mounted dashboard view.
#[derive(Debug, Default)]
pub struct DashboardView {
    suppliers: Vec<Supplier>,
    products: Vec<Product>,
    supplier_form: SupplierForm,
    product_form: ProductForm,
    supplier_error: Option<String>,
    product_error: Option<String>,
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The service accepted the record; carries the id when one was reported.
    Created { id: Option<EntityId> },
    /// The write failed; the form buffer still holds the submitted values.
    Failed,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

const SUPPLIER_ERROR: &str = "Could not add the supplier. Your entries were kept.";
const PRODUCT_ERROR: &str = "Could not add the product. Your entries were kept.";

impl DashboardView {
    #[must_use]
    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn supplier_form(&self) -> &SupplierForm {
        &self.supplier_form
    }

    #[must_use]
    pub fn product_form(&self) -> &ProductForm {
        &self.product_form
    }

    /// Notice for the last failed supplier write, cleared on the next attempt.
    #[must_use]
    pub fn supplier_error(&self) -> Option<&str> {
        self.supplier_error.as_deref()
    }

    /// Notice for the last failed product write, cleared on the next attempt.
    #[must_use]
    pub fn product_error(&self) -> Option<&str> {
        self.product_error.as_deref()
    }

    /// Options for the product form's supplier selector.
    ///
    /// Derived from the current supplier snapshot on every call, so it can
    /// never drift from it.
    #[must_use]
    pub fn supplier_options(&self) -> Vec<SupplierOption> {
        self.suppliers.iter().map(SupplierOption::from).collect()
    }

    /// Name of the supplier a product points at, if it is in the snapshot.
    #[must_use]
    pub fn supplier_name(&self, id: &EntityId) -> Option<&str> {
        self.suppliers
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.name.as_str())
    }

    /// Store the selected supplier id in the product buffer.
    pub fn select_supplier(&mut self, id: &EntityId) {
        self.product_form.select_supplier(id);
    }
}

/// Re-read the supplier collection. Returns whether the snapshot was replaced.
pub async fn refresh_suppliers(view: &View<DashboardView>, backend: &dyn Backend) -> bool {
    match backend.list_suppliers().await {
        Ok(suppliers) => {
            view.update(|d| d.suppliers = suppliers);
            true
        }
        Err(e) => {
            error!(name: "dashboard.suppliers.fetch_failed", view = %view.id(), error = %e, "Error fetching suppliers");
            false
        }
    }
}

/// Re-read the product collection. Returns whether the snapshot was replaced.
pub async fn refresh_products(view: &View<DashboardView>, backend: &dyn Backend) -> bool {
    match backend.list_products().await {
        Ok(products) => {
            view.update(|d| d.products = products);
            true
        }
        Err(e) => {
            error!(name: "dashboard.products.fetch_failed", view = %view.id(), error = %e, "Error fetching products");
            false
        }
    }
}

/// Submit the supplier form.
pub async fn submit_supplier(
    view: &View<DashboardView>,
    backend: &dyn Backend,
    form: SupplierForm,
) -> SubmitOutcome {
    let request = form.to_request();
    view.update(|d| {
        d.supplier_form = form;
        d.supplier_error = None;
    });

    match backend.create_supplier(&request).await {
        Ok(id) => {
            info!(name: "dashboard.supplier.created", view = %view.id(), id = ?id, "Supplier added");
            view.update(|d| d.supplier_form = SupplierForm::default());
            refresh_suppliers(view, backend).await;
            SubmitOutcome::Created { id }
        }
        Err(e) => {
            error!(name: "dashboard.supplier.create_failed", view = %view.id(), error = %e, "Error adding supplier");
            view.update(|d| d.supplier_error = Some(SUPPLIER_ERROR.to_string()));
            SubmitOutcome::Failed
        }
    }
}

/// Submit the product form.
pub async fn submit_product(
    view: &View<DashboardView>,
    backend: &dyn Backend,
    form: ProductForm,
) -> SubmitOutcome {
    let request = form.to_request();
    view.update(|d| {
        d.product_form = form;
        d.product_error = None;
    });

    match backend.create_product(&request).await {
        Ok(id) => {
            info!(name: "dashboard.product.created", view = %view.id(), id = ?id, "Product added");
            view.update(|d| d.product_form = ProductForm::default());
            refresh_products(view, backend).await;
            SubmitOutcome::Created { id }
        }
        Err(e) => {
            error!(name: "dashboard.product.create_failed", view = %view.id(), error = %e, "Error adding product");
            view.update(|d| d.product_error = Some(PRODUCT_ERROR.to_string()));
            SubmitOutcome::Failed
        }
    }
}
