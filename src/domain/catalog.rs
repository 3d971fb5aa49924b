//! Supplier and product records plus the form buffers used to create them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier.
///
/// The catalog service hands out integer ids, but ids are only ever echoed
/// back or displayed, so they are kept as opaque text. Both JSON numbers and
/// strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Product price as reported by the catalog service.
///
/// Decimal columns may come back as JSON strings, so both representations
/// are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(Self)
                .map_err(|e| serde::de::Error::custom(format!("invalid price {s:?}: {e}"))),
        }
    }
}

/// Supplier record as listed by `GET /suppliers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: EntityId,
    pub name: String,
    pub contact_info: String,
    pub product_category: String,
}

/// Product record as listed by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub brand: String,
    pub price: Price,
    pub category: String,
    pub description: String,
    /// Weak reference to a supplier; never checked against the snapshot.
    pub supplier_id: EntityId,
}

/// Body of `POST /suppliers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_info: String,
    pub product_category: String,
}

/// Body of `POST /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    /// The typed text, unparsed. The service does the numeric conversion.
    pub price: String,
    pub category: String,
    pub description: String,
    /// Selected supplier id, kept as the plain string the selector produced.
    pub supplier_id: String,
}

/// Editable staging record for a supplier that has not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierForm {
    pub name: String,
    pub contact_info: String,
    pub product_category: String,
}

impl SupplierForm {
    #[must_use]
    pub fn to_request(&self) -> NewSupplier {
        NewSupplier {
            name: self.name.clone(),
            contact_info: self.contact_info.clone(),
            product_category: self.product_category.clone(),
        }
    }
}

/// Editable staging record for a product that has not been submitted yet.
///
/// Every field holds the text exactly as typed, including `price`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub brand: String,
    pub price: String,
    pub category: String,
    pub description: String,
    pub supplier_id: String,
}

impl ProductForm {
    /// Store the id of the supplier picked in the selector.
    pub fn select_supplier(&mut self, id: &EntityId) {
        self.supplier_id = id.as_str().to_string();
    }

    #[must_use]
    pub fn to_request(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            brand: self.brand.clone(),
            price: self.price.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            supplier_id: self.supplier_id.clone(),
        }
    }
}

/// One entry of the product form's supplier selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierOption {
    pub id: EntityId,
    pub name: String,
}

impl From<&Supplier> for SupplierOption {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id.clone(),
            name: supplier.name.clone(),
        }
    }
}
