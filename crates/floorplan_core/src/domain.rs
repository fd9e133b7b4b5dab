//! crates/floorplan_core/src/domain.rs
//!
//! Defines the pure, core data structures for the floor-plan editor.
//! Squares reference products by id only; the product list on the `Store`
//! is the single owner of product data.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

//=========================================================================================
// Identifiers
//=========================================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// The stable key of the signed-in user, supplied by the identity provider.
    Identity
);
string_id!(
    /// Backend-assigned id of a persisted store.
    StoreId
);
string_id!(
    /// Backend-assigned id of a catalog product.
    ProductId
);

//=========================================================================================
// Squares
//=========================================================================================

/// What occupies a square of the floor plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SquareType {
    #[default]
    Empty,
    Products,
    CashRegister,
    Entrance,
    Exit,
}

impl SquareType {
    pub const ALL: [SquareType; 5] = [
        SquareType::Empty,
        SquareType::Products,
        SquareType::CashRegister,
        SquareType::Entrance,
        SquareType::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SquareType::Empty => "empty",
            SquareType::Products => "products",
            SquareType::CashRegister => "cash_register",
            SquareType::Entrance => "entrance",
            SquareType::Exit => "exit",
        }
    }
}

impl fmt::Display for SquareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cell of the grid. `row` and `col` always equal its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    #[serde(rename = "type")]
    pub kind: SquareType,
    // Only meaningful when `kind` is `Products`.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn empty(row: usize, col: usize) -> Self {
        Self {
            kind: SquareType::Empty,
            product_ids: Vec::new(),
            row,
            col,
        }
    }

    pub fn holds(&self, product_id: &ProductId) -> bool {
        self.product_ids.contains(product_id)
    }

    pub fn is_product_square(&self) -> bool {
        self.kind == SquareType::Products
    }
}

//=========================================================================================
// Products
//=========================================================================================

/// Reasons a product's fields are rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidProduct {
    #[error("Product title is required")]
    MissingTitle,
    #[error("Product category is required")]
    MissingCategory,
    #[error("Product price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
}

/// The editable fields of a product, before the backend has assigned an id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub image: String,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), InvalidProduct> {
        if self.title.trim().is_empty() {
            return Err(InvalidProduct::MissingTitle);
        }
        if self.category.trim().is_empty() {
            return Err(InvalidProduct::MissingCategory);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(InvalidProduct::InvalidPrice(self.price));
        }
        Ok(())
    }
}

/// A catalog entry owned by the store's product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub image: String,
}

impl Product {
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            title: draft.title,
            price: draft.price,
            category: draft.category,
            description: draft.description,
            image: draft.image,
        }
    }

    pub fn draft(&self) -> ProductDraft {
        ProductDraft {
            title: self.title.clone(),
            price: self.price,
            category: self.category.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
        }
    }

    /// Case-insensitive match over title, category and description.
    /// A blank term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.title, &self.category, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

//=========================================================================================
// Store
//=========================================================================================

/// The supermarket owned by one identity.
///
/// `layout` and `products` are shared snapshots: every mutation produces a new
/// value, so a reader holding an older `Store` never sees a half-applied change.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    /// `None` until the first successful remote create.
    pub id: Option<StoreId>,
    pub owner_id: Identity,
    pub name: String,
    pub address: String,
    pub layout: Arc<Grid>,
    pub products: Arc<Vec<Product>>,
}

impl Store {
    pub fn product(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == product_id)
    }

    pub fn has_product(&self, product_id: &ProductId) -> bool {
        self.product(product_id).is_some()
    }
}

//=========================================================================================
// Backend records
//=========================================================================================

/// A store as persisted by the backend. `layout` is the serialized grid text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub id: StoreId,
    pub owner_id: Identity,
    pub name: String,
    pub address: String,
    pub layout: String,
}

/// The fields sent to the backend to create a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoreRecord {
    pub owner_id: Identity,
    pub name: String,
    pub address: String,
    pub layout: String,
}

/// Custom attributes kept by the identity provider for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileAttributes {
    pub store_name: Option<String>,
    pub address: Option<String>,
    pub layout_rows: Option<usize>,
    pub layout_cols: Option<usize>,
}
