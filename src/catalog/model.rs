//! Catalog data types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Product identifier.
pub type ProductId = u64;

/// Category identifier.
pub type CategoryId = u64;

/// Name and description for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID
    pub id: ProductId,

    /// Stock keeping unit
    #[serde(default)]
    pub sku: String,

    /// Default name
    #[serde(default)]
    pub name: String,

    /// Default description
    #[serde(default)]
    pub description: Option<String>,

    /// Category the product belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Per-language name and description
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localized: BTreeMap<String, LocalizedText>,
}

impl Product {
    /// Create a product with the minimum required fields.
    pub fn new(id: ProductId, sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            sku: sku.into(),
            name: name.into(),
            description: None,
            category: None,
            localized: BTreeMap::new(),
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the default description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the default description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Replace the name and description for `language`.
    pub fn set_localized(
        &mut self,
        language: &str,
        name: Option<String>,
        description: Option<String>,
    ) {
        self.localized.insert(language.to_string(), LocalizedText { name, description });
    }

    /// Localized fields for `language`, if any.
    pub fn localized(&self, language: &str) -> Option<&LocalizedText> {
        self.localized.get(language)
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// Full hierarchical path (e.g. "/catalog/furniture/chairs")
    #[serde(default)]
    pub path: String,
}

impl Category {
    /// Create a category.
    pub fn new(id: CategoryId, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { id, name: name.into(), path: path.into() }
    }
}

/// Product listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Only products whose category equals this value
    pub category: Option<String>,
    /// Maximum number of products
    pub limit: Option<usize>,
}

impl ProductQuery {
    /// Query matching every product.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter by category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `product` passes the filter.
    pub fn matches(&self, product: &Product) -> bool {
        match self.category {
            Some(ref category) => product.category.as_deref() == Some(category.as_str()),
            None => true,
        }
    }
}
