//! Product catalog access.
//!
//! The catalog is owned by the host platform. Tools reach it through the
//! [`Catalog`] trait; [`MemoryCatalog`] is the bundled implementation used by
//! the CLI (backed by a JSON file) and by tests.

mod memory;
mod model;

use std::path::PathBuf;

pub use memory::{CatalogData, MemoryCatalog};
pub use model::{Category, CategoryId, LocalizedText, Product, ProductId, ProductQuery};

/// Error type for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Product/category store the MCP tools operate on.
pub trait Catalog: Send + Sync {
    /// List products matching `query`, in catalog order.
    fn list_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>>;

    /// List all categories with their full paths.
    fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    /// Look up a product by ID.
    fn product(&self, id: ProductId) -> CatalogResult<Option<Product>>;

    /// Persist a product.
    fn save_product(&self, product: &Product) -> CatalogResult<()>;

    /// Total number of products.
    fn count_products(&self) -> CatalogResult<usize>;
}
