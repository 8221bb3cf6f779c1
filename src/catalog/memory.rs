//! In-memory catalog, optionally persisted to a JSON file.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::model::{Category, Product, ProductId, ProductQuery};
use super::{Catalog, CatalogError, CatalogResult};

/// On-disk layout of a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Thread-safe in-memory catalog.
///
/// When created with [`MemoryCatalog::open`], every saved product is written
/// back to the backing file.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    data: RwLock<CatalogData>,
    path: Option<PathBuf>,
}

impl MemoryCatalog {
    /// Create an empty catalog without a backing file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from in-memory data.
    pub fn with_data(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self { data: RwLock::new(CatalogData { products, categories }), path: None }
    }

    /// Load a catalog from a JSON file and keep it as the backing store.
    pub fn open(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io { path: path.to_path_buf(), source: e })?;
        let data: CatalogData = serde_json::from_str(&content)?;

        tracing::debug!(
            path = %path.display(),
            products = data.products.len(),
            categories = data.categories.len(),
            "Loaded catalog"
        );

        Ok(Self { data: RwLock::new(data), path: Some(path.to_path_buf()) })
    }

    // Writes a sibling temp file and renames it over the backing file.
    fn persist(&self, data: &CatalogData) -> CatalogResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let content = serde_json::to_vec_pretty(data)?;
        let io_error = |source| CatalogError::Io { path: path.clone(), source };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
        file.write_all(&content).map_err(io_error)?;
        file.as_file().sync_all().map_err(io_error)?;
        file.persist(path).map_err(|e| io_error(e.error))?;

        Ok(())
    }
}

impl Catalog for MemoryCatalog {
    fn list_products(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
        let data = self.data.read();
        let matching = data.products.iter().filter(|p| query.matches(p)).cloned();

        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.data.read().categories.clone())
    }

    fn product(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        Ok(self.data.read().products.iter().find(|p| p.id == id).cloned())
    }

    fn save_product(&self, product: &Product) -> CatalogResult<()> {
        let mut data = self.data.write();

        let mut updated = data.clone();
        match updated.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => updated.products.push(product.clone()),
        }

        self.persist(&updated)?;
        *data = updated;
        Ok(())
    }

    fn count_products(&self) -> CatalogResult<usize> {
        Ok(self.data.read().products.len())
    }
}
