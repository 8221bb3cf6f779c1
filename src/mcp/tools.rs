//! MCP catalog tools.
//!
//! The tool set is fixed: every tool is a [`ToolKind`], and [`dispatch`] maps
//! a kind plus its JSON parameters onto catalog operations. Each tool has its
//! own [`ToolOutput`] variant.

use std::fmt;
use std::str::FromStr;

use chrono::SecondsFormat;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::catalog::{Catalog, CatalogError, ProductId, ProductQuery};

/// Parameters passed to a tool.
pub type ToolParams = serde_json::Map<String, Value>;

/// Language used by `save_translations` when none is given.
pub const DEFAULT_LANGUAGE: &str = "en";

/// The catalog tools exposed once connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GetProducts,
    GetCategories,
    SaveDescriptions,
    SaveTranslations,
    GetStats,
}

impl ToolKind {
    /// Every tool, in registration order.
    pub const ALL: [Self; 5] = [
        Self::GetProducts,
        Self::GetCategories,
        Self::SaveDescriptions,
        Self::SaveTranslations,
        Self::GetStats,
    ];

    /// Wire name of the tool.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetProducts => "get_products",
            Self::GetCategories => "get_categories",
            Self::SaveDescriptions => "save_descriptions",
            Self::SaveTranslations => "save_translations",
            Self::GetStats => "get_stats",
        }
    }

    /// Short human-readable description.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::GetProducts => "List products, optionally filtered by category and limited",
            Self::GetCategories => "List all categories with their full paths",
            Self::SaveDescriptions => "Save generated descriptions onto products",
            Self::SaveTranslations => "Save localized names and descriptions onto products",
            Self::GetStats => "Catalog statistics",
        }
    }

    /// Look up a tool by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("Unknown tool: {s}"))
    }
}

/// Represents a tool call request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name
    pub name: String,
    /// Tool arguments
    #[serde(default)]
    pub arguments: ToolParams,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), arguments: ToolParams::new() }
    }

    /// Add an argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }
}

/// Error type for tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters for {tool}: {message}")]
    InvalidParams { tool: &'static str, message: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Product projection returned by `get_products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
}

/// Category projection returned by `get_categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: u64,
    pub name: String,
    pub path: String,
}

/// Result of a tool execution, one variant per tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Products(Vec<ProductSummary>),
    Categories(Vec<CategorySummary>),
    Saved {
        saved: usize,
    },
    Translations {
        saved: usize,
        language: String,
    },
    Stats {
        #[serde(rename = "totalProducts")]
        total_products: usize,
        timestamp: String,
    },
}

impl ToolOutput {
    /// JSON form of the output.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Default, Deserialize)]
struct GetProductsParams {
    #[serde(default, deserialize_with = "lenient_string")]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DescriptionItem {
    #[serde(deserialize_with = "lenient_id")]
    id: ProductId,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaveDescriptionsParams {
    #[serde(default)]
    items: Vec<DescriptionItem>,
}

#[derive(Debug, Deserialize)]
struct TranslationItem {
    #[serde(deserialize_with = "lenient_id")]
    id: ProductId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaveTranslationsParams {
    #[serde(default)]
    items: Vec<TranslationItem>,
    #[serde(default, deserialize_with = "lenient_string")]
    language: Option<String>,
}

/// Run `kind` against the catalog.
pub fn dispatch(
    kind: ToolKind,
    params: &ToolParams,
    catalog: &dyn Catalog,
) -> Result<ToolOutput, ToolError> {
    match kind {
        ToolKind::GetProducts => get_products(parse(kind, params)?, catalog),
        ToolKind::GetCategories => get_categories(catalog),
        ToolKind::SaveDescriptions => save_descriptions(parse(kind, params)?, catalog),
        ToolKind::SaveTranslations => save_translations(parse(kind, params)?, catalog),
        ToolKind::GetStats => get_stats(catalog),
    }
}

fn parse<T: DeserializeOwned>(kind: ToolKind, params: &ToolParams) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| ToolError::InvalidParams { tool: kind.name(), message: e.to_string() })
}

fn get_products(params: GetProductsParams, catalog: &dyn Catalog) -> Result<ToolOutput, ToolError> {
    let query = ProductQuery { category: params.category, limit: params.limit };

    let products = catalog
        .list_products(&query)?
        .into_iter()
        .map(|p| ProductSummary { id: p.id, sku: p.sku, name: p.name, description: p.description })
        .collect();

    Ok(ToolOutput::Products(products))
}

fn get_categories(catalog: &dyn Catalog) -> Result<ToolOutput, ToolError> {
    let categories = catalog
        .list_categories()?
        .into_iter()
        .map(|c| CategorySummary { id: c.id, name: c.name, path: c.path })
        .collect();

    Ok(ToolOutput::Categories(categories))
}

fn save_descriptions(
    params: SaveDescriptionsParams,
    catalog: &dyn Catalog,
) -> Result<ToolOutput, ToolError> {
    let mut saved = 0;

    for item in params.items {
        let Some(mut product) = catalog.product(item.id)? else {
            tracing::debug!(id = item.id, "Skipping unknown product");
            continue;
        };
        product.set_description(item.description);
        catalog.save_product(&product)?;
        saved += 1;
    }

    Ok(ToolOutput::Saved { saved })
}

fn save_translations(
    params: SaveTranslationsParams,
    catalog: &dyn Catalog,
) -> Result<ToolOutput, ToolError> {
    let language = params.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let mut saved = 0;

    for item in params.items {
        let Some(mut product) = catalog.product(item.id)? else {
            tracing::debug!(id = item.id, "Skipping unknown product");
            continue;
        };
        product.set_localized(&language, item.name, item.description);
        catalog.save_product(&product)?;
        saved += 1;
    }

    Ok(ToolOutput::Translations { saved, language })
}

fn get_stats(catalog: &dyn Catalog) -> Result<ToolOutput, ToolError> {
    Ok(ToolOutput::Stats {
        total_products: catalog.count_products()?,
        timestamp: chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    })
}

/// Format tools for display.
pub fn format_tools(tools: &[ToolKind]) -> String {
    let mut output = String::new();

    for tool in tools {
        output.push_str(&format!("  {} - {}\n", tool.name(), tool.description()));
    }

    output
}

// Accepts a string or a number.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

// Accepts a non-negative integer or a numeric string.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_unsigned(&value).map(|n| Some(n as usize)).map_err(de::Error::custom),
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    parse_unsigned(&Value::deserialize(deserializer)?).map_err(de::Error::custom)
}

fn parse_unsigned(value: &Value) -> Result<u64, String> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| format!("expected a non-negative integer, got {n}")),
        Value::String(s) => {
            s.trim().parse::<u64>().map_err(|_| format!("expected a non-negative integer, got \"{s}\""))
        }
        other => Err(format!("expected a non-negative integer, got {other}")),
    }
}
