//! # Plugix
//!
//! Bridge between a CMS product catalog and the Plugix AI API.
//!
//! Plugix exposes catalog operations as MCP tools an AI agent can call, and
//! wraps the Plugix HTTP API (descriptions, translations, SEO, chat) behind a
//! typed client.
//!
//! ## Features
//!
//! - **API Client**: Envelope-checked calls with bearer auth and platform header
//! - **MCP Tools**: Product and category listing, description and translation writes
//! - **Keep-Alive**: Health-checked connection with a cancellable daemon loop
//!
//! ## Quick Start
//!
//! ```bash
//! # Connect once and list the available tools
//! plugix start
//!
//! # Keep the connection alive until Ctrl+C
//! plugix start --daemon
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::cast_possible_truncation)]

pub mod api;
pub mod app;
pub mod catalog;
pub mod core;
pub mod mcp;

pub use api::{ApiError, PlugixClient};
pub use catalog::{Catalog, MemoryCatalog, Product, ProductQuery};
pub use mcp::{McpError, McpService, ShutdownSignal, ToolCall, ToolKind, ToolOutput};

// Re-export commonly used types
pub use app::{App, StartOutcome};
pub use core::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "plugix";
