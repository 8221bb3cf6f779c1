//! MCP (Model Context Protocol) tool dispatch.
//!
//! Exposes catalog operations as named tools an AI agent can call. The
//! service only exposes tools after the Plugix API passes a health check.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  McpService                      │
//! │  • Disabled / Disconnected / Connected state     │
//! │  • Health-checked connect, idempotent disconnect │
//! │  • Cancellable keep-alive loop                   │
//! └─────────────────────────────────────────────────┘
//!          │ execute_tool(name, params)
//!          ▼
//!   tools::dispatch(ToolKind, params, &dyn Catalog) ──▶ ToolOutput
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plugix::mcp::{McpService, McpSettings, ToolCall};
//!
//! let service = McpService::new(client, catalog, McpSettings::from_config(&config.mcp));
//! service.connect()?;
//!
//! // Get available tools
//! let tools = service.available_tools();
//!
//! // Call a tool
//! let result = service.execute(&ToolCall::new("get_products").arg("limit", 10))?;
//! ```

mod service;
mod shutdown;
mod tools;

pub use service::{
    ConnectionState, LoopExit, McpError, McpService, McpSettings, MAX_POLL_INTERVAL,
};
pub use shutdown::ShutdownSignal;
pub use tools::{
    dispatch, format_tools, CategorySummary, ProductSummary, ToolCall, ToolError, ToolKind,
    ToolOutput, ToolParams, DEFAULT_LANGUAGE,
};
