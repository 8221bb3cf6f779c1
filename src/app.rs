//! Application wiring and the `start` lifecycle.
//!
//! [`App`] assembles the configuration, catalog, API client and MCP service,
//! and implements the start flow: enable check, connect, then either a one-shot
//! tool listing or the keep-alive loop.

use std::io::Write;
use std::sync::Arc;

use crate::api::{DescriptionOptions, PlugixClient, SeoOptions, TranslateOptions};
use crate::catalog::{Catalog, MemoryCatalog, ProductQuery};
use crate::core::Config;
use crate::mcp::{LoopExit, McpService, McpSettings, ProductSummary, ShutdownSignal};

/// AI features that can be switched off in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiFeature {
    ProductDescriptions,
    Translations,
    SeoOptimization,
}

impl AiFeature {
    /// Config key of the feature.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::ProductDescriptions => "product_descriptions",
            Self::Translations => "translations",
            Self::SeoOptimization => "seo_optimization",
        }
    }
}

/// How `start` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Connected and listed the tools
    Listed(Vec<&'static str>),
    /// Connected, ran the keep-alive loop, and it returned
    DaemonExited(LoopExit),
    /// MCP is disabled in configuration
    Disabled,
    /// Connect failed with the given message
    ConnectFailed(String),
}

impl StartOutcome {
    /// Whether the start counts as a success for the exit code.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Listed(_) | Self::DaemonExited(_))
    }
}

/// Assembled application.
pub struct App {
    config: Config,
    client: PlugixClient,
    catalog: Arc<dyn Catalog>,
    service: Arc<McpService>,
}

impl App {
    /// Build the application from configuration.
    ///
    /// Validates the config, opens the catalog file when one is configured and
    /// creates the HTTP client.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let catalog: Arc<dyn Catalog> = match config.catalog.path {
            Some(ref path) => Arc::new(MemoryCatalog::open(path)?),
            None => {
                tracing::warn!("No catalog file configured, using an empty catalog");
                Arc::new(MemoryCatalog::new())
            }
        };

        let client = PlugixClient::new(&config)?;
        Ok(Self::with_parts(config, client, catalog))
    }

    /// Build the application from ready-made parts.
    pub fn with_parts(config: Config, client: PlugixClient, catalog: Arc<dyn Catalog>) -> Self {
        let settings = McpSettings::from_config(&config.mcp);
        let service = Arc::new(McpService::new(client.clone(), Arc::clone(&catalog), settings));
        Self { config, client, catalog, service }
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// API client.
    pub fn client(&self) -> &PlugixClient {
        &self.client
    }

    /// Catalog.
    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Shared MCP service.
    pub fn service(&self) -> Arc<McpService> {
        Arc::clone(&self.service)
    }

    /// Run the start flow, writing human-readable status to `out`.
    ///
    /// In daemon mode this blocks until `stop` fires or the connection ends.
    pub fn start(
        &self,
        daemon: bool,
        stop: &ShutdownSignal,
        out: &mut dyn Write,
    ) -> anyhow::Result<StartOutcome> {
        writeln!(out, "Plugix MCP Server")?;
        writeln!(out, "=================\n")?;

        if !self.service.is_enabled() {
            writeln!(
                out,
                "[ERROR] MCP is disabled in configuration. Enable it with `[mcp] enabled = true`."
            )?;
            return Ok(StartOutcome::Disabled);
        }

        writeln!(out, "[INFO] Connecting to Plugix API...")?;

        if let Err(e) = self.service.connect() {
            writeln!(out, "[ERROR] Failed to connect: {e}")?;
            return Ok(StartOutcome::ConnectFailed(e.to_string()));
        }

        writeln!(out, "[OK] MCP server connected successfully!")?;

        if !daemon {
            let tools = self.service.available_tools();
            writeln!(out, "[INFO] Tools available: {}", tools.join(", "))?;
            return Ok(StartOutcome::Listed(tools));
        }

        writeln!(out, "[NOTE] Running in daemon mode. Press Ctrl+C to stop.")?;
        out.flush()?;

        let exit = self.service.run_loop(stop);
        match exit {
            LoopExit::Stopped => writeln!(out, "\nStopping MCP server...")?,
            LoopExit::Disconnected => writeln!(out, "\nMCP disconnected.")?,
            LoopExit::ConnectionLost => writeln!(out, "\n[WARN] Lost connection to Plugix API.")?,
        }
        self.service.disconnect();

        Ok(StartOutcome::DaemonExited(exit))
    }

    /// Fail unless `feature` is enabled in configuration.
    pub fn ensure_feature(&self, feature: AiFeature) -> anyhow::Result<()> {
        let features = &self.config.features;
        let enabled = match feature {
            AiFeature::ProductDescriptions => features.product_descriptions,
            AiFeature::Translations => features.translations,
            AiFeature::SeoOptimization => features.seo_optimization,
        };

        if !enabled {
            anyhow::bail!("Feature '{}' is disabled in configuration", feature.key());
        }
        Ok(())
    }

    /// Catalog products to send to the AI endpoints.
    pub fn product_payload(&self, query: &ProductQuery) -> anyhow::Result<Vec<ProductSummary>> {
        let products = self.catalog.list_products(query)?;
        if products.is_empty() {
            anyhow::bail!("No products matched");
        }

        Ok(products
            .into_iter()
            .map(|p| ProductSummary { id: p.id, sku: p.sku, name: p.name, description: p.description })
            .collect())
    }

    /// Generate descriptions for the matching products.
    pub fn describe(
        &self,
        query: &ProductQuery,
        options: &DescriptionOptions,
    ) -> anyhow::Result<serde_json::Value> {
        self.ensure_feature(AiFeature::ProductDescriptions)?;
        let products = self.product_payload(query)?;
        Ok(serde_json::Value::Object(self.client.generate_descriptions(&products, options)?))
    }

    /// Translate the matching products into `language`.
    pub fn translate(
        &self,
        query: &ProductQuery,
        language: &str,
        options: &TranslateOptions,
    ) -> anyhow::Result<serde_json::Value> {
        self.ensure_feature(AiFeature::Translations)?;
        if !self.config.supports_language(language) {
            anyhow::bail!(
                "Language '{}' is not configured (available: {})",
                language,
                self.config.languages.join(", ")
            );
        }

        let products = self.product_payload(query)?;
        Ok(serde_json::Value::Object(self.client.translate(&products, language, options)?))
    }

    /// Generate SEO metadata for the matching products.
    pub fn seo(&self, query: &ProductQuery, options: &SeoOptions) -> anyhow::Result<serde_json::Value> {
        self.ensure_feature(AiFeature::SeoOptimization)?;
        let products = self.product_payload(query)?;
        Ok(serde_json::Value::Object(self.client.generate_seo(&products, options)?))
    }
}
