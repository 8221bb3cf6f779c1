//! Plugix - bridge between a CMS product catalog and the Plugix AI API.
//!
//! Connects to the Plugix API, exposes catalog operations as MCP tools and
//! runs one-off AI operations against catalog products.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plugix::api::{ApiData, DescriptionOptions, SeoOptions, TranslateOptions};
use plugix::catalog::ProductQuery;
use plugix::core::config::LOCAL_CONFIG_FILE;
use plugix::core::Config;
use plugix::mcp::{format_tools, ShutdownSignal, ToolKind, ToolParams};
use plugix::App;

/// CMS catalog bridge for the Plugix AI API
#[derive(Parser)]
#[command(name = "plugix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (defaults to .plugix.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Plugix MCP server
    Start {
        /// Run as daemon (keeps the process running)
        #[arg(short, long)]
        daemon: bool,
    },

    /// List the MCP tools exposed to AI agents
    Tools,

    /// Connect and execute a single MCP tool
    Exec {
        /// Tool name (e.g. get_products)
        tool: String,

        /// Tool parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
    },

    /// Check the Plugix API health
    Health,

    /// Show API usage statistics
    Usage,

    /// Run an AI operation against catalog products
    Ai {
        /// AI operation
        #[command(subcommand)]
        operation: AiOperation,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum AiOperation {
    /// Generate product descriptions
    Describe {
        #[command(flatten)]
        selection: Selection,

        /// Writing tone
        #[arg(long, default_value = "professional")]
        tone: String,

        /// Output language (repeatable, defaults to en)
        #[arg(short, long = "language")]
        languages: Vec<String>,

        /// Maximum description length
        #[arg(long, default_value_t = 500)]
        max_length: u32,
    },

    /// Translate product content
    Translate {
        #[command(flatten)]
        selection: Selection,

        /// Target language code
        #[arg(short, long)]
        language: String,

        /// Domain context for the translator (defaults to ecommerce)
        #[arg(long)]
        context: Option<String>,
    },

    /// Generate SEO metadata
    Seo {
        #[command(flatten)]
        selection: Selection,

        /// Skip meta title generation
        #[arg(long)]
        no_meta_title: bool,

        /// Skip meta description generation
        #[arg(long)]
        no_meta_description: bool,

        /// Skip keyword generation
        #[arg(long)]
        no_keywords: bool,
    },

    /// Chat with the AI about your products
    Chat {
        /// Message to send
        message: String,

        /// Chat context as a JSON object
        #[arg(long, default_value = "{}")]
        context: String,
    },
}

/// Which catalog products an AI operation targets.
#[derive(Args)]
struct Selection {
    /// Only products in this category
    #[arg(long)]
    category: Option<String>,

    /// Maximum number of products
    #[arg(long)]
    limit: Option<usize>,
}

impl Selection {
    fn query(&self) -> ProductQuery {
        let mut query = ProductQuery::all();
        if let Some(ref category) = self.category {
            query = query.category(category);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Start { daemon } => return cmd_start(config_path, daemon),
        Commands::Tools => cmd_tools(),
        Commands::Exec { tool, params } => cmd_exec(config_path, &tool, &params)?,
        Commands::Health => cmd_health(config_path)?,
        Commands::Usage => cmd_usage(config_path)?,
        Commands::Ai { operation } => cmd_ai(config_path, operation)?,
        Commands::Config { path } => cmd_config(config_path, path)?,
        Commands::Completions { shell } => cmd_completions(shell),
    }

    Ok(ExitCode::SUCCESS)
}

fn load_app(config_path: Option<&Path>) -> Result<App> {
    let config = Config::load(config_path)?;
    App::from_config(config)
}

/// Start the MCP server, optionally staying alive until Ctrl+C.
fn cmd_start(config_path: Option<&Path>, daemon: bool) -> Result<ExitCode> {
    let app = load_app(config_path)?;
    let stop = ShutdownSignal::new();

    if daemon {
        let handler_stop = stop.clone();
        ctrlc::set_handler(move || handler_stop.trigger())?;
    }

    let outcome = app.start(daemon, &stop, &mut io::stdout())?;
    tracing::debug!(?outcome, "start finished");

    Ok(if outcome.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// List available tools.
fn cmd_tools() {
    println!("MCP tools:\n");
    print!("{}", format_tools(&ToolKind::ALL));
}

/// Connect and run one tool.
fn cmd_exec(config_path: Option<&Path>, tool: &str, params: &str) -> Result<()> {
    let params: ToolParams =
        serde_json::from_str(params).context("--params must be a JSON object")?;

    let app = load_app(config_path)?;
    let service = app.service();

    service.connect().context("Failed to connect")?;
    let result = service.execute_tool(tool, &params);
    service.disconnect();

    print_json(&result?.to_json())
}

/// Check API health.
fn cmd_health(config_path: Option<&Path>) -> Result<()> {
    let app = load_app(config_path)?;
    let health = app.client().health()?;

    print_json(&serde_json::Value::Object(health))
}

/// Show API usage.
fn cmd_usage(config_path: Option<&Path>) -> Result<()> {
    let app = load_app(config_path)?;
    let usage = app.client().usage()?;

    print_json(&serde_json::Value::Object(usage))
}

/// Handle AI commands.
fn cmd_ai(config_path: Option<&Path>, operation: AiOperation) -> Result<()> {
    let app = load_app(config_path)?;

    let result = match operation {
        AiOperation::Describe { selection, tone, languages, max_length } => {
            let mut options = DescriptionOptions { tone, max_length, ..DescriptionOptions::default() };
            if !languages.is_empty() {
                options.languages = languages;
            }
            app.describe(&selection.query(), &options)?
        }
        AiOperation::Translate { selection, language, context } => {
            let mut options = TranslateOptions::default();
            if let Some(context) = context {
                options.context = context;
            }
            app.translate(&selection.query(), &language, &options)?
        }
        AiOperation::Seo { selection, no_meta_title, no_meta_description, no_keywords } => {
            let options = SeoOptions {
                meta_title: !no_meta_title,
                meta_description: !no_meta_description,
                keywords: !no_keywords,
            };
            app.seo(&selection.query(), &options)?
        }
        AiOperation::Chat { message, context } => {
            let context: ApiData =
                serde_json::from_str(&context).context("--context must be a JSON object")?;
            serde_json::Value::Object(app.client().chat(&message, &context)?)
        }
    };

    print_json(&result)
}

/// Show configuration.
fn cmd_config(config_path: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        match Config::locate(config_path) {
            Some(path) => println!("{}", path.display()),
            None => println!("No config file found (looked for {LOCAL_CONFIG_FILE})"),
        }
        return Ok(());
    }

    let config = Config::load(config_path)?;

    println!("Plugix Configuration:\n");
    println!("  API key:   {}", config.masked_api_key());
    println!("  API URL:   {}", config.normalized_api_url());
    println!("  Platform:  {}", config.platform);
    println!("  Timeout:   {}s", config.request_timeout_secs);
    println!("  Languages: {}", config.languages.join(", "));

    println!("\n  MCP:");
    println!("    Enabled:            {}", config.mcp.enabled);
    println!("    Auto connect:       {}", config.mcp.auto_connect);
    println!("    Reconnect interval: {}ms", config.mcp.reconnect_interval);

    println!("\n  Features:");
    println!("    Product descriptions: {}", config.features.product_descriptions);
    println!("    Translations:         {}", config.features.translations);
    println!("    SEO optimization:     {}", config.features.seo_optimization);

    match config.catalog.path {
        Some(ref path) => println!("\n  Catalog: {}", path.display()),
        None => println!("\n  Catalog: (empty, no file configured)"),
    }

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "plugix", &mut io::stdout());
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}
