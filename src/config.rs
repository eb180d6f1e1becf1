//! Configuration

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::resolver::{RemainderPolicy, ResolveOptions};

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Storefront feature flags and policies.
///
/// None of these reach the resolver directly; the remainder policy is handed over
/// as [`ResolveOptions`].
#[derive(Debug, Clone, Args)]
pub struct StorefrontConfig {
    /// Orders must be drawn from a specific inventory location
    #[arg(long, env = "MULTI_LOCATION_INVENTORY", default_value_t = false)]
    pub multi_location_inventory: bool,

    /// Apply eligible promotions automatically when adding to the cart
    #[arg(long, env = "AUTO_APPLY_PROMOTIONS", default_value_t = false)]
    pub auto_apply_promotions: bool,

    /// How to pick between two remainder packagings the shopper has not chosen between
    #[arg(
        long,
        env = "REMAINDER_POLICY",
        value_enum,
        default_value_t = RemainderPolicy::DefaultPriority
    )]
    pub remainder_policy: RemainderPolicy,

    /// Catalog id sent with facet queries
    #[arg(long, env = "CATALOG_ID", default_value = "catalog")]
    pub catalog_id: String,
}

impl StorefrontConfig {
    /// Options to resolve selections with.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            remainder_policy: self.remainder_policy,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            multi_location_inventory: false,
            auto_apply_promotions: false,
            remainder_policy: RemainderPolicy::default(),
            catalog_id: "catalog".to_string(),
        }
    }
}

/// Allot CLI configuration
#[derive(Debug, Parser)]
#[command(
    name = "allot",
    about = "Resolve variant allocation and tiered pricing for a catalog fixture",
    long_about = None
)]
pub struct AllotConfig {
    /// Directory holding catalog fixtures
    #[arg(long, env = "ALLOT_FIXTURE_DIR", default_value = "./fixtures")]
    pub fixture_dir: PathBuf,

    /// Catalog fixture name
    #[arg(short, long, default_value = "reel")]
    pub fixture: String,

    /// Requested quantity
    #[arg(short, long, allow_negative_numbers = true)]
    pub quantity: i64,

    /// Id of the remainder variant to use for left over units
    #[arg(short, long)]
    pub choice: Option<String>,

    /// Facet to filter by, as `Name=Value` (repeatable)
    #[arg(long = "facet", value_parser = parse_facet)]
    pub facets: Vec<(String, String)>,

    /// Storefront settings
    #[command(flatten)]
    pub storefront: StorefrontConfig,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AllotConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

fn parse_facet(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected Name=Value, got {arg}"))?;

    if name.trim().is_empty() || value.trim().is_empty() {
        return Err(format!("expected Name=Value, got {arg}"));
    }

    Ok((name.trim().to_string(), value.trim().to_string()))
}
