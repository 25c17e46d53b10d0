use crate::error::AppError;
use crate::export::{ExportDestination, ExportFormat};
use crate::index::{FilterKind, FilterSet, QueryMode};
use crate::model::AccessKind;
use crate::stack::ItemConfig;
use crate::store::DiskReplicaStore;
use crate::types::{parse_updated_since, PageSize, RegistryUrl, ValidationError};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about = "Browse the MCP server registry and export IDE configs", long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Registry listing endpoint (saved as the default when given)
    #[arg(long, env = "MCP_REGISTRY_URL", global = true)]
    pub registry_url: Option<String>,

    /// Directory holding the local replica and preferences
    #[arg(long, env = "MCP_CATALOG_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep the replica and preferences in memory only
    #[arg(long, default_value_t = false, global = true)]
    pub no_persist: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show one page of servers
    Browse(BrowseArgs),
    /// Build the local replica of the whole catalog
    Index {
        /// Crawl again even if a replica exists
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Manage the stack of selected access points
    Stack {
        #[command(subcommand)]
        action: StackAction,
    },
    /// Write the stack as an IDE configuration
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub struct BrowseArgs {
    /// Search term matched against names and descriptions
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Only servers updated since this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub updated_since: Option<String>,

    /// Page number to show
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Results per page, 3 to 100 (saved as the default)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Query the local replica, building it first if needed
    #[arg(long, conflicts_with = "remote")]
    pub local: bool,

    /// Query the registry directly
    #[arg(long)]
    pub remote: bool,

    /// Package registry filter, e.g. `npm=off` (local mode only)
    #[arg(long = "package-filter", value_name = "TYPE=on|off")]
    pub package_filters: Vec<String>,

    /// Remote transport filter, e.g. `sse=off` (local mode only)
    #[arg(long = "transport-filter", value_name = "TYPE=on|off")]
    pub transport_filters: Vec<String>,

    /// Print entries as JSON instead of a listing
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum StackAction {
    /// List stack items
    List,
    /// Add an access point of a server
    Add(StackItemArgs),
    /// Remove an access point of a server
    Remove(StackItemArgs),
    /// Save your own command, arguments, env vars or headers for an item
    Set(StackConfigArgs),
    /// Forget the saved settings of an item
    Reset(StackItemArgs),
    /// Empty the stack
    Clear,
}

#[derive(Args, Debug)]
pub struct StackItemArgs {
    /// Server name, e.g. io.github.acme/weather
    pub server: String,
    #[arg(value_enum)]
    pub kind: AccessKind,
    /// Position among the server's packages or remotes
    #[arg(default_value_t = 0)]
    pub index: usize,
}

#[derive(Args, Debug)]
pub struct StackConfigArgs {
    #[command(flatten)]
    pub item: StackItemArgs,

    /// Launch command (packages)
    #[arg(long)]
    pub command: Option<String>,

    /// Launch argument, repeatable; replaces the generated ones (packages)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Environment variable (packages)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// HTTP header (remotes)
    #[arg(long = "header", value_name = "KEY=VALUE")]
    pub headers: Vec<String>,
}

impl StackConfigArgs {
    pub fn to_config(&self) -> Result<ItemConfig, ValidationError> {
        Ok(ItemConfig {
            command: self.command.as_deref().map(str::trim).map(str::to_string),
            args: (!self.args.is_empty()).then(|| self.args.clone()),
            env: parse_pairs(&self.env)?,
            headers: parse_pairs(&self.headers)?,
        })
    }
}

fn parse_pairs(pairs: &[String]) -> Result<IndexMap<String, String>, ValidationError> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(ValidationError::InvalidOverride {
                field: pair.clone(),
                reason: "expected KEY=VALUE".to_string(),
            }),
        })
        .collect()
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_enum, default_value_t = ExportFormat::VsCode)]
    pub format: ExportFormat,

    /// Output file or directory (defaults to the format's file name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy the document to the clipboard
    #[arg(short = 'b', long, default_value_t = false)]
    pub clipboard: bool,

    /// Print the document to stdout only
    #[arg(short = 'p', long, default_value_t = false)]
    pub pipe: bool,
}

/// Session-wide settings resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Explicit registry override; `None` uses the saved preference.
    pub registry_url: Option<RegistryUrl>,
    pub data_dir: PathBuf,
    pub persist: bool,
    pub verbose: bool,
}

impl CatalogConfig {
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        let registry_url = cli
            .registry_url
            .as_deref()
            .map(RegistryUrl::parse)
            .transpose()?;

        Ok(Self {
            registry_url,
            data_dir: cli
                .data_dir
                .clone()
                .unwrap_or_else(DiskReplicaStore::default_dir),
            persist: !cli.no_persist,
            verbose: cli.verbose,
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            registry_url: None,
            data_dir: DiskReplicaStore::default_dir(),
            persist: true,
            verbose: false,
        }
    }
}

/// A validated browse request.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseOptions {
    pub search: String,
    pub updated_since: Option<DateTime<Utc>>,
    pub page: usize,
    pub page_size: Option<PageSize>,
    /// `None` keeps the saved mode.
    pub mode: Option<QueryMode>,
    pub filters: FilterSet,
    pub json: bool,
}

impl BrowseArgs {
    pub fn resolve(&self) -> Result<BrowseOptions, AppError> {
        if self.page == 0 {
            return Err(ValidationError::InvalidPageNumber(self.page).into());
        }

        let mut filters = FilterSet::new();
        for spec in &self.package_filters {
            filters.apply_flag(FilterKind::Package, spec)?;
        }
        for spec in &self.transport_filters {
            filters.apply_flag(FilterKind::Remote, spec)?;
        }

        let mode = match (self.local, self.remote) {
            (true, _) => Some(QueryMode::Local),
            (_, true) => Some(QueryMode::Remote),
            _ => None,
        };

        Ok(BrowseOptions {
            search: self.search.trim().to_string(),
            updated_since: self
                .updated_since
                .as_deref()
                .map(parse_updated_since)
                .transpose()?,
            page: self.page,
            page_size: self.page_size.map(PageSize::preference).transpose()?,
            mode,
            filters,
            json: self.json,
        })
    }
}

impl ExportArgs {
    pub fn destinations(&self) -> Vec<ExportDestination> {
        if self.pipe {
            return vec![ExportDestination::Stdout];
        }
        let mut destinations = Vec::new();
        if let Some(path) = &self.output {
            destinations.push(ExportDestination::File(path.clone()));
        }
        if self.clipboard {
            destinations.push(ExportDestination::Clipboard);
        }
        if destinations.is_empty() {
            destinations.push(ExportDestination::File(PathBuf::from(self.format.file_name())));
        }
        destinations
    }
}
