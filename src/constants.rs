// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Registry API
// ---------------------------------------------------------------------------

/// The public MCP registry listing endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.modelcontextprotocol.io/v0/servers";

/// Only the latest version of each server is listed.
pub const REGISTRY_VERSION_FILTER: &str = "latest";

/// Accept header sent with every listing request. Errors come back as
/// RFC 7807 problem documents.
pub const REGISTRY_ACCEPT: &str = "application/json, application/problem+json";

// ---------------------------------------------------------------------------
// Page sizes
// ---------------------------------------------------------------------------

/// Smallest page a user may ask for.
pub const MIN_RESULTS_PER_PAGE: u32 = 3;

/// Largest page the registry serves. Also the crawl page size, to keep the
/// number of round-trips during a replica build low.
pub const MAX_RESULTS_PER_PAGE: u32 = 100;

/// Page size when nothing has been saved yet.
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 60;

// ---------------------------------------------------------------------------
// Settings keys
// ---------------------------------------------------------------------------

pub const SETTING_REGISTRY_URL: &str = "mcp-registry-api-url";
pub const SETTING_RESULTS_PER_PAGE: &str = "mcp-registry-results-per-page";
pub const SETTING_USE_LOCAL_INDEX: &str = "mcp-registry-use-index";
pub const SETTING_STACK: &str = "mcp-registry-stack";

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Directory name under the user cache dir.
pub const STORE_DIR_NAME: &str = "mcp-catalog";

pub const ENTRIES_FILE: &str = "servers.json";
pub const MANIFEST_FILE: &str = "servers.manifest.json";
pub const SETTINGS_FILE: &str = "settings.json";

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

pub const VSCODE_CONFIG_FILE: &str = "mcp-settings.json";
pub const CURSOR_CONFIG_FILE: &str = "cursor-config.json";

/// Image registry assumed for OCI packages that name none.
pub const DEFAULT_OCI_REGISTRY: &str = "docker.io";
