//! IDE configuration documents generated from the stack.
//!
//! Remotes become `{type, url, headers}` and packages become a launch command
//! `{command, args, env}`. Servers are keyed by name, so two items of the
//! same server collapse into the later one.

use crate::constants::{CURSOR_CONFIG_FILE, DEFAULT_OCI_REGISTRY, VSCODE_CONFIG_FILE};
use crate::error::AppError;
use crate::model::{AccessPoint, KeyValueInput, Package, PackageArgument, Remote};
use crate::output::{DeliveryTarget, OutputPlan};
use crate::stack::{Stack, StackItem};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Target IDE document layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// `{"servers": {...}}`
    #[value(name = "vscode")]
    VsCode,
    /// `{"mcpServers": {...}}`
    Cursor,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::VsCode => VSCODE_CONFIG_FILE,
            Self::Cursor => CURSOR_CONFIG_FILE,
        }
    }

    fn root_key(self) -> &'static str {
        match self {
            Self::VsCode => "servers",
            Self::Cursor => "mcpServers",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VsCode => write!(f, "vscode"),
            Self::Cursor => write!(f, "cursor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteConfig {
    #[serde(rename = "type")]
    pub transport_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageConfig {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerConfig {
    Remote(RemoteConfig),
    Package(PackageConfig),
}

fn resolved_map(inputs: &[KeyValueInput]) -> Option<IndexMap<String, String>> {
    if inputs.is_empty() {
        return None;
    }
    Some(
        inputs
            .iter()
            .map(|input| (input.name.clone(), input.resolved_value()))
            .collect(),
    )
}

pub fn remote_config(remote: &Remote) -> RemoteConfig {
    let transport_type = match remote.transport_type.as_str() {
        "streamable-http" => "http".to_string(),
        other => other.to_string(),
    };
    RemoteConfig {
        transport_type,
        url: remote.url.clone(),
        headers: resolved_map(&remote.headers),
    }
}

/// Command-line tokens for one runtime argument.
///
/// Named arguments emit their flag, followed by the value when one is
/// known. A named argument that expects a formatted value but has none is
/// left out, as is a positional one without a value or default.
fn argument_tokens(argument: &PackageArgument) -> Vec<String> {
    let value = argument.value.clone().or_else(|| argument.default.clone());
    match (argument.argument_type.as_str(), argument.name.as_deref(), value) {
        ("named", Some(name), Some(value)) => vec![name.to_string(), value],
        ("named", Some(name), None) if argument.format.is_none() => vec![name.to_string()],
        ("positional", _, Some(value)) => vec![value],
        _ => Vec::new(),
    }
}

/// Launch command generated from what the registry declares.
///
/// Runtime arguments go before the package identifier (or image).
pub fn package_config(package: &Package) -> PackageConfig {
    let launcher = |default: &str| {
        package
            .runtime_hint
            .clone()
            .unwrap_or_else(|| default.to_string())
    };
    let runtime: Vec<String> = package
        .runtime_arguments
        .iter()
        .flat_map(argument_tokens)
        .collect();
    let with_runtime = |mut prefix: Vec<String>, target: String| {
        prefix.extend(runtime.iter().cloned());
        prefix.push(target);
        Some(prefix)
    };
    let (command, args) = match package.registry_type.as_str() {
        "npm" => (launcher("npx"), with_runtime(Vec::new(), package.identifier.clone())),
        "pypi" => (launcher("uvx"), with_runtime(Vec::new(), package.identifier.clone())),
        "oci" => (launcher("docker"), with_runtime(docker_run_prefix(), oci_image(package))),
        other => {
            log::warn!(
                "No launch command known for registry type '{}' ({})",
                other,
                package.identifier
            );
            (String::new(), None)
        }
    };
    PackageConfig {
        command,
        args,
        env: resolved_map(&package.environment_variables),
    }
}

fn docker_run_prefix() -> Vec<String> {
    ["run", "-i", "--rm"].iter().map(|s| s.to_string()).collect()
}

fn oci_image(package: &Package) -> String {
    let registry = package
        .registry_base_url
        .as_deref()
        .map(|url| url.trim_start_matches("https://").trim_end_matches('/'))
        .filter(|host| !host.is_empty())
        .unwrap_or(DEFAULT_OCI_REGISTRY);
    format!(
        "{}/{}:{}",
        registry,
        package.identifier,
        package.version.as_deref().unwrap_or("latest")
    )
}

/// The exported config of one stack item: registry defaults with the
/// item's saved settings on top.
///
/// Saved env vars and headers are upserted into the generated maps. Saved
/// args replace the generated ones; an empty list drops them, except for
/// OCI packages which keep their `docker run` line.
pub fn item_config(item: &StackItem) -> ServerConfig {
    let saved = item.config.as_ref();
    match &item.access_point {
        AccessPoint::Remote(remote) => {
            let mut config = remote_config(remote);
            if let Some(saved) = saved.filter(|c| !c.headers.is_empty()) {
                config
                    .headers
                    .get_or_insert_with(IndexMap::new)
                    .extend(saved.headers.clone());
            }
            ServerConfig::Remote(config)
        }
        AccessPoint::Package(package) => {
            let mut config = package_config(package);
            if let Some(saved) = saved {
                if let Some(command) = &saved.command {
                    config.command = command.clone();
                }
                match saved.args.as_deref() {
                    Some([]) if package.registry_type == "oci" => {}
                    Some([]) => config.args = None,
                    Some(args) => config.args = Some(args.to_vec()),
                    None => {}
                }
                if !saved.env.is_empty() {
                    config
                        .env
                        .get_or_insert_with(IndexMap::new)
                        .extend(saved.env.clone());
                }
            }
            ServerConfig::Package(config)
        }
    }
}

/// Server configs keyed by server name, in stack order.
pub fn build_servers(stack: &Stack) -> IndexMap<String, ServerConfig> {
    let mut servers = IndexMap::new();
    for item in stack {
        servers.insert(item.server_name.clone(), item_config(item));
    }
    servers
}

/// Pretty-printed document for `format`.
pub fn render(stack: &Stack, format: ExportFormat) -> Result<String, AppError> {
    let mut document = IndexMap::new();
    document.insert(format.root_key(), build_servers(stack));
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Where an exported document should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDestination {
    /// A file; a directory gets the format's default file name.
    File(PathBuf),
    Stdout,
    Clipboard,
}

pub fn plan_export(
    stack: &Stack,
    format: ExportFormat,
    destinations: &[ExportDestination],
) -> Result<OutputPlan, AppError> {
    let content = render(stack, format)?;
    let plan = destinations
        .iter()
        .fold(OutputPlan::new(), |plan, destination| {
            let target = match destination {
                ExportDestination::File(path) if path.is_dir() => DeliveryTarget::WriteFile {
                    path: path.join(format.file_name()),
                    content: content.clone(),
                },
                ExportDestination::File(path) => DeliveryTarget::WriteFile {
                    path: path.clone(),
                    content: content.clone(),
                },
                ExportDestination::Stdout => DeliveryTarget::PrintToStdout {
                    content: content.clone(),
                },
                ExportDestination::Clipboard => DeliveryTarget::CopyToClipboard {
                    content: content.clone(),
                },
            };
            plan.with_target(target)
        });
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::ItemConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn package(registry_type: &str, identifier: &str) -> Package {
        Package {
            identifier: identifier.to_string(),
            registry_type: registry_type.to_string(),
            registry_base_url: None,
            version: Some("1.0.0".to_string()),
            runtime_hint: None,
            runtime_arguments: Vec::new(),
            package_arguments: Vec::new(),
            transport: None,
            environment_variables: Vec::new(),
            file_sha256: None,
            extra: Default::default(),
        }
    }

    fn item(server: &str, access_point: AccessPoint) -> StackItem {
        StackItem {
            server_name: server.to_string(),
            index: 0,
            access_point,
            config: None,
        }
    }

    #[test]
    fn remote_maps_streamable_http_and_resolves_headers() {
        let remote = Remote {
            transport_type: "streamable-http".to_string(),
            url: Some("https://api.example/mcp".to_string()),
            headers: vec![
                KeyValueInput {
                    name: "Authorization".to_string(),
                    description: Some("Bearer token".to_string()),
                    ..Default::default()
                },
                KeyValueInput {
                    name: "X-Region".to_string(),
                    default: Some("eu".to_string()),
                    ..Default::default()
                },
            ],
            extra: Default::default(),
        };
        let json = serde_json::to_value(remote_config(&remote)).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "http",
                "url": "https://api.example/mcp",
                "headers": {"Authorization": "<Bearer token>", "X-Region": "eu"}
            })
        );
    }

    #[test]
    fn package_commands_per_registry() {
        let npm = package_config(&package("npm", "@acme/weather"));
        assert_eq!(npm.command, "npx");
        assert_eq!(npm.args, Some(vec!["@acme/weather".to_string()]));

        let mut pypi = package("pypi", "acme-weather");
        pypi.runtime_hint = Some("pipx".to_string());
        assert_eq!(package_config(&pypi).command, "pipx");

        let mut oci = package("oci", "acme/weather");
        oci.registry_base_url = Some("https://ghcr.io".to_string());
        assert_eq!(
            package_config(&oci).args.unwrap(),
            vec!["run", "-i", "--rm", "ghcr.io/acme/weather:1.0.0"]
        );

        let docker_hub = package_config(&package("oci", "acme/weather"));
        assert_eq!(docker_hub.args.unwrap()[3], "docker.io/acme/weather:1.0.0");

        let unknown = package_config(&package("nuget", "Acme.Weather"));
        assert_eq!(serde_json::to_value(unknown).unwrap(), json!({"command": ""}));
    }

    #[test]
    fn package_env_uses_value_then_default_then_placeholder() {
        let mut pkg = package("npm", "x");
        pkg.environment_variables = vec![
            KeyValueInput {
                name: "A".to_string(),
                value: Some("set".to_string()),
                default: Some("ignored".to_string()),
                ..Default::default()
            },
            KeyValueInput {
                name: "B".to_string(),
                ..Default::default()
            },
        ];
        let env = package_config(&pkg).env.unwrap();
        assert_eq!(env["A"], "set");
        assert_eq!(env["B"], "<B>");
    }

    #[test]
    fn documents_key_servers_by_name_and_later_items_win() {
        let mut stack = Stack::new();
        stack.add(item("one", AccessPoint::Package(package("npm", "first"))));
        stack.add(item("two", AccessPoint::Package(package("pypi", "second"))));
        stack.add(item(
            "one",
            AccessPoint::Remote(Remote {
                transport_type: "sse".to_string(),
                url: Some("https://one.example/sse".to_string()),
                headers: Vec::new(),
                extra: Default::default(),
            }),
        ));

        let vscode: serde_json::Value =
            serde_json::from_str(&render(&stack, ExportFormat::VsCode).unwrap()).unwrap();
        assert_eq!(
            vscode,
            json!({
                "servers": {
                    "one": {"type": "sse", "url": "https://one.example/sse"},
                    "two": {"command": "uvx", "args": ["second"]}
                }
            })
        );

        let cursor = render(&stack, ExportFormat::Cursor).unwrap();
        assert!(cursor.starts_with("{\n  \"mcpServers\""));
    }

    #[test]
    fn empty_stack_renders_empty_document() {
        let rendered = render(&Stack::new(), ExportFormat::VsCode).unwrap();
        assert_eq!(rendered, "{\n  \"servers\": {}\n}");
    }

    #[test]
    fn directory_destination_gets_default_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_export(
            &Stack::new(),
            ExportFormat::Cursor,
            &[
                ExportDestination::File(dir.path().to_path_buf()),
                ExportDestination::Stdout,
            ],
        )
        .unwrap();
        assert_eq!(plan.targets.len(), 2);
        assert!(matches!(
            &plan.targets[0],
            DeliveryTarget::WriteFile { path, .. } if path.ends_with("cursor-config.json")
        ));
    }

    fn argument(argument_type: &str, name: Option<&str>, value: Option<&str>) -> PackageArgument {
        PackageArgument {
            argument_type: argument_type.to_string(),
            name: name.map(str::to_string),
            value: value.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn runtime_arguments_precede_the_target() {
        let mut npm = package("npm", "@acme/weather");
        npm.runtime_arguments = vec![
            argument("named", Some("-y"), None),
            argument("named", Some("--registry"), Some("https://npm.acme.dev")),
            PackageArgument {
                format: Some("filepath".to_string()),
                ..argument("named", Some("--config"), None)
            },
            argument("positional", None, None),
        ];
        assert_eq!(
            package_config(&npm).args.unwrap(),
            vec!["-y", "--registry", "https://npm.acme.dev", "@acme/weather"]
        );

        let mut oci = package("oci", "acme/weather");
        oci.runtime_arguments = vec![argument("positional", None, Some("--network=host"))];
        assert_eq!(
            package_config(&oci).args.unwrap(),
            vec!["run", "-i", "--rm", "--network=host", "docker.io/acme/weather:1.0.0"]
        );
    }

    #[test]
    fn saved_settings_override_registry_defaults() {
        let mut pkg = package("npm", "@acme/weather");
        pkg.environment_variables = vec![
            KeyValueInput {
                name: "API_KEY".to_string(),
                is_required: true,
                ..Default::default()
            },
            KeyValueInput {
                name: "REGION".to_string(),
                default: Some("eu".to_string()),
                ..Default::default()
            },
        ];
        let mut package_item = item("weather", AccessPoint::Package(pkg));
        package_item
            .set_config(ItemConfig {
                command: Some("bunx".to_string()),
                env: IndexMap::from([("API_KEY".to_string(), "sk-live".to_string())]),
                ..Default::default()
            })
            .unwrap();

        let mut remote_item = item(
            "tickets",
            AccessPoint::Remote(Remote {
                headers: vec![KeyValueInput {
                    name: "Authorization".to_string(),
                    ..Default::default()
                }],
                ..Remote::new("sse", Some("https://tickets.example/sse".to_string()))
            }),
        );
        remote_item
            .set_config(ItemConfig {
                headers: IndexMap::from([("Authorization".to_string(), "Bearer t0k".to_string())]),
                ..Default::default()
            })
            .unwrap();

        let mut stack = Stack::new();
        stack.add(package_item);
        stack.add(remote_item);
        let cursor: serde_json::Value =
            serde_json::from_str(&render(&stack, ExportFormat::Cursor).unwrap()).unwrap();
        assert_eq!(
            cursor,
            json!({
                "mcpServers": {
                    "weather": {
                        "command": "bunx",
                        "args": ["@acme/weather"],
                        "env": {"API_KEY": "sk-live", "REGION": "eu"}
                    },
                    "tickets": {
                        "type": "sse",
                        "url": "https://tickets.example/sse",
                        "headers": {"Authorization": "Bearer t0k"}
                    }
                }
            })
        );
    }

    #[test]
    fn saved_args_replace_generated_ones_but_oci_keeps_its_run_line() {
        let mut npm = item("n", AccessPoint::Package(package("npm", "@acme/n")));
        npm.config = Some(ItemConfig {
            args: Some(vec!["-y".to_string(), "@acme/n@next".to_string()]),
            ..Default::default()
        });
        let ServerConfig::Package(config) = item_config(&npm) else {
            panic!("expected a package config");
        };
        assert_eq!(config.args.unwrap(), vec!["-y", "@acme/n@next"]);

        let mut oci = item("o", AccessPoint::Package(package("oci", "acme/o")));
        oci.config = Some(ItemConfig {
            args: Some(Vec::new()),
            ..Default::default()
        });
        let ServerConfig::Package(config) = item_config(&oci) else {
            panic!("expected a package config");
        };
        assert_eq!(config.args.unwrap()[3], "docker.io/acme/o:1.0.0");
    }
}
