// src/main.rs

use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use mcp_catalog::config::{BrowseOptions, Command, CommandLineInput, StackAction};
use mcp_catalog::export::ExportDestination;
use mcp_catalog::index::{BuildOutcome, QueryMode, QueryParams};
use mcp_catalog::output::DeliveryTarget;
use mcp_catalog::pagination::NavigationOutcome;
use mcp_catalog::{AppError, CatalogConfig, CatalogSession, Entry};
use std::fs;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("mcp_catalog.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // stderr keeps stdout clean for `browse --json` and `export --pipe`.
    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

async fn browse(session: &mut CatalogSession, options: BrowseOptions) -> Result<(), AppError> {
    let current = session.params().clone();
    let params = QueryParams {
        mode: options.mode.unwrap_or(current.mode),
        search: options.search,
        updated_since: options.updated_since,
        filters: options.filters,
        page_size: options.page_size.unwrap_or(current.page_size),
    };
    session.query(params).await?;

    if session.mode() == QueryMode::Local {
        if options.page > 1 {
            if let NavigationOutcome::Unreachable(unreachable) =
                session.go_to_page(options.page).await?
            {
                eprintln!("⚠️  {}", unreachable);
            }
        }
    } else {
        walk_forward(session, options.page).await?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(session.entries())?);
        return Ok(());
    }

    print_page(session);
    Ok(())
}

/// The registry only hands out one cursor at a time, so remote pages are
/// reached by walking forward.
async fn walk_forward(session: &mut CatalogSession, page: usize) -> Result<(), AppError> {
    while session.navigator().current_page() < page {
        match session.next_page().await? {
            NavigationOutcome::Moved { .. } => {}
            _ => {
                eprintln!(
                    "⚠️  Only {} page(s) available.",
                    session.navigator().current_page()
                );
                break;
            }
        }
    }
    Ok(())
}

fn print_page(session: &CatalogSession) {
    let navigator = session.navigator();
    for entry in session.entries() {
        print_entry(entry, session);
    }

    let total = navigator
        .total_matched()
        .map(|n| format!(" of {} matching", n))
        .unwrap_or_default();
    println!(
        "📄 Page {} ({} {} server(s){}){}",
        navigator.current_page(),
        session.mode(),
        session.entries().len(),
        total,
        if navigator.has_next() { ", more available" } else { "" }
    );
}

fn print_entry(entry: &Entry, session: &CatalogSession) {
    let marker = if session.stack().server_has_items(entry.name()) {
        "★"
    } else {
        " "
    };
    println!("{} {}", marker, entry.name());
    if !entry.description().is_empty() {
        println!("    {}", entry.description());
    }
    for (i, package) in entry.packages().iter().enumerate() {
        println!("    package {}: {} {}", i, package.registry_type, package.identifier);
    }
    for (i, remote) in entry.remotes().iter().enumerate() {
        println!(
            "    remote {}: {} {}",
            i,
            remote.transport_type,
            remote.url.as_deref().unwrap_or("")
        );
    }
}

async fn index(session: &mut CatalogSession, force: bool) -> Result<(), AppError> {
    match session.enable_local_index(force).await? {
        BuildOutcome::Built { entries, pages } => {
            println!("✓ Indexed {} servers from {} page(s).", entries, pages);
        }
        BuildOutcome::Skipped { existing } => match existing {
            Some(info) => println!(
                "✓ Using existing replica of {} servers built {} (use --force to refresh).",
                info.entry_count,
                info.built_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => println!("✓ Using existing replica (use --force to refresh)."),
        },
    }
    Ok(())
}

async fn stack(session: &mut CatalogSession, action: StackAction) -> Result<(), AppError> {
    match action {
        StackAction::List => {
            if session.stack().is_empty() {
                println!("Your stack is empty");
            }
            for item in session.stack() {
                println!("{} {} {}", item.server_name, item.kind(), item.index);
                if let Some(config) = &item.config {
                    if let Some(command) = &config.command {
                        println!("    command: {}", command);
                    }
                    if let Some(args) = &config.args {
                        println!("    args: {}", args.join(" "));
                    }
                    for (key, value) in config.env.iter().chain(&config.headers) {
                        println!("    {} = {}", key, value);
                    }
                }
                let missing = item.missing_required_env();
                if !missing.is_empty() {
                    println!("    ⚠️  required env not set: {}", missing.join(", "));
                }
            }
        }
        StackAction::Add(args) => {
            let entry = session.find_entry(&args.server).await?.ok_or_else(|| {
                AppError::MissingConfiguration(format!("No server named '{}'", args.server))
            })?;
            if session.add_to_stack(&entry, args.kind, args.index).await {
                println!("✓ Added {} {} {} to your stack", args.server, args.kind, args.index);
            } else {
                println!(
                    "{} {} {} is already in your stack or does not exist",
                    args.server, args.kind, args.index
                );
            }
        }
        StackAction::Remove(args) => {
            if session
                .remove_from_stack(&args.server, args.kind, args.index)
                .await
            {
                println!("✓ Removed {} {} {}", args.server, args.kind, args.index);
            } else {
                println!("Not in your stack");
            }
        }
        StackAction::Set(args) => {
            let config = args.to_config()?;
            let item = &args.item;
            if session
                .configure_stack_item(&item.server, item.kind, item.index, config)
                .await?
            {
                println!("✓ Saved settings for {} {} {}", item.server, item.kind, item.index);
            } else {
                println!("Not in your stack");
            }
        }
        StackAction::Reset(args) => {
            if session
                .reset_stack_item_config(&args.server, args.kind, args.index)
                .await
            {
                println!("✓ Reset settings for {} {} {}", args.server, args.kind, args.index);
            } else {
                println!("Nothing saved for that item");
            }
        }
        StackAction::Clear => {
            session.clear_stack().await;
            println!("✓ Stack cleared");
        }
    }
    Ok(())
}

fn export(
    session: &CatalogSession,
    format: mcp_catalog::export::ExportFormat,
    destinations: Vec<ExportDestination>,
) -> Result<(), AppError> {
    if session.stack().is_empty() {
        log::warn!("Exporting an empty stack");
    }
    let report = session.export(format, &destinations)?;
    for completed in &report.completed {
        match &completed.target {
            DeliveryTarget::WriteFile { path, .. } => {
                eprintln!("✓ {} config saved to {}", format, path.display());
            }
            DeliveryTarget::CopyToClipboard { .. } => {
                eprintln!("✓ {} config copied to clipboard", format);
            }
            DeliveryTarget::PrintToStdout { .. } => {}
        }
    }
    Ok(())
}

async fn run(cli: CommandLineInput) -> Result<(), AppError> {
    let config = CatalogConfig::resolve(&cli)?;
    let mut session = CatalogSession::open(&config).await?;
    log::info!("Using registry {}", session.registry_url());

    match cli.command {
        Command::Browse(args) => browse(&mut session, args.resolve()?).await,
        Command::Index { force } => index(&mut session, force).await,
        Command::Stack { action } => stack(&mut session, action).await,
        Command::Export(args) => export(&session, args.format, args.destinations()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    run(cli).await?;

    Ok(())
}
