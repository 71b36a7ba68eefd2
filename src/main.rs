use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gcpfind::config::Config;
use gcpfind::gcp::auth;
use gcpfind::gcp::client::GcpClient;
use gcpfind::gcp::projects::{check_project_ids, searchable_projects, ProjectCache};
use gcpfind::output::{self, OutputFormat};
use gcpfind::resource::build_providers;
use gcpfind::search::{Engine, Query, ResourceKind, SearchContext};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Find GCP resources by name across projects
#[derive(Parser, Debug)]
#[command(name = "gcpfind", version, about, long_about = None)]
struct Cli {
    /// Log level for debugging (written to the log file)
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search resources whose name contains TERM
    Search(SearchArgs),
    /// List the searchable resource types
    Kinds,
    /// Show or refresh the cached project list
    Projects {
        /// Re-fetch the project list from Resource Manager
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Name fragment to look for (case-insensitive)
    term: String,

    /// Only search this resource type (repeatable)
    #[arg(long = "type", value_name = "KIND")]
    types: Vec<String>,

    /// Skip this resource type (repeatable)
    #[arg(long = "no-type", value_name = "KIND")]
    no_types: Vec<String>,

    /// Project to search (repeatable). Defaults to config, then the project cache
    #[arg(short, long = "project", value_name = "PROJECT")]
    projects: Vec<String>,

    /// Number of projects searched at the same time
    #[arg(long)]
    parallelism: Option<usize>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcpfind started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcpfind").join("gcpfind.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcpfind").join("gcpfind.log");
    }
    PathBuf::from("gcpfind.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = setup_logging(cli.log_level);

    let config = Config::load();

    match cli.command {
        Command::Search(args) => run_search(args, &config).await,
        Command::Kinds => {
            for kind in ResourceKind::all() {
                println!("{:<30} {}", kind.as_str(), kind.display_name());
            }
            Ok(())
        }
        Command::Projects { refresh } => run_projects(refresh).await,
    }
}

async fn run_search(args: SearchArgs, config: &Config) -> Result<()> {
    // Validation happens before any credentials or network work
    let query = Query::from_filters(args.term.as_str(), &args.types[..], &args.no_types[..])?;

    let client = GcpClient::new().await?;
    let projects = resolve_projects(&args.projects, config, &client).await?;

    let mut engine = Engine::new(build_providers(&client)?)?;
    if let Some(parallelism) = config.effective_parallelism(args.parallelism) {
        engine.set_max_concurrent_projects(parallelism);
    }

    let mut ctx = SearchContext::new();
    if let Some(timeout) = config.effective_timeout(args.timeout) {
        ctx = ctx.with_timeout(timeout);
    }

    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, canceling search");
            interrupt.cancel();
        }
    });

    tracing::info!("Searching {} projects for {:?}", projects.len(), query.term);

    let output = engine.search_with_warnings(&ctx, &projects, &query).await?;

    match args.output {
        OutputFormat::Json => println!("{}", output::render_json(&output)?),
        OutputFormat::Text => {
            print!("{}", output::render_results_table(&output.results));
            eprint!("{}", output::render_warnings(&output.warnings));
            if output.results.is_empty() {
                eprintln!("No resources matching {:?} found.", query.term);
            }
        }
    }

    if output.all_failed() {
        anyhow::bail!("all {} searches failed", output.units);
    }

    Ok(())
}

/// Pick the projects to search: flags, then config, then the cache, then
/// a live listing (cached for next time), then the gcloud default project
async fn resolve_projects(
    explicit: &[String],
    config: &Config,
    client: &GcpClient,
) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        check_project_ids(explicit)?;
        return Ok(explicit.to_vec());
    }

    if let Some(projects) = config.configured_projects() {
        check_project_ids(projects).context("Bad project list in config file")?;
        return Ok(projects.to_vec());
    }

    if let Some(cache) = ProjectCache::load() {
        let projects = searchable_projects(cache.projects);
        if !projects.is_empty() {
            tracing::debug!("Using {} cached projects", projects.len());
            return Ok(projects);
        }
    }

    match ProjectCache::refresh(client).await {
        Ok(cache) => {
            let projects = searchable_projects(cache.projects);
            if !projects.is_empty() {
                return Ok(projects);
            }
            tracing::warn!("No projects returned, falling back to default project");
        }
        Err(e) => tracing::warn!("Failed to list projects: {:#}, falling back to default project", e),
    }

    auth::get_default_project()
        .map(|project| vec![project])
        .context("No projects to search. Pass --project or set GOOGLE_CLOUD_PROJECT")
}

async fn run_projects(refresh: bool) -> Result<()> {
    let cache = if refresh {
        let client = GcpClient::new().await?;
        Some(ProjectCache::refresh(&client).await?)
    } else {
        ProjectCache::load()
    };

    let Some(cache) = cache else {
        println!("No cached projects. Run 'gcpfind projects --refresh'.");
        return Ok(());
    };

    for project in &cache.projects {
        println!("{}", project);
    }
    eprintln!(
        "{} projects, cached {}",
        cache.projects.len(),
        cache.updated_at.format("%Y-%m-%d %H:%M UTC")
    );

    Ok(())
}
