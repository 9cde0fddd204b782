//! urlquery CLI Application
//!
//! A command-line interface for urlquery.net: submit URLs for sandbox
//! analysis, download reports and artifacts, check reputation and search
//! public reports. This binary is a thin layer over urlquery-lib.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use urlquery_lib::{
    api_key, base_url, encode_path_segment, load_env_config, mask_secret, poll_until_done,
    split_tags, CancellationToken, ClientOption, ConfigKey, ConfigManager, EnvConfig, FileConfig,
    PollConfig, SearchParams, SubmitJob, UrlqueryClient, UrlqueryError,
    DEFAULT_SUBMIT_USER_AGENT,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

const MISSING_API_KEY: &str =
    "API Key is required. Set it via 'config set apikey <value>' or use the --apikey flag.";

type CliResult<T> = Result<T, Box<dyn Error>>;

/// CLI arguments for urlquery-cli
#[derive(Parser, Debug)]
#[command(name = "urlquery-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for interacting with urlquery.net")]
#[command(
    long_about = "A command-line interface for submitting URLs to urlquery.net for sandbox analysis,\nfetching reports and artifacts, checking URL reputation and searching reports."
)]
#[command(styles = STYLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// API key (overrides URLQUERY_APIKEY and the config file)
    #[arg(long = "apikey", value_name = "KEY", global = true, help_heading = "Global Options")]
    pub apikey: Option<String>,

    /// Directory for downloaded reports, screenshots and files
    #[arg(long = "output", value_name = "DIR", global = true, help_heading = "Global Options")]
    pub output: Option<String>,

    /// Print a human-readable summary instead of JSON
    #[arg(long = "summary", global = true, help_heading = "Global Options")]
    pub summary: bool,

    /// Use a specific config file instead of ~/.urlquery-cli.yaml
    #[arg(long = "config", value_name = "FILE", global = true, help_heading = "Configuration")]
    pub config: Option<String>,

    /// Alternate API gateway (default: https://api.urlquery.net)
    #[arg(long = "base-url", value_name = "URL", global = true, help_heading = "Configuration")]
    pub base_url: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true, help_heading = "Configuration")]
    pub verbose: bool,

    /// Show request-level debug logging
    #[arg(short = 'd', long = "debug", global = true, help_heading = "Configuration")]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a URL for sandbox analysis and wait for the report
    Submit(SubmitArgs),

    /// Fetch report details or download artifacts
    #[command(
        long_about = "Retrieve data from a finished scan by its Report ID.\n\n  report        JSON report with scan metadata and results\n  screenshot    Screenshot of the loaded URL\n  domain_graph  Visual representation of domain relationships\n  resource      Specific resource from the scan (by hash)\n\nFiles are written to the output directory (default: current directory)."
    )]
    Report {
        /// Report ID (UUID)
        report_id: String,

        /// What to fetch
        #[arg(value_enum)]
        action: ReportAction,

        /// Resource hash (required for `resource`)
        hash: Option<String>,
    },

    /// Check the reputation of a URL or IP address
    Reputation {
        /// URL or IP to look up
        url: String,
    },

    /// Search reports on urlquery.net (see https://urlquery.net/help/search)
    Search {
        /// Search query
        query: String,

        /// Maximum number of results to return
        #[arg(long = "limit", default_value_t = 10)]
        limit: u32,

        /// Result offset
        #[arg(long = "offset", default_value_t = 0)]
        offset: u32,
    },

    /// View or edit CLI config (API key, output directory, ...)
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show version information
    Version,
}

#[derive(clap::Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct SubmitArgs {
    #[command(subcommand)]
    pub command: Option<SubmitCommand>,

    /// URL to submit
    pub url: Option<String>,

    /// Comma-separated tags (alphanumeric and underscore only)
    #[arg(long = "tags", value_name = "TAGS")]
    pub tags: Option<String>,

    /// Override the browser user agent used by the sandbox
    #[arg(long = "useragent", value_name = "UA")]
    pub useragent: Option<String>,

    /// Report visibility: public, restricted or private
    #[arg(long = "access", value_name = "LEVEL")]
    pub access: Option<String>,

    /// Referer sent with the first request
    #[arg(long = "referer", value_name = "URL")]
    pub referer: Option<String>,

    /// Return right after queueing instead of waiting for the report
    #[arg(long = "no-wait")]
    pub no_wait: bool,

    /// Seconds between status checks
    #[arg(long = "interval", value_name = "SECS", default_value_t = 1)]
    pub interval: u64,

    /// Give up after this many status checks (0 = no limit)
    #[arg(long = "max-polls", value_name = "N", default_value_t = 600)]
    pub max_polls: u32,
}

#[derive(Subcommand, Debug)]
pub enum SubmitCommand {
    /// View the current processing status of a submitted URL
    Status {
        /// Queue ID returned by `submit`
        queue_id: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Report,
    Screenshot,
    #[value(name = "domain_graph")]
    DomainGraph,
    Resource,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set a configuration value (apikey, output, useragent, access)
    Set { key: String, value: String },
    /// Remove a configuration value
    Unset { key: String },
}

/// Settings after merging flags, environment and the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub apikey: Option<String>,
    pub output: PathBuf,
    pub useragent: Option<String>,
    pub access: Option<String>,
    pub base_url: Option<String>,
    pub summary: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_tracing(&args);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. `URLQUERY_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_env("URLQUERY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::colors_enabled_stderr())
        .with_target(args.debug)
        .try_init();
}

async fn run(args: Args) -> CliResult<()> {
    validate_args(&args)?;

    if let Command::Version = args.command {
        print_version();
        return Ok(());
    }

    let env_config = load_env_config();
    let manager = config_manager(&args, &env_config)?;

    match &args.command {
        Command::Config(command) => run_config(&manager, command),
        command => {
            let file_config = manager.load()?;
            let settings = resolve_settings(&args, env_config, file_config);
            tracing::debug!(config = %manager.path().display(), "settings resolved");

            match command {
                Command::Submit(submit) => run_submit(&settings, submit).await,
                Command::Report {
                    report_id,
                    action,
                    hash,
                } => run_report(&settings, report_id, *action, hash.as_deref()).await,
                Command::Reputation { url } => run_reputation(&settings, url).await,
                Command::Search {
                    query,
                    limit,
                    offset,
                } => run_search(&settings, query, *limit, *offset).await,
                Command::Config(_) | Command::Version => Ok(()),
            }
        }
    }
}

/// Validate argument combinations clap cannot express.
fn validate_args(args: &Args) -> Result<(), String> {
    match &args.command {
        Command::Submit(submit) if submit.command.is_none() => {
            if submit.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                return Err("Missing URL.\nUsage: urlquery-cli submit <url>".to_string());
            }
            if submit.interval == 0 {
                return Err("--interval must be at least 1 second".to_string());
            }
        }
        Command::Report {
            action: ReportAction::Resource,
            hash,
            ..
        } if hash.as_deref().map_or(true, |h| h.trim().is_empty()) => {
            return Err(
                "Missing resource hash.\nUsage: urlquery-cli report <report_id> resource <hash>"
                    .to_string(),
            );
        }
        _ => {}
    }

    if let Some(url) = &args.base_url {
        if url.trim().is_empty() {
            return Err("--base-url cannot be empty".to_string());
        }
    }

    Ok(())
}

/// Config file: `--config` > `URLQUERY_CONFIG` > `~/.urlquery-cli.yaml`.
fn config_manager(args: &Args, env_config: &EnvConfig) -> Result<ConfigManager, UrlqueryError> {
    if let Some(path) = &args.config {
        tracing::info!("using config file from --config: {}", path);
        Ok(ConfigManager::new(path))
    } else if let Some(path) = &env_config.config {
        tracing::info!("using config file from URLQUERY_CONFIG: {}", path);
        Ok(ConfigManager::new(path))
    } else {
        ConfigManager::with_default_path()
    }
}

/// Merge settings with precedence: CLI flag > environment > config file > default.
fn resolve_settings(args: &Args, env_config: EnvConfig, file_config: FileConfig) -> Settings {
    let flag = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

    Settings {
        apikey: flag(&args.apikey)
            .or(env_config.apikey)
            .or(file_config.apikey),
        output: flag(&args.output)
            .or(env_config.output)
            .or(file_config.output)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        useragent: env_config.useragent.or(file_config.useragent),
        access: env_config.access.or(file_config.access),
        base_url: flag(&args.base_url).or(env_config.base_url),
        summary: args.summary,
    }
}

/// Build the API client once per invocation. All API commands need a key.
fn build_client(settings: &Settings) -> CliResult<UrlqueryClient> {
    let key = settings
        .apikey
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or(MISSING_API_KEY)?;

    let mut options: Vec<ClientOption> = vec![api_key(key.trim())];
    if let Some(url) = &settings.base_url {
        options.push(base_url(url.trim()));
    }

    Ok(UrlqueryClient::with_options(options)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{}", output);
    Ok(())
}

/// Truncate-and-write `data` to `dir/name`.
fn write_output(dir: &Path, name: &str, data: &[u8]) -> CliResult<PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            UrlqueryError::file_error(dir.to_string_lossy(), format!("Failed to create directory: {}", e))
        })?;
    }

    let path = dir.join(name);
    fs::write(&path, data).map_err(|e| {
        UrlqueryError::file_error(path.to_string_lossy(), format!("Failed to write file: {}", e))
    })?;

    tracing::info!(path = %path.display(), bytes = data.len(), "file written");
    Ok(path)
}

// ── submit ───────────────────────────────────────────────────────────────────

fn build_submit_job(settings: &Settings, submit: &SubmitArgs, url: &str) -> SubmitJob {
    let useragent = submit
        .useragent
        .clone()
        .or_else(|| settings.useragent.clone())
        .unwrap_or_else(|| DEFAULT_SUBMIT_USER_AGENT.to_string());
    let access = submit
        .access
        .as_deref()
        .or(settings.access.as_deref())
        .unwrap_or("public");

    let mut job = SubmitJob::new(url)
        .with_useragent(useragent)
        .with_access(access);

    if let Some(tags) = &submit.tags {
        job = job.with_tags(split_tags(tags));
    }
    if let Some(referer) = &submit.referer {
        job = job.with_referer(referer.clone());
    }

    job
}

async fn run_submit(settings: &Settings, submit: &SubmitArgs) -> CliResult<()> {
    if let Some(SubmitCommand::Status { queue_id }) = &submit.command {
        return run_submit_status(settings, queue_id).await;
    }

    let url = submit.url.as_deref().unwrap_or_default();
    let client = build_client(settings)?;
    let job = build_submit_job(settings, submit, url);

    let queued = client.submit(&job).await?;
    tracing::info!(queue_id = %queued.queue_id, status = %queued.status, "url submitted");

    if settings.summary {
        ui::print_submit_summary(&queued);
    } else if submit.no_wait {
        print_json(&queued)?;
    }

    if submit.no_wait {
        return Ok(());
    }

    let config = PollConfig::default()
        .with_interval(Duration::from_secs(submit.interval))
        .with_max_attempts((submit.max_polls > 0).then_some(submit.max_polls));

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let result = poll_until_done(&client, queued, &config, &cancel, ui::print_poll_status).await;
    ui::clear_poll_status();

    let done = result?;
    ui::print_report_finished(&done);
    Ok(())
}

async fn run_submit_status(settings: &Settings, queue_id: &str) -> CliResult<()> {
    let client = build_client(settings)?;
    let job = client.queue_status(queue_id).await?;
    print_json(&job)
}

// ── report ───────────────────────────────────────────────────────────────────

async fn run_report(
    settings: &Settings,
    report_id: &str,
    action: ReportAction,
    hash: Option<&str>,
) -> CliResult<()> {
    // Fail on a malformed ID before the API key check or any request
    urlquery_lib::validate_report_id(report_id)?;

    let client = build_client(settings)?;
    let dir = settings.output.as_path();

    match action {
        ReportAction::Report => {
            let document = client.get_report(report_id).await?;
            if settings.summary {
                ui::print_report_summary(&document.report);
            } else {
                let path = write_output(dir, &format!("report_{}.json", report_id), &document.raw)?;
                println!("Report written to: {}", path.display());
            }
        }
        ReportAction::Screenshot => {
            let data = client.get_screenshot(report_id).await?;
            let path = write_output(dir, &format!("screenshot_{}.png", report_id), &data)?;
            println!("Screenshot written to: {}", path.display());
        }
        ReportAction::DomainGraph => {
            let data = client.get_domain_graph(report_id).await?;
            let path = write_output(dir, &format!("domain_graph_{}.gif", report_id), &data)?;
            println!("Domain graph written to: {}", path.display());
        }
        ReportAction::Resource => {
            let hash = hash.unwrap_or_default().trim();
            let data = client.get_resource(report_id, hash).await?;
            // The hash names the file too, so it must not contain path separators
            let file_name = format!("resource_{}", encode_path_segment("resource hash", hash)?);
            let path = write_output(dir, &file_name, &data)?;
            println!("Resource written to: {} ({} bytes)", path.display(), data.len());
        }
    }

    Ok(())
}

// ── reputation / search ──────────────────────────────────────────────────────

async fn run_reputation(settings: &Settings, url: &str) -> CliResult<()> {
    let client = build_client(settings)?;
    let result = client.check_reputation(url).await?;

    if settings.summary {
        ui::print_reputation_summary(&result);
        Ok(())
    } else {
        print_json(&result)
    }
}

async fn run_search(settings: &Settings, query: &str, limit: u32, offset: u32) -> CliResult<()> {
    let client = build_client(settings)?;
    let params = SearchParams::new(query).limit(limit).offset(offset);
    let results = client.search(&params).await?;

    if settings.summary {
        ui::print_search_summary(&results);
        Ok(())
    } else {
        print_json(&results)
    }
}

// ── config / version ─────────────────────────────────────────────────────────

fn run_config(manager: &ConfigManager, command: &ConfigCommand) -> CliResult<()> {
    match command {
        ConfigCommand::Show => {
            let entries: Vec<(ConfigKey, String)> = manager
                .entries()?
                .into_iter()
                .map(|(key, value)| match key {
                    ConfigKey::ApiKey => (key, mask_secret(&value)),
                    _ => (key, value),
                })
                .collect();
            ui::print_config_entries(&manager.path().display().to_string(), &entries);
        }
        ConfigCommand::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            let config = manager.set(key, value)?;
            let stored = config.get(key).unwrap_or_default();
            let shown = if key == ConfigKey::ApiKey {
                mask_secret(stored)
            } else {
                stored.to_string()
            };
            println!("Config updated: {} = {}", key, shown);
        }
        ConfigCommand::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            if manager.unset(key)? {
                println!("Config key '{}' has been removed.", key);
            } else {
                println!("Config key '{}' is not set.", key);
            }
        }
    }
    Ok(())
}

fn print_version() {
    let info = urlquery_lib::info();
    println!("urlquery-cli version {}", env!("CARGO_PKG_VERSION"));
    println!("Library: urlquery-lib {}", info.version);
    println!("Authors: {}", info.author);
    println!("API endpoint: {}", info.api_base_url);
    println!(
        "OS/Arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}
