//! CLI - Command Line Interface
//!
//! Available Commands:
//! - quotes add <AUTHOR> <CONTENT>
//! - quotes list [--keyword-type T] [--keyword K] [--page N]
//! - quotes get <ID>
//! - quotes update <ID> [--author A] [--content C]
//! - quotes delete <ID>
//! - quotes build
//! - quotes recent

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use quotes_core::{BackendKind, KeywordType, PageRequest, Quote, QuoteDraft, QuoteId, StorageConfig};
use quotes_storage::{QuoteService, open_repository};

/// Quotes shown per listing page
pub(crate) const LIST_PAGE_SIZE: usize = 5;

const LIST_HEADER: &str = "번호 / 작가 / 명언";
const LIST_RULE: &str = "=====================";

/// Quote store CLI
#[derive(Parser, Debug)]
#[command(name = "quotes")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// YAML storage configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend (memory, file, consolidated, sqlite)
    #[arg(short, long, global = true)]
    backend: Option<BackendKind>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Register a quote
    Add(AddArgs),

    /// List one page of quotes, optionally filtered by keyword
    List(ListArgs),

    /// Show one quote
    Get(IdArgs),

    /// Replace a quote's author and/or content
    Update(UpdateArgs),

    /// Delete a quote
    Delete(IdArgs),

    /// Rewrite the store from its current contents
    Build,

    /// Show what the backend lists as its full collection
    Recent,
}

#[derive(Args, Debug)]
pub(crate) struct AddArgs {
    pub author: String,
    pub content: String,
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Field the keyword searches: author, content or all
    #[arg(long, default_value = "all")]
    pub keyword_type: KeywordType,

    #[arg(short, long, default_value = "")]
    pub keyword: String,

    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Args, Debug)]
pub(crate) struct IdArgs {
    pub id: i64,
}

#[derive(Args, Debug)]
pub(crate) struct UpdateArgs {
    pub id: i64,

    /// New author; keeps the current one when omitted
    #[arg(short, long)]
    pub author: Option<String>,

    /// New content; keeps the current one when omitted
    #[arg(short, long)]
    pub content: Option<String>,
}

/// Parse CLI arguments and execute commands
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    debug!("Resolved storage config: {:?}", config);

    let repository = open_repository(&config)
        .await
        .with_context(|| format!("failed to open {} storage", config.backend))?;
    let service = QuoteService::new(repository);

    match cli.command {
        Commands::Add(args) => cmd_add(&service, args).await,
        Commands::List(args) => cmd_list(&service, args).await,
        Commands::Get(args) => cmd_get(&service, args).await,
        Commands::Update(args) => cmd_update(&service, args).await,
        Commands::Delete(args) => cmd_delete(&service, args).await,
        Commands::Build => cmd_build(&service).await,
        Commands::Recent => cmd_recent(&service).await,
    }
}

/// Logs go to stderr so command output stays clean. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config file, then environment, then `--backend`
pub(crate) fn resolve_config(cli: &Cli) -> anyhow::Result<StorageConfig> {
    let config = match &cli.config {
        Some(path) => StorageConfig::load(path)?,
        None => StorageConfig::default(),
    };
    let mut config = config.apply_env()?;

    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    Ok(config)
}

async fn cmd_add(service: &QuoteService, args: AddArgs) -> anyhow::Result<()> {
    let id = service
        .create(&QuoteDraft::new(args.author, args.content))
        .await?;
    info!("Registered quote {}", id);
    println!("{id}번 명언이 등록되었습니다.");
    Ok(())
}

async fn cmd_list(service: &QuoteService, args: ListArgs) -> anyhow::Result<()> {
    let request = PageRequest::new(args.page, LIST_PAGE_SIZE)?;
    let page = service
        .page(args.keyword_type, &args.keyword, request)
        .await?;

    print_quotes(&page.content);
    if let Some(indicator) = page.indicator() {
        println!("{indicator}");
    }
    Ok(())
}

async fn cmd_get(service: &QuoteService, args: IdArgs) -> anyhow::Result<()> {
    let quote = service.find_by_id(QuoteId(args.id)).await?;
    println!("{quote}");
    Ok(())
}

async fn cmd_update(service: &QuoteService, args: UpdateArgs) -> anyhow::Result<()> {
    let id = QuoteId(args.id);
    let current = service.find_by_id(id).await?;

    let draft = QuoteDraft::new(
        args.author.unwrap_or(current.author),
        args.content.unwrap_or(current.content),
    );
    let updated = service.update(id, &draft).await?;
    println!("{updated}번 명언이 수정되었습니다.");
    Ok(())
}

async fn cmd_delete(service: &QuoteService, args: IdArgs) -> anyhow::Result<()> {
    let deleted = service.delete(QuoteId(args.id)).await?;
    println!("{deleted}번 명언이 삭제되었습니다.");
    Ok(())
}

async fn cmd_build(service: &QuoteService) -> anyhow::Result<()> {
    service.build().await?;
    info!("Storage rebuilt");
    Ok(())
}

async fn cmd_recent(service: &QuoteService) -> anyhow::Result<()> {
    let quotes = service.list_all().await?;
    print_quotes(&quotes);
    Ok(())
}

fn print_quotes(quotes: &[Quote]) {
    println!("{LIST_HEADER}");
    println!("{LIST_RULE}");
    for quote in quotes {
        println!("{quote}");
    }
}
