use std::fmt;
use std::sync::Arc;

use party_core::model::{CategoryKey, ContentItem, ContentPayload, RuleKind};
use services::{AppServices, ContentLibrary, Draw, DrawService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BUILTIN_CATALOG: &str = include_str!("../content/catalogs.json");

#[derive(Debug)]
enum ArgsError {
    MissingCommand,
    MissingValue { flag: &'static str },
    MissingCategory { command: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidCategory { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "a subcommand is required"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingCategory { command } => {
                write!(f, "{command} requires a category")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid category: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app draw <category>   [--db <sqlite_url>] [--catalog <file.json>]");
    eprintln!("  app reset <category>  [--db <sqlite_url>] [--catalog <file.json>]");
    eprintln!("  app reset-all         [--db <sqlite_url>] [--catalog <file.json>]");
    eprintln!("  app forget-all        [--db <sqlite_url>] [--catalog <file.json>]");
    eprintln!("  app status            [--db <sqlite_url>] [--catalog <file.json>]");
    eprintln!("  app categories        [--catalog <file.json>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:party.sqlite3");
    eprintln!("  --catalog <built-in sample catalog>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PARTY_DB_URL, PARTY_CATALOG, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Draw(CategoryKey),
    Reset(CategoryKey),
    ResetAll,
    ForgetAll,
    Status,
    Categories,
}

impl Command {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let first = args.next().ok_or(ArgsError::MissingCommand)?;
        match first.as_str() {
            "draw" => Ok(Self::Draw(require_category(args, "draw")?)),
            "reset" => Ok(Self::Reset(require_category(args, "reset")?)),
            "reset-all" => Ok(Self::ResetAll),
            "forget-all" => Ok(Self::ForgetAll),
            "status" => Ok(Self::Status),
            "categories" => Ok(Self::Categories),
            _ => Err(ArgsError::UnknownCommand(first)),
        }
    }

    fn needs_storage(&self) -> bool {
        !matches!(self, Self::Categories)
    }
}

fn require_category(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<CategoryKey, ArgsError> {
    let raw = args.next().ok_or(ArgsError::MissingCategory { command })?;
    if raw.starts_with("--") {
        return Err(ArgsError::MissingCategory { command });
    }
    CategoryKey::new(raw.clone()).map_err(|_| ArgsError::InvalidCategory { raw })
}

struct Args {
    command: Command,
    db_url: String,
    catalog_path: Option<String>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let command = Command::parse(&mut args)?;
        let mut db_url =
            std::env::var("PARTY_DB_URL").unwrap_or_else(|_| "sqlite:party.sqlite3".into());
        let mut catalog_path = std::env::var("PARTY_CATALOG").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--catalog" => {
                    catalog_path = Some(require_value(&mut args, "--catalog")?);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url: normalize_sqlite_url(db_url),
            catalog_path,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn load_library(
    path: Option<&str>,
) -> Result<ContentLibrary<ContentItem>, Box<dyn std::error::Error>> {
    let library = match path {
        Some(path) => {
            tracing::info!(path, "loading catalog file");
            ContentLibrary::from_json(&std::fs::read_to_string(path)?)?
        }
        None => ContentLibrary::from_json(BUILTIN_CATALOG)?,
    };
    Ok(library)
}

fn print_draw(draw: &Draw<ContentItem>) {
    if draw.did_rollover {
        println!("(You've seen everything in {}. Starting over!)", draw.category);
    }
    match &draw.item.payload {
        ContentPayload::Question {
            text,
            options,
            correct_answer,
        } => {
            println!("{text}");
            for (n, option) in options.iter().enumerate() {
                println!("  {}) {option}", n + 1);
            }
            println!("answer: {correct_answer}");
        }
        ContentPayload::Rule { text, scope } => {
            let label = match scope {
                RuleKind::Permanent => "permanent rule",
                RuleKind::Card => "rule",
            };
            println!("[{label}] {text}");
        }
        ContentPayload::Prompt { text } | ContentPayload::Word { text } => println!("{text}"),
    }
}

async fn print_status(draws: &DrawService<ContentItem>) {
    for progress in draws.progress_all().await {
        println!(
            "{:<20} {:>4}/{:<4} {} left this cycle",
            progress.category.as_str(),
            progress.cursor.clamp(0, i64::try_from(progress.total).unwrap_or(i64::MAX)),
            progress.total,
            progress.remaining
        );
    }
}

fn wants_help(argv: &[String]) -> bool {
    argv.is_empty() || argv.iter().any(|arg| matches!(arg.as_str(), "--help" | "-h"))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if wants_help(&argv) {
        print_usage();
        return Ok(());
    }

    let parsed = Args::parse(argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let library = load_library(parsed.catalog_path.as_deref())?;

    if !parsed.command.needs_storage() {
        for (category, catalog) in library.iter() {
            println!("{:<20} {} items", category.as_str(), catalog.len());
        }
        return Ok(());
    }

    // Open + migrate SQLite here so services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, library).await?;
    let draws: Arc<DrawService<ContentItem>> = services.draws();

    match parsed.command {
        Command::Draw(category) => {
            let draw = draws.draw_next(&category).await?;
            print_draw(&draw);
        }
        Command::Reset(category) => {
            draws.reset_category(&category).await;
            println!("{category} will start from the beginning.");
        }
        Command::ResetAll => {
            draws.new_game().await;
            println!("New game: every category starts from the beginning.");
        }
        Command::ForgetAll => {
            draws.forget_all().await;
            println!("All saved progress removed.");
        }
        Command::Status => print_status(&draws).await,
        Command::Categories => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
