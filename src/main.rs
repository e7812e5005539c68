//! tldr - Main entry point.
//!
//! Usage: tldr [OPTIONS] [PAGE]...
//!
//! Options:
//!   --version, -v              Show version
//!   --update, -u               Re-download the page cache
//!   --list-all, -a             List every cached page
//!   --platform, -p <PLATFORM>  Show the page for a specific platform
//!   --path, -f <FILE>          Render a local page file
//!   --history, -t              Show the most recent lookups
//!   --random, -r               Show a random page
//!
//! Without options, renders PAGE for the current platform, falling back to
//! the common and other platforms.

use std::env;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::process;

use rand::Rng;
use tldr::cache::{CacheStore, HistoryTracker, Repository};
use tldr::config::{Config, SystemPlatform};
use tldr::lookup::find_page;
use tldr::render::{MarkdownRenderer, Palette};
use tldr::{Result, TldrError, logging};

/// Current version of tldr.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of history entries shown by --history.
const HISTORY_LIMIT: usize = 10;

const USAGE: &str = "Usage: tldr [OPTIONS] [PAGE]...

Options:
  -v, --version              Show version
  -u, --update               Re-download the page cache
  -a, --list-all             List every cached page
  -p, --platform <PLATFORM>  Show the page for a specific platform
  -f, --path <FILE>          Render a local page file
  -t, --history              Show the most recent lookups
  -r, --random               Show a random page
  -h, --help                 Show this help";

/// What the invocation asked for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    Update,
    ListAll,
    History,
    Random,
    Path(String),
    Platform { platform: String, page: String },
    Page(String),
}

/// Joins positional words into a page name (`git pull` -> `git-pull`).
fn page_name(words: &[String]) -> Option<String> {
    if words.is_empty() {
        return None;
    }
    Some(words.join("-").to_lowercase())
}

fn parse_args(args: &[String]) -> std::result::Result<Command, String> {
    let mut words = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-v" => return Ok(Command::Version),
            "--update" | "-u" => return Ok(Command::Update),
            "--list-all" | "-a" => return Ok(Command::ListAll),
            "--history" | "-t" => return Ok(Command::History),
            "--random" | "-r" => return Ok(Command::Random),
            "--path" | "-f" => {
                let path = iter.next().ok_or("--path requires a file")?;
                return Ok(Command::Path(path.clone()));
            }
            "--platform" | "-p" => {
                let platform = iter.next().ok_or("--platform requires a platform name")?;
                let rest: Vec<String> = iter.by_ref().cloned().collect();
                let page = page_name(&rest).ok_or("no page provided")?;
                return Ok(Command::Platform {
                    platform: platform.clone(),
                    page,
                });
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option: {}", flag)),
            word => words.push(word.to_string()),
        }
    }

    Ok(page_name(&words).map_or(Command::Help, Command::Page))
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config: {}", e);
        Config::default()
    });
    if let Err(e) = logging::init(&config.log_config) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Err(e) = run(command, &config) {
        tracing::error!("{}", e);
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    let palette = if config.color.enabled(atty::is(atty::Stream::Stdout)) {
        Palette::colored()
    } else {
        Palette::plain()
    };
    let renderer = MarkdownRenderer::new(palette);
    let mut stdout = io::stdout().lock();

    match command {
        Command::Help => println!("{}", USAGE),
        Command::Version => println!("tldr v{}", VERSION),
        Command::Update => {
            let store = CacheStore::new(config.cache_config()?);
            store.reload()?;
            println!("Pages updated.");
        }
        Command::ListAll => {
            let store = CacheStore::open(config.cache_config()?)?;
            for page in store.pages()? {
                println!("{}", page);
            }
        }
        Command::History => {
            let cache = config.cache_config()?;
            fs::create_dir_all(&cache.directory)?;
            let recent = HistoryTracker::new(&cache.directory).recent(HISTORY_LIMIT)?;
            if recent.is_empty() {
                println!("No history is available yet");
            }
            for record in recent {
                println!("{}", record);
            }
        }
        Command::Path(path) => {
            let file = File::open(&path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => TldrError::NotFound(path.clone()),
                _ => e.into(),
            })?;
            renderer.write(BufReader::new(file), &mut stdout)?;
        }
        Command::Platform { platform, page } => {
            let store = CacheStore::open(config.cache_config()?)?;
            let markdown = store.markdown(&platform, &page)?;
            renderer.write(BufReader::new(markdown), &mut stdout)?;
        }
        Command::Random => {
            let store = CacheStore::open(config.cache_config()?)?;
            let pages = store.pages()?;
            let page = pick_page(&pages, &mut rand::rng())?;
            show_page(&store, &renderer, page, &mut stdout)?;
        }
        Command::Page(page) => {
            let store = CacheStore::open(config.cache_config()?)?;
            show_page(&store, &renderer, &page, &mut stdout)?;
        }
    }

    Ok(())
}

/// Renders `page` from the best matching platform and records the lookup.
fn show_page<W: Write>(
    store: &CacheStore,
    renderer: &MarkdownRenderer,
    page: &str,
    out: &mut W,
) -> Result<()> {
    let found = find_page(store, &SystemPlatform::new(), page)?;
    tracing::debug!("Rendering {} from {}", page, found.platform);
    renderer.write(BufReader::new(found.reader), out)?;
    store.record_history(page)?;
    Ok(())
}

/// Picks one page uniformly at random.
fn pick_page<'a, R: Rng + ?Sized>(pages: &'a [String], rng: &mut R) -> Result<&'a str> {
    if pages.is_empty() {
        return Err(TldrError::NotFound("the cache holds no pages".to_string()));
    }
    Ok(&pages[rng.random_range(0..pages.len())])
}
