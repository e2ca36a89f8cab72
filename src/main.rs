use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use skiff::{Config, ConfigError, FeedList, HttpSource, StoreError};

/// Get the config directory path (~/.config/skiff/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("skiff"))
}

/// Get the cache directory path (~/.cache/skiff/)
fn get_cache_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".cache").join("skiff"))
}

/// Atomically replace `dst` with `bytes` using write-to-temp-then-rename.
/// The destination is never observable in a partial state.
fn atomic_write(dst: &Path, bytes: &[u8]) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions or disk space",
                temp_path.display()
            )
        })?;

    temp_file.write_all(bytes).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write to temporary file '{}': disk may be full",
            temp_path.display()
        )
    })?;

    temp_file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk",
            temp_path.display()
        )
    })?;

    drop(temp_file);

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}': check permissions",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "skiff", about = "Refresh subscribed feeds and update the local read-state cache")]
struct Args {
    /// Config file (default: ~/.config/skiff/feeds.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cache file (default: ~/.cache/skiff/feeds.json)
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Mark every item in every feed as read after refreshing
    #[arg(long)]
    mark_all_read: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("feeds.toml"),
    };
    let cache_path = match args.cache {
        Some(path) => path,
        None => get_cache_dir()?.join("feeds.json"),
    };

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(ConfigError::Missing(path)) => {
            eprintln!("Error: no config file found at {}", path.display());
            eprintln!();
            eprintln!("To get started, list your feeds by category:");
            eprintln!();
            eprintln!("  # {}", path.display());
            eprintln!("  news = [\"https://example.com/rss\"]");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load config"),
    };

    let list = FeedList::from_config(&config);
    if list.is_empty() {
        eprintln!("Warning: config contains no feeds, nothing to refresh");
        return Ok(());
    }

    // First run has no cache; a corrupt cache is abandoned rather than
    // allowed to poison the fresh state.
    match File::open(&cache_path) {
        Ok(file) => match list.restore(file) {
            Ok(()) => {}
            Err(StoreError::Decode(e)) => {
                tracing::warn!(path = %cache_path.display(), error = %e, "Cache is corrupt, starting from fresh state");
            }
            Err(e) => return Err(e).context("Failed to restore cache"),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %cache_path.display(), "No cache file, first run");
        }
        Err(e) => return Err(e).context("Failed to open cache"),
    }

    println!("Refreshing {} feeds...", list.len());
    let mut rx = list
        .update_all(Arc::new(HttpSource::new()))
        .context("Failed to start refresh")?;

    let mut failures = 0usize;
    while let Some(done) = rx.recv().await {
        let feed = done.feed.read();
        match &done.result {
            Ok(added) => println!("  ok   {} ({} new)", feed.url, added),
            Err(e) => {
                failures += 1;
                println!("  fail {} ({})", feed.url, e);
            }
        }
    }

    if args.mark_all_read {
        list.mark_all_read();
        println!("Marked all items read.");
    }

    if let Some(dir) = cache_path.parent() {
        std::fs::create_dir_all(dir).context("Failed to create cache directory")?;
    }
    let mut buf = Vec::new();
    list.save(&mut buf).context("Failed to serialize cache")?;
    atomic_write(&cache_path, &buf)?;

    let unread = list
        .feeds()
        .iter()
        .filter(|f| f.read().has_unread())
        .count();
    println!(
        "Done: {} feeds refreshed, {} failed, {} with unread items.",
        list.len() - failures,
        failures,
        unread
    );
    Ok(())
}
