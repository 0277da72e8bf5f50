//! Digcache - command-line DNS lookups with a TTL cache.
//!
//! The binary is a thin shell around the library: it parses the command line,
//! loads configuration, runs a single resolution against the upstream
//! resolver, and prints the answer as text or JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use digcache::cache::LookupCache;
use digcache::config::Config;
use digcache::dns::{RecordKind, Resolution, Resolver};

#[derive(Parser)]
#[command(name = "digcache")]
#[command(version)]
#[command(about = "DNS lookups over UDP/TCP with a bounded TTL cache")]
struct Cli {
    /// Domain name to resolve
    domain: String,

    /// Record type to query (A, AAAA, CNAME, MX, NS)
    #[arg(default_value = "A")]
    record_type: String,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// Print the resolution as record lines followed by a summary line.
fn print_text(domain: &str, kind: RecordKind, resolution: &Resolution) {
    for record in &resolution.records {
        println!("{record}");
    }
    let source = if resolution.cached { "cache" } else { "upstream" };
    println!(";; {domain} {kind} from {source}, ttl {}s", resolution.ttl);
}

/// Print the resolution as a JSON object.
fn print_json(domain: &str, kind: RecordKind, resolution: &Resolution) -> Result<()> {
    let payload = serde_json::json!({
        "domain": domain,
        "record_type": kind.as_str(),
        "records": resolution.records,
        "cached": resolution.cached,
        "ttl": resolution.ttl,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let domain = cli.domain.trim();
    if domain.is_empty() {
        bail!("Domain parameter is required");
    }

    // Validate the record type before touching the network.
    let kind: RecordKind = cli.record_type.parse()?;

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    info!("Upstream resolver: {}", config.upstream_resolver);
    info!("Default cache TTL: {} seconds", config.default_ttl_seconds);
    info!("Cache capacity: {} entries", config.max_cache_entries);

    let cache = Arc::new(LookupCache::new(
        config.max_cache_entries,
        Duration::from_secs(config.default_ttl_seconds),
    ));
    let resolver = Resolver::new(config.upstream_resolver, cache);

    let resolution = resolver.resolve(domain, kind).await?;

    if cli.json {
        print_json(domain, kind, &resolution)?;
    } else {
        print_text(domain, kind, &resolution);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep stdout clean for record output; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    run().await
}
