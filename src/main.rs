use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use h2push::compression::{CompressOptions, Compression};
use h2push::config::{parse_byte_size, PushConfig};
use h2push::{PushOptions, PushRequest};
use serde_json::json;
use std::path::PathBuf;

/// h2push - inspect how a resource would be pushed over HTTP/2
#[derive(Parser, Debug)]
#[command(name = "h2push")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve headers, priority and compression for a push without sending it
    Plan(PlanArgs),
}

#[derive(clap::Args, Debug)]
struct PlanArgs {
    /// Resource path of the push promise (e.g. /app.js)
    path: String,

    /// Read the body from this file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Inline text body
    #[arg(long, conflicts_with = "file")]
    body: Option<String>,

    /// Extra header, "name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Compression threshold, e.g. 512 or 2kb
    #[arg(long)]
    threshold: Option<String>,

    /// Push priority 0-7
    #[arg(short, long)]
    priority: Option<u8>,

    /// Gzip level 0-9
    #[arg(long)]
    level: Option<u32>,

    /// Disable compression
    #[arg(long)]
    no_compress: bool,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PushConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }),
        None => PushConfig::default(),
    };

    // Initialize logging subsystem
    h2push::logging::init_subscriber(config.log_format)
        .expect("Failed to initialize logging subsystem");

    tracing::debug!(
        threshold = config.threshold,
        default_priority = config.default_priority,
        compression_level = config.compression_level,
        "Configuration loaded"
    );

    let result = match args.command {
        Command::Plan(plan_args) => plan(plan_args, &config),
    };

    match result {
        Ok(report) => println!("{}", report),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn plan(args: PlanArgs, config: &PushConfig) -> anyhow::Result<serde_json::Value> {
    let mut options = PushOptions::new();

    for raw in &args.headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("header '{}' must look like 'name: value'", raw))?;
        options = options.header(name.trim(), value.trim());
    }
    if let Some(threshold) = &args.threshold {
        let bytes = parse_byte_size(threshold).map_err(|e| anyhow!(e))?;
        options = options.threshold(bytes);
    }
    if let Some(priority) = args.priority {
        options = options.priority(priority);
    }
    if args.no_compress {
        options = options.compress(false);
    } else if let Some(level) = args.level {
        options = options.compress_with(CompressOptions::with_level(level)?);
    }

    if let Some(body) = args.body {
        options = options.body(body);
    } else if let Some(file) = &args.file {
        let size = std::fs::metadata(file)
            .with_context(|| format!("cannot stat {}", file.display()))?
            .len();
        if !args.headers.iter().any(|h| h.to_lowercase().starts_with("content-length")) {
            options = options.header("content-length", size.to_string());
        }
        options = options.filename(file);
    }

    let request = PushRequest::new(&args.path, options, config)?;

    let headers: serde_json::Map<String, serde_json::Value> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                json!(value.to_str().unwrap_or("<binary>")),
            )
        })
        .collect();

    let compression = match request.compression() {
        Compression::Enabled(options) => json!({
            "enabled": true,
            "level": options.effective_level(config.compression_level),
        }),
        _ => json!({ "enabled": false }),
    };

    Ok(json!({
        "path": request.path(),
        "priority": request.priority(),
        "body": request.body_kind(),
        "content_type": request.content_type(),
        "length": request.length(),
        "compression": compression,
        "headers": headers,
    }))
}
