//! CLI mode for forgecache - generates deploy artifacts and optionally warms
//! the asset cache.

mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use crate::{
    CacheConfig, CacheController, DiskStore, HttpFetcher, generate,
};

use progress::{ProgressEvents, print_activation_summary, print_install_summary};

const DEFAULT_ORIGIN: &str = "https://pixelforge.com";

/// Parsed command-line options.
struct Options {
    config_path: Option<PathBuf>,
    out_dir: PathBuf,
    cache_dir: Option<PathBuf>,
    origin: String,
    warm: bool,
    activate: bool,
}

fn print_usage() {
    eprintln!("Usage: forgecache [OPTIONS]");
    eprintln!();
    eprintln!("Generates the sw-config.toml and build-info.json deploy artifacts,");
    eprintln!("and can warm the offline asset cache ahead of the first visitor.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <PATH>     Cache config TOML to deploy (default: built-in site config)");
    eprintln!("  --out <DIR>         Artifact output directory (default: dist)");
    eprintln!("  --warm              Precache the manifest into the cache store");
    eprintln!("  --activate          After warming, evict stale cache buckets");
    eprintln!("  --cache-dir <DIR>   Cache store root for --warm (default: <out>/cache)");
    eprintln!("  --origin <URL>      Site origin for relative assets (default: {DEFAULT_ORIGIN})");
    eprintln!("  -h, --help          Show this help");
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut options = Options {
        config_path: None,
        out_dir: PathBuf::from("dist"),
        cache_dir: None,
        origin: DEFAULT_ORIGIN.to_string(),
        warm: false,
        activate: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config_path = Some(PathBuf::from(args.get(i)?));
            }
            "--out" => {
                i += 1;
                options.out_dir = PathBuf::from(args.get(i)?);
            }
            "--cache-dir" => {
                i += 1;
                options.cache_dir = Some(PathBuf::from(args.get(i)?));
            }
            "--origin" => {
                i += 1;
                options.origin = args.get(i)?.clone();
            }
            "--warm" => options.warm = true,
            "--activate" => options.activate = true,
            _ => return None,
        }
        i += 1;
    }

    Some(options)
}

/// Runs the CLI with the given arguments (excluding the program name).
pub async fn run(args: Vec<String>) -> ExitCode {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let Some(options) = parse_args(&args) else {
        print_usage();
        return ExitCode::FAILURE;
    };

    match execute(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(options: Options) -> crate::Result<()> {
    let config = match &options.config_path {
        Some(path) => CacheConfig::load(path)?,
        None => CacheConfig::default(),
    };

    let paths = generate::write_artifacts(&config, &options.out_dir)?;
    println!("Wrote {}", paths.sw_config.display());
    println!("Wrote {}", paths.build_info.display());

    if !options.warm {
        return Ok(());
    }

    let cache_dir = options
        .cache_dir
        .unwrap_or_else(|| options.out_dir.join("cache"));
    let store = DiskStore::new(cache_dir);
    let fetcher = HttpFetcher::new(options.origin)?;
    let activate = options.activate;

    let controller = CacheController::new(config, store, fetcher);

    println!(
        "Warming cache {} ({} assets)...",
        controller.version(),
        controller.config().manifest.len()
    );

    let events = ProgressEvents::new(controller.config().manifest.len());
    let report = controller.install(&events).await;
    events.finish();

    let report = report?;
    print_install_summary(&report);

    if activate {
        let report = controller.activate(&crate::NoEvents).await?;
        print_activation_summary(&report);
    }

    Ok(())
}
