//! Command-line driver for Horizon Splice.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::prelude::*;

use horizon_splice::config::CONFIG_FILE;
use horizon_splice::module_path::absolutize;
use horizon_splice::{DependencyGraph, Error, InvocationKind, Result, SpliceConfig, Splicer};
use horizon_splice_core::parse_css;

/// Expand style and mixin invocations in stylesheets
#[derive(Parser, Debug)]
#[command(name = "horizon-splice", version)]
#[command(about = "Expand style and mixin invocations in stylesheets")]
struct Args {
    /// Stylesheets to expand
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Configuration file, used when it exists
    #[arg(long, short = 'c', default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Invocation kind (styles or mixin), overriding the configuration
    #[arg(long, short = 'k')]
    kind: Option<InvocationKind>,

    /// Directory for expanded stylesheets (default: stdout)
    #[arg(long, short = 'o')]
    out_dir: Option<PathBuf>,

    /// Write dependency messages as JSON to this file
    #[arg(long)]
    deps: Option<PathBuf>,

    /// Drop undefined invocations instead of failing
    #[arg(long)]
    silent: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "horizon_splice=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("horizon-splice: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = if args.config.is_file() {
        SpliceConfig::load(&args.config)?
    } else {
        SpliceConfig::default()
    };
    if let Some(kind) = args.kind {
        config.kind = kind;
    }
    if args.silent {
        config.silent = true;
    }

    let mut splicer = Splicer::new(config);
    let mut graph = DependencyGraph::new();
    splicer.once(&mut graph)?;

    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    for input in &args.inputs {
        let css = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
        let path = absolutize(&cwd, input);
        let mut doc = parse_css(&css, Some(path.as_path()))?;
        splicer.resolve(&mut doc)?;
        let output = doc.to_css();

        match &args.out_dir {
            Some(dir) => write_output(dir, input, &output)?,
            None => print!("{output}"),
        }
    }

    splicer.once_exit()?;

    if let Some(path) = &args.deps {
        let json = serde_json::to_string_pretty(&graph.messages())
            .map_err(|e| Error::io(path, e.into()))?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}

fn write_output(dir: &Path, input: &Path, css: &str) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let name = input.file_name().unwrap_or(input.as_os_str());
    let target = dir.join(name);
    fs::write(&target, css).map_err(|e| Error::io(&target, e))?;
    tracing::info!("Wrote {}", target.display());
    Ok(())
}
