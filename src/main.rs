use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use betsy::export::{self, dot, ExportFormat};
use betsy::graph::{parse_prefix_list, validate_package_root, DependencyGraph, ModuleFilter};

#[derive(Parser)]
#[command(name = "betsy")]
#[command(author = "Gabriele N. Tornetta <phoenix1987@gmail.com>")]
#[command(version)]
#[command(about = "Visualize the import graph of a Python package", long_about = None)]
struct Cli {
    /// Package directory to scan (must contain __init__.py)
    root: PathBuf,

    /// Output file; its extension is replaced by the format's extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated module prefixes to keep
    #[arg(short = 'I', long, value_parser = parse_prefix_list)]
    include: Option<BTreeSet<String>>,

    /// Comma-separated module prefixes to drop
    #[arg(short = 'X', long, value_parser = parse_prefix_list)]
    exclude: Option<BTreeSet<String>>,

    /// Output format: html, json or dot
    #[arg(short, long, default_value = "html")]
    format: ExportFormat,

    /// Also lay the graph out with Graphviz next to the output
    #[arg(long)]
    render: bool,

    /// Show debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let root = validate_package_root(&cli.root)
        .with_context(|| format!("Invalid package root {}", cli.root.display()))?;

    let filter = ModuleFilter::new(cli.include.clone(), cli.exclude.clone());
    let graph = DependencyGraph::build(&root, filter)
        .with_context(|| format!("Failed to build import graph for {}", root.display()))?;

    let filter = graph.filter();
    log::debug!(
        "Include prefixes: {:?}, exclude prefixes: {:?}",
        filter.include(),
        filter.exclude()
    );

    for cycle in graph.import_cycles() {
        log::info!("Import cycle: {}", cycle);
    }

    let content = export::export_to_string(cli.format, &graph)
        .with_context(|| format!("Failed to export graph as {}", cli.format))?;

    let path = match &cli.output {
        Some(output) => {
            let path = output.with_extension(cli.format.extension());
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            path
        }
        None => {
            let path = write_temporary(&content, cli.format)?;
            println!("file://{}", path.display());
            path
        }
    };
    log::info!("Wrote {} output to {}", cli.format, path.display());

    if cli.render {
        let dest = path.with_extension(ExportFormat::Dot.extension());
        let pdf = dot::render(&graph, &dest)
            .with_context(|| format!("Failed to render {}", dest.display()))?;
        log::info!("Rendered {}", pdf.display());
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Writes `content` to a fresh temporary file that outlives the process.
fn write_temporary(content: &str, format: ExportFormat) -> Result<PathBuf> {
    let suffix = format!(".{}", format.extension());
    let file = tempfile::Builder::new()
        .prefix("betsy-")
        .suffix(&suffix)
        .tempfile()
        .context("Failed to create temporary output file")?;

    fs::write(file.path(), content)
        .with_context(|| format!("Failed to write {}", file.path().display()))?;

    let (_, path) = file
        .keep()
        .context("Failed to keep temporary output file")?;
    Ok(path)
}
