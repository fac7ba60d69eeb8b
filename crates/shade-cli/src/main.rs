//! Shade CLI
//!
//! Command-line tool for merging `META-INF/MANIFEST.MF` across exploded archives.

use clap::{Parser, Subcommand};
use shade_core::{
    parse_manifest_file, DirectoryArchive, DirectoryWriter, ManifestConfig, ManifestEntry,
    ManifestMerger, MemoryWriter, ShadePipeline, ShadeReport, MANIFEST_PATH,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shade-cli")]
#[command(about = "Archive shading manifest merger", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the manifests of several exploded archives into one
    Merge {
        /// Archive root directories, in precedence order
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,

        /// Manifest configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Main-Class to force into the merged manifest
        #[arg(short, long)]
        main_class: Option<String>,

        /// Additional attributes (NAME=VALUE), applied after the config file
        #[arg(short, long)]
        attr: Vec<String>,

        /// Output directory for the merged entries
        #[arg(short, long)]
        output: PathBuf,

        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Parse and display a single manifest file
    Parse {
        /// Path to the manifest file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show every manifest found across archives and which one wins
    Explain {
        /// Archive root directories, in precedence order
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,
    },

    /// Create a manifest configuration template
    CreateConfig {
        /// Output path for the configuration file
        #[arg(short, long)]
        output: PathBuf,

        /// Main-Class to include
        #[arg(short, long)]
        main_class: Option<String>,

        /// Attributes to include (NAME=VALUE)
        #[arg(short, long)]
        attr: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> shade_core::Result<()> {
    match command {
        Commands::Merge {
            root,
            config,
            main_class,
            attr,
            output,
            report,
        } => {
            let config = build_config(config.as_deref(), main_class, &attr)?;
            cmd_merge(&root, &config, &output, report.as_deref())
        }
        Commands::Parse { file } => cmd_parse(&file),
        Commands::Explain { root } => cmd_explain(&root),
        Commands::CreateConfig {
            output,
            main_class,
            attr,
        } => cmd_create_config(&output, main_class, &attr),
    }
}

/// Start from the config file if given, then apply flags on top
fn build_config(
    path: Option<&Path>,
    main_class: Option<String>,
    attrs: &[String],
) -> shade_core::Result<ManifestConfig> {
    let mut config = match path {
        Some(path) => ManifestConfig::load(path)?,
        None => ManifestConfig::new(),
    };

    if main_class.is_some() {
        config.main_class = main_class;
    }
    for attr in attrs {
        config.add_entry(attr.parse::<ManifestEntry>()?);
    }

    Ok(config)
}

fn run_pipeline(
    roots: &[PathBuf],
    config: &ManifestConfig,
    writer: &mut dyn shade_core::ArchiveWriter,
) -> shade_core::Result<ShadeReport> {
    let merger = ManifestMerger::new(config.to_overrides()?);
    let mut pipeline = ShadePipeline::new().with_transformer(merger);

    for root in roots {
        pipeline.process_archive(&DirectoryArchive::new(root))?;
    }

    pipeline.finish(writer)
}

fn cmd_merge(
    roots: &[PathBuf],
    config: &ManifestConfig,
    output: &Path,
    report_path: Option<&Path>,
) -> shade_core::Result<()> {
    let mut writer = DirectoryWriter::new(output);
    let report = run_pipeline(roots, config, &mut writer)?;

    println!("Processed {} archive(s)", report.sources.len());

    let manifests = report.claimed_by("manifest");
    match manifests.first() {
        Some(winner) => println!(
            "Found {} manifest(s), using {}!/{}",
            manifests.len(),
            winner.archive,
            winner.path
        ),
        None => println!("No manifest found, writing a new one"),
    }

    for path in writer.written() {
        println!("Wrote {}", path.display());
    }

    if let Some(report_path) = report_path {
        report.save(report_path)?;
        println!("Report written to {}", report_path.display());
    }

    Ok(())
}

fn cmd_parse(file: &Path) -> shade_core::Result<()> {
    let attributes = parse_manifest_file(file)?;

    println!("File: {}", file.display());
    println!("Attributes: {}", attributes.len());
    println!();

    for attr in attributes.iter() {
        println!("{}: {}", attr.name, attr.value);
    }

    Ok(())
}

fn cmd_explain(roots: &[PathBuf]) -> shade_core::Result<()> {
    let mut writer = MemoryWriter::new();
    let report = run_pipeline(roots, &ManifestConfig::new(), &mut writer)?;

    let manifests = report.claimed_by("manifest");

    println!("Manifests (encounter order):");
    if manifests.is_empty() {
        println!("  (none)");
    }
    for (i, entry) in manifests.iter().enumerate() {
        let marker = if i == 0 { " <-- winner" } else { "" };
        println!("  {}. {}!/{}{}", i + 1, entry.archive, entry.path, marker);
    }

    if let Some(entry) = writer.get(MANIFEST_PATH) {
        println!();
        println!("Merged manifest:");
        print!("{}", String::from_utf8_lossy(&entry.bytes));
    }

    Ok(())
}

fn cmd_create_config(
    output: &Path,
    main_class: Option<String>,
    attrs: &[String],
) -> shade_core::Result<()> {
    let mut config = ManifestConfig::new();
    config.main_class = main_class;

    for attr in attrs {
        match attr.parse::<ManifestEntry>() {
            Ok(entry) => config.add_entry(entry),
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    // Give the user something to edit
    if config.main_class.is_none() && config.manifest_entries.is_empty() {
        config.add_entry(ManifestEntry::new("Built-By", "your-name"));
    }

    config.validate()?;
    config.save(output)?;
    println!("Created config file: {}", output.display());
    println!("Entries: {}", config.manifest_entries.len());
    println!();
    println!("Edit the file to add your attributes, then run:");
    println!(
        "  shade-cli merge --root <dir> --config {} --output <dir>",
        output.display()
    );

    Ok(())
}
