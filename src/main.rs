//! Bindery CLI - javascript bundle pipeline
//!
//! Usage: bindery <COMMAND>
//!
//! Commands:
//!   manifest    Print the bundle manifests for the matched sites
//!   bundle      Compile bundles and write them to the bundle root
//!   precompile  Transpile entity sources to the precompile root
//!   watch       Watch sources and rebuild changed entities continuously

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use bindery::config;
use bindery::{
    catalog, BuildConfig, BundleStage, CommandBundler, CommandTranspiler, DecorateStage,
    FileCatalog, GeneratorParams, IdentityTranspiler, ManifestGenerator, PrecompileStage,
    ReportMode, Reporter, StageExt, StageParams, Transpiler, WatchOptions, WriteFilesStage,
};

/// Bindery - javascript bundle pipeline for multi-site source trees
#[derive(Parser, Debug)]
#[command(name = "bindery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the bundle manifests for the matched sites
    Manifest {
        /// Site query, `*` for all sites
        #[arg(default_value = "*")]
        query: String,
    },

    /// Compile bundles and write them to the bundle root
    Bundle {
        /// Site query, `*` for all sites
        #[arg(default_value = "*")]
        query: String,

        /// Write root overriding the configured bundle path
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },

    /// Transpile entity sources to the precompile root
    Precompile {
        /// Entity query, `*` for everything
        #[arg(default_value = "*")]
        query: String,

        /// Write root overriding the configured precompile path
        #[arg(short, long)]
        destination: Option<PathBuf>,
    },

    /// Watch sources and rebuild changed entities continuously
    Watch {
        /// Entity query limiting the initial build
        #[arg(default_value = "*")]
        query: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mode = if cli.json {
        ReportMode::Json
    } else {
        ReportMode::Human
    };
    let reporter = Reporter::new(mode).verbose(cli.verbose > 0);

    let project_root = std::env::current_dir()?;
    let (config, warnings) = config::load_or_default(Some(&project_root));
    if !cli.json {
        for warning in &warnings {
            eprintln!(
                "warning: unknown configuration key `{}` in {}",
                warning.key,
                warning.file.display()
            );
        }
    }

    let catalog = catalog::scan(&config.sources_path)?;

    match cli.command {
        Commands::Manifest { query } => cmd_manifest(&catalog, &config, &query),
        Commands::Bundle { query, destination } => {
            cmd_bundle(&catalog, &config, &reporter, &query, destination)
        }
        Commands::Precompile { query, destination } => {
            cmd_precompile(&catalog, &config, &reporter, &query, destination)
        }
        Commands::Watch { query } => cmd_watch(&catalog, &config, &reporter, &query),
    }
}

fn cmd_manifest(catalog: &FileCatalog, config: &BuildConfig, query: &str) -> Result<()> {
    let generator = ManifestGenerator::new(catalog, config, Reporter::silent());
    let params = GeneratorParams {
        query: query.to_string(),
        ..Default::default()
    };
    let all = generator.generate_all(&params)?;

    let mut output = serde_json::Map::new();
    for (site, manifests) in &all {
        output.insert(site.name.clone(), serde_json::to_value(manifests)?);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_bundle(
    catalog: &FileCatalog,
    config: &BuildConfig,
    reporter: &Reporter,
    query: &str,
    destination: Option<PathBuf>,
) -> Result<()> {
    let bundler = CommandBundler::from_config(&config.bundler)
        .ok_or_else(|| anyhow::anyhow!("no bundler command configured (set [bundler] program)"))?;

    let mut chain = BundleStage::new(catalog, bundler, reporter.clone())
        .pipe(DecorateStage::new())
        .pipe(WriteFilesStage::new(
            config.bundle_path.clone(),
            reporter.clone(),
        ));

    let params = StageParams {
        query: query.to_string(),
        destination,
        ..Default::default()
    };
    let written = chain.run(config, &params)?;

    if !reporter.is_json() {
        println!("{} bundle file(s) written", written.len());
    }
    Ok(())
}

fn cmd_precompile(
    catalog: &FileCatalog,
    config: &BuildConfig,
    reporter: &Reporter,
    query: &str,
    destination: Option<PathBuf>,
) -> Result<()> {
    let params = StageParams {
        query: query.to_string(),
        destination,
        ..Default::default()
    };
    let written = match CommandTranspiler::from_config(&config.transpiler) {
        Some(transpiler) => run_precompile(catalog, config, reporter, transpiler, &params)?,
        None => run_precompile(catalog, config, reporter, IdentityTranspiler, &params)?,
    };

    if !reporter.is_json() {
        println!("{} file(s) written", written);
    }
    Ok(())
}

fn run_precompile<T: Transpiler>(
    catalog: &FileCatalog,
    config: &BuildConfig,
    reporter: &Reporter,
    transpiler: T,
    params: &StageParams,
) -> Result<usize> {
    let mut chain = PrecompileStage::new(catalog, transpiler, reporter.clone())
        .pipe(DecorateStage::new())
        .pipe(WriteFilesStage::new(
            config.precompile_path.clone(),
            reporter.clone(),
        ));
    Ok(chain.run(config, params)?.len())
}

fn cmd_watch(
    catalog: &FileCatalog,
    config: &BuildConfig,
    reporter: &Reporter,
    query: &str,
) -> Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let options = WatchOptions {
        source: config.sources_path.clone(),
        query: query.to_string(),
    };

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })?;

    match CommandTranspiler::from_config(&config.transpiler) {
        Some(transpiler) => run_watch(catalog, config, reporter, transpiler, options, running),
        None => run_watch(catalog, config, reporter, IdentityTranspiler, options, running),
    }
}

fn run_watch<T: Transpiler>(
    catalog: &FileCatalog,
    config: &BuildConfig,
    reporter: &Reporter,
    transpiler: T,
    options: WatchOptions,
    running: std::sync::Arc<std::sync::atomic::AtomicBool>,
) -> Result<()> {
    let mut stage = PrecompileStage::new(catalog, transpiler, reporter.clone());

    bindery::watch(catalog, options, running, reporter, |entity| {
        let files = stage.process_entity(entity, config);
        let written = files.len();
        for file in files {
            let target = config.precompile_path.join(&file.path);
            bindery::fs::write_atomic(&target, file.contents.as_bytes())?;
            reporter.file_written(&target, file.contents.len());
        }
        Ok(written)
    })?;
    Ok(())
}
