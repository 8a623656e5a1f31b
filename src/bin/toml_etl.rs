use anyhow::Context;
use clap::Parser;
use trail_enrich::config::toml_config::{LogFormat, PipelineKind, TomlConfig};
use trail_enrich::core::{ConfigProvider, GeneratorConfigProvider, Pipeline};
use trail_enrich::utils::{logger, validation::Validate};
use trail_enrich::{EnrichmentPipeline, EtlEngine, GeneratorPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Run the enrichment or generator pipeline from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "etl-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show the resolved plan without reading or writing any data
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.monitoring.verbose;
    match config.monitoring.log_format {
        LogFormat::Compact => logger::init_cli_logger(verbose),
        LogFormat::Json => logger::init_json_logger(verbose),
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::default();
    match config.kind() {
        PipelineKind::Enrich => run(EnrichmentPipeline::new(storage, config), monitor_enabled),
        PipelineKind::Generate => run(GeneratorPipeline::new(storage, config), monitor_enabled),
    }

    Ok(())
}

fn run<P: Pipeline>(pipeline: P, monitor_enabled: bool) {
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(report) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!(
                "✅ {}: {} records ({} skipped)",
                report.pipeline, report.records, report.skipped
            );
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Pipeline: {} ({:?})", config.pipeline.name, config.kind());
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Routing table: {}", config.routing.table_path);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    match config.kind() {
        PipelineKind::Enrich => {
            println!("📥 Input: {}", config.input_path());
            println!("💾 Output: {}", ConfigProvider::output_path(config));
            println!("  Max line length: {} bytes", config.max_line_bytes());
            if config.progress_interval() > 0 {
                println!("  Progress every {} records", config.progress_interval());
            }
        }
        PipelineKind::Generate => {
            println!("💾 Output: {}", GeneratorConfigProvider::output_path(config));
            println!(
                "  Target size: {:.2} MB, checked every {} records",
                config.target_size_bytes() as f64 / (1024.0 * 1024.0),
                config.check_interval()
            );
            println!("  Account pool: first {} routing entries", config.account_pool_limit());
            match config.seed() {
                Some(seed) => println!("  Seed: {}", seed),
                None => println!("  Seed: random"),
            }
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
