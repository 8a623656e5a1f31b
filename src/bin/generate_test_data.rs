use clap::Parser;
use trail_enrich::core::GeneratorConfigProvider;
use trail_enrich::utils::{logger, validation::Validate};
use trail_enrich::{EtlEngine, GeneratorCliConfig, GeneratorPipeline, LocalStorage};

fn main() {
    let config = GeneratorCliConfig::parse();

    logger::init_cli_logger(config.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    tracing::info!(
        "🚀 Generating test data into {} (target {:.2} MB)",
        config.output_path(),
        config.target_size_bytes() as f64 / (1024.0 * 1024.0)
    );
    if let Some(seed) = config.seed() {
        tracing::info!("🎲 Using seed {}", seed);
    }

    let monitor_enabled = config.monitor;
    let pipeline = GeneratorPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(report) => {
            println!("Generated {} records", report.records);
            println!(
                "Test data written to {} ({:.2} MB)",
                report.output_path,
                report.output_bytes as f64 / (1024.0 * 1024.0)
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    }
}
