use clap::Parser;
use data_import::adapters::default_object_client;
use data_import::core::{ExecutionContext, IMPORT_STAGE, SUMMARY_KEY};
use data_import::utils::{logger, validation::Validate};
use data_import::{
    file_adapter, CliConfig, ImportError, ImportStageBuilder, InMemoryRegistry, ProjectConfig,
    StageRunner,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting data-import");
    tracing::debug!("CLI config: {:?}", args);

    if let Err(e) = args.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mut config = match ProjectConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(keyword) = &args.default_adapter {
        config.project.default_adapter = Some(keyword.clone());
        tracing::info!("🔧 Default adapter overridden to: {}", keyword);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&args, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("❌ Import failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e {
                ImportError::NotFound { .. }
                | ImportError::ConfigError { .. }
                | ImportError::ConfigValidationError { .. }
                | ImportError::InvalidConfigValueError { .. } => 1,
                ImportError::DataLoadExhausted => 2,
                _ => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(args: &CliConfig, config: &ProjectConfig) -> data_import::Result<()> {
    let object_client = default_object_client(config.s3_region()).await;
    let registry = Arc::new(InMemoryRegistry::builtin(object_client, config.s3_path()));

    let builder = ImportStageBuilder::new(registry, config);
    let steps = builder.build(config.import_config()?)?;
    let runner = StageRunner::new().with_steps(steps);
    tracing::info!("📋 Import chain: {}", runner.labels().join(" -> "));

    let execution_id = format!("import-{}", chrono::Utc::now().format("%Y%m%d%H%M%S"));
    let mut context = ExecutionContext::new(execution_id);
    let reports = runner.execute_all(&mut context).await?;

    let execution_summary = StageRunner::get_execution_summary(&reports);
    tracing::info!("✅ Import finished: {:?}", execution_summary);

    if let Some(summary) = context.get_artifact(IMPORT_STAGE, SUMMARY_KEY) {
        let rendered = serde_json::to_string_pretty(summary)?;
        match &args.summary_output {
            Some(path) => {
                std::fs::write(path, rendered)?;
                println!("📁 Variable summaries saved to: {}", path);
            }
            None => println!("{}", rendered),
        }
    }

    if let (Some(path), Some(dataset)) = (&args.export, context.dataset()) {
        file_adapter().write(dataset, path.as_str()).await?;
        println!("📁 Dataset exported to: {}", path);
    }

    Ok(())
}

