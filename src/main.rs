use clap::Parser;
use table_export::utils::error::{ErrorSeverity, ExportError};
use table_export::utils::{logger, validation::Validate};
use table_export::{CliConfig, Dataset, ExportConfig, ExportEngine, ExportOutput, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_format);

    tracing::info!("🚀 Starting table-export");
    if args.verbose {
        tracing::debug!("CLI config: {:?}", args);
    }

    // 載入並驗證配置
    let config = match args.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!("✅ Configuration loaded and validated successfully");

    let monitor_enabled = args.monitoring_enabled(&config);
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(&config, args.dry_run, monitor_enabled).await {
        Ok(Some(output)) => {
            let saved_to = LocalStorage::new(config.output_path().to_string())
                .full_path(&output.file_name);
            tracing::info!("✅ Export completed successfully!");
            println!("✅ Export completed successfully!");
            println!(
                "📁 Output saved to: {} ({}, {} bytes)",
                saved_to.display(),
                output.mime_type,
                output.bytes.len()
            );
        }
        Ok(None) => {}
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2, // 編碼錯誤，可重試
                ErrorSeverity::High => 1,   // 設定或資料錯誤
                ErrorSeverity::Critical => 3, // 系統錯誤
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(
    config: &ExportConfig,
    dry_run: bool,
    monitor_enabled: bool,
) -> Result<Option<ExportOutput>, ExportError> {
    let format = config.format()?;
    let dataset = Dataset::from_json_file(config.input_path())?;
    let columns = config.resolve_columns(&dataset);
    let options = config.export_options();

    tracing::info!(
        "📋 {} records, {} columns -> {}",
        dataset.len(),
        columns.len(),
        options.file_name(format)
    );

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - No file will be written");
        println!("Input:   {}", config.input_path());
        println!("Records: {}", dataset.len());
        println!("Output:  {}/{}", config.output_path(), options.file_name(format));
        println!("Format:  {} ({})", format, format.mime_type());
        for column in &columns {
            println!("  - {} <- {} ({:?})", column.header, column.field_key, column.format);
        }
        return Ok(None);
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = ExportEngine::new_with_monitoring(storage, options, monitor_enabled);

    let output = engine.download(&dataset, &columns, format).await?;
    Ok(Some(output))
}
