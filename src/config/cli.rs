use crate::config::toml_config::ExportConfig;
use crate::domain::model::{ColumnConfig, ColumnDefinition};
use crate::utils::error::{ExportError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "table-export")]
#[command(about = "Export a JSON table to CSV, XLSX, JSON or PDF")]
pub struct CliConfig {
    /// JSON file holding an array of records
    #[arg(short, long)]
    pub input: Option<String>,

    /// TOML export configuration; command line flags override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format: csv, xlsx, json or pdf
    #[arg(short, long)]
    pub format: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Output file name without extension
    #[arg(long)]
    pub file_stem: Option<String>,

    /// Columns as `Header=field_key`, comma separated
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// CSV quoting: never or rfc4180
    #[arg(long)]
    pub csv_quoting: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, value_enum, default_value = "compact", help = "Log output: compact or json")]
    pub log_format: LogFormat,

    /// Validate and show what would be exported without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// Builds the effective export config: the TOML file (if any) with
    /// command line overrides applied.
    pub fn resolve(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                ExportConfig::from_file(path)?
            }
            None => {
                let input = validation::validate_required_field("input", &self.input)?;
                ExportConfig::for_input(input.clone())
            }
        };

        // 應用命令列覆蓋設定
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(format) = &self.format {
            config.export.format = format.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.export.output_path = output_path.clone();
        }
        if let Some(file_stem) = &self.file_stem {
            config.export.file_stem = file_stem.clone();
        }
        if let Some(quoting) = &self.csv_quoting {
            config.export.csv_quoting = quoting.parse()?;
        }
        if !self.columns.is_empty() {
            config.columns = self
                .columns
                .iter()
                .map(|spec| parse_column_spec(spec).map(ColumnConfig::Leaf))
                .collect::<Result<Vec<_>>>()?;
        }

        Ok(config)
    }

    pub fn monitoring_enabled(&self, config: &ExportConfig) -> bool {
        self.monitor || config.monitoring_enabled()
    }
}

/// `Header=field_key`, or a bare `field_key` used as its own header.
pub fn parse_column_spec(spec: &str) -> Result<ColumnDefinition> {
    let spec = spec.trim();
    let (header, field_key) = match spec.split_once('=') {
        Some((header, field_key)) => (header.trim(), field_key.trim()),
        None => (spec, spec),
    };

    if header.is_empty() || field_key.is_empty() {
        return Err(ExportError::InvalidConfigValueError {
            field: "columns".to_string(),
            value: spec.to_string(),
            reason: "Expected `Header=field_key`".to_string(),
        });
    }

    Ok(ColumnDefinition::new(header, field_key))
}
