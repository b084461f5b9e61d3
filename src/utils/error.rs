use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF rendering error: {message}")]
    PdfError { message: String },

    #[error("Unsupported export format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Encoding,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExportError::IoError(_) => ErrorCategory::Io,
            ExportError::ZipError(_)
            | ExportError::CsvError(_)
            | ExportError::SerializationError(_)
            | ExportError::PdfError { .. } => ErrorCategory::Encoding,
            ExportError::UnsupportedFormat { .. }
            | ExportError::ConfigError { .. }
            | ExportError::ConfigValidationError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ExportError::ProcessingError { .. } | ExportError::ValidationError { .. } => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Encoding => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ExportError::IoError(e) => format!(
                "Check that the input file exists and the output directory is writable ({})",
                e.kind()
            ),
            ExportError::UnsupportedFormat { .. } => {
                "Use one of the supported formats: csv, xlsx, json, pdf".to_string()
            }
            ExportError::MissingConfigError { field } => {
                format!("Provide a value for '{}' on the command line or in the config file", field)
            }
            ExportError::InvalidConfigValueError { field, .. }
            | ExportError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' in your configuration", field)
            }
            ExportError::ConfigError { .. } => {
                "Make sure the config file is valid TOML".to_string()
            }
            ExportError::ValidationError { .. } | ExportError::SerializationError(_) => {
                "Input must be a JSON array of objects".to_string()
            }
            ExportError::ProcessingError { .. } => {
                "Inspect the input records for unexpected values".to_string()
            }
            ExportError::ZipError(_) | ExportError::CsvError(_) | ExportError::PdfError { .. } => {
                "Retry the export; if it keeps failing, try another format".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a file: {}", self),
            ErrorCategory::Encoding => format!("Failed to produce the export file: {}", self),
            ErrorCategory::Configuration => format!("Invalid export settings: {}", self),
            ErrorCategory::Data => format!("The input data could not be exported: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
