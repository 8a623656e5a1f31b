use thiserror::Error;

/// 致命錯誤：發生時整個執行中止並以非零狀態結束
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Routing table error ({path}): {reason}")]
    RoutingTableError { path: String, reason: String },

    #[error("Cannot open input stream {path}: {source}")]
    InputOpenError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create output stream {path}: {source}")]
    OutputCreateError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Read error at line {line}: {source}")]
    StreamReadError {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Write error after {records} records: {source}")]
    StreamWriteError {
        records: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line} exceeds the maximum line length of {limit} bytes")]
    LineTooLong { line: u64, limit: usize },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    RoutingTable,
    InputStream,
    OutputStream,
    Processing,
    System,
}

/// 嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 輸出可能已被截斷
    Medium,
    /// 啟動前失敗，沒有任何輸出
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::RoutingTableError { .. } => ErrorCategory::RoutingTable,
            EtlError::InputOpenError { .. }
            | EtlError::StreamReadError { .. }
            | EtlError::LineTooLong { .. } => ErrorCategory::InputStream,
            EtlError::OutputCreateError { .. } | EtlError::StreamWriteError { .. } => {
                ErrorCategory::OutputStream
            }
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::StreamReadError { .. }
            | EtlError::StreamWriteError { .. }
            | EtlError::LineTooLong { .. }
            | EtlError::ProcessingError { .. }
            | EtlError::SerializationError(_) => ErrorSeverity::Medium,
            EtlError::OutputCreateError { .. } | EtlError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the command line flags or the TOML config file",
            ErrorCategory::RoutingTable => {
                "Make sure the routing table exists and is a JSON object keyed by account id"
            }
            ErrorCategory::InputStream => {
                "Make sure the input is a readable gzip-compressed NDJSON file"
            }
            ErrorCategory::OutputStream => {
                "Check that the output directory exists and is writable, and that the disk is not full"
            }
            ErrorCategory::Processing => "Re-run with --verbose to see which record failed",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::RoutingTableError { path, .. } => {
                format!("Could not load routing table '{}'", path)
            }
            EtlError::InputOpenError { path, .. } => format!("Could not open input '{}'", path),
            EtlError::OutputCreateError { path, .. } => {
                format!("Could not create output '{}'", path)
            }
            EtlError::StreamReadError { line, .. } => format!(
                "Input stream is corrupt or unreadable near line {}; output is truncated",
                line
            ),
            EtlError::LineTooLong { line, limit } => format!(
                "Line {} is longer than {} bytes; output is truncated",
                line, limit
            ),
            other => other.to_string(),
        }
    }
}

/// 單筆記錄的錯誤：記錄後跳過，不影響退出狀態
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("failed to decode record: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("record is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
