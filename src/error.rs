//! Error types for persona-notes
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for persona-notes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Storage errors (3xx)
    StorageCorrupt = 300,
    StorageWrite = 301,

    // Validation errors (4xx)
    NoPersonaSelected = 400,
    BlankKeyword = 401,
    PersonaNotFound = 402,
    DuplicatePersona = 403,
    InvalidRequest = 404,

    // Generation errors (5xx)
    GenerationFailed = 500,

    // External I/O errors (6xx)
    ClipboardFailed = 600,
    DownloadFailed = 601,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            600..=699 => 60,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────

    /// Persisted persona data exists but cannot be decoded
    #[error("Corrupt persisted state in {path}: {message}")]
    StorageCorrupt { path: PathBuf, message: String },

    /// Persisting the persona collection failed
    #[error("Failed to persist personas: {message}")]
    StorageWrite { message: String },

    // ─────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────

    /// Generation requested with an empty selection
    #[error("No persona selected")]
    NoPersonaSelected,

    /// Image note requested with a blank keyword
    #[error("Image keyword must not be blank")]
    BlankKeyword,

    /// Persona id not present in the store
    #[error("Persona not found: {id}")]
    PersonaNotFound { id: String },

    /// Persona id already present in the store
    #[error("Persona already exists: {id}")]
    DuplicatePersona { id: String },

    /// Invalid persona generation request
    #[error("Invalid {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Generation Errors
    // ─────────────────────────────────────────────────────────────

    /// Generation backend failed
    #[error("Generation failed: {message}")]
    GenerationFailed { message: String },

    // ─────────────────────────────────────────────────────────────
    // External I/O Errors
    // ─────────────────────────────────────────────────────────────

    /// Clipboard write failed
    #[error("Failed to copy to clipboard: {message}")]
    ClipboardFailed { message: String },

    /// Image download failed
    #[error("Failed to download {url}: {message}")]
    DownloadFailed { url: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::StorageCorrupt { .. } => ErrorCode::StorageCorrupt,
            Error::StorageWrite { .. } => ErrorCode::StorageWrite,

            Error::NoPersonaSelected => ErrorCode::NoPersonaSelected,
            Error::BlankKeyword => ErrorCode::BlankKeyword,
            Error::PersonaNotFound { .. } => ErrorCode::PersonaNotFound,
            Error::DuplicatePersona { .. } => ErrorCode::DuplicatePersona,
            Error::InvalidRequest { .. } => ErrorCode::InvalidRequest,

            Error::GenerationFailed { .. } => ErrorCode::GenerationFailed,

            Error::ClipboardFailed { .. } => ErrorCode::ClipboardFailed,
            Error::DownloadFailed { .. } => ErrorCode::DownloadFailed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Missing or invalid user input, caught before any async call
    pub fn is_validation(&self) -> bool {
        (400..500).contains(&(self.code() as u16))
    }

    /// Clipboard or network failure at the call site
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Error::ClipboardFailed { .. } | Error::DownloadFailed { .. }
        )
    }

    /// Check if the error should stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::Config(_)
                | Error::StorageCorrupt { .. }
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => {
                Some("Run 'persona-notes config init' to create a default configuration file.")
            }
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-notes config validate' to see details.",
            ),
            Error::StorageCorrupt { .. } => Some(
                "The persona file could not be decoded. Fix or move it aside; it was left untouched.",
            ),
            Error::NoPersonaSelected => Some(
                "Pass --persona <id>, or pick one with 'persona-notes persona select <id>'.",
            ),
            Error::BlankKeyword => Some("Pass a non-empty --keyword for image notes."),
            Error::PersonaNotFound { .. } => {
                Some("Run 'persona-notes persona list' to see the available ids.")
            }
            Error::GenerationFailed { .. } => Some("Please try again later."),
            Error::DownloadFailed { .. } => {
                Some("Check your network connection and try again later.")
            }
            Error::ClipboardFailed { .. } => {
                Some("Your terminal may not support OSC 52 clipboard writes.")
            }
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a persona not found error
    pub fn persona_not_found(id: impl Into<String>) -> Self {
        Error::PersonaNotFound { id: id.into() }
    }

    /// Create an invalid request error
    pub fn invalid_request(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }

    /// Create a download failed error
    pub fn download_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DownloadFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a generation failed error
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Error::GenerationFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::StorageCorrupt.as_str(), "E300");
        assert_eq!(ErrorCode::NoPersonaSelected.as_str(), "E400");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::StorageCorrupt.exit_code(), 30);
        assert_eq!(ErrorCode::BlankKeyword.exit_code(), 40);
        assert_eq!(ErrorCode::GenerationFailed.exit_code(), 50);
        assert_eq!(ErrorCode::DownloadFailed.exit_code(), 60);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_classification() {
        assert!(Error::NoPersonaSelected.is_validation());
        assert!(Error::BlankKeyword.is_validation());
        assert!(Error::persona_not_found("1").is_validation());
        assert!(!Error::NoPersonaSelected.is_external());

        assert!(Error::download_failed("http://x", "refused").is_external());
        assert!(Error::ClipboardFailed { message: "x".into() }.is_external());
        assert!(!Error::download_failed("http://x", "refused").is_fatal());

        let corrupt = Error::StorageCorrupt {
            path: PathBuf::from("/tmp/personas.json"),
            message: "expected value".into(),
        };
        assert!(corrupt.is_fatal());
        assert!(!corrupt.is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = Error::persona_not_found("1700000000000");
        assert!(err.to_string().contains("1700000000000"));

        let err = Error::invalid_request("num_id", "must be at least 1");
        assert_eq!(err.to_string(), "Invalid num_id: must be at least 1");
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::NoPersonaSelected;
        let formatted = err.format_for_terminal();

        assert!(formatted.contains("E400"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::ConfigNotFound {
            path: PathBuf::from("/test/config.toml"),
        };
        let formatted = err.format_for_log();

        assert!(formatted.contains("[E100]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }
}
