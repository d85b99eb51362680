//! Structured error handling for chainkb
//!
//! Provides a single error type with:
//! - Error codes for programmatic handling
//! - Key/value context and a cause chain
//! - JSON rendering for embedders that report errors over the wire
//!
//! Most knowledge base operations never fail: a failed match is `None`, a
//! duplicate assert merges and retracting something absent is a no-op. The
//! errors below cover bad input (malformed queries, rules without antecedents,
//! unparseable statements) and configuration loading.
//!
//! # Example
//!
//! ```rust,ignore
//! use chainkb::error::{KbError, ErrorCode};
//!
//! let err = KbError::invalid_query("rules cannot be asked")
//!     .with_code(ErrorCode::RuleQuery)
//!     .with_context("query", "rule: ((p ?x)) -> (q ?x)");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::parser::ParseError;

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Parse errors (1xxx)
    /// Generic parse error
    ParseError = 1000,
    /// Statement syntax error
    InvalidSyntax = 1001,
    /// Unexpected end of input
    UnexpectedEof = 1002,
    /// Entry is neither `fact:` nor `rule:`
    UnknownEntryKind = 1003,

    // Query errors (2xxx)
    /// Generic malformed query
    InvalidQuery = 2000,
    /// A rule was used as a query
    RuleQuery = 2001,
    /// Query statement has no usable predicate
    UnresolvablePredicate = 2002,

    // Knowledge base errors (3xxx)
    /// Rule without antecedents
    InvalidRule = 3001,

    // Config errors (7xxx)
    /// Generic config error
    ConfigError = 7000,
    /// Config file could not be read
    ConfigNotFound = 7001,
    /// Invalid config syntax
    InvalidConfigSyntax = 7002,

    // IO errors (8xxx)
    /// Reading input failed
    IoError = 8000,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
    /// Unexpected state
    UnexpectedState = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidSyntax => "Invalid statement syntax",
            ErrorCode::UnexpectedEof => "Unexpected end of input",
            ErrorCode::UnknownEntryKind => "Unknown entry kind",

            ErrorCode::InvalidQuery => "Invalid query",
            ErrorCode::RuleQuery => "Rules cannot be asked",
            ErrorCode::UnresolvablePredicate => "Query has no resolvable predicate",

            ErrorCode::InvalidRule => "Invalid rule",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not readable",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",

            ErrorCode::IoError => "IO error",

            ErrorCode::InternalError => "Internal error",
            ErrorCode::UnexpectedState => "Unexpected state",
        }
    }

    /// Whether the error was caused by caller input
    pub fn is_input_error(&self) -> bool {
        matches!(self.code() / 1000, 1 | 2 | 3)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the context
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for chainkb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl KbError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods
    // ========================================================================

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// Create a malformed query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidQuery, message)
    }

    /// Create an invalid rule error
    pub fn invalid_rule(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRule, message)
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Replace the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Add a context field
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.field(key, value));
        self
    }

    /// Add a cause to the chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.cause(cause));
        self
    }

    /// Add a resolution hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Whether this is a malformed-query error (any `2xxx` code)
    pub fn is_invalid_query(&self) -> bool {
        self.code.code() / 1000 == 2
    }

    /// Render as compact JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"message\":{:?}}}", self.message))
    }
}

impl fmt::Display for KbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[E{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            for (key, value) in &ctx.fields {
                write!(f, "\n  {}: {}", key, value)?;
            }
            for cause in &ctx.causes {
                write!(f, "\n  caused by: {}", cause)?;
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for KbError {}

// ============================================================================
// Conversions
// ============================================================================

impl From<std::io::Error> for KbError {
    fn from(err: std::io::Error) -> Self {
        KbError::new(ErrorCode::IoError, err.to_string())
    }
}

impl From<toml::de::Error> for KbError {
    fn from(err: toml::de::Error) -> Self {
        KbError::new(ErrorCode::InvalidConfigSyntax, err.to_string())
    }
}

impl From<ConfigError> for KbError {
    fn from(err: ConfigError) -> Self {
        let code = match err {
            ConfigError::IoError(..) => ErrorCode::ConfigNotFound,
            ConfigError::ParseError(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::SerializeError(_) => ErrorCode::ConfigError,
        };
        KbError::new(code, err.to_string())
    }
}

impl From<ParseError> for KbError {
    fn from(err: ParseError) -> Self {
        let code = match err {
            ParseError::Syntax { .. } => ErrorCode::InvalidSyntax,
            ParseError::UnexpectedEof => ErrorCode::UnexpectedEof,
            ParseError::UnknownKind { .. } => ErrorCode::UnknownEntryKind,
        };
        KbError::new(code, err.to_string())
    }
}

/// Result alias used across the crate
pub type KbResult<T> = Result<T, KbError>;
