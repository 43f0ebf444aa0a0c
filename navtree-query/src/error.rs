//! Error types for include-tree construction and query execution.
//!
//! Errors carry:
//! - An error code for programmatic handling
//! - Suggestions for fixing the declaration that caused them
//! - Context about the model and include path involved
//!
//! # Error Codes
//!
//! Error codes follow a pattern: N{category}{number}
//! - 1xxx: Declaration errors (unsupported shape, bad path, dangling continuation)
//! - 5xxx: Execution errors raised by the underlying engine
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use navtree_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::invalid_path("Cases..Owner", "empty segment");
//! assert_eq!(err.code, ErrorCode::InvalidIncludePath);
//! assert!(err.to_string().contains("N1002"));
//! ```

use std::fmt;
use std::sync::Arc;

use owo_colors::OwoColorize;
use thiserror::Error;

/// Result type for include-tree and query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Declaration errors (1xxx)
    /// A path expression has a shape the parser does not recognise (N1001).
    UnsupportedDeclaration = 1001,
    /// A dotted string path is malformed (N1002).
    InvalidIncludePath = 1002,
    /// A continuation has no root-level declaration to attach to (N1003).
    DanglingContinuation = 1003,

    // Execution errors (5xxx)
    /// The underlying engine failed to execute the query (N5001).
    ExecutionFailed = 5001,
    /// Execution was cancelled before completion (N5002).
    Cancelled = 5002,

    // Configuration errors (7xxx)
    /// Invalid configuration (N7001).
    InvalidConfiguration = 7001,
    /// Configuration file could not be read (N7002).
    ConfigIo = 7002,

    // Internal errors (9xxx)
    /// Internal error (N9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "N1001").
    pub fn code(&self) -> String {
        format!("N{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnsupportedDeclaration => "Unsupported include declaration",
            Self::InvalidIncludePath => "Invalid include path",
            Self::DanglingContinuation => "Continuation without a root include",
            Self::ExecutionFailed => "Query execution failed",
            Self::Cancelled => "Query execution cancelled",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::ConfigIo => "Configuration file unreadable",
            Self::Internal => "Internal error",
        }
    }

    /// Whether this code describes a mistake in how includes were declared.
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDeclaration | Self::InvalidIncludePath | Self::DanglingContinuation
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The model the query was built over.
    pub model: Option<String>,
    /// The include path involved, rendered as text.
    pub path: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Create new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation.
    pub fn operation(mut self, op: impl Into<String>) -> Self {
        self.operation = Some(op.into());
        self
    }

    /// Set the model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the include path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a text suggestion.
    pub fn suggest(mut self, text: impl Into<String>) -> Self {
        self.suggestions.push(Suggestion::new(text));
        self
    }

    /// Set help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Errors that can occur while building include trees or executing queries.
///
/// Errors are cheap to clone so a failed tree build can be cached on the
/// query and reported on every request.
#[derive(Error, Debug, Clone)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context
            .suggestions
            .push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Set the include path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.context.path = Some(path.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A path expression wraps an operation outside the recognised set, or
    /// does not end in a property access.
    pub fn unsupported_declaration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::UnsupportedDeclaration,
            format!("Unsupported include declaration `{}`: {}", path, reason.into()),
        )
        .with_path(&path)
        .with_suggestion("Only filter, order_by, then_by, skip and take may wrap a collection include")
        .with_code_suggestion(
            "Apply other shaping to the query itself, not to the include",
            "query.include(person::CASES.filter(...).take(5))",
        )
    }

    /// A dotted string path is malformed.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::InvalidIncludePath,
            format!("Invalid include path `{}`: {}", path, reason.into()),
        )
        .with_path(&path)
        .with_suggestion("Separate navigation names with the configured separator, e.g. \"Cases.Owner\"")
    }

    /// A continuation never met the root-level declaration it continues.
    pub fn dangling_continuation(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::DanglingContinuation,
            format!("Continuation `{}` has no preceding root-level include", path),
        )
        .with_path(&path)
        .with_help("then_include must follow include in the operation graph")
    }

    /// The underlying engine failed.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExecutionFailed, message.into())
    }

    /// Execution was cancelled.
    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "Query execution was cancelled")
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message.into())
            .with_suggestion("Check navtree.toml against the documented keys")
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
            .with_help("This is likely a bug in navtree")
    }

    // ============== Error Checks ==============

    /// Check if this error came from a malformed include declaration.
    pub fn is_declaration_error(&self) -> bool {
        self.code.is_declaration_error()
    }

    /// Check if this error came from the execution engine.
    pub fn is_execution_error(&self) -> bool {
        matches!(self.code, ErrorCode::ExecutionFailed | ErrorCode::Cancelled)
    }

    // ============== Display Functions ==============

    /// Get the error code.
    pub fn error_code(&self) -> &ErrorCode {
        &self.code
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  → Model: {}\n", model));
        }
        if let Some(ref path) = self.context.path {
            output.push_str(&format!("  → Path: {}\n", path));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!(
                        "     ```\n     {}\n     ```\n",
                        code.replace('\n', "\n     ")
                    ));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }

    /// Display error with ANSI colors for terminal output.
    pub fn display_colored(&self) -> String {
        let mut output = String::new();

        let header = format!("Error [{}]", self.code.code());
        output.push_str(&format!("{}: {}\n", header.red().bold(), self.message.bold()));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  {} {}\n", "→ While:".dimmed(), op));
        }
        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  {} {}\n", "→ Model:".dimmed(), model));
        }
        if let Some(ref path) = self.context.path {
            output.push_str(&format!("  {} {}\n", "→ Path:".dimmed(), path));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {} {}\n", format!("{}.", i + 1).yellow(), suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     {}\n", code.replace('\n', "\n     ").cyan()));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\n{} {}\n", "Help:".cyan().bold(), help));
        }

        output
    }
}

/// Extension trait for converting foreign errors to QueryError.
pub trait IntoQueryError {
    /// Convert to a QueryError.
    fn into_query_error(self) -> QueryError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoQueryError for E {
    fn into_query_error(self) -> QueryError {
        QueryError::execution(self.to_string()).with_source(self)
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::UnsupportedDeclaration.code(), "N1001");
        assert_eq!(ErrorCode::ExecutionFailed.code(), "N5001");
        assert_eq!(ErrorCode::InvalidConfiguration.code(), "N7001");
    }

    #[test]
    fn test_unsupported_declaration_error() {
        let err = QueryError::unsupported_declaration("x.Cases.Distinct()", "`Distinct` cannot wrap an include");
        assert!(err.is_declaration_error());
        assert!(err.message.contains("Distinct"));
        assert_eq!(err.context.path.as_deref(), Some("x.Cases.Distinct()"));
        assert!(!err.context.suggestions.is_empty());
    }

    #[test]
    fn test_dangling_continuation_error() {
        let err = QueryError::dangling_continuation("x.Owner");
        assert_eq!(err.code, ErrorCode::DanglingContinuation);
        assert!(err.context.help.is_some());
    }

    #[test]
    fn test_execution_errors_are_not_declaration_errors() {
        assert!(QueryError::execution("boom").is_execution_error());
        assert!(QueryError::cancelled().is_execution_error());
        assert!(!QueryError::cancelled().is_declaration_error());
    }

    #[test]
    fn test_foreign_error_conversion() {
        let io = std::io::Error::other("socket closed");
        let err = io.into_query_error();
        assert_eq!(err.code, ErrorCode::ExecutionFailed);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_clone_keeps_source() {
        let err = std::io::Error::other("socket closed").into_query_error();
        let copy = err.clone();
        assert_eq!(copy.code, err.code);
        assert!(std::error::Error::source(&copy).is_some());
    }

    #[test]
    fn test_display_full() {
        let err = QueryError::invalid_path("A..B", "empty segment")
            .with_model("Person")
            .with_context("Building include tree");

        let output = err.display_full();
        assert!(output.contains("N1002"));
        assert!(output.contains("Person"));
        assert!(output.contains("A..B"));
        assert!(output.contains("Suggestions"));
    }

    #[test]
    fn test_display_colored_keeps_message() {
        let err = QueryError::dangling_continuation("x.Owner");
        assert!(err.display_colored().contains("x.Owner"));
    }

    #[test]
    fn test_error_macro() {
        let err = query_error!(
            ErrorCode::InvalidConfiguration,
            "separator must be a single character",
            with_path = "tree.separator",
            with_suggestion = "Use \".\" or \"/\""
        );

        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
        assert_eq!(err.context.path.as_deref(), Some("tree.separator"));
    }
}
