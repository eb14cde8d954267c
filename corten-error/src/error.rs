//! Defines the main `Error` struct.

use crate::codes;
use crate::prelude::{fmt, Display};

/// Error categories for Corten operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Binary loading and decoding errors
    Parse = 1,
    /// Static validation errors
    Validation = 2,
    /// Import resolution and instantiation errors
    Instantiation = 3,
    /// Runtime traps defined by the Wasm specification
    Trap = 4,
    /// Misuse of the engine API by the embedder
    Runtime = 5,
}

impl ErrorCategory {
    /// Short lowercase name used in log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Validation => "validation",
            Self::Instantiation => "instantiation",
            Self::Trap => "trap",
            Self::Runtime => "runtime",
        }
    }
}

/// Corten `Error` type.
///
/// Pairs a category with a flat code from [`codes`] and a fixed message.
/// Equality compares the category and code only, so call sites may attach
/// context-specific messages without affecting error identity.
#[derive(Debug, Clone, Copy)]
pub struct Error {
    category: ErrorCategory,
    code: u16,
    message: &'static str,
}

impl Error {
    /// Create a new error.
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self { category, code, message }
    }

    /// The error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    /// The flat error code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// The fixed message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// Whether this error is a Wasm execution trap.
    #[must_use]
    pub const fn is_trap(&self) -> bool {
        matches!(self.category, ErrorCategory::Trap)
    }

    // Factory methods, one per concern, so call sites stay terse.

    /// Loading or decoding failure.
    #[must_use]
    pub const fn parse(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, code, message)
    }

    /// Static validation failure.
    #[must_use]
    pub const fn validation(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Validation, code, message)
    }

    /// Linking or instantiation failure.
    #[must_use]
    pub const fn instantiation(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Instantiation, code, message)
    }

    /// Wasm execution trap.
    #[must_use]
    pub const fn trap(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Trap, code, message)
    }

    /// Engine API misuse.
    #[must_use]
    pub const fn runtime(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, code, message)
    }

    /// Unexpected end of input while decoding.
    #[must_use]
    pub const fn unexpected_end() -> Self {
        Self::parse(codes::UNEXPECTED_END, "unexpected end of input")
    }

    /// Operand stack underflow, an internal engine invariant violation.
    #[must_use]
    pub const fn stack_underflow() -> Self {
        Self::runtime(codes::STACK_UNDERFLOW, "operand stack underflow")
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.code == other.code
    }
}

impl Eq for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error E{}: {}", self.category.as_str(), self.code, self.message)
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_identity_ignores_message() {
        let a = Error::parse(codes::INVALID_MAGIC, "bad magic in header");
        let b = Error::parse(codes::INVALID_MAGIC, "different wording");
        assert_eq!(a, b);
        assert_ne!(a, Error::parse(codes::INVALID_VERSION, "bad magic in header"));
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_display_includes_code_and_category() {
        let err = Error::trap(codes::DIVISION_BY_ZERO, "integer divide by zero");
        let rendered = std::format!("{err}");
        assert!(rendered.contains("trap"));
        assert!(rendered.contains("4001"));
        assert!(rendered.contains("divide"));
    }

    #[test]
    fn test_trap_predicate() {
        assert!(Error::trap(codes::UNREACHABLE, "unreachable executed").is_trap());
        assert!(!Error::parse(codes::INVALID_PATH, "no such file").is_trap());
    }
}
