//! Error types for template parsing.

use std::fmt;
use tempeh_source::{Position, Span};

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A fatal structural error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Where the offending token starts.
    pub position: Position,
    /// Byte range of the offending token.
    pub span: Span,
    /// The error code.
    pub code: ErrorCode,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, position: Position, span: Span, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            position,
            span,
            code,
        }
    }

    /// A closing tag with no matching open element.
    pub fn unmatched_closing_tag(tag: &str, position: Position, span: Span) -> Self {
        Self::new(
            format!("Unexpected closing tag </{}> with no matching open element", tag),
            position,
            span,
            ErrorCode::UnmatchedClosingTag,
        )
    }

    /// A closing `</template>` while no inline component scope is open.
    pub fn unexpected_scope_close(position: Position, span: Span) -> Self {
        Self::new(
            "Unexpected closing </template> tag outside of an inline component",
            position,
            span,
            ErrorCode::UnexpectedScopeClose,
        )
    }

    /// Two inline components declared with the same name.
    pub fn duplicate_component(name: &str, position: Position, span: Span) -> Self {
        Self::new(
            format!("Duplicate inline component name: {}", name),
            position,
            span,
            ErrorCode::DuplicateComponent,
        )
    }
}

/// Error codes for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Closing tag that matches nothing on the open-node stack.
    UnmatchedClosingTag,
    /// Closing `</template>` that would close the main component.
    UnexpectedScopeClose,
    /// Inline component name declared twice in one file.
    DuplicateComponent,
}

impl ErrorCode {
    /// Get the error code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnmatchedClosingTag => "unmatched-closing-tag",
            ErrorCode::UnexpectedScopeClose => "unexpected-scope-close",
            ErrorCode::DuplicateComponent => "duplicate-component",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = ParseError::unmatched_closing_tag("div", Position::new(3, 7), Span::new(20, 26));
        assert_eq!(
            err.to_string(),
            "Unexpected closing tag </div> with no matching open element at 3:7"
        );
        assert_eq!(err.code.as_str(), "unmatched-closing-tag");
    }
}
