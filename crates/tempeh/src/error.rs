//! Diagnostics for files that fail to read or parse.

use miette::{Diagnostic, NamedSource, SourceSpan};
use tempeh_parser::{ErrorCode, ParseError, Position};
use thiserror::Error;

/// A parse error attached to the source it came from.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(tempeh::parse))]
pub struct TemplateError {
    pub message: String,
    pub code: ErrorCode,
    pub position: Position,
    #[source_code]
    pub source_code: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

impl TemplateError {
    /// Wrap a parse error with its file name and source text.
    pub fn new(name: &str, source: String, error: ParseError) -> Self {
        let span = error.span.to_range();
        Self {
            message: error.message,
            code: error.code,
            position: error.position,
            source_code: NamedSource::new(name, source),
            span: SourceSpan::from(span),
        }
    }
}

/// Why a single file produced no template data.
#[derive(Debug, Error, Diagnostic)]
pub enum FileError {
    #[error("failed to read {path}")]
    #[diagnostic(code(tempeh::io))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] TemplateError),
}

impl FileError {
    /// Stable code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            FileError::Read { .. } => "read-failed",
            FileError::Parse(err) => err.code.as_str(),
        }
    }

    /// Position of a parse error.
    pub fn position(&self) -> Option<Position> {
        match self {
            FileError::Read { .. } => None,
            FileError::Parse(err) => Some(err.position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempeh_parser::parse_template;

    #[test]
    fn test_template_error_span() {
        let source = "<div></span></div>";
        let err = parse_template(source).unwrap_err();
        let err = TemplateError::new("page.tmph.html", source.to_string(), err);

        assert_eq!(err.span, SourceSpan::from(5..12));
        assert_eq!(err.position, Position::new(1, 6));
        assert_eq!(
            err.to_string(),
            "Unexpected closing tag </span> with no matching open element"
        );
    }

    #[test]
    fn test_file_error_code() {
        let source = "</template>";
        let err = parse_template(source).unwrap_err();
        let err = FileError::from(TemplateError::new("x", source.to_string(), err));
        assert_eq!(err.code(), "unexpected-scope-close");
        assert_eq!(err.position(), Some(Position::new(1, 1)));
    }
}
