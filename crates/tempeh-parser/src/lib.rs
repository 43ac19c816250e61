//! Template parser.
//!
//! Turns template markup into a [`TemplateData`]: the main component tree,
//! inline components hoisted out of `<template #component="Name">`
//! definitions, script and style assets collected into named buckets, and
//! component imports declared with `<link rel="import">`.
//!
//! Parsing is a single synchronous pass. Structural errors abort it with a
//! [`ParseError`]; running out of input inside a tag, value, comment or raw
//! body does not.

pub mod ast;
pub mod builder;
pub mod chars;
pub mod cursor;
pub mod error;
pub mod expr;
pub mod raw;
pub mod scanner;
pub mod whitespace;

pub use ast::*;
pub use builder::{ParseOptions, TemplateParser};
pub use error::{ErrorCode, ParseError, ParseResult};
pub use expr::{ExpressionClassifier, ExpressionFlags};
pub use tempeh_source::{Position, Span};

/// Parse a complete template file.
pub fn parse_template(source: &str) -> ParseResult<TemplateData> {
    parse_template_with_options(source, ParseOptions::default())
}

/// Parse a template with explicit options.
pub fn parse_template_with_options(source: &str, options: ParseOptions) -> ParseResult<TemplateData> {
    TemplateParser::new(source, options).parse()
}

/// Parse a fragment extracted from a larger file. Positions are reported
/// relative to the file, with the fragment's first character at `start`.
pub fn parse_fragment(source: &str, start: Position) -> ParseResult<TemplateData> {
    parse_template_with_options(source, ParseOptions::at(start))
}
