//! Character and tag-name classifiers.

/// HTML void elements. These never receive a body.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Line break characters; each one advances the cursor to a new line.
#[inline]
pub fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\x0C')
}

/// Whitespace as far as the template language is concerned.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || is_line_break(c)
}

/// Quote characters that may open an attribute value. Backticks are only
/// honoured for render attributes.
#[inline]
pub fn is_quote_char(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// The first character of a tag name is stricter than the rest.
#[inline]
pub fn is_legal_leading_tag_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

#[inline]
pub fn is_end_of_tag_char(c: char) -> bool {
    c == '>' || c == '/'
}

/// Anything but whitespace, `=`, quotes, `>` and `/`.
#[inline]
pub fn is_legal_name_char(c: char) -> bool {
    !is_whitespace(c) && !is_quote_char(c) && !is_end_of_tag_char(c) && c != '='
}

/// Characters allowed in an unquoted attribute value. `/` is handled by the
/// scanner since it only ends a value when it starts `/>`. A backtick is
/// plain text here.
#[inline]
pub fn is_legal_unquoted_value_char(c: char) -> bool {
    !is_whitespace(c) && c != '"' && c != '\'' && c != '>' && c != '<' && c != '='
}

/// Quote characters that open a string literal inside a `<script>` body.
#[inline]
pub fn is_script_quote_char(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// Quote characters that open a string literal inside a `<style>` body.
#[inline]
pub fn is_style_quote_char(c: char) -> bool {
    matches!(c, '"' | '\'')
}

/// Check if a tag name is a void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Elements whose body is read as raw text rather than markup.
pub fn is_raw_text_element(tag: &str) -> bool {
    tag == "script" || tag == "style"
}

/// Elements under which text whitespace is kept byte-for-byte.
pub fn is_whitespace_preserving_element(tag: &str) -> bool {
    tag == "pre" || tag == "textarea"
}
