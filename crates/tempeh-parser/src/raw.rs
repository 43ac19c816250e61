//! Raw content reading for `script`, `style` and `#raw` elements.

use crate::chars::{is_line_break, is_script_quote_char, is_style_quote_char, is_whitespace};
use crate::cursor::Cursor;

/// How to find the end of a raw body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawContentMode {
    /// Track nested elements with the same tag name so that the matching
    /// closing tag ends the body.
    Nested,
    /// Ignore closing tags inside JavaScript string literals.
    Script,
    /// Ignore closing tags inside CSS string literals.
    Style,
}

impl RawContentMode {
    fn is_quote(self, c: char) -> bool {
        match self {
            RawContentMode::Nested => false,
            RawContentMode::Script => is_script_quote_char(c),
            RawContentMode::Style => is_style_quote_char(c),
        }
    }
}

impl<'a> Cursor<'a> {
    /// Read everything up to the closing tag for `tag_name` and consume that
    /// closing tag. At end of input the scanned text is returned as is.
    ///
    /// Inside a quoted string a quote closes only if it is preceded by an even
    /// number of backslashes. Single- and double-quoted strings also end at an
    /// unescaped line break, which keeps a stray apostrophe in a comment from
    /// swallowing the rest of the file.
    pub fn read_raw_content(&mut self, tag_name: &str, mode: RawContentMode) -> &'a str {
        let start = self.offset();
        let mut depth = 0usize;
        let mut open_quote: Option<char> = None;

        while let Some(c) = self.current() {
            if let Some(quote) = open_quote {
                if c == quote && self.preceding_backslashes() % 2 == 0 {
                    open_quote = None;
                } else if quote != '`' && is_line_break(c) && !self.continues_line(c) {
                    open_quote = None;
                }
                self.advance();
                continue;
            }

            if mode.is_quote(c) {
                open_quote = Some(c);
                self.advance();
                continue;
            }

            if c == '<' {
                if self.is_named_tag_ahead("</", tag_name) {
                    if depth == 0 {
                        let end = self.offset();
                        self.read_closing_tag();
                        return self.slice(start, end);
                    }
                    depth -= 1;
                } else if mode == RawContentMode::Nested && self.is_named_tag_ahead("<", tag_name) {
                    depth += 1;
                }
            }

            self.advance();
        }

        self.slice(start, self.offset())
    }

    /// The line break at the cursor is escaped. Inside an open string the
    /// `\n` of a `\r\n` always follows an escaped `\r`.
    fn continues_line(&self, c: char) -> bool {
        (c == '\n' && self.prev_char() == Some('\r')) || self.preceding_backslashes() % 2 == 1
    }

    /// `prefix` followed by exactly `tag_name`, then whitespace, `>`, `/` or
    /// end of input.
    fn is_named_tag_ahead(&self, prefix: &str, tag_name: &str) -> bool {
        let Some(rest) = self.remaining().strip_prefix(prefix) else {
            return false;
        };
        let Some(after) = rest.strip_prefix(tag_name) else {
            return false;
        };
        match after.chars().next() {
            None => true,
            Some(c) => is_whitespace(c) || c == '>' || c == '/',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempeh_source::Position;

    fn read(source: &str, tag: &str, mode: RawContentMode) -> (String, String) {
        let mut cursor = Cursor::new(source);
        let body = cursor.read_raw_content(tag, mode).to_string();
        (body, cursor.remaining().to_string())
    }

    #[test]
    fn test_script_ignores_closing_tag_in_string() {
        let (body, rest) = read(
            r#"var s = "</script>";</script>after"#,
            "script",
            RawContentMode::Script,
        );
        assert_eq!(body, r#"var s = "</script>";"#);
        assert_eq!(rest, "after");
    }

    #[test]
    fn test_script_escaped_quotes() {
        let (body, _) = read(
            r#"a = 'it\'s </script>'; b = "\\";</script>"#,
            "script",
            RawContentMode::Script,
        );
        assert_eq!(body, r#"a = 'it\'s </script>'; b = "\\";"#);
    }

    #[test]
    fn test_script_template_literal_spans_lines() {
        let (body, _) = read(
            "x = `\n</script>\n`;</script>",
            "script",
            RawContentMode::Script,
        );
        assert_eq!(body, "x = `\n</script>\n`;");
    }

    #[test]
    fn test_stray_apostrophe_ends_at_line_break() {
        let (body, rest) = read(
            "// don't\nrun();\n</script><p>",
            "script",
            RawContentMode::Script,
        );
        assert_eq!(body, "// don't\nrun();\n");
        assert_eq!(rest, "<p>");
    }

    #[test]
    fn test_escaped_line_break_continues_string() {
        let (body, rest) = read(
            "var s = 'a\\\n</script>';</script><p>",
            "script",
            RawContentMode::Script,
        );
        assert_eq!(body, "var s = 'a\\\n</script>';");
        assert_eq!(rest, "<p>");

        let (body, _) = read(
            "var s = \"a\\\r\n</script>\";</script>",
            "script",
            RawContentMode::Script,
        );
        assert_eq!(body, "var s = \"a\\\r\n</script>\";");
    }

    #[test]
    fn test_escaped_backslash_before_line_break() {
        let (body, rest) = read(
            "x = 'a\\\\\n</script><p>",
            "script",
            RawContentMode::Script,
        );
        assert_eq!(body, "x = 'a\\\\\n");
        assert_eq!(rest, "<p>");
    }

    #[test]
    fn test_style_ignores_closing_tag_in_string() {
        let (body, rest) = read(
            r#"a::after { content: "</style>"; } b::after { content: '</style>'; }</style>tail"#,
            "style",
            RawContentMode::Style,
        );
        assert_eq!(
            body,
            r#"a::after { content: "</style>"; } b::after { content: '</style>'; }"#
        );
        assert_eq!(rest, "tail");
    }

    #[test]
    fn test_style_ignores_backticks() {
        let (body, _) = read(
            "a::before { content: '`'; }</style>",
            "style",
            RawContentMode::Style,
        );
        assert_eq!(body, "a::before { content: '`'; }");
    }

    #[test]
    fn test_nested_tracking() {
        let (body, rest) = read(
            "<div><div>x</div></div></div>tail",
            "div",
            RawContentMode::Nested,
        );
        assert_eq!(body, "<div><div>x</div></div>");
        assert_eq!(rest, "tail");
    }

    #[test]
    fn test_nested_checks_name_boundary() {
        let (body, _) = read("<divider></div>", "div", RawContentMode::Nested);
        assert_eq!(body, "<divider>");
    }

    #[test]
    fn test_unterminated_returns_rest() {
        let mut cursor = Cursor::new("a\nb");
        assert_eq!(cursor.read_raw_content("pre", RawContentMode::Nested), "a\nb");
        assert!(cursor.is_at_end());
        assert_eq!(cursor.position(), Position::new(2, 2));
    }
}
