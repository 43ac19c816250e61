//! Tag, attribute, comment and text scanning on top of [`Cursor`].

use crate::ast::{Element, RenderAttribute, StaticAttribute, ATTR_BINDING_NAME};
use crate::chars::{
    is_legal_leading_tag_name_char, is_legal_name_char, is_legal_unquoted_value_char, is_quote_char,
};
use crate::cursor::Cursor;
use crate::expr::ExpressionClassifier;
use smol_str::SmolStr;
use tempeh_source::{Position, Span};

const CLOSING_TAG_PREFIX: &str = "</";
const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// What stopped a [`Cursor::read_text`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEnd {
    /// The cursor sits on `<` starting an opening tag.
    OpeningTag,
    /// The cursor sits on `</`.
    ClosingTag,
    /// No input left.
    EndOfInput,
}

/// Text read up to the next tag, with comments removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub end: TextEnd,
}

/// A scanned opening tag. The element has no children yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningTag {
    pub element: Element,
    /// Whether the tag ended with `/>`.
    pub self_closing: bool,
    pub span: Span,
}

/// A scanned closing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingTag {
    pub name: SmolStr,
    pub position: Position,
    pub span: Span,
}

impl<'a> Cursor<'a> {
    /// `<` followed by a legal leading tag-name character.
    pub fn is_opening_tag_ahead(&self) -> bool {
        self.current() == Some('<') && self.peek(1).is_some_and(is_legal_leading_tag_name_char)
    }

    pub fn is_closing_tag_ahead(&self) -> bool {
        self.starts_with(CLOSING_TAG_PREFIX)
    }

    pub fn is_comment_ahead(&self) -> bool {
        self.starts_with(COMMENT_OPEN)
    }

    /// Skip a `<!-- ... -->` comment. An unterminated comment runs to the
    /// end of input.
    pub fn skip_comment(&mut self) {
        self.consume(COMMENT_OPEN);
        while !self.is_at_end() && !self.starts_with(COMMENT_CLOSE) {
            self.advance();
        }
        self.consume(COMMENT_CLOSE);
    }

    /// Read text until the next opening tag, closing tag or end of input.
    /// Comments are dropped from the returned text.
    pub fn read_text(&mut self) -> TextRun {
        let mut text = String::new();
        let mut segment_start = self.offset();

        let end = loop {
            if self.is_at_end() {
                break TextEnd::EndOfInput;
            }
            if self.is_opening_tag_ahead() {
                break TextEnd::OpeningTag;
            }
            if self.is_closing_tag_ahead() {
                break TextEnd::ClosingTag;
            }
            if self.is_comment_ahead() {
                text.push_str(self.slice(segment_start, self.offset()));
                self.skip_comment();
                segment_start = self.offset();
                continue;
            }
            self.advance();
        };

        text.push_str(self.slice(segment_start, self.offset()));
        TextRun { text, end }
    }

    /// Read a tag or attribute name.
    pub fn read_tag_name(&mut self) -> &'a str {
        self.consume_while(is_legal_name_char)
    }

    /// Read an opening tag starting at `<`, leaving the cursor after its `>`.
    pub fn read_opening_tag(&mut self, classifier: &ExpressionClassifier) -> OpeningTag {
        let start = self.offset();
        let position = self.position();

        self.consume("<");
        let tag_name = SmolStr::from(self.read_tag_name());
        let (static_attributes, render_attributes) = self.read_attributes(classifier);

        let self_closing = self.consume("/>");
        if !self_closing {
            // Anything left before `>` is junk the attribute loop gave up on.
            while let Some(c) = self.advance() {
                if c == '>' {
                    break;
                }
            }
        }

        OpeningTag {
            element: Element {
                tag_name,
                static_attributes,
                render_attributes,
                children: Vec::new(),
                position,
            },
            self_closing,
            span: self.span_from(start),
        }
    }

    /// Read a closing tag starting at `</`, leaving the cursor after its `>`.
    pub fn read_closing_tag(&mut self) -> ClosingTag {
        let start = self.offset();
        let position = self.position();

        self.consume(CLOSING_TAG_PREFIX);
        let name = SmolStr::from(self.read_tag_name());
        while let Some(c) = self.advance() {
            if c == '>' {
                break;
            }
        }

        ClosingTag {
            name,
            position,
            span: self.span_from(start),
        }
    }

    /// Parse attributes until `>`, `/>` or end of input, leaving the cursor
    /// on the tag terminator.
    pub fn read_attributes(
        &mut self,
        classifier: &ExpressionClassifier,
    ) -> (Vec<StaticAttribute>, Vec<RenderAttribute>) {
        let mut static_attributes = Vec::new();
        let mut render_attributes = Vec::new();

        loop {
            if !self.skip_to_attribute_name() {
                break;
            }

            let position = self.position();
            let sigil = self.current().filter(|&c| c == ':' || c == '#');
            if sigil.is_some() {
                self.advance();
            }

            let name_start = self.offset();
            let mut modifier_at = None;
            while let Some(c) = self.current() {
                if !is_legal_name_char(c) {
                    break;
                }
                if sigil == Some('#') && c == ':' && modifier_at.is_none() {
                    modifier_at = Some(self.offset());
                }
                self.advance();
            }
            let name_end = self.offset();

            self.skip_whitespace();
            let value = if self.consume("=") {
                self.skip_whitespace();
                self.read_attribute_value(sigil.is_some())
            } else {
                None
            };

            match sigil {
                None => static_attributes.push(StaticAttribute {
                    name: self.slice(name_start, name_end).into(),
                    value,
                    position,
                }),
                Some(sigil) => {
                    let (name, modifier) = if sigil == ':' {
                        let bound = self.slice(name_start, name_end);
                        (
                            SmolStr::new_static(ATTR_BINDING_NAME),
                            (!bound.is_empty()).then(|| SmolStr::from(bound)),
                        )
                    } else if let Some(at) = modifier_at {
                        (
                            SmolStr::from(self.slice(name_start, at)),
                            Some(SmolStr::from(self.slice(at + 1, name_end))),
                        )
                    } else {
                        (SmolStr::from(self.slice(name_start, name_end)), None)
                    };

                    let flags = value
                        .as_deref()
                        .map(|v| classifier.classify(v))
                        .unwrap_or_default();

                    render_attributes.push(RenderAttribute {
                        name,
                        modifier,
                        expression_value: value,
                        references_props: flags.references_props,
                        is_async: flags.is_async,
                        position,
                    });
                }
            }
        }

        (static_attributes, render_attributes)
    }

    /// Skip to the next attribute name. Returns `false` on `>`, `/>` or end
    /// of input.
    fn skip_to_attribute_name(&mut self) -> bool {
        loop {
            match self.current() {
                None | Some('>') => return false,
                Some('/') if self.peek(1) == Some('>') => return false,
                Some(c) if is_legal_name_char(c) => return true,
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Read the value after `=`. Backtick quoting is only recognised for
    /// render attributes; a static value starting with one is unquoted.
    fn read_attribute_value(&mut self, allow_backtick: bool) -> Option<String> {
        let c = self.current()?;
        if is_quote_char(c) && (c != '`' || allow_backtick) {
            self.advance();
            Some(self.read_quoted_value(c).to_string())
        } else {
            Some(self.read_unquoted_value().to_string())
        }
    }

    /// Read up to the closing `quote`, which is consumed but not returned.
    /// A quote preceded by an odd number of backslashes is escaped.
    pub fn read_quoted_value(&mut self, quote: char) -> &'a str {
        let start = self.offset();
        while let Some(c) = self.current() {
            if c == quote && self.preceding_backslashes() % 2 == 0 {
                let value = self.slice(start, self.offset());
                self.advance();
                return value;
            }
            self.advance();
        }
        self.slice(start, self.offset())
    }

    /// Read an unquoted value up to whitespace, a quote, `<`, `>` or `/>`.
    pub fn read_unquoted_value(&mut self) -> &'a str {
        let start = self.offset();
        while let Some(c) = self.current() {
            if (c == '/' && self.peek(1) == Some('>')) || !is_legal_unquoted_value_char(c) {
                break;
            }
            self.advance();
        }
        self.slice(start, self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn opening(source: &str) -> OpeningTag {
        Cursor::new(source).read_opening_tag(ExpressionClassifier::shared())
    }

    #[test]
    fn test_read_text_stops_at_tags() {
        let mut cursor = Cursor::new("hello <b>");
        let run = cursor.read_text();
        assert_eq!(run.text, "hello ");
        assert_eq!(run.end, TextEnd::OpeningTag);

        let mut cursor = Cursor::new("bye</b>");
        assert_eq!(cursor.read_text().end, TextEnd::ClosingTag);

        let mut cursor = Cursor::new("a < b");
        let run = cursor.read_text();
        assert_eq!(run.text, "a < b");
        assert_eq!(run.end, TextEnd::EndOfInput);
    }

    #[test]
    fn test_read_text_strips_comments() {
        let mut cursor = Cursor::new("a<!-- <b>x</b> -->b<!-- unterminated");
        let run = cursor.read_text();
        assert_eq!(run.text, "ab");
        assert_eq!(run.end, TextEnd::EndOfInput);
    }

    #[test]
    fn test_read_opening_tag() {
        let tag = opening(r#"<a href="/home" hidden class=nav>"#);
        assert_eq!(tag.element.tag_name, "a");
        assert!(!tag.self_closing);
        let attrs: Vec<_> = tag
            .element
            .static_attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_deref()))
            .collect();
        assert_eq!(
            attrs,
            vec![("href", Some("/home")), ("hidden", None), ("class", Some("nav"))]
        );
        assert_eq!(tag.span, Span::new(0, 33));
    }

    #[test]
    fn test_render_attributes() {
        let tag = opening(r#"<div :class="props.cls" #scope:local #for="await items()" #raw>"#);
        let attrs = &tag.element.render_attributes;
        assert_eq!(attrs.len(), 4);

        assert_eq!(attrs[0].name, "attr");
        assert_eq!(attrs[0].modifier.as_deref(), Some("class"));
        assert_eq!(attrs[0].expression_value.as_deref(), Some("props.cls"));
        assert!(attrs[0].references_props);
        assert!(!attrs[0].is_async);

        assert_eq!(attrs[1].name, "scope");
        assert_eq!(attrs[1].modifier.as_deref(), Some("local"));
        assert_eq!(attrs[1].expression_value, None);

        assert_eq!(attrs[2].name, "for");
        assert!(attrs[2].is_async);

        assert_eq!(attrs[3].name, "raw");
        assert!(tag.element.static_attributes.is_empty());
    }

    #[test]
    fn test_attribute_positions() {
        let tag = opening("<p\n  id=x\n  #if=\"a\">");
        assert_eq!(tag.element.position, Position::new(1, 1));
        assert_eq!(tag.element.static_attributes[0].position, Position::new(2, 3));
        assert_eq!(tag.element.render_attributes[0].position, Position::new(3, 3));
    }

    #[test]
    fn test_escaped_quotes() {
        let tag = opening(r#"<i a="a\"b" b="a\\">"#);
        let attrs = &tag.element.static_attributes;
        assert_eq!(attrs[0].value.as_deref(), Some(r#"a\"b"#));
        assert_eq!(attrs[1].value.as_deref(), Some(r#"a\\"#));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_backtick_only_for_render_attributes() {
        let tag = opening("<i #text=`a ${b} c`>");
        assert_eq!(
            tag.element.render_attributes[0].expression_value.as_deref(),
            Some("a ${b} c")
        );

        let tag = opening("<i title=`x`>");
        assert_eq!(tag.element.static_attributes[0].value.as_deref(), Some("`x`"));

        let tag = opening("<i title=`x y` alt=a>");
        let attrs: Vec<_> = tag
            .element
            .static_attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_deref()))
            .collect();
        assert_eq!(attrs, vec![("title", Some("`x")), ("y", None), ("alt", Some("a"))]);
    }

    #[test]
    fn test_self_closing_and_unquoted_path() {
        let tag = opening("<Card title=a/b />");
        assert!(tag.self_closing);
        assert_eq!(tag.element.static_attributes[0].value.as_deref(), Some("a/b"));

        let tag = opening("<img src=x.png/>");
        assert!(tag.self_closing);
        assert_eq!(tag.element.static_attributes[0].value.as_deref(), Some("x.png"));
    }

    #[test]
    fn test_whitespace_around_equals() {
        let tag = opening(r#"<a href = "x">"#);
        assert_eq!(tag.element.static_attributes.len(), 1);
        assert_eq!(tag.element.static_attributes[0].value.as_deref(), Some("x"));
    }

    #[test]
    fn test_unterminated_tag() {
        let tag = opening(r#"<a href="unterminated"#);
        assert_eq!(tag.element.tag_name, "a");
        assert_eq!(tag.element.static_attributes[0].value.as_deref(), Some("unterminated"));

        let tag = opening("<a href=");
        assert_eq!(tag.element.static_attributes[0].value, None);
    }

    #[test]
    fn test_duplicate_attributes_are_kept() {
        let tag = opening(r#"<a class="a" class="b">"#);
        assert_eq!(tag.element.static_attributes.len(), 2);
    }

    #[test]
    fn test_read_closing_tag() {
        let mut cursor = Cursor::new("</div >rest");
        let tag = cursor.read_closing_tag();
        assert_eq!(tag.name, "div");
        assert_eq!(tag.span, Span::new(0, 7));
        assert_eq!(cursor.remaining(), "rest");
    }
}
