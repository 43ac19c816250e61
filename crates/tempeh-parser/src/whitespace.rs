//! Whitespace collapsing for text content.

use crate::chars::is_whitespace;

/// How a string's whitespace runs should be treated.
///
/// A run touching the start of the string is leading, one touching the end
/// is trailing, and every other run is interior. Leading and trailing runs
/// are removed when their strip flag is set and collapsed to a single space
/// otherwise. Interior runs are collapsed only when `flatten_interior` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WhitespacePolicy {
    pub flatten_interior: bool,
    pub strip_leading: bool,
    pub strip_trailing: bool,
}

impl WhitespacePolicy {
    /// Policy for element text: always flattened, edges stripped depending
    /// on whether the text is the first and/or last child.
    pub const fn element_text(is_first_child: bool, is_last_child: bool) -> Self {
        Self {
            flatten_interior: true,
            strip_leading: is_first_child,
            strip_trailing: is_last_child,
        }
    }

    /// Policy for raw script/style bodies: trim the edges, keep the inside.
    pub const fn raw_body() -> Self {
        Self {
            flatten_interior: false,
            strip_leading: true,
            strip_trailing: true,
        }
    }

    /// Apply this policy to a string.
    pub fn apply(self, text: &str) -> String {
        normalize_whitespace(text, self)
    }
}

/// Collapse and strip whitespace runs in `text` according to `policy`.
pub fn normalize_whitespace(text: &str, policy: WhitespacePolicy) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !is_whitespace(c) {
            out.push(c);
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !is_whitespace(next) {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }

        let is_leading = start == 0;
        let is_trailing = end == text.len();

        if is_leading || is_trailing {
            let strip = (is_leading && policy.strip_leading) || (is_trailing && policy.strip_trailing);
            if !strip {
                out.push(' ');
            }
        } else if policy.flatten_interior {
            out.push(' ');
        } else {
            out.push_str(&text[start..end]);
        }
    }

    out
}
