//! Light classification of render-attribute expressions.
//!
//! The expression language itself is never parsed. Both checks are plain
//! regex matches, so string literals containing `await` or `props` are
//! classified as if they were code.

use once_cell::sync::Lazy;
use regex::Regex;

static SHARED: Lazy<ExpressionClassifier> = Lazy::new(ExpressionClassifier::new);

/// Flags derived from an expression's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpressionFlags {
    pub is_async: bool,
    pub references_props: bool,
}

/// Compiled matchers for the async and props checks.
#[derive(Debug, Clone)]
pub struct ExpressionClassifier {
    async_token: Regex,
    props_token: Regex,
}

impl ExpressionClassifier {
    /// Compile the matchers.
    pub fn new() -> Self {
        Self {
            // `await` not preceded by a word character or `.`
            async_token: Regex::new(r"(?:^|[^\w.])await\b").expect("async token regex is valid"),
            props_token: Regex::new(r"\bprops\b").expect("props token regex is valid"),
        }
    }

    /// A process-wide instance, compiled on first use.
    pub fn shared() -> &'static ExpressionClassifier {
        &SHARED
    }

    /// Whether the expression awaits something.
    pub fn is_async(&self, expression: &str) -> bool {
        self.async_token.is_match(expression)
    }

    /// Whether the expression mentions the reserved `props` identifier.
    pub fn references_props(&self, expression: &str) -> bool {
        self.props_token.is_match(expression)
    }

    /// Run both checks.
    pub fn classify(&self, expression: &str) -> ExpressionFlags {
        ExpressionFlags {
            is_async: self.is_async(expression),
            references_props: self.references_props(expression),
        }
    }
}

impl Default for ExpressionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_detection() {
        let classifier = ExpressionClassifier::shared();
        assert!(classifier.is_async("await fetchUser()"));
        assert!(classifier.is_async("(await load()).name"));
        assert!(classifier.is_async("x ? await a : b"));
        assert!(!classifier.is_async("user.await"));
        assert!(!classifier.is_async("awaited"));
        assert!(!classifier.is_async("noawait()"));
    }

    #[test]
    fn test_async_false_positive_in_string() {
        // Known limitation, kept on purpose.
        assert!(ExpressionClassifier::new().is_async("'please await'"));
    }

    #[test]
    fn test_props_detection() {
        let classifier = ExpressionClassifier::new();
        assert!(classifier.references_props("props.title"));
        assert!(classifier.references_props("{ ...props }"));
        assert!(!classifier.references_props("myprops"));
        assert!(!classifier.references_props("propsy"));
    }

    #[test]
    fn test_classify() {
        let flags = ExpressionClassifier::shared().classify("await props.load()");
        assert_eq!(
            flags,
            ExpressionFlags {
                is_async: true,
                references_props: true
            }
        );
    }
}
