//! Tree builder driving the cursor, scanner and normalizer.
//!
//! Elements are allocated in an arena and referenced by index while they are
//! open. Each component scope keeps its own stack of open element indices;
//! the owned [`Element`] tree is only materialized when a scope closes.

use crate::ast::{
    AssetSource, Component, ComponentImport, Element, Node, ScriptAsset, StyleAsset, TemplateData,
    TextNode, DEFAULT_BUCKET_NAME, DEFAULT_SCRIPT_SCOPE,
};
use crate::chars::{is_raw_text_element, is_whitespace_preserving_element};
use crate::cursor::Cursor;
use crate::error::{ParseError, ParseResult};
use crate::expr::ExpressionClassifier;
use crate::raw::RawContentMode;
use crate::scanner::{OpeningTag, TextEnd};
use crate::whitespace::WhitespacePolicy;
use indexmap::IndexSet;
use smol_str::SmolStr;
use std::mem;
use tempeh_source::Position;
use tracing::{debug, trace};

/// Options for a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Position of the first character of the source.
    pub start: Position,
    /// Copied into [`TemplateData::source_file_path`].
    pub source_file_path: Option<String>,
}

impl ParseOptions {
    /// Options for a fragment whose first character sits at `start`.
    pub fn at(start: Position) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// Set the source file path.
    pub fn with_source_file_path(mut self, path: impl Into<String>) -> Self {
        self.source_file_path = Some(path.into());
        self
    }
}

type ElementId = usize;

#[derive(Debug)]
enum PendingChild {
    Text(TextNode),
    Element(ElementId),
}

/// An element whose children are still being collected.
#[derive(Debug)]
struct PendingElement {
    element: Element,
    children: Vec<PendingChild>,
}

/// An open component scope.
#[derive(Debug, Default)]
struct Scope {
    /// `None` for the main component.
    name: Option<String>,
    root: ElementId,
    /// Open elements below the root, innermost last.
    open: Vec<ElementId>,
    has_default_slot: bool,
    named_slots: IndexSet<String>,
    prop_types_jsdoc: Option<String>,
}

impl Scope {
    fn new(name: Option<String>, root: ElementId) -> Self {
        Self {
            name,
            root,
            ..Self::default()
        }
    }

    fn current_parent(&self) -> ElementId {
        self.open.last().copied().unwrap_or(self.root)
    }
}

/// Where a closing tag lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseTarget {
    /// Truncate the open stack of the scope at `level` to `index`.
    Element { level: usize, index: usize },
    /// Close the inline scope at `level`.
    Scope { level: usize },
}

/// Parser for a single template source.
pub struct TemplateParser<'a> {
    cursor: Cursor<'a>,
    classifier: &'a ExpressionClassifier,
    arena: Vec<PendingElement>,
    main: Scope,
    /// Open inline component scopes, innermost last.
    inline: Vec<Scope>,
    data: TemplateData,
}

impl<'a> TemplateParser<'a> {
    /// Create a parser using the shared expression classifier.
    pub fn new(source: &'a str, options: ParseOptions) -> Self {
        Self::with_classifier(source, options, ExpressionClassifier::shared())
    }

    /// Create a parser using the given expression classifier.
    pub fn with_classifier(
        source: &'a str,
        options: ParseOptions,
        classifier: &'a ExpressionClassifier,
    ) -> Self {
        let mut parser = Self {
            cursor: Cursor::with_start(source, options.start),
            classifier,
            arena: Vec::new(),
            main: Scope::default(),
            inline: Vec::new(),
            data: TemplateData {
                source_file_path: options.source_file_path,
                ..TemplateData::default()
            },
        };
        let root = parser.alloc(Element {
            position: options.start,
            ..Element::default()
        });
        parser.main = Scope::new(None, root);
        parser
    }

    /// Run the parse to completion.
    pub fn parse(mut self) -> ParseResult<TemplateData> {
        loop {
            let preserve = self.preserves_whitespace();
            let position = self.cursor.position();
            let run = self.cursor.read_text();

            let parent = self.current_scope().current_parent();
            let text_content = if preserve {
                run.text
            } else {
                let is_first = self.arena[parent].children.is_empty();
                let is_last = run.end != TextEnd::OpeningTag;
                WhitespacePolicy::element_text(is_first, is_last).apply(&run.text)
            };
            if !text_content.is_empty() {
                self.append(PendingChild::Text(TextNode {
                    text_content,
                    position,
                }));
            }

            match run.end {
                TextEnd::EndOfInput => break,
                TextEnd::ClosingTag => self.close_element()?,
                TextEnd::OpeningTag => self.open_element()?,
            }
        }

        Ok(self.finish())
    }

    fn alloc(&mut self, element: Element) -> ElementId {
        self.arena.push(PendingElement {
            element,
            children: Vec::new(),
        });
        self.arena.len() - 1
    }

    fn tag_name(&self, id: ElementId) -> &str {
        &self.arena[id].element.tag_name
    }

    /// Scope at `level`: 0 is main, `n` is the n-th open inline scope.
    fn scope(&self, level: usize) -> &Scope {
        match level {
            0 => &self.main,
            n => &self.inline[n - 1],
        }
    }

    fn scope_mut(&mut self, level: usize) -> &mut Scope {
        match level {
            0 => &mut self.main,
            n => &mut self.inline[n - 1],
        }
    }

    fn current_scope(&self) -> &Scope {
        self.scope(self.inline.len())
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        self.scope_mut(self.inline.len())
    }

    fn append(&mut self, child: PendingChild) {
        let parent = self.current_scope().current_parent();
        self.arena[parent].children.push(child);
    }

    fn append_element(&mut self, element: Element) -> ElementId {
        let id = self.alloc(element);
        self.append(PendingChild::Element(id));
        id
    }

    /// Append an element whose body was read raw, with the body as its only
    /// child.
    fn append_with_body(&mut self, element: Element, body: String, position: Position) {
        let id = self.append_element(element);
        if !body.is_empty() {
            self.arena[id].children.push(PendingChild::Text(TextNode {
                text_content: body,
                position,
            }));
        }
    }

    fn preserves_whitespace(&self) -> bool {
        std::iter::once(&self.main)
            .chain(&self.inline)
            .flat_map(|scope| &scope.open)
            .any(|&id| is_whitespace_preserving_element(self.tag_name(id)))
    }

    fn open_element(&mut self) -> ParseResult<()> {
        let tag = self.cursor.read_opening_tag(self.classifier);

        match tag.element.tag_name.as_str() {
            "link" => {
                if let Some(tag) = self.collect_link(tag) {
                    self.append_element(tag.element);
                }
                return Ok(());
            }
            name if is_raw_text_element(name) => {
                self.handle_raw_text(tag);
                return Ok(());
            }
            "template" => {
                if let Some(name) = component_name(&tag.element) {
                    return self.open_component(tag, name);
                }
            }
            "slot" => self.record_slot(&tag.element),
            _ => {}
        }

        if tag.element.is_void() || tag.self_closing {
            self.append_element(tag.element);
            return Ok(());
        }

        if tag.element.has_render_attribute("raw") {
            let position = self.cursor.position();
            let tag_name = tag.element.tag_name.clone();
            let body = self.read_raw_body(&tag_name, RawContentMode::Nested);
            self.append_with_body(tag.element, body, position);
            return Ok(());
        }

        let id = self.append_element(tag.element);
        self.current_scope_mut().open.push(id);
        Ok(())
    }

    fn read_raw_body(&mut self, tag_name: &str, mode: RawContentMode) -> String {
        WhitespacePolicy::raw_body().apply(self.cursor.read_raw_content(tag_name, mode))
    }

    /// Collect import and local stylesheet links. Returns the tag back when
    /// it should stay in the tree.
    fn collect_link(&mut self, tag: OpeningTag) -> Option<OpeningTag> {
        let element = &tag.element;
        let href = element.static_value("href").filter(|h| !h.is_empty());

        match (element.static_value("rel"), href) {
            (Some("import"), Some(href)) => {
                let import = ComponentImport {
                    import_name: element
                        .static_value("as")
                        .filter(|name| !name.is_empty())
                        .map(String::from),
                    path: href.to_string(),
                    position: element.position,
                };
                debug!(path = %import.path, position = %import.position, "collected component import");
                self.data.component_imports.push(import);
                None
            }
            (Some("stylesheet"), Some(href)) if is_relative_path(href) => {
                let bucket = bucket_name(element);
                debug!(bucket, path = href, "collected stylesheet link");
                let style = StyleAsset {
                    source: AssetSource::Path(href.to_string()),
                    position: element.position,
                };
                self.data.bucket_mut(bucket).styles.push(style);
                None
            }
            _ => Some(tag),
        }
    }

    /// Read a `script` or `style` body, then keep the element or collect
    /// its body.
    fn handle_raw_text(&mut self, tag: OpeningTag) {
        let is_script = tag.element.tag_name == "script";
        let body_position = self.cursor.position();
        let body = if tag.self_closing {
            String::new()
        } else if is_script {
            self.read_raw_body("script", RawContentMode::Script)
        } else {
            self.read_raw_body("style", RawContentMode::Style)
        };
        let element = tag.element;

        if element.has_render_attribute("raw") {
            self.append_with_body(element, body, body_position);
        } else if is_script {
            self.collect_script(element, body, body_position);
        } else {
            self.collect_style(element, body, body_position);
        }
    }

    fn collect_script(&mut self, element: Element, body: String, body_position: Position) {
        let src = element.static_value("src").filter(|src| !src.is_empty());
        if src.is_some_and(|src| !is_relative_path(src)) {
            self.append_with_body(element, body, body_position);
            return;
        }

        if element.has_render_attribute("render") && (src.is_some() || !body.is_empty()) {
            self.append_with_body(element, body, body_position);
            return;
        }
        if !body.is_empty() {
            if element.has_render_attribute("types") {
                debug!(position = %body_position, "collected prop types");
                self.current_scope_mut().prop_types_jsdoc = Some(body);
                return;
            }
        }

        let (source, position) = match src {
            Some(src) => (AssetSource::Path(src.to_string()), element.position),
            None if !body.is_empty() => (AssetSource::Content(body), body_position),
            None => return,
        };

        let bucket = bucket_name(&element);
        let scope = script_scope(&element);
        debug!(bucket, scope, position = %position, "collected script asset");
        self.data.bucket_mut(bucket).scripts.push(ScriptAsset {
            source,
            scope: SmolStr::from(scope),
            position,
        });
    }

    fn collect_style(&mut self, element: Element, body: String, body_position: Position) {
        if body.is_empty() {
            return;
        }

        let bucket = bucket_name(&element);
        debug!(bucket, position = %body_position, "collected style asset");
        self.data.bucket_mut(bucket).styles.push(StyleAsset {
            source: AssetSource::Content(body),
            position: body_position,
        });
    }

    fn record_slot(&mut self, element: &Element) {
        let scope = self.current_scope_mut();
        match element.static_value("name").filter(|name| !name.is_empty()) {
            Some(name) => {
                scope.named_slots.insert(name.to_string());
            }
            None => scope.has_default_slot = true,
        }
    }

    fn open_component(&mut self, tag: OpeningTag, name: String) -> ParseResult<()> {
        if self.data.inline_components.contains_key(&name) {
            return Err(ParseError::duplicate_component(
                &name,
                tag.element.position,
                tag.span,
            ));
        }

        debug!(component = %name, position = %tag.element.position, "opened inline component");
        self.data
            .inline_components
            .insert(name.clone(), Component::default());

        let root = self.alloc(tag.element);
        let scope = Scope::new(Some(name), root);
        if tag.self_closing {
            self.close_scope(scope);
        } else {
            self.inline.push(scope);
        }
        Ok(())
    }

    fn close_element(&mut self) -> ParseResult<()> {
        let tag = self.cursor.read_closing_tag();

        let Some(target) = self.find_close_target(&tag.name) else {
            return Err(if tag.name == "template" {
                ParseError::unexpected_scope_close(tag.position, tag.span)
            } else {
                ParseError::unmatched_closing_tag(&tag.name, tag.position, tag.span)
            });
        };

        let level = match target {
            CloseTarget::Element { level, .. } | CloseTarget::Scope { level } => level,
        };
        while self.inline.len() > level {
            if let Some(scope) = self.inline.pop() {
                trace!(component = ?scope.name, "implicitly closed inline component");
                self.close_scope(scope);
            }
        }

        match target {
            CloseTarget::Element { level, index } => {
                let scope = self.scope_mut(level);
                if index + 1 < scope.open.len() {
                    trace!(
                        count = scope.open.len() - index - 1,
                        "implicitly closed elements"
                    );
                }
                scope.open.truncate(index);
            }
            CloseTarget::Scope { .. } => {
                if let Some(scope) = self.inline.pop() {
                    self.close_scope(scope);
                }
            }
        }
        Ok(())
    }

    /// Find what a closing tag named `name` closes, searching scopes
    /// innermost first.
    fn find_close_target(&self, name: &str) -> Option<CloseTarget> {
        for level in (0..=self.inline.len()).rev() {
            let scope = self.scope(level);
            if let Some(index) = scope.open.iter().rposition(|&id| self.tag_name(id) == name) {
                return Some(CloseTarget::Element { level, index });
            }
            if level > 0 && name == "template" {
                return Some(CloseTarget::Scope { level });
            }
        }
        None
    }

    fn close_scope(&mut self, scope: Scope) {
        let Some(name) = scope.name.clone() else {
            return;
        };
        debug!(component = %name, "closed inline component");
        let component = self.build_component(scope);
        self.data.inline_components.insert(name, component);
    }

    fn build_component(&mut self, scope: Scope) -> Component {
        Component {
            root_node: self.build_element(scope.root),
            has_default_slot: scope.has_default_slot,
            named_slots: scope.named_slots,
            prop_types_jsdoc: scope.prop_types_jsdoc,
        }
    }

    fn build_element(&mut self, id: ElementId) -> Element {
        let pending = &mut self.arena[id];
        let mut element = mem::take(&mut pending.element);
        let children = mem::take(&mut pending.children);
        element.children = children
            .into_iter()
            .map(|child| match child {
                PendingChild::Text(text) => Node::Text(text),
                PendingChild::Element(id) => Node::Element(self.build_element(id)),
            })
            .collect();
        element
    }

    fn finish(mut self) -> TemplateData {
        while let Some(scope) = self.inline.pop() {
            trace!(component = ?scope.name, open = scope.open.len(), "closed inline component at end of input");
            self.close_scope(scope);
        }
        if !self.main.open.is_empty() {
            trace!(open = self.main.open.len(), "closed elements at end of input");
        }

        let main = mem::take(&mut self.main);
        self.data.main_component = self.build_component(main);
        self.data
    }
}

/// Inline component name from `#component="Name"` or `#component:Name`.
fn component_name(element: &Element) -> Option<String> {
    element
        .render_attribute("component")
        .and_then(|attr| attr.argument())
        .map(String::from)
}

fn bucket_name(element: &Element) -> &str {
    element
        .render_attribute("bucket")
        .and_then(|attr| attr.argument())
        .unwrap_or(DEFAULT_BUCKET_NAME)
}

/// `#scope:<name>` modifier, else the attribute's value.
fn script_scope(element: &Element) -> &str {
    element
        .render_attribute("scope")
        .and_then(|attr| {
            attr.modifier
                .as_deref()
                .filter(|m| !m.is_empty())
                .or_else(|| attr.expression_value.as_deref().filter(|v| !v.is_empty()))
        })
        .unwrap_or(DEFAULT_SCRIPT_SCOPE)
}

fn is_relative_path(path: &str) -> bool {
    path.starts_with('.') || path.starts_with('/')
}
