//! Data model produced by the template parser.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use tempeh_source::Position;

/// Bucket used when an asset names no bucket of its own.
pub const DEFAULT_BUCKET_NAME: &str = "default";

/// Scope used when a script names no scope of its own.
pub const DEFAULT_SCRIPT_SCOPE: &str = "global";

/// Directive name given to `:name` attribute bindings; the bound attribute
/// name is carried as the modifier.
pub const ATTR_BINDING_NAME: &str = "attr";

#[cfg(feature = "serde")]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Everything parsed out of one template file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TemplateData {
    /// Path of the file this data was parsed from, when the caller knows it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub source_file_path: Option<String>,
    /// The component made up of the file's top-level markup.
    pub main_component: Component,
    /// Components declared with `<template #component="Name">`, hoisted
    /// regardless of nesting depth, in declaration order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "IndexMap::is_empty"))]
    pub inline_components: IndexMap<String, Component>,
    /// Extracted scripts and styles keyed by bucket name.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "IndexMap::is_empty"))]
    pub assets: IndexMap<String, AssetBucket>,
    /// Components imported with `<link rel="import">`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub component_imports: Vec<ComponentImport>,
}

impl TemplateData {
    /// Get an inline component by name.
    pub fn inline_component(&self, name: &str) -> Option<&Component> {
        self.inline_components.get(name)
    }

    /// Get an asset bucket by name.
    pub fn bucket(&self, name: &str) -> Option<&AssetBucket> {
        self.assets.get(name)
    }

    /// Get the bucket for `name`, creating it on first reference.
    pub(crate) fn bucket_mut(&mut self, name: &str) -> &mut AssetBucket {
        self.assets.entry(name.to_string()).or_default()
    }
}

/// A named parse scope with its own node tree.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Component {
    /// Root element. For the main component this is a synthetic element
    /// with an empty tag name; for inline components it is the declaring
    /// `<template>` element.
    pub root_node: Element,
    /// Whether an unnamed `<slot>` appears in the component.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub has_default_slot: bool,
    /// Names of the named `<slot>`s in the component.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "IndexSet::is_empty"))]
    pub named_slots: IndexSet<String>,
    /// Body of a `<script #types>` element, verbatim.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "propTypesJSDoc", default, skip_serializing_if = "Option::is_none")
    )]
    pub prop_types_jsdoc: Option<String>,
}

/// A node in the parsed tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Node {
    /// A run of text.
    Text(TextNode),
    /// An element.
    Element(Element),
}

impl Node {
    /// Get the position of this node.
    pub fn position(&self) -> Position {
        match self {
            Self::Text(n) => n.position,
            Self::Element(n) => n.position,
        }
    }

    /// Get this node as an element, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Get the text content, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.text_content),
            Self::Element(_) => None,
        }
    }
}

/// An element node.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Element {
    /// The tag name.
    pub tag_name: SmolStr,
    /// Plain HTML attributes, in source order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub static_attributes: Vec<StaticAttribute>,
    /// `:` and `#` directive attributes, in source order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub render_attributes: Vec<RenderAttribute>,
    /// Child nodes. Always empty for void elements.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<Node>,
    /// Where the opening tag starts.
    pub position: Position,
}

impl Element {
    /// Get the first static attribute with this name.
    pub fn static_attribute(&self, name: &str) -> Option<&StaticAttribute> {
        self.static_attributes.iter().find(|a| a.name == name)
    }

    /// Get the value of the first static attribute with this name.
    pub fn static_value(&self, name: &str) -> Option<&str> {
        self.static_attribute(name).and_then(|a| a.value.as_deref())
    }

    /// Get the first render attribute with this directive name.
    pub fn render_attribute(&self, name: &str) -> Option<&RenderAttribute> {
        self.render_attributes.iter().find(|a| a.name == name)
    }

    /// Check if this element has a render attribute with this directive name.
    pub fn has_render_attribute(&self, name: &str) -> bool {
        self.render_attribute(name).is_some()
    }

    /// Check if this is a void element.
    pub fn is_void(&self) -> bool {
        crate::chars::is_void_element(&self.tag_name)
    }
}

/// A text node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TextNode {
    /// The text content.
    pub text_content: String,
    /// Where the text run starts.
    pub position: Position,
}

/// A plain HTML attribute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticAttribute {
    /// Attribute name.
    pub name: SmolStr,
    /// Attribute value. `None` for boolean attributes.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<String>,
    /// Where the attribute starts.
    pub position: Position,
}

/// A directive attribute (`:name` or `#name[:modifier]`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RenderAttribute {
    /// Directive name without its sigil; `attr` for `:` bindings.
    pub name: SmolStr,
    /// Text after the first `:` of a `#` directive, or the bound attribute
    /// name of a `:` binding.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub modifier: Option<SmolStr>,
    /// Raw expression text of the attribute value.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub expression_value: Option<String>,
    /// Whether the expression mentions `props`.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "doesExpressionReferenceProps", default, skip_serializing_if = "is_false")
    )]
    pub references_props: bool,
    /// Whether the expression uses `await`.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "isExpressionAsync", default, skip_serializing_if = "is_false")
    )]
    pub is_async: bool,
    /// Where the attribute starts, sigil included.
    pub position: Position,
}

impl RenderAttribute {
    /// The directive's argument: its value if non-empty, otherwise its
    /// modifier. `#bucket="x"` and `#bucket:x` both yield `x`.
    pub fn argument(&self) -> Option<&str> {
        self.expression_value
            .as_deref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.modifier.as_deref().filter(|m| !m.is_empty()))
    }
}

/// Where an asset's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum AssetSource {
    /// Inline body text.
    Content(String),
    /// Path to an external file.
    Path(String),
}

/// A script collected into an asset bucket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptAsset {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub source: AssetSource,
    /// Render scope, `global` unless overridden by `#scope:<name>`.
    pub scope: SmolStr,
    pub position: Position,
}

/// A style collected into an asset bucket.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleAsset {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub source: AssetSource,
    pub position: Position,
}

/// Scripts and styles gathered under one bucket name.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetBucket {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub scripts: Vec<ScriptAsset>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub styles: Vec<StyleAsset>,
}

/// A component pulled in with `<link rel="import" href="..." as="...">`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ComponentImport {
    /// Alias from the `as` attribute.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub import_name: Option<String>,
    /// The `href` path.
    pub path: String,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_attr(value: Option<&str>, modifier: Option<&str>) -> RenderAttribute {
        RenderAttribute {
            name: "bucket".into(),
            modifier: modifier.map(SmolStr::from),
            expression_value: value.map(String::from),
            references_props: false,
            is_async: false,
            position: Position::START,
        }
    }

    #[test]
    fn test_render_attribute_argument() {
        assert_eq!(render_attr(Some("theme"), None).argument(), Some("theme"));
        assert_eq!(render_attr(None, Some("theme")).argument(), Some("theme"));
        assert_eq!(render_attr(Some(""), Some("x")).argument(), Some("x"));
        assert_eq!(render_attr(None, None).argument(), None);
    }

    #[test]
    fn test_element_attribute_lookup() {
        let el = Element {
            tag_name: "a".into(),
            static_attributes: vec![
                StaticAttribute {
                    name: "href".into(),
                    value: Some("/x".into()),
                    position: Position::START,
                },
                StaticAttribute {
                    name: "hidden".into(),
                    value: None,
                    position: Position::START,
                },
            ],
            ..Default::default()
        };
        assert_eq!(el.static_value("href"), Some("/x"));
        assert!(el.static_attribute("hidden").is_some());
        assert_eq!(el.static_value("hidden"), None);
        assert!(!el.has_render_attribute("raw"));
        assert!(!el.is_void());
    }
}
