/*
 * element.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document elements.
//!
//! [`Element`] is a closed sum type; every variant has a stable numeric
//! [`ElementTag`] that is used when elements cross the extension boundary.

use crate::bullet::Bullet;
use crate::style::Style;
use crate::tree::SyntaxTree;
use serde::{Deserialize, Serialize};

/// Stable numeric identifier of an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ElementTag {
    Text = 0,
    StylePush = 1,
    StylePop = 2,
    Break = 3,
    Section = 4,
    ListBegin = 5,
    ListEnd = 6,
    ListEntry = 7,
    Ruler = 8,
    Figure = 9,
    Code = 10,
    Quote = 11,
    Reference = 12,
    Link = 13,
    Latex = 14,
    Raw = 15,
    RawInline = 16,
    ExternalRef = 17,
    Presentation = 18,
    Annotation = 19,
    CustomStylePush = 20,
    CustomStylePop = 21,
    CustomPresPush = 22,
    CustomPresPop = 23,
}

impl ElementTag {
    pub const ALL: [ElementTag; 24] = [
        ElementTag::Text,
        ElementTag::StylePush,
        ElementTag::StylePop,
        ElementTag::Break,
        ElementTag::Section,
        ElementTag::ListBegin,
        ElementTag::ListEnd,
        ElementTag::ListEntry,
        ElementTag::Ruler,
        ElementTag::Figure,
        ElementTag::Code,
        ElementTag::Quote,
        ElementTag::Reference,
        ElementTag::Link,
        ElementTag::Latex,
        ElementTag::Raw,
        ElementTag::RawInline,
        ElementTag::ExternalRef,
        ElementTag::Presentation,
        ElementTag::Annotation,
        ElementTag::CustomStylePush,
        ElementTag::CustomStylePop,
        ElementTag::CustomPresPush,
        ElementTag::CustomPresPop,
    ];

    pub fn from_u8(tag: u8) -> Option<ElementTag> {
        ElementTag::ALL.get(usize::from(tag)).copied()
    }

    /// Human readable name used by dumps and diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ElementTag::Text => "Text",
            ElementTag::StylePush => "StylePush",
            ElementTag::StylePop => "StylePop",
            ElementTag::Break => "Break",
            ElementTag::Section => "Section",
            ElementTag::ListBegin => "List Begin",
            ElementTag::ListEnd => "List End",
            ElementTag::ListEntry => "List Entry",
            ElementTag::Ruler => "Ruler",
            ElementTag::Figure => "Figure",
            ElementTag::Code => "Code",
            ElementTag::Quote => "Quote",
            ElementTag::Reference => "Reference",
            ElementTag::Link => "Link",
            ElementTag::Latex => "Latex",
            ElementTag::Raw => "Raw",
            ElementTag::RawInline => "Raw Inline",
            ElementTag::ExternalRef => "External Reference",
            ElementTag::Presentation => "Presentation",
            ElementTag::Annotation => "Annotation",
            ElementTag::CustomStylePush => "Custom Style Push",
            ElementTag::CustomStylePop => "Custom Style Pop",
            ElementTag::CustomPresPush => "Custom Presentation Push",
            ElementTag::CustomPresPop => "Custom Presentation Pop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
}

/// Paragraph or line boundary. `size` 0 is a single newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Number of `#`, starting at 1
    pub level: usize,
    pub numbered: bool,
    /// Listed in the table of contents
    pub toc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBegin {
    pub style: String,
    pub bullet: Bullet,
}

impl ListBegin {
    pub fn ordered(&self) -> bool {
        self.bullet.is_ordered()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEnd {
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub content: SyntaxTree,
    pub counter: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruler {
    /// Number of `=` beyond the three that make a ruler
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub path: String,
    pub name: String,
    pub description: SyntaxTree,
    /// Assigned from the document counter when pushed
    pub id: usize,
}

/// A run of code lines with the number of its first line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFragment {
    pub first_line: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub language: String,
    pub name: String,
    pub style: String,
    pub fragments: Vec<CodeFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub content: SyntaxTree,
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    Figure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Name of the referenced object
    pub referencing: String,
    /// Custom display text, may be empty
    pub name: String,
    pub kind: ReferenceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TexMode {
    /// `$|...|$`
    Normal,
    /// `$...$`
    Math,
    /// `$$...$$`
    MathLine,
}

impl TexMode {
    /// Suffix appended to the content hash to build the file name
    pub fn suffix(self) -> &'static str {
        match self {
            TexMode::Normal => "_n",
            TexMode::Math => "_m",
            TexMode::MathLine => "_l",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latex {
    pub content: String,
    pub filename: String,
    pub preamble: String,
    pub prepend: String,
    pub append: String,
    pub font_size: String,
    pub mode: TexMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raw {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    pub description: String,
    pub author: String,
    pub url: String,
    /// Assigned from the document counter when pushed
    pub num: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationKind {
    Center,
    Box,
    LeftLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub content: SyntaxTree,
    pub kind: PresentationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: SyntaxTree,
    pub content: SyntaxTree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomStyleMark {
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPresentationMark {
    pub presentation: String,
    /// Nesting level of this presentation, starting at 0
    pub level: usize,
}

/// One node of a [`SyntaxTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Text(Text),
    StylePush(Style),
    StylePop(Style),
    Break(Break),
    Section(Section),
    ListBegin(ListBegin),
    ListEnd(ListEnd),
    ListEntry(ListEntry),
    Ruler(Ruler),
    Figure(Figure),
    Code(Code),
    Quote(Quote),
    Reference(Reference),
    Link(Link),
    Latex(Latex),
    Raw(Raw),
    RawInline(Raw),
    ExternalRef(ExternalRef),
    Presentation(Presentation),
    Annotation(Annotation),
    CustomStylePush(CustomStyleMark),
    CustomStylePop(CustomStyleMark),
    CustomPresPush(CustomPresentationMark),
    CustomPresPop(CustomPresentationMark),
}

impl Element {
    pub fn text(content: impl Into<String>) -> Element {
        Element::Text(Text {
            content: content.into(),
        })
    }

    pub fn tag(&self) -> ElementTag {
        match self {
            Element::Text(_) => ElementTag::Text,
            Element::StylePush(_) => ElementTag::StylePush,
            Element::StylePop(_) => ElementTag::StylePop,
            Element::Break(_) => ElementTag::Break,
            Element::Section(_) => ElementTag::Section,
            Element::ListBegin(_) => ElementTag::ListBegin,
            Element::ListEnd(_) => ElementTag::ListEnd,
            Element::ListEntry(_) => ElementTag::ListEntry,
            Element::Ruler(_) => ElementTag::Ruler,
            Element::Figure(_) => ElementTag::Figure,
            Element::Code(_) => ElementTag::Code,
            Element::Quote(_) => ElementTag::Quote,
            Element::Reference(_) => ElementTag::Reference,
            Element::Link(_) => ElementTag::Link,
            Element::Latex(_) => ElementTag::Latex,
            Element::Raw(_) => ElementTag::Raw,
            Element::RawInline(_) => ElementTag::RawInline,
            Element::ExternalRef(_) => ElementTag::ExternalRef,
            Element::Presentation(_) => ElementTag::Presentation,
            Element::Annotation(_) => ElementTag::Annotation,
            Element::CustomStylePush(_) => ElementTag::CustomStylePush,
            Element::CustomStylePop(_) => ElementTag::CustomStylePop,
            Element::CustomPresPush(_) => ElementTag::CustomPresPush,
            Element::CustomPresPop(_) => ElementTag::CustomPresPop,
        }
    }

    /// Elements that flow inside a paragraph. A single line break between
    /// two of them becomes a space.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Element::Text(_)
                | Element::StylePush(_)
                | Element::StylePop(_)
                | Element::Break(_)
                | Element::Reference(_)
                | Element::Link(_)
                | Element::Latex(_)
                | Element::RawInline(_)
                | Element::ExternalRef(_)
                | Element::Annotation(_)
                | Element::CustomStylePush(_)
                | Element::CustomStylePop(_)
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Element::Text(text) => Some(&text.content),
            _ => None,
        }
    }

    /// Trees nested inside this element, in display order
    pub fn children(&self) -> Vec<&SyntaxTree> {
        match self {
            Element::ListEntry(entry) => vec![&entry.content],
            Element::Figure(figure) => vec![&figure.description],
            Element::Quote(quote) => vec![&quote.content],
            Element::Presentation(presentation) => vec![&presentation.content],
            Element::Annotation(annotation) => vec![&annotation.name, &annotation.content],
            _ => Vec::new(),
        }
    }

    /// JSON form handed to extensions: `{"tag", "type", "value"}`.
    pub fn to_bridge_value(&self) -> serde_json::Result<serde_json::Value> {
        use serde_json::{Value, json};

        let value = match serde_json::to_value(self)? {
            Value::Object(map) => map.into_iter().next().map_or(Value::Null, |(_, v)| v),
            other => other,
        };
        let tag = self.tag();
        Ok(json!({
            "tag": tag as u8,
            "type": tag.name(),
            "value": value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_roundtrip_through_u8() {
        for tag in ElementTag::ALL {
            assert_eq!(ElementTag::from_u8(tag as u8), Some(tag));
        }
        assert_eq!(ElementTag::from_u8(24), None);
    }

    #[test]
    fn test_tag_values_are_stable() {
        assert_eq!(ElementTag::Text as u8, 0);
        assert_eq!(ElementTag::Figure as u8, 9);
        assert_eq!(ElementTag::ExternalRef as u8, 17);
        assert_eq!(ElementTag::CustomPresPop as u8, 23);
    }

    #[test]
    fn test_element_tags() {
        assert_eq!(Element::text("x").tag(), ElementTag::Text);
        assert_eq!(Element::StylePop(Style::BOLD).tag(), ElementTag::StylePop);
        assert_eq!(
            Element::RawInline(Raw {
                content: "x".into()
            })
            .tag(),
            ElementTag::RawInline
        );
        assert_eq!(Element::RawInline(Raw { content: "x".into() }).tag().name(), "Raw Inline");
    }

    #[test]
    fn test_text_like() {
        assert!(Element::text("a").is_text_like());
        assert!(Element::Break(Break { size: 0 }).is_text_like());
        assert!(!Element::Ruler(Ruler { length: 0 }).is_text_like());
        assert!(!Element::ListEnd(ListEnd { ordered: false }).is_text_like());
        assert!(!Element::Raw(Raw { content: String::new() }).is_text_like());
    }

    #[test]
    fn test_bridge_value() {
        let value = Element::Link(Link {
            name: "site".into(),
            path: "https://example.com".into(),
        })
        .to_bridge_value()
        .unwrap();

        assert_eq!(value["tag"], 13);
        assert_eq!(value["type"], "Link");
        assert_eq!(value["value"]["name"], "site");

        let value = Element::StylePush(Style::ITALIC).to_bridge_value().unwrap();
        assert_eq!(value["tag"], 1);
        assert_eq!(value["value"], 4);
    }

    #[test]
    fn test_children() {
        let mut content = SyntaxTree::new();
        content.push(Element::text("inside"));
        let entry = Element::ListEntry(ListEntry {
            content,
            counter: 1,
        });
        assert_eq!(entry.children().len(), 1);
        assert!(Element::text("x").children().is_empty());
    }
}
