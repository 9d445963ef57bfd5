/*
 * renderer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Renderer contract and the text tree dump.

use crate::config::RenderOptions;
use nml_syntax::{Bullet, Document, Element, PresentationKind, SyntaxTree};
use std::io::{self, Write};

/// Turns a finished document into output.
pub trait Renderer {
    fn name(&self) -> &str;

    /// Whether variable `name` has a meaning for this renderer.
    fn is_reserved_variable(&self, name: &str) -> bool;

    /// Validate the value of a reserved variable.
    fn check_variable(&self, name: &str, value: &str) -> Result<(), String>;

    fn render(
        &self,
        doc: &Document,
        options: &RenderOptions,
        out: &mut dyn Write,
    ) -> io::Result<()>;
}

/// Indented `[Type]: payload` dump of a tree, one element per line.
///
/// ```
/// use nml_parser::{Engine, TextRenderer};
///
/// let doc = Engine::new().parse_str("doc", "**hi**").unwrap();
/// let text = TextRenderer.render_to_string(&doc).unwrap();
/// assert!(text.contains("[StylePush]: Bold"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn render_to_string(&self, doc: &Document) -> io::Result<String> {
        let mut buf = Vec::new();
        self.render(doc, &RenderOptions::default(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Renderer for TextRenderer {
    fn name(&self) -> &str {
        "Text"
    }

    fn is_reserved_variable(&self, _name: &str) -> bool {
        false
    }

    fn check_variable(&self, _name: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    fn render(
        &self,
        doc: &Document,
        _options: &RenderOptions,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        write_tree(doc.tree(), 0, out)
    }
}

fn indent(depth: usize, out: &mut dyn Write) -> io::Result<()> {
    write!(out, "{:width$}", "", width = depth * 2)
}

fn write_safe_string(text: &str, out: &mut dyn Write) -> io::Result<()> {
    write!(out, "\"")?;
    for ch in text.chars() {
        match ch {
            '\\' => write!(out, "\\\\"),
            '"' => write!(out, "\\\""),
            '\n' => write!(out, "\\n"),
            _ => write!(out, "{}", ch),
        }?
    }
    write!(out, "\"")
}

fn write_tree(tree: &SyntaxTree, depth: usize, out: &mut dyn Write) -> io::Result<()> {
    indent(depth, out)?;
    writeln!(out, "{{")?;
    for element in tree.iter() {
        write_element(element, depth + 1, out)?;
    }
    indent(depth, out)?;
    writeln!(out, "}}")
}

fn write_element(element: &Element, depth: usize, out: &mut dyn Write) -> io::Result<()> {
    indent(depth, out)?;
    write!(out, "[{}]: ", element.tag().name())?;
    match element {
        Element::Text(text) => write_safe_string(&text.content, out)?,
        Element::StylePush(style) | Element::StylePop(style) => {
            write!(out, "{}", style.name().unwrap_or("?"))?
        }
        Element::Break(br) => write!(out, "{}", br.size)?,
        Element::Section(section) => write!(
            out,
            "{}+{} level={} {}",
            if section.numbered { "ord" } else { "unord" },
            if section.toc { "toc" } else { "notoc" },
            section.level,
            section.title
        )?,
        Element::ListBegin(begin) => match &begin.bullet {
            Bullet::Ordered(bullet) => write!(
                out,
                "(ord) st=({}) bullet=({}+{}+{})",
                begin.style,
                bullet.left,
                bullet.kind.marker(),
                bullet.right
            )?,
            Bullet::Unordered(bullet) => {
                write!(out, "(unord) st=({}) bullet=({})", begin.style, bullet)?
            }
        },
        Element::ListEnd(end) => write!(out, "({})", if end.ordered { "ord" } else { "unord" })?,
        Element::ListEntry(entry) => write!(out, "{}", entry.counter)?,
        Element::Ruler(ruler) => write!(out, "{}", ruler.length)?,
        Element::Figure(figure) => write!(
            out,
            "name=({}) path=({}) id={}",
            figure.name, figure.path, figure.id
        )?,
        Element::Code(code) => {
            write!(
                out,
                "lang=({}) name=({}) style=({}) lines=",
                code.language, code.name, code.style
            )?;
            let firsts: Vec<String> = code
                .fragments
                .iter()
                .map(|fragment| fragment.first_line.to_string())
                .collect();
            write!(out, "[{}] ", firsts.join(","))?;
            let text: Vec<&str> = code.fragments.iter().map(|f| f.text.as_str()).collect();
            write_safe_string(&text.join("\n"), out)?
        }
        Element::Quote(quote) => write!(out, "author=({})", quote.author)?,
        Element::Reference(reference) => write!(
            out,
            "referencing=({}) name=({}) kind={:?}",
            reference.referencing, reference.name, reference.kind
        )?,
        Element::Link(link) => write!(out, "name=({}) path=({})", link.name, link.path)?,
        Element::Latex(tex) => write!(
            out,
            "{:?} code=({}) filename=({})",
            tex.mode, tex.content, tex.filename
        )?,
        Element::Raw(raw) | Element::RawInline(raw) => {
            write!(out, "content=")?;
            write_safe_string(&raw.content, out)?
        }
        Element::ExternalRef(reference) => write!(
            out,
            "[{}] desc=({}) author=({}) url=({})",
            reference.num, reference.description, reference.author, reference.url
        )?,
        Element::Presentation(presentation) => write!(
            out,
            "{}",
            match presentation.kind {
                PresentationKind::Center => "center",
                PresentationKind::Box => "box",
                PresentationKind::LeftLine => "left-line",
            }
        )?,
        Element::Annotation(_) => {}
        Element::CustomStylePush(mark) | Element::CustomStylePop(mark) => {
            write!(out, "({})", mark.style)?
        }
        Element::CustomPresPush(mark) | Element::CustomPresPop(mark) => {
            write!(out, "({}) level={}", mark.presentation, mark.level)?
        }
    }
    writeln!(out)?;

    for child in element.children() {
        write_tree(child, depth, out)?;
    }
    Ok(())
}
