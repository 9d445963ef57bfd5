/*
 * handlers/inline.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Mid-line constructs. Every handler here starts with the escape check.

use crate::error::{ErrorKind, ParseResult};
use crate::pattern::CachedMatch;
use crate::scanner::Scanner;
use crate::token::get_token;
use nml_syntax::{
    Annotation, Break, Element, ExternalRef, Latex, Link, Presentation, PresentationKind, Raw,
    Style, TexMode,
};
use sha1::{Digest, Sha1};

/// Hex SHA-1 of a LaTeX snippet, used to name its rendered file.
fn tex_digest(tex: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(tex.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

impl Scanner<'_, '_> {
    /// `[name](path)`
    pub(super) fn handle_link(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Link";
        if let Some(next) = self.escape_add_text(prev, found.start, "[") {
            return Ok(next);
        }
        let content = self.content();
        let start = found.start;

        let Some((name, name_end)) = get_token(content, "]", start + 1, None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                start,
                1,
                CATEGORY,
                "Missing closing ']' after opening '['",
            ));
        };
        if name.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                name_end - start + 1,
                CATEGORY,
                "Link cannot have an empty name",
            ));
        }
        if content.as_bytes().get(name_end + 1) != Some(&b'(') {
            return Err(self.error(
                ErrorKind::MalformedToken,
                start,
                name_end - start,
                CATEGORY,
                format!("Missing '(' after '[{}]'", name),
            ));
        }
        let Some((path, path_end)) = get_token(content, ")", name_end + 2, None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                start,
                1,
                CATEGORY,
                "Missing closing ')' after opening '('",
            ));
        };
        if path.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                path_end - start + 1,
                CATEGORY,
                "Link cannot have an empty path",
            ));
        }

        self.doc.push(Element::Link(Link { name, path }));
        Ok(path_end + 1)
    }

    /// `^{{body}}`
    pub(super) fn handle_annotation(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Annotation";
        if let Some(next) = self.escape_add_text(prev, found.start, "^{{") {
            return Ok(next);
        }

        let Some((mut body, end)) = get_token(self.content(), "}}", found.end(), None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                found.len,
                CATEGORY,
                "Missing closing '}}' after opening '{{'",
            ));
        };
        if body.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                end - found.start + 2,
                CATEGORY,
                "Annotation cannot be empty",
            ));
        }

        let mut name = self.variable_or("Annotation", "[note]");
        name.push('\n');
        let (name, _) = self.sub_parse("[annotation name]", name, None)?;
        body.push('\n');
        let (body, _) = self.sub_parse("[annotation]", body, Some(found.end()))?;

        self.doc.push(Element::Annotation(Annotation {
            name: name.into_tree(),
            content: body.into_tree(),
        }));
        Ok(end + 2)
    }

    /// `§[description][author](url)`
    pub(super) fn handle_external_reference(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid External Reference";
        if let Some(next) = self.escape_add_text(prev, found.start, "§[") {
            return Ok(next);
        }
        let content = self.content();
        let start = found.start;
        let bytes = content.as_bytes();
        let missing_bracket = "Missing closing ']' after opening '['";

        let description_start = start + "§[".len();
        let Some((description, description_end)) =
            get_token(content, "]", description_start, None)
        else {
            return Err(self.error(ErrorKind::MalformedToken, start, 3, CATEGORY, missing_bracket));
        };
        if description.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                description_end - start + 1,
                CATEGORY,
                "Description cannot be empty",
            ));
        }
        if bytes.get(description_end + 1) != Some(&b'[') {
            return Err(self.error(
                ErrorKind::MalformedToken,
                start,
                description_end - start,
                CATEGORY,
                format!("Missing '[' after '§[{}]'", description),
            ));
        }

        let Some((author, author_end)) = get_token(content, "]", description_end + 2, None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                description_end + 1,
                1,
                CATEGORY,
                missing_bracket,
            ));
        };
        if bytes.get(author_end + 1) != Some(&b'(') {
            return Err(self.error(
                ErrorKind::MalformedToken,
                start,
                author_end - start,
                CATEGORY,
                format!("Missing '(' after '§[{}][{}]'", description, author),
            ));
        }

        let Some((url, url_end)) = get_token(content, ")", author_end + 2, None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                author_end + 1,
                1,
                CATEGORY,
                "Missing closing ')' after opening '('",
            ));
        };

        self.doc.push(Element::ExternalRef(ExternalRef {
            description,
            author,
            url,
            num: 0,
        }));
        Ok(url_end + 1)
    }

    /// `{{raw}}` and `{{{inline raw}}}`
    pub(super) fn handle_raw(
        &mut self,
        prev: usize,
        found: &CachedMatch,
        inline: bool,
    ) -> ParseResult<usize> {
        let (open, close, category, empty) = if inline {
            ("{{{", "}}}", "Invalid Raw Inline", "Inline raws cannot be empty")
        } else {
            ("{{", "}}", "Invalid Raw", "Raws cannot be empty")
        };
        if let Some(next) = self.escape_add_text(prev, found.start, open) {
            return Ok(next);
        }

        let Some((content, end)) = get_token(self.content(), close, found.end(), None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                found.len,
                category,
                format!("Missing terminating '{}' after initial '{}'", close, open),
            ));
        };
        if content.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                end - found.start + close.len(),
                category,
                empty,
            ));
        }

        let raw = Raw { content };
        self.doc.push(if inline {
            Element::RawInline(raw)
        } else {
            Element::Raw(raw)
        });
        Ok(end + close.len())
    }

    /// `:: comment` up to the end of the line
    pub(super) fn handle_comment(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        if let Some(next) = self.escape_add_text(prev, found.start, "::") {
            return Ok(next);
        }
        Ok(self.line_end(found.start))
    }

    /// `%%script%%`
    pub(super) fn handle_eval(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Eval";
        if let Some(next) = self.escape_add_text(prev, found.start, "%%") {
            return Ok(next);
        }

        let Some((script, end)) = get_token(self.content(), "%%", found.end(), None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                2,
                CATEGORY,
                "Missing terminating '%%' after initial '%%'",
            ));
        };
        if script.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                end - found.start + 2,
                CATEGORY,
                "Script cannot be empty",
            ));
        }

        let bridge = self.session.engine.bridge();
        bridge.eval(&script, &mut self.doc).map_err(|e| {
            self.error(
                ErrorKind::Extension,
                found.start,
                end - found.start + 2,
                CATEGORY,
                e.to_string(),
            )
        })?;
        Ok(end + 2)
    }

    /// `%name%` substitutes a variable, `%(expr)%` an evaluation result.
    pub(super) fn handle_call(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Call";
        if let Some(next) = self.escape_add_text(prev, found.start, "%") {
            return Ok(next);
        }

        let Some((call, end)) = get_token(self.content(), "%", found.end(), None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                1,
                CATEGORY,
                "Missing terminating '%' after initial '%'",
            ));
        };
        let span = end - found.start + 1;
        if call.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                span,
                CATEGORY,
                "Calls cannot be empty",
            ));
        }

        let (name, mut value) = if call.starts_with('(') {
            let bridge = self.session.engine.bridge();
            let result = bridge.eval(&call, &mut self.doc).map_err(|e| {
                self.error(ErrorKind::Extension, found.start, span, CATEGORY, e.to_string())
            })?;
            ("[eval result]".to_string(), result)
        } else {
            if call.contains('\n') {
                return Err(self.error(
                    ErrorKind::MalformedToken,
                    found.start,
                    1,
                    CATEGORY,
                    "Missing terminating '%' after initial '%'",
                ));
            }
            let Some(value) = self.resolve(&call) else {
                return Err(self.error(
                    ErrorKind::UnknownReference,
                    found.start,
                    span,
                    CATEGORY,
                    format!("Unknown variable '{}'", call),
                ));
            };
            (format!("[#+{}]", call), value)
        };

        value.push('\n');
        let (parsed, _) = self.sub_parse(&name, value, None)?;
        self.doc.merge(parsed);
        Ok(end + 1)
    }

    /// `$math$`, `$$math line$$` and `$|latex|$`
    pub(super) fn handle_latex(
        &mut self,
        prev: usize,
        found: &CachedMatch,
        mode: TexMode,
    ) -> ParseResult<usize> {
        let (open, close, category) = match mode {
            TexMode::Math => ("$", "$", "Invalid LaTeX Math"),
            TexMode::MathLine => ("$$", "$$", "Invalid LaTeX Line"),
            TexMode::Normal => ("$|", "|$", "Invalid LaTeX Normal"),
        };
        if let Some(next) = self.escape_add_text(prev, found.start, open) {
            return Ok(next);
        }

        let Some((tex, end)) = get_token(self.content(), close, found.end(), None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                found.len,
                category,
                format!("Missing terminating '{}' after initial '{}'", close, open),
            ));
        };
        if tex.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                end - found.start + close.len(),
                category,
                "LaTeX code cannot be empty",
            ));
        }

        let filename = format!("{}{}", tex_digest(&tex), mode.suffix());
        let latex = Latex {
            filename,
            preamble: self.variable_or("TexPreamble", ""),
            prepend: self.variable_or("TexPrepend", ""),
            append: self.variable_or("TexAppend", ""),
            font_size: self.variable_or("TexFontSize", "12"),
            content: tex,
            mode,
        };
        self.doc.push(Element::Latex(latex));
        Ok(end + close.len())
    }

    /// `[[center]]`, `[[[box]]]` and `[[|left line|]]`
    pub(super) fn handle_presentation(
        &mut self,
        prev: usize,
        found: &CachedMatch,
        kind: PresentationKind,
    ) -> ParseResult<usize> {
        let (open, close, category, label, buffer) = match kind {
            PresentationKind::Center => ("[[", "]]", "Invalid Center", "Center", "[center]"),
            PresentationKind::Box => ("[[[", "]]]", "Invalid Box", "Box", "[box]"),
            PresentationKind::LeftLine => {
                ("[[|", "|]]", "Invalid Left Line", "Left line", "[left_line]")
            }
        };
        if let Some(next) = self.escape_add_text(prev, found.start, open) {
            return Ok(next);
        }

        let Some((mut body, end)) = get_token(self.content(), close, found.end(), None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                found.len,
                category,
                format!("Missing closing '{}' after opening '{}'", close, open),
            ));
        };
        if body.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                end - found.start + close.len(),
                category,
                format!("{} cannot be empty", label),
            ));
        }

        body.push('\n');
        let (parsed, _) = self.sub_parse(buffer, body, Some(found.end()))?;
        self.doc.merge_non_elems(&parsed);
        self.doc.push(Element::Presentation(Presentation {
            content: parsed.into_tree(),
            kind,
        }));
        Ok(end + close.len())
    }

    /// Toggle one of the builtin styles.
    pub(super) fn handle_style(
        &mut self,
        prev: usize,
        found: &CachedMatch,
        style: Style,
    ) -> ParseResult<usize> {
        if let Some(next) = self.escape_add_text(prev, found.start, &found.text) {
            return Ok(next);
        }

        if self.state.style.toggle(style) {
            self.doc.push(Element::StylePush(style));
        } else {
            self.doc.push(Element::StylePop(style));
        }
        Ok(found.end())
    }

    /// Two or more newlines. The last newline is left for line-anchored
    /// patterns.
    pub(super) fn handle_long_break(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        let content = self.content();
        self.add_text(&content[prev..found.start]);
        self.check_styles(found.start)?;

        let newlines = content[found.start..]
            .bytes()
            .take_while(|b| *b == b'\n')
            .count();
        self.doc.push(Element::Break(Break { size: newlines - 1 }));
        Ok(found.start + newlines - 1)
    }

    /// A single newline inside a paragraph.
    pub(super) fn handle_short_break(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        let content = self.content();
        self.add_text(&content[prev..found.start]);
        // A long break already ended the paragraph at this newline
        if !matches!(self.doc.last(), Some(Element::Break(_))) {
            self.doc.push(Element::Break(Break { size: 0 }));
        }
        self.check_styles(found.start)?;
        Ok(found.start + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::tex_digest;
    use crate::bridge::NativeBridge;
    use crate::engine::Engine;
    use crate::error::ErrorKind;
    use nml_syntax::{Element, Link, PresentationKind, Raw, TexMode, Variable};
    use pretty_assertions::assert_eq;

    fn elements(source: &str) -> Vec<Element> {
        Engine::new()
            .parse_str("test", source)
            .unwrap()
            .tree()
            .iter()
            .cloned()
            .collect()
    }

    fn error(source: &str) -> crate::error::ParseError {
        Engine::new().parse_str("test", source).unwrap_err()
    }

    #[test]
    fn test_link() {
        assert_eq!(
            elements("see [docs](https://example.org)!"),
            vec![
                Element::text("see "),
                Element::Link(Link {
                    name: "docs".into(),
                    path: "https://example.org".into()
                }),
                Element::text("!"),
            ]
        );
        assert_eq!(error("[](x)").message(), "Link cannot have an empty name");
        assert_eq!(error("[a]()").message(), "Link cannot have an empty path");
    }

    #[test]
    fn test_annotation_uses_variable_name() {
        let doc = Engine::new()
            .parse_str("test", "#+Annotation Note\nword^{{the *aside*}}")
            .unwrap();
        let Some(Element::Annotation(annotation)) = doc.last() else {
            panic!("expected an annotation");
        };
        assert_eq!(
            annotation.name.iter().collect::<Vec<_>>(),
            vec![&Element::text("Note")]
        );
        assert_eq!(annotation.content.len(), 4);

        assert_eq!(error("^{{}}").kind(), ErrorKind::EmptyContent);
        assert_eq!(error("^{{open").kind(), ErrorKind::MalformedToken);
    }

    #[test]
    fn test_external_reference() {
        let doc = Engine::new()
            .parse_str("test", "§[Manual][Someone](https://example.org) §[Other][](x)")
            .unwrap();
        let refs: Vec<(usize, &str)> = doc
            .tree()
            .iter()
            .filter_map(|element| match element {
                Element::ExternalRef(reference) => Some((reference.num, reference.author.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(refs, vec![(1, "Someone"), (2, "")]);
        assert_eq!(doc.external_refs().len(), 2);

        assert_eq!(
            error("§[][a](b)").message(),
            "Description cannot be empty"
        );
    }

    #[test]
    fn test_raw() {
        assert_eq!(
            elements("{{<b>}} {{{<i>}}}"),
            vec![
                Element::Raw(Raw {
                    content: "<b>".into()
                }),
                Element::text(" "),
                Element::RawInline(Raw {
                    content: "<i>".into()
                }),
            ]
        );
        assert_eq!(error("{{}}").message(), "Raws cannot be empty");
    }

    #[test]
    fn test_comment_keeps_newline() {
        assert_eq!(
            elements("a :: hidden\nb"),
            vec![
                Element::text("a  "),
                Element::Break(nml_syntax::Break { size: 0 }),
                Element::text("b"),
            ]
        );
    }

    #[test]
    fn test_long_break_absorbs_trailing_newline() {
        assert_eq!(
            elements("a\n\nb"),
            vec![
                Element::text("a"),
                Element::Break(nml_syntax::Break { size: 1 }),
                Element::text("b"),
            ]
        );
        assert_eq!(
            elements("a\n\n\nb"),
            vec![
                Element::text("a"),
                Element::Break(nml_syntax::Break { size: 2 }),
                Element::text("b"),
            ]
        );
    }

    #[test]
    fn test_call_substitutes_variable() {
        assert_eq!(
            elements("#+Who **world**\nhello %Who%"),
            vec![
                // The newline after the definition line
                Element::Break(nml_syntax::Break { size: 0 }),
                Element::text("hello "),
                Element::StylePush(nml_syntax::Style::BOLD),
                Element::text("world"),
                Element::StylePop(nml_syntax::Style::BOLD),
            ]
        );
        assert_eq!(error("%nobody%").kind(), ErrorKind::UnknownReference);
        assert_eq!(error("100% sure").kind(), ErrorKind::MalformedToken);
    }

    #[test]
    fn test_eval_and_call_through_bridge() {
        let engine = Engine::new().with_bridge(NativeBridge::new());
        let doc = engine
            .parse_str("test", "%%(set-var Name \"x\")%%%(get-var Name)%")
            .unwrap();
        assert_eq!(doc.variable("Name"), Some(&Variable::Text("x".into())));
        assert_eq!(doc.last(), Some(&Element::text("x")));

        let err = Engine::new().parse_str("test", "%%(anything)%%").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extension);
    }

    #[test]
    fn test_latex_modes() {
        let doc = Engine::new()
            .parse_str("test", "#+TexFontSize 14\n$x$ $$y$$ $|z|$")
            .unwrap();
        let latex: Vec<(TexMode, String, String)> = doc
            .tree()
            .iter()
            .filter_map(|element| match element {
                Element::Latex(tex) => {
                    Some((tex.mode, tex.content.clone(), tex.font_size.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            latex,
            vec![
                (TexMode::Math, "x".into(), "14".into()),
                (TexMode::MathLine, "y".into(), "14".into()),
                (TexMode::Normal, "z".into(), "14".into()),
            ]
        );

        let Some(Element::Latex(last)) = doc.last() else {
            panic!("expected latex");
        };
        assert_eq!(last.filename, format!("{}_n", tex_digest("z")));
        assert_eq!(error("$$ $$").kind(), ErrorKind::EmptyContent);
    }

    #[test]
    fn test_tex_digest() {
        assert_eq!(tex_digest("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_presentations() {
        let kinds: Vec<PresentationKind> = elements("[[a]]\n[[[b]]]\n[[|c|]]")
            .into_iter()
            .filter_map(|element| match element {
                Element::Presentation(presentation) => Some(presentation.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                PresentationKind::Center,
                PresentationKind::Box,
                PresentationKind::LeftLine
            ]
        );
        assert_eq!(error("[[[ ]]]").message(), "Box cannot be empty");
        assert_eq!(
            error("[[|open").message(),
            "Missing closing '|]]' after opening '[[|'"
        );
    }
}
