/*
 * handlers/custom.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Custom types defined by the document.
//!
//! A definition line checks that the extension bridge provides the
//! callables the type needs, records the type in the document and
//! registers its trigger in the matching band of the pattern table.

use crate::bridge::Callable;
use crate::error::{ErrorKind, ParseError, ParseResult};
use crate::pattern::{
    CachedMatch, PRESENTATION_BAND, PROCESS_BAND, PatternKind, STYLE_BAND, compile_custom,
};
use crate::scanner::Scanner;
use crate::token::get_token;
use nml_error_reporting::generic_error;
use nml_syntax::{
    CustomPresentation, CustomPresentationMark, CustomProcess, CustomStyle, CustomStyleMark,
    CustomType, Element,
};
use tracing::debug;

/// Words of a definition line after its keyword. The last field takes the
/// rest of the line.
struct DefinitionLine<'l> {
    start: usize,
    line: &'l str,
    keyword_len: usize,
    fields: Vec<&'l str>,
}

impl<'l> DefinitionLine<'l> {
    fn new(line: &'l str, start: usize, keyword_len: usize, count: usize) -> Self {
        let rest = line.get(keyword_len..).unwrap_or_default();
        let fields = if rest.is_empty() {
            Vec::new()
        } else {
            rest.splitn(count, ' ').collect()
        };
        DefinitionLine {
            start,
            line,
            keyword_len,
            fields,
        }
    }

    fn field(&self, index: usize) -> Option<&'l str> {
        self.fields.get(index).copied().filter(|field| !field.is_empty())
    }

    /// Offset just past field `index`
    fn end_of(&self, index: usize) -> usize {
        let mut offset = self.start + self.keyword_len;
        for field in self.fields.iter().take(index + 1) {
            offset += field.len() + 1;
        }
        offset.saturating_sub(1)
    }
}

fn missing_custom_type(name: &str) -> ParseError {
    ParseError::internal(generic_error!(format!(
        "Custom type '{}' has a pattern but is not defined",
        name
    )))
}

impl Scanner<'_, '_> {
    fn require_callable(
        &self,
        name: String,
        line: &DefinitionLine<'_>,
        category: &str,
    ) -> ParseResult<String> {
        if self.session.engine.bridge().lookup(&name).is_none() {
            return Err(self.error(
                ErrorKind::Extension,
                line.start,
                line.line.len(),
                category,
                format!("Missing extension callable: '{}'", name),
            ));
        }
        Ok(name)
    }

    fn callable(&self, name: &str, found: &CachedMatch, category: &str) -> ParseResult<Callable> {
        self.session.engine.bridge().lookup(name).ok_or_else(|| {
            self.error(
                ErrorKind::Extension,
                found.start,
                found.len,
                category,
                format!("Missing extension callable: '{}'", name),
            )
        })
    }

    fn register_custom_type(
        &mut self,
        custom: CustomType,
        line: &DefinitionLine<'_>,
        category: &str,
    ) -> ParseResult<()> {
        let name = custom.name().to_string();
        if !self.doc.add_custom_type(custom) {
            return Err(self.error(
                ErrorKind::DuplicateName,
                line.start + line.keyword_len,
                name.len(),
                category,
                format!("A custom type named '{}' already exists", name),
            ));
        }
        Ok(())
    }

    /// `#:DefStyle <Name> <Regex>`
    pub(super) fn handle_define_style(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid DefStyle";
        const SYNTAX: &str = "Syntax: '#:DefStyle <Name> <Regex>'";
        let content = self.content();
        let start = self.enter_line(prev, found.start);
        let end = self.line_end(start);
        let def = DefinitionLine::new(&content[start..end], start, 11, 2);

        if def.fields.is_empty() {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                10,
                CATEGORY,
                format!("{}\nCustom style is missing a name!", SYNTAX),
            ));
        }
        let Some(name) = def.field(0) else {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                10,
                CATEGORY,
                format!("{}\nCustom style name is empty!", SYNTAX),
            ));
        };
        let Some(regex) = def.field(1) else {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                def.end_of(0) - start,
                CATEGORY,
                format!("{}\nCustom style is missing a regex!", SYNTAX),
            ));
        };

        let begin = self.require_callable(format!("{}-begin", name), &def, CATEGORY)?;
        let end_callable = self.require_callable(format!("{}-end", name), &def, CATEGORY)?;
        let apply = format!("{}-apply", name);
        let apply = self.session.engine.bridge().lookup(&apply).map(|_| apply);

        let entry = compile_custom(
            format!("style:{}", name),
            PatternKind::CustomStyle(name.to_string()),
            regex,
            CATEGORY,
        )?;
        self.register_custom_type(
            CustomType::Style(CustomStyle {
                name: name.to_string(),
                regex: regex.to_string(),
                begin,
                end: end_callable,
                apply,
            }),
            &def,
            CATEGORY,
        )?;
        self.table.insert_after(STYLE_BAND, entry)?;
        debug!(name, regex, "custom style defined");
        Ok(end)
    }

    /// Toggle of a custom style. Closing a style with an apply callable
    /// replaces everything since the opening mark with the callable's
    /// output.
    pub(super) fn handle_custom_style(
        &mut self,
        prev: usize,
        found: &CachedMatch,
        name: &str,
    ) -> ParseResult<usize> {
        if let Some(next) = self.escape_add_text(prev, found.start, &found.text) {
            return Ok(next);
        }
        let style = self
            .doc
            .custom_type(name)
            .and_then(CustomType::as_style)
            .cloned()
            .ok_or_else(|| missing_custom_type(name))?;
        let mark = CustomStyleMark {
            style: name.to_string(),
        };

        if self.state.toggle_custom_style(name) {
            self.doc.push(Element::CustomStylePush(mark));
            return Ok(found.end());
        }

        if let Some(apply) = &style.apply {
            let category = format!("Invalid Custom Style ({})", name);
            let callable = self.callable(apply, found, &category)?;
            let tree = self.doc.tree_mut();
            let styled = match tree.rfind(
                |element| matches!(element, Element::CustomStylePush(open) if open.style == name),
            ) {
                Some(open) => tree.split_off_after(open),
                None => {
                    let mut all = Vec::new();
                    while let Some(element) = tree.pop() {
                        all.push(element);
                    }
                    all.reverse();
                    all
                }
            };
            let applied = callable(styled).map_err(|e| {
                self.error(ErrorKind::Extension, found.start, found.len, &category, e.to_string())
            })?;
            for element in applied {
                self.doc.push(element);
            }
        }
        self.doc.push(Element::CustomStylePop(mark));
        Ok(found.end())
    }

    /// `#:DefPresentation <Name> <RegexBegin> <RegexEnd>`
    pub(super) fn handle_define_presentation(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid DefPresentation";
        const SYNTAX: &str = "Syntax: '#:DefPresentation <Name> <RegexBegin> <RegexEnd>'";
        let content = self.content();
        let start = self.enter_line(prev, found.start);
        let end = self.line_end(start);
        let def = DefinitionLine::new(&content[start..end], start, 18, 3);

        if def.fields.is_empty() {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                17,
                CATEGORY,
                format!("{}\nCustom presentation is missing a name!", SYNTAX),
            ));
        }
        let Some(name) = def.field(0) else {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                17,
                CATEGORY,
                format!("{}\nCustom presentation name is empty!", SYNTAX),
            ));
        };
        let Some(regex_begin) = def.field(1) else {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                def.end_of(0) - start,
                CATEGORY,
                format!("{}\nCustom presentation is missing a begin regex!", SYNTAX),
            ));
        };
        let Some(regex_end) = def.field(2) else {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                def.end_of(1) - start,
                CATEGORY,
                format!("{}\nCustom presentation is missing an end regex!", SYNTAX),
            ));
        };

        let begin = self.require_callable(format!("{}-begin", name), &def, CATEGORY)?;
        let end_callable = self.require_callable(format!("{}-end", name), &def, CATEGORY)?;
        let begin_entry = compile_custom(
            format!("presentation:{}:begin", name),
            PatternKind::CustomPresentationBegin(name.to_string()),
            regex_begin,
            CATEGORY,
        )?;
        let end_entry = compile_custom(
            format!("presentation:{}:end", name),
            PatternKind::CustomPresentationEnd(name.to_string()),
            regex_end,
            CATEGORY,
        )?;
        self.register_custom_type(
            CustomType::Presentation(CustomPresentation {
                name: name.to_string(),
                regex_begin: regex_begin.to_string(),
                regex_end: regex_end.to_string(),
                begin,
                end: end_callable,
            }),
            &def,
            CATEGORY,
        )?;
        self.table.insert_after(PRESENTATION_BAND, begin_entry)?;
        self.table.insert_after(PRESENTATION_BAND, end_entry)?;
        debug!(name, regex_begin, regex_end, "custom presentation defined");
        Ok(end)
    }

    pub(super) fn handle_custom_presentation(
        &mut self,
        prev: usize,
        found: &CachedMatch,
        name: &str,
        begin: bool,
    ) -> ParseResult<usize> {
        if let Some(next) = self.escape_add_text(prev, found.start, &found.text) {
            return Ok(next);
        }
        if self.doc.custom_type(name).and_then(CustomType::as_presentation).is_none() {
            return Err(missing_custom_type(name));
        }

        let depth = self.state.presentation_depth.entry(name.to_string()).or_insert(0);
        let level = if begin {
            *depth += 1;
            *depth - 1
        } else {
            if *depth == 0 {
                return Err(self.error(
                    ErrorKind::Extension,
                    found.start,
                    found.len,
                    "Invalid Custom Presentation",
                    "Attempting to close presentation without opening it first!",
                ));
            }
            *depth -= 1;
            *depth
        };

        let mark = CustomPresentationMark {
            presentation: name.to_string(),
            level,
        };
        self.doc.push(if begin {
            Element::CustomPresPush(mark)
        } else {
            Element::CustomPresPop(mark)
        });
        Ok(found.end())
    }

    /// `#:DefProcess <Name> <RegexBegin> <TokenEnd>`
    pub(super) fn handle_define_process(
        &mut self,
        prev: usize,
        found: &CachedMatch,
    ) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid DefProcess";
        const SYNTAX: &str = "Syntax: '#:DefProcess <Name> <RegexBegin> <TokenEnd>'";
        let content = self.content();
        let start = self.enter_line(prev, found.start);
        let end = self.line_end(start);
        let def = DefinitionLine::new(&content[start..end], start, 13, 3);

        if def.fields.is_empty() {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                12,
                CATEGORY,
                format!("{}\nCustom process is missing a name!", SYNTAX),
            ));
        }
        let Some(name) = def.field(0) else {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                12,
                CATEGORY,
                format!("{}\nCustom process name is empty!", SYNTAX),
            ));
        };
        let Some(regex_begin) = def.field(1) else {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                def.end_of(0) - start,
                CATEGORY,
                format!("{}\nCustom process is missing a begin regex!", SYNTAX),
            ));
        };
        let Some(token_end) = def.field(2) else {
            return Err(self.error(
                ErrorKind::InvalidSyntax,
                start,
                def.end_of(1) - start,
                CATEGORY,
                format!("{}\nCustom process is missing an end token!", SYNTAX),
            ));
        };

        let apply = self.require_callable(format!("{}-apply", name), &def, CATEGORY)?;
        let entry = compile_custom(
            format!("process:{}", name),
            PatternKind::CustomProcess(name.to_string()),
            regex_begin,
            CATEGORY,
        )?;
        self.register_custom_type(
            CustomType::Process(CustomProcess {
                name: name.to_string(),
                regex_begin: regex_begin.to_string(),
                token_end: token_end.to_string(),
                apply,
            }),
            &def,
            CATEGORY,
        )?;
        self.table.insert_after(PROCESS_BAND, entry)?;
        debug!(name, regex_begin, token_end, "custom process defined");
        Ok(end)
    }

    /// Content up to the process' end token is parsed, handed to its apply
    /// callable, and the callable's output is appended.
    pub(super) fn handle_custom_process(
        &mut self,
        prev: usize,
        found: &CachedMatch,
        name: &str,
    ) -> ParseResult<usize> {
        if let Some(next) = self.escape_add_text(prev, found.start, &found.text) {
            return Ok(next);
        }
        let process = self
            .doc
            .custom_type(name)
            .and_then(CustomType::as_process)
            .cloned()
            .ok_or_else(|| missing_custom_type(name))?;
        let category = format!("Invalid Custom Process ({})", name);

        let Some((body, body_end)) = get_token(self.content(), &process.token_end, found.end(), None)
        else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                found.start,
                found.len,
                &category,
                format!(
                    "Missing terminating '{}' after initial '{}'",
                    process.token_end, process.regex_begin
                ),
            ));
        };
        if body.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                body_end - found.start + process.token_end.len(),
                &category,
                "Empty content",
            ));
        }

        let callable = self.callable(&process.apply, found, &category)?;
        let (parsed, _) = self.sub_parse(
            &format!("[{}-apply tokens]", name),
            body + "\n",
            Some(found.end()),
        )?;
        self.doc.merge_non_elems(&parsed);
        let applied = callable(parsed.into_tree().into_elements()).map_err(|e| {
            self.error(ErrorKind::Extension, found.start, found.len, &category, e.to_string())
        })?;
        for element in applied {
            self.doc.push(element);
        }
        Ok(body_end + process.token_end.len())
    }
}
