/*
 * handlers/blocks.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ErrorKind, ParseResult};
use crate::fs::normalize;
use crate::pattern::CachedMatch;
use crate::scanner::Scanner;
use crate::token::{get_token, trim_identifier};
use nml_syntax::{Code, CodeFragment, Element, Quote};
use tracing::trace;

const CODE_CATEGORY: &str = "Invalid Code";

/// A backslash-escaped `#:Inc` line or fence. One backslash is dropped.
fn is_escaped_directive(line: &str) -> bool {
    let unescaped = line.trim_start_matches('\\');
    unescaped.len() < line.len()
        && (unescaped.starts_with("#:Inc ") || unescaped.starts_with("```"))
}

/// Split code lines at `#:Line N` directives. Each fragment starts at the
/// line number of the directive before it, the first one at 1.
fn split_fragments(code: &str) -> Result<Vec<CodeFragment>, &'static str> {
    let mut fragments = Vec::new();
    let mut first_line = 1;
    let mut fragment_start = 0;
    let mut pos = 0;
    while pos < code.len() {
        let line_end = code[pos..].find('\n').map_or(code.len(), |i| pos + i);
        if let Some(number) = code[pos..line_end].strip_prefix("#:Line ") {
            let text = &code[fragment_start..pos];
            let text = text.strip_suffix('\n').unwrap_or(text);
            if !text.is_empty() {
                fragments.push(CodeFragment {
                    first_line,
                    text: text.to_string(),
                });
            }

            let number = trim_identifier(number);
            if number.is_empty() {
                return Err("Missing number after '#:Line'");
            }
            first_line = number.parse().map_err(|_| "Invalid number for '#:Line'")?;
            fragment_start = (line_end + 1).min(code.len());
        }
        pos = line_end + 1;
    }

    let text = &code[fragment_start..];
    if !text.is_empty() {
        fragments.push(CodeFragment {
            first_line,
            text: text.to_string(),
        });
    }
    Ok(fragments)
}

impl Scanner<'_, '_> {
    /// ```` ```lang[, name] ```` up to the closing fence.
    pub(super) fn handle_code(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        let content = self.content();
        let start = self.enter_line(prev, found.start);
        let line_end = self.line_end(start);
        let header = &content[start..line_end];

        let (language, name) = match get_token(content, ",", start + 3, Some(line_end)) {
            Some((language, comma)) if !language.is_empty() => (
                language,
                trim_identifier(&content[comma + 1..line_end]).to_string(),
            ),
            _ => (header[3..].replace('\\', ""), String::new()),
        };
        let language = trim_identifier(&language).to_string();
        if language.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                3,
                CODE_CATEGORY,
                "Missing language",
            ));
        }

        let body_start = line_end + 1;
        let Some((_, code_end)) = get_token(content, "```", body_start, None) else {
            return Err(self.error(
                ErrorKind::MalformedToken,
                start,
                header.len(),
                CODE_CATEGORY,
                "Missing closing '```'",
            ));
        };
        if code_end <= body_start {
            return Err(self.error(
                ErrorKind::EmptyContent,
                start,
                header.len(),
                CODE_CATEGORY,
                "Missing code",
            ));
        }

        let mut lines = Vec::new();
        let mut offset = body_start;
        for line in content[body_start..code_end].split('\n') {
            if let Some(directive) = line.strip_prefix("#:Inc ") {
                lines.push(self.code_include(directive, offset, line.len())?);
            } else if is_escaped_directive(line) {
                lines.push(line[1..].to_string());
            } else {
                lines.push(line.to_string());
            }
            offset += line.len() + 1;
        }
        let code = lines.join("\n");

        let fragments = split_fragments(&code).map_err(|message| {
            self.error(ErrorKind::InvalidSyntax, start, header.len(), CODE_CATEGORY, message)
        })?;

        let Some(style) = self.resolve("CodeStyle") else {
            return Err(self.error(
                ErrorKind::UnknownReference,
                start,
                header.len(),
                CODE_CATEGORY,
                "You must set '#+CodeStyle' before using code fragments",
            ));
        };

        trace!(%language, %name, fragments = fragments.len(), "code block");
        self.doc.push(Element::Code(Code {
            language,
            name,
            style,
            fragments,
        }));
        Ok(code_end + 3)
    }

    /// Text spliced in by a `#:Inc file[, first, count]` code line.
    fn code_include(&self, directive: &str, offset: usize, len: usize) -> ParseResult<String> {
        let (file, range) = match get_token(directive, ",", 0, None) {
            Some((file, comma)) if !file.is_empty() => (file, Some(&directive[comma + 1..])),
            _ => (directive.to_string(), None),
        };
        let file = trim_identifier(&file);
        if file.is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                offset,
                len,
                CODE_CATEGORY,
                "Missing filename after '#:Inc'",
            ));
        }

        let range = match range {
            Some(range) => {
                let mut parts = range.splitn(2, ',').map(trim_identifier);
                let first = parts.next().filter(|part| !part.is_empty());
                let Some(first) = first else {
                    return Err(self.error(
                        ErrorKind::InvalidSyntax,
                        offset,
                        len,
                        CODE_CATEGORY,
                        "Missing include line begin after '#:Inc'",
                    ));
                };
                let Some(count) = parts.next().filter(|part| !part.is_empty()) else {
                    return Err(self.error(
                        ErrorKind::InvalidSyntax,
                        offset,
                        len,
                        CODE_CATEGORY,
                        "Missing include line count after '#:Inc'",
                    ));
                };
                let number = |value: &str| {
                    value.parse::<usize>().map_err(|_| {
                        self.error(
                            ErrorKind::InvalidSyntax,
                            offset,
                            len,
                            CODE_CATEGORY,
                            format!("Cannot parse '{}' as a number", value),
                        )
                    })
                };
                Some((number(first)?, number(count)?))
            }
            None => None,
        };

        let path = normalize(&self.session.cwd.join(file));
        let source = self
            .session
            .engine
            .file_system()
            .read_to_string(&path)
            .map_err(|e| {
                self.error(
                    ErrorKind::IncludeIO,
                    offset + 6,
                    file.len(),
                    CODE_CATEGORY,
                    format!("Unable to open file '{}' for '#:Inc'", file),
                )
                .with_hint(format!("{}: {}", path.display(), e))
            })?;

        match range {
            Some((first, count)) => {
                let Some(end) = first.checked_add(count) else {
                    return Err(self.error(
                        ErrorKind::InvalidSyntax,
                        offset,
                        len,
                        CODE_CATEGORY,
                        "Line range too large",
                    ));
                };
                if first > source.lines().count() {
                    return Err(self.error(
                        ErrorKind::InvalidSyntax,
                        offset,
                        len,
                        CODE_CATEGORY,
                        format!("Line {} is past the end of '{}'", first, file),
                    ));
                }
                Ok(source
                    .lines()
                    .enumerate()
                    .filter(|(index, _)| (first..end).contains(&(index + 1)))
                    .map(|(_, line)| line)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            None if source.is_empty() => Err(self.error(
                ErrorKind::EmptyContent,
                offset + 6,
                file.len(),
                CODE_CATEGORY,
                format!("Included file '{}' is empty", file),
            )),
            None => Ok(source.strip_suffix('\n').unwrap_or(&source).to_string()),
        }
    }

    /// Consecutive `>` lines. `>[author]` names the quote's author.
    pub(super) fn handle_quote(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        const CATEGORY: &str = "Invalid Quote";
        let content = self.content();
        let start = self.enter_line(prev, found.start);

        let mut body = String::new();
        let mut author: Option<String> = None;
        let mut pos = start;
        let mut end = start;
        while content.as_bytes().get(pos) == Some(&b'>') {
            let begin = pos + 1;
            if begin >= content.len() {
                return Err(self.error(
                    ErrorKind::EmptyContent,
                    pos,
                    1,
                    CATEGORY,
                    "Empty quote line at end of file",
                ));
            }
            end = self.line_end(begin);
            let line = &content[begin..end];

            if let Some(rest) = line.strip_prefix('[') {
                if author.is_some() {
                    return Err(self.error(
                        ErrorKind::InvalidSyntax,
                        begin,
                        line.len(),
                        CATEGORY,
                        "Quote can only have one author",
                    ));
                }
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(self.error(
                        ErrorKind::MalformedToken,
                        begin,
                        line.len(),
                        CATEGORY,
                        "Quote author needs a closing ']'",
                    ));
                };
                author = Some(name.to_string());
            } else {
                body.push_str(line);
                body.push('\n');
            }
            pos = end + 1;
        }

        let (parsed, _) = self.sub_parse("[quote]", body, Some(start))?;
        self.doc.merge_non_elems(&parsed);
        self.doc.push(Element::Quote(Quote {
            content: parsed.into_tree(),
            author: author.unwrap_or_default(),
        }));
        Ok(end)
    }
}
