/*
 * token.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Token extraction helpers shared by the handlers.
//!
//! All positions are byte offsets into the buffer content. Delimiters and
//! the escape character are ASCII, so offsets computed here always land on
//! character boundaries.

/// Escape character for every token kind
pub const ESCAPE: char = '\\';

/// Read from `start` up to the first unescaped `separator`.
///
/// Leading spaces and tabs are skipped. Inside the token, `\sep` yields a
/// literal separator, `\\sep` yields a backslash and ends the token at that
/// separator, and any other backslash is kept as is. The search stops at
/// `end` when given.
///
/// Returns the unescaped token and the offset of the separator, or `None`
/// when no unescaped separator is found.
///
/// ```
/// use nml_parser::token::get_token;
///
/// assert_eq!(get_token("[ a\\]b ] rest", "]", 1, None), Some(("a]b ".to_string(), 7)));
/// assert_eq!(get_token("[abc", "]", 1, None), None);
/// ```
pub fn get_token(
    content: &str,
    separator: &str,
    start: usize,
    end: Option<usize>,
) -> Option<(String, usize)> {
    let end = end.map_or(content.len(), |end| end.min(content.len()));
    let bytes = content.as_bytes();
    let mut start = start;
    while start < end && (bytes[start] == b' ' || bytes[start] == b'\t') {
        start += 1;
    }
    let search_in = content.get(start..end)?;

    let mut token = String::with_capacity(search_in.len());
    let mut pos = 0;
    while pos < search_in.len() {
        let left = &search_in[pos..];
        if let Some(after) = left.strip_prefix(ESCAPE) {
            if after.starts_with(ESCAPE) && after[1..].starts_with(separator) {
                token.push(ESCAPE);
                pos += 2;
            } else if after.starts_with(separator) {
                token.push_str(separator);
                pos += 1 + separator.len();
            } else {
                token.push(ESCAPE);
                pos += 1;
            }
        } else if left.starts_with(separator) {
            return Some((token, start + pos));
        } else {
            let ch = left.chars().next()?;
            token.push(ch);
            pos += ch.len_utf8();
        }
    }
    None
}

/// Trim spaces and tabs on both ends.
pub fn trim_identifier(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t')
}

/// Split on every unescaped `split`, trimming each part.
///
/// `\<split>` keeps the split character and `\\` a single backslash.
pub fn char_split(s: &str, split: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut word = String::new();
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            match chars.peek() {
                Some(&next) if next == split || next == ESCAPE => {
                    word.push(next);
                    chars.next();
                }
                _ => word.push(ch),
            }
        } else if ch == split {
            parts.push(std::mem::take(&mut word));
        } else {
            word.push(ch);
        }
    }
    parts.push(word);
    parts
        .iter()
        .map(|part| trim_identifier(part).to_string())
        .collect()
}

/// Read a logical line starting at `start`.
///
/// A backslash before a newline joins the next line; two backslashes
/// before a newline join it and keep a newline. With `trim_continued`,
/// indentation after a joined newline is dropped.
///
/// Returns the text and the offset of the terminating newline (or the end
/// of the content).
pub fn read_continued(content: &str, start: usize, trim_continued: bool) -> (String, usize) {
    let bytes = content.as_bytes();
    let skip_blanks = |mut i: usize| {
        if trim_continued {
            while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
                i += 1;
            }
        }
        i
    };

    let mut text = String::new();
    let mut i = start.min(content.len());
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'\n') {
            i = skip_blanks(i + 2);
        } else if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'\\') && bytes.get(i + 2) == Some(&b'\n')
        {
            text.push('\n');
            i = skip_blanks(i + 3);
        } else if bytes[i] == b'\n' {
            break;
        } else {
            // Multi-byte characters are copied whole
            let Some(ch) = content[i..].chars().next() else {
                break;
            };
            text.push(ch);
            i += ch.len_utf8();
        }
    }
    (text, i)
}

/// Skip spaces and tabs from `start`, stopping at `limit`.
pub fn skip_blanks(content: &str, start: usize, limit: usize) -> usize {
    let bytes = content.as_bytes();
    let limit = limit.min(bytes.len());
    let mut i = start;
    while i < limit && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_token_plain() {
        assert_eq!(get_token("{{body}}", "}}", 2, None), Some(("body".to_string(), 6)));
        assert_eq!(get_token("%%  (x)%%", "%%", 2, None), Some(("(x)".to_string(), 7)));
    }

    #[test]
    fn test_get_token_escapes() {
        // \sep keeps the separator
        assert_eq!(get_token("a\\)b)", ")", 0, None), Some(("a)b".to_string(), 4)));
        // \\sep keeps one backslash and ends the token
        assert_eq!(get_token("a\\\\)b)", ")", 0, None), Some(("a\\".to_string(), 3)));
        // lone backslash is literal
        assert_eq!(get_token("a\\b)", ")", 0, None), Some(("a\\b".to_string(), 3)));
    }

    #[test]
    fn test_get_token_bounded() {
        let content = "![name\n](x)";
        assert_eq!(get_token(content, "]", 2, Some(6)), None);
        assert_eq!(get_token(content, "]", 2, None), Some(("name\n".to_string(), 7)));
    }

    #[test]
    fn test_get_token_multibyte() {
        assert_eq!(get_token("§{été}", "}", 3, None), Some(("été".to_string(), 8)));
    }

    #[test]
    fn test_char_split() {
        assert_eq!(char_split("fig, custom name", ','), vec!["fig", "custom name"]);
        assert_eq!(char_split("a\\, b", ','), vec!["a, b"]);
        assert_eq!(char_split("a\\\\, b", ','), vec!["a\\", "b"]);
        assert_eq!(char_split(" solo ", ','), vec!["solo"]);
    }

    #[test]
    fn test_read_continued() {
        let content = "first \\\n   second\nthird";
        assert_eq!(read_continued(content, 0, true), ("first second".to_string(), 17));
        assert_eq!(read_continued(content, 0, false), ("first    second".to_string(), 17));

        let content = "a\\\\\nb";
        assert_eq!(read_continued(content, 0, true), ("a\nb".to_string(), 5));
    }

    #[test]
    fn test_trim_identifier() {
        assert_eq!(trim_identifier("\t name  "), "name");
        assert_eq!(skip_blanks("  \tx", 0, 10), 3);
    }
}
