/// Scanner for `{{name}}` placeholders in raw lines and `{{IMG_<n>}}` tokens in
/// processed lines
use crate::span::Span;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const TOKEN_PREFIX: &str = "{{IMG_";
const NAME_PREFIX: &str = "IMG:";

/// A `{{...}}` span found in a raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte span of the whole placeholder, braces included
    pub span: Span,
    /// Text between the braces, untouched
    pub inner: &'a str,
}

impl<'a> Placeholder<'a> {
    /// The lookup name: trimmed, with an optional `IMG:` prefix removed
    pub fn name(&self) -> &'a str {
        let trimmed = self.inner.trim();
        trimmed
            .strip_prefix(NAME_PREFIX)
            .map(str::trim)
            .unwrap_or(trimmed)
    }
}

/// A stable `{{IMG_<n>}}` token found in processed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch {
    pub span: Span,
    pub slot: usize,
}

/// Format the stable token for slot `n`
pub fn token(slot: usize) -> String {
    format!("{}{}{}", TOKEN_PREFIX, slot, CLOSE)
}

/// Find every placeholder in `line`, left to right, non-overlapping.
///
/// A placeholder is `{{`, one or more characters other than `}`, then `}}`.
/// A candidate that fails to close is left as plain text and scanning resumes
/// one byte later.
pub fn find_placeholders(line: &str) -> Vec<Placeholder<'_>> {
    let bytes = line.as_bytes();
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = line[pos..].find(OPEN) {
        let start = pos + offset;
        let inner_start = start + OPEN.len();
        let mut end = inner_start;
        while end < bytes.len() && bytes[end] != b'}' {
            end += 1;
        }

        if end > inner_start && line[end..].starts_with(CLOSE) {
            found.push(Placeholder {
                span: Span::new(start, end + CLOSE.len()),
                inner: &line[inner_start..end],
            });
            pos = end + CLOSE.len();
        } else {
            pos = start + 1;
        }
    }

    found
}

/// Find every complete `{{IMG_<n>}}` token in `text`
pub fn find_tokens(text: &str) -> Vec<TokenMatch> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(TOKEN_PREFIX) {
        let start = pos + offset;
        let digits_start = start + TOKEN_PREFIX.len();
        let digits_len = text[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        let digits_end = digits_start + digits_len;

        let slot = if digits_len > 0 && text[digits_end..].starts_with(CLOSE) {
            text[digits_start..digits_end].parse::<usize>().ok()
        } else {
            None
        };

        match slot {
            Some(slot) => {
                let end = digits_end + CLOSE.len();
                found.push(TokenMatch {
                    span: Span::new(start, end),
                    slot,
                });
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    found
}

/// If `text` ends in the middle of a token (`{`, `{{IMG_1`, `{{IMG_12}`...),
/// return the byte offset where that unfinished token starts.
pub fn unfinished_token_start(text: &str) -> Option<usize> {
    let start = text.rfind('{')?;
    // Step back over the first brace of `{{`
    let start = if start > 0 && text[..start].ends_with('{') {
        start - 1
    } else {
        start
    };
    let tail = &text[start..];

    if TOKEN_PREFIX.starts_with(tail) {
        return Some(start);
    }

    let rest = tail.strip_prefix(TOKEN_PREFIX)?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let after = &rest[digits..];
    (digits > 0 && (after.is_empty() || after == "}")).then_some(start)
}
