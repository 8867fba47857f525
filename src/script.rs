/// Scripts: the line sets a scenario types out, and the sectioned text format
/// they are written in
use std::collections::HashMap;
use std::fmt;

use crate::catalog::AssetCatalog;
use crate::placeholder::find_placeholders;
use crate::span::Span;

const DEFAULT_DENIED: [&str; 2] = ["", "permission denied: cannot execute 'Yes' 😅"];
const DEFAULT_ESCALATE: &str = "okay okay, enough. escalating privileges...";

/// The raw lines of every scenario step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub intro: Vec<String>,
    pub unlock: Vec<String>,
    pub accepted: Vec<String>,
    /// Typed when "yes" is pressed while still locked
    pub denied: Vec<String>,
    /// Progressive messages, one per decline attempt
    pub decline: Vec<String>,
    /// Typed instead of a decline message once the threshold is reached
    pub escalate: String,
}

impl Script {
    /// Parse a script file
    ///
    /// # Example
    /// ```
    /// use terminal_typer::script::Script;
    ///
    /// let source = "[intro]\nhello {{heart}}\n[unlock]\nok\n[accepted]\nyay\n[decline]\nno?\n";
    /// let script = Script::parse(source).unwrap();
    /// assert_eq!(script.intro, vec!["hello {{heart}}"]);
    /// ```
    pub fn parse(source: &str) -> Result<Script, ScriptError> {
        ScriptParser::new(source).parse()
    }

    /// The message for the given 1-based decline attempt; attempts past the
    /// end reuse the last message
    pub fn decline_message(&self, attempt: u32) -> &str {
        let index = (attempt as usize).saturating_sub(1);
        self.decline
            .get(index)
            .or(self.decline.last())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Placeholder names in `source` that the catalog doesn't know. They still
    /// work, drawing from the fun pool.
    pub fn lint(source: &str, catalog: &AssetCatalog) -> Vec<ScriptWarning> {
        let mut warnings = Vec::new();
        for (offset, line) in lines_with_offsets(source) {
            if is_comment(line) || parse_header(line).is_some() {
                continue;
            }
            for placeholder in find_placeholders(line) {
                let name = placeholder.name();
                if !catalog.is_known_name(name) {
                    warnings.push(ScriptWarning::UnknownImage {
                        name: name.to_string(),
                        span: placeholder.span.shift(offset),
                    });
                }
            }
        }
        warnings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Intro,
    Unlock,
    Accepted,
    Denied,
    Decline,
    Escalate,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "intro" => Some(Section::Intro),
            "unlock" => Some(Section::Unlock),
            "accepted" => Some(Section::Accepted),
            "denied" => Some(Section::Denied),
            "decline" => Some(Section::Decline),
            "escalate" => Some(Section::Escalate),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Intro => "intro",
            Section::Unlock => "unlock",
            Section::Accepted => "accepted",
            Section::Denied => "denied",
            Section::Decline => "decline",
            Section::Escalate => "escalate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    ContentOutsideSection { span: Span },
    UnknownSection { name: String, span: Span },
    UnterminatedHeader { span: Span },
    DuplicateSection { name: String, span: Span, first: Span },
    MissingSection { name: String },
    EmptySection { name: String, span: Span },
    MultipleLines { name: String, span: Span },
}

impl ScriptError {
    /// Where the error is; missing sections point at the start of the file
    pub fn span(&self) -> Span {
        match self {
            ScriptError::ContentOutsideSection { span } => *span,
            ScriptError::UnknownSection { span, .. } => *span,
            ScriptError::UnterminatedHeader { span } => *span,
            ScriptError::DuplicateSection { span, .. } => *span,
            ScriptError::MissingSection { .. } => Span::new(0, 0),
            ScriptError::EmptySection { span, .. } => *span,
            ScriptError::MultipleLines { span, .. } => *span,
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ContentOutsideSection { span } => {
                write!(f, "Line outside of any section at position {}", span.start)
            }
            ScriptError::UnknownSection { name, span } => {
                write!(f, "Unknown section '{}' at position {}", name, span.start)
            }
            ScriptError::UnterminatedHeader { span } => {
                write!(f, "Unterminated section header at position {}", span.start)
            }
            ScriptError::DuplicateSection { name, span, .. } => {
                write!(f, "Duplicate section '{}' at position {}", name, span.start)
            }
            ScriptError::MissingSection { name } => write!(f, "Missing section '{}'", name),
            ScriptError::EmptySection { name, span } => {
                write!(f, "Section '{}' at position {} has no lines", name, span.start)
            }
            ScriptError::MultipleLines { name, span } => write!(
                f,
                "Section '{}' at position {} must have exactly one line",
                name, span.start
            ),
        }
    }
}

impl std::error::Error for ScriptError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptWarning {
    UnknownImage { name: String, span: Span },
}

impl fmt::Display for ScriptWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptWarning::UnknownImage { name, span } => write!(
                f,
                "Unknown image '{}' at position {} uses the fun pool",
                name, span.start
            ),
        }
    }
}

fn lines_with_offsets(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source.split_inclusive('\n').scan(0, |offset, raw| {
        let start = *offset;
        *offset += raw.len();
        Some((start, raw.trim_end_matches(['\n', '\r'])))
    })
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

enum Header<'a> {
    Complete(&'a str),
    Unterminated,
}

/// `[name]` on a line of its own, name made of ASCII letters, digits, `_` or `-`
fn parse_header(line: &str) -> Option<Header<'_>> {
    let rest = line.trim_end().strip_prefix('[')?;
    let name_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
        .count();
    if name_len == 0 {
        return None;
    }
    match &rest[name_len..] {
        "]" => Some(Header::Complete(&rest[..name_len])),
        "" => Some(Header::Unterminated),
        _ => None,
    }
}

struct Body {
    header: Span,
    /// `None` for blank lines, which are dropped at the end of a section
    lines: Vec<Option<String>>,
}

impl Body {
    fn into_lines(self) -> Vec<String> {
        self.lines.into_iter().map(Option::unwrap_or_default).collect()
    }
}

struct ScriptParser<'a> {
    source: &'a str,
    sections: HashMap<Section, Body>,
    current: Option<Section>,
}

impl<'a> ScriptParser<'a> {
    fn new(source: &'a str) -> Self {
        ScriptParser {
            source,
            sections: HashMap::new(),
            current: None,
        }
    }

    fn parse(mut self) -> Result<Script, ScriptError> {
        for (offset, line) in lines_with_offsets(self.source) {
            let span = Span::new(offset, offset + line.len());
            if is_comment(line) {
                continue;
            }

            match parse_header(line) {
                Some(Header::Complete(name)) => self.open_section(name, span)?,
                Some(Header::Unterminated) => {
                    return Err(ScriptError::UnterminatedHeader { span })
                }
                None => self.push_line(line, span)?,
            }
        }
        self.finish()
    }

    fn open_section(&mut self, name: &str, span: Span) -> Result<(), ScriptError> {
        let section = Section::from_name(name).ok_or_else(|| ScriptError::UnknownSection {
            name: name.to_string(),
            span,
        })?;
        if let Some(existing) = self.sections.get(&section) {
            return Err(ScriptError::DuplicateSection {
                name: name.to_string(),
                span,
                first: existing.header,
            });
        }
        self.sections.insert(
            section,
            Body {
                header: span,
                lines: Vec::new(),
            },
        );
        self.current = Some(section);
        Ok(())
    }

    fn push_line(&mut self, line: &str, span: Span) -> Result<(), ScriptError> {
        let body = match self.current.and_then(|s| self.sections.get_mut(&s)) {
            Some(body) => body,
            None if line.trim().is_empty() => return Ok(()),
            None => return Err(ScriptError::ContentOutsideSection { span }),
        };
        let line = match line {
            // A lone `.` keeps an empty line that would otherwise be trimmed
            "." => Some(String::new()),
            blank if blank.trim().is_empty() => None,
            text => Some(text.to_string()),
        };
        body.lines.push(line);
        Ok(())
    }

    fn finish(mut self) -> Result<Script, ScriptError> {
        for body in self.sections.values_mut() {
            while matches!(body.lines.last(), Some(None)) {
                body.lines.pop();
            }
        }

        let intro = self.required(Section::Intro)?;
        let unlock = self.required(Section::Unlock)?;
        let accepted = self.required(Section::Accepted)?;
        let decline = self.required(Section::Decline)?;
        let denied = match self.sections.remove(&Section::Denied) {
            Some(body) => body.into_lines(),
            None => DEFAULT_DENIED.iter().map(|l| l.to_string()).collect(),
        };
        let escalate = match self.sections.remove(&Section::Escalate) {
            Some(body) if body.lines.len() == 1 => body.into_lines().remove(0),
            Some(body) => {
                return Err(ScriptError::MultipleLines {
                    name: Section::Escalate.name().to_string(),
                    span: body.header,
                })
            }
            None => DEFAULT_ESCALATE.to_string(),
        };

        Ok(Script {
            intro,
            unlock,
            accepted,
            denied,
            decline,
            escalate,
        })
    }

    fn required(&mut self, section: Section) -> Result<Vec<String>, ScriptError> {
        let body = self
            .sections
            .remove(&section)
            .ok_or_else(|| ScriptError::MissingSection {
                name: section.name().to_string(),
            })?;
        if body.lines.is_empty() {
            return Err(ScriptError::EmptySection {
                name: section.name().to_string(),
                span: body.header,
            });
        }
        Ok(body.into_lines())
    }
}
