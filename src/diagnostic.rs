/// Diagnostic reporting for script files using ariadne
use crate::script::{ScriptError, ScriptWarning};
use crate::span::Span;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::ops::Range;

fn span_to_range(span: Span) -> Range<usize> {
    span.range()
}

fn render<'a>(
    report: Report<'_, (&'a str, Range<usize>)>,
    source_name: &'a str,
    source: &str,
) -> String {
    let mut output = Vec::new();
    report
        .write((source_name, Source::from(source)), &mut output)
        .expect("Failed to write diagnostic");

    String::from_utf8(output).expect("Invalid UTF-8 in diagnostic output")
}

/// Report a script error
pub fn report_script_error(source_name: &str, source: &str, error: &ScriptError) -> String {
    let report = match error {
        ScriptError::ContentOutsideSection { span } => {
            Report::build(ReportKind::Error, source_name, span.start)
                .with_message("Line outside of any section")
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message("this line belongs to no section")
                        .with_color(Color::Red),
                )
                .with_help("Start the file with a section header such as [intro]")
                .finish()
        }
        ScriptError::UnknownSection { name, span } => {
            Report::build(ReportKind::Error, source_name, span.start)
                .with_message(format!("Unknown section: '{}'", name))
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message(format!("'{}' is not a section name", name))
                        .with_color(Color::Red),
                )
                .with_note("Sections: intro, unlock, accepted, denied, decline, escalate")
                .finish()
        }
        ScriptError::UnterminatedHeader { span } => {
            Report::build(ReportKind::Error, source_name, span.start)
                .with_message("Unterminated section header")
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message("this header is missing a closing ']'")
                        .with_color(Color::Red),
                )
                .with_help("Add a closing ']' to complete the header")
                .finish()
        }
        ScriptError::DuplicateSection { name, span, first } => {
            Report::build(ReportKind::Error, source_name, span.start)
                .with_message(format!("Duplicate section: '{}'", name))
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message(format!("'{}' is defined again here", name))
                        .with_color(Color::Red),
                )
                .with_label(
                    Label::new((source_name, span_to_range(*first)))
                        .with_message("first defined here")
                        .with_color(Color::Yellow),
                )
                .finish()
        }
        ScriptError::MissingSection { name } => {
            Report::build(ReportKind::Error, source_name, 0)
                .with_message(format!("Missing section: '{}'", name))
                .with_help(format!("Add a [{}] section with at least one line", name))
                .finish()
        }
        ScriptError::EmptySection { name, span } => {
            Report::build(ReportKind::Error, source_name, span.start)
                .with_message(format!("Empty section: '{}'", name))
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message(format!("'{}' has no lines", name))
                        .with_color(Color::Red),
                )
                .with_help("Use a line with a single '.' for an empty line")
                .finish()
        }
        ScriptError::MultipleLines { name, span } => {
            Report::build(ReportKind::Error, source_name, span.start)
                .with_message(format!("Section '{}' takes one line", name))
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message("this section must have exactly one line")
                        .with_color(Color::Red),
                )
                .finish()
        }
    };

    render(report, source_name, source)
}

/// Report lint warnings, one report per warning
pub fn report_script_warnings(
    source_name: &str,
    source: &str,
    warnings: &[ScriptWarning],
) -> String {
    warnings
        .iter()
        .map(|warning| match warning {
            ScriptWarning::UnknownImage { name, span } => {
                let report = Report::build(ReportKind::Warning, source_name, span.start)
                    .with_message(format!("Unknown image: '{}'", name))
                    .with_label(
                        Label::new((source_name, span_to_range(*span)))
                            .with_message("not a known image name")
                            .with_color(Color::Yellow),
                    )
                    .with_note("A random image from the fun pool is used instead")
                    .finish();
                render(report, source_name, source)
            }
        })
        .collect()
}

/// Combined error reporting for anything that can go wrong loading a script
pub fn report_typer_error(source_name: &str, source: &str, error: &crate::TyperError) -> String {
    match error {
        crate::TyperError::Script(e) => report_script_error(source_name, source, e),
        other => {
            let report = Report::<(&str, Range<usize>)>::build(ReportKind::Error, source_name, 0)
                .with_message(other.to_string())
                .finish();
            render(report, source_name, source)
        }
    }
}
