//! Source-annotated error reports for the command line.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use ftl_eval::TemplateError;
use ftl_parse::ParseError;

/// A parse error with the offending source underlined.
pub fn parse_error_report(name: &str, source: &str, error: &ParseError, color: bool) -> String {
    let span = clamp(error.span.to_range(), source);
    let report = Report::build(ReportKind::Error, name, span.start)
        .with_config(Config::default().with_color(color))
        .with_message(error.kind.to_string())
        .with_label(
            Label::new((name, span))
                .with_message(format!("at {}", error.pos))
                .with_color(Color::Red),
        )
        .finish();
    write(report, name, source).unwrap_or_else(|| error.to_string())
}

/// A render error with its location, tips and FTL stack.
pub fn template_error_report(
    name: &str,
    source: &str,
    error: &TemplateError,
    color: bool,
) -> String {
    let Some(span) = error.span else {
        return error.to_string();
    };
    let span = clamp(span.to_range(), source);
    let mut builder = Report::build(ReportKind::Error, name, span.start)
        .with_config(Config::default().with_color(color))
        .with_message(&error.message);
    let label = match &error.blamed {
        Some(blamed) => format!("evaluating {blamed}"),
        None => error.kind.to_string(),
    };
    builder = builder.with_label(
        Label::new((name, span))
            .with_message(label)
            .with_color(Color::Red),
    );
    for tip in &error.tips {
        builder = builder.with_help(tip);
    }
    if !error.stack.is_empty() {
        let stack: Vec<String> = error
            .stack
            .iter()
            .map(|entry| format!("{}  [{}]", entry.description, entry.pos))
            .collect();
        builder = builder.with_note(format!("FTL stack:\n{}", stack.join("\n")));
    }
    write(builder.finish(), name, source).unwrap_or_else(|| error.to_string())
}

fn clamp(range: Range<usize>, source: &str) -> Range<usize> {
    let end = range.end.min(source.len());
    range.start.min(end)..end
}

fn write<'a>(
    report: Report<'_, (&'a str, Range<usize>)>,
    name: &'a str,
    source: &str,
) -> Option<String> {
    let mut buf = Vec::new();
    report
        .write((name, Source::from(source.to_owned())), &mut buf)
        .ok()?;
    String::from_utf8(buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Configuration;

    #[test]
    fn parse_errors_name_the_template() {
        let source = "<#if x>unclosed";
        let Err(error) = Configuration::default().parse("page.ftl", source) else {
            panic!("an unclosed #if doesn't parse");
        };
        let report = parse_error_report("page.ftl", source, &error, false);
        assert!(report.contains("page.ftl"));
        assert!(report.contains("#if"));
    }

    #[test]
    fn render_errors_underline_the_expression() {
        let source = "Hi ${user.name}!";
        let Ok(template) = Configuration::default().parse("page.ftl", source) else {
            panic!("the template parses");
        };
        let Err(crate::RenderError::Template(error)) =
            template.render_to_string(crate::Value::hash(crate::SimpleHash::new()))
        else {
            panic!("user is missing from the data model");
        };
        let report = template_error_report("page.ftl", source, &error, false);
        assert!(report.contains("page.ftl"));
        assert!(report.contains("user"));
    }

    #[test]
    fn errors_without_span_fall_back_to_display() {
        let error = TemplateError::custom("boom");
        assert_eq!(template_error_report("t", "", &error, false), error.to_string());
    }

    #[test]
    fn clamping_keeps_ranges_inside_the_source() {
        assert_eq!(clamp(2..10, "abc"), 2..3);
        assert_eq!(clamp(5..10, "abc"), 3..3);
    }
}
