//! Snippet rendering with ariadne.

use crate::CompileError;
use ariadne::{Config, Label, Report, ReportKind, Source};

/// Render `error` against its source text as a plain-text report.
///
/// Spans past the end of `source` are clamped so a stale span never
/// panics the renderer.
pub fn render(error: &CompileError, source: &str) -> String {
    let file = error
        .file()
        .map_or_else(|| "<input>".to_string(), |path| path.display().to_string());
    let len = source.len();
    let start = (error.span.start as usize).min(len);
    let end = (error.span.end as usize).clamp(start, len);

    let mut label = Label::new((file.clone(), start..end));
    if let Some(backend) = error.backend {
        label = label.with_message(format!("not expressible on {backend}"));
    } else {
        label = label.with_message(error.code.description());
    }

    let mut report = Report::build(ReportKind::Error, file.clone(), start)
        .with_code(error.code.as_str())
        .with_message(format!("{}: {}", error.kind, error.message))
        .with_label(label)
        .with_config(Config::default().with_color(false));
    for note in &error.notes {
        report = report.with_note(note);
    }

    let mut out = Vec::new();
    if report
        .finish()
        .write((file, Source::from(source.to_string())), &mut out)
        .is_err()
    {
        return error.to_string();
    }
    String::from_utf8_lossy(&out).into_owned()
}
