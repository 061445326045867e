//! Source-annotated error reports for the command line.

use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};

use crate::interpreter::formatter::ValueFormatter;
use crate::interpreter::{RuntimeError, RuntimeErrorKind, Value};
use crate::lexer::{LexicalError, LineBreaks, Span};
use crate::parser::{ParserError, ParserErrorKind};

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> PrettyFormatter<'src> {
    /// `path` only names the source in the report header.
    pub fn new(text: &'src str, path: &'src str) -> Self {
        Self {
            text,
            path,
            line_breaks: LineBreaks::new(text),
        }
    }

    fn render(
        &self,
        span: Span,
        code: &str,
        message: &str,
        label: String,
        notes: &[String],
    ) -> String {
        let path = self.path;
        // Ariadne needs a non-empty range to draw a label; end of input has none.
        let range = if span.is_empty() {
            span.start as usize..span.start as usize + 1
        } else {
            span.range()
        };
        let mut report = Report::build(ReportKind::Error, (path, range.clone()))
            .with_code(code)
            .with_message(message)
            .with_label(
                Label::new((path, range))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            );
        for note in notes {
            report = report.with_note(note);
        }
        let mut output = std::io::Cursor::new(Vec::new());
        report
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }

    pub fn format_lexical_error(&self, error: &LexicalError) -> String {
        self.render(
            error.span,
            error.code(),
            "Invalid token",
            format!("{}", error.kind),
            &[],
        )
    }

    pub fn format_parser_error(&self, error: &ParserError) -> String {
        let message = match error.kind {
            ParserErrorKind::LexicalError(ref inner) => return self.format_lexical_error(inner),
            ParserErrorKind::UnexpectedEof => "Unexpected end of input",
            ParserErrorKind::DuplicateParameter(_) => "Invalid function declaration",
            _ => "Syntax error",
        };
        self.render(
            error.span,
            error.code(),
            message,
            format!("{}", error.kind),
            &[],
        )
    }

    pub fn format_runtime_error(&self, error: &RuntimeError) -> String {
        let message = match error.kind {
            ref kind if kind.is_type_error() => "Type error",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "Arity error",
            RuntimeErrorKind::StackOverflow { .. } => "Stack overflow",
            _ => "Runtime error",
        };
        let notes: Vec<String> = error
            .backtrace
            .iter()
            .map(|frame| {
                let (line, column) = self
                    .line_breaks
                    .get_line_and_column(frame.call_span.start as usize);
                format!(
                    "in call to {} at line {line}:{column}",
                    (&frame.name).fg(Color::Cyan)
                )
            })
            .collect();
        self.render(
            error.span,
            error.code(),
            message,
            format!("{}", error.kind),
            &notes,
        )
    }
}

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        self.format_runtime_error(error)
    }
}
