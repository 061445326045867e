use super::{error::RuntimeError, value::Value};
use crate::lexer::LineBreaks;

pub trait ValueFormatter {
    fn format(&self, value: &Value) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

/// Plain one line messages, `[line L:C] Error: ...`, followed by one line per
/// active call.
pub struct BasicFormatter {
    line_breaks: LineBreaks,
}

impl BasicFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let (line, column) = self
            .line_breaks
            .get_line_and_column(error.span.start as usize);
        let mut message = format!("[line {line}:{column}] Error: {}", error.kind);
        for frame in error.backtrace.iter() {
            let line = self.line_breaks.get_line_from_span(frame.call_span);
            message.push_str(&format!("\n    in {} called at line {line}", frame.name));
        }
        message
    }
}
