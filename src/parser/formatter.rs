use super::{
    expression::{Conditional, Expression, ExpressionKind},
    statement::{Block, Program, Statement},
    ParserError, ParserErrorKind,
};
use crate::lexer::LineBreaks;
use crate::stack::ensure_sufficient_stack;
use std::fmt::Write;

const WRITE_FMT_MSG: &str = "Writing into a String buffer should not fail.";

pub trait ParserFormatter {
    fn format(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugParserFormatter;

impl ParserFormatter for DebugParserFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program:#?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Renders the tree as one S-expression per top level statement.
pub struct SExpressionFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> SExpressionFormatter<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            line_breaks: LineBreaks::new(text),
        }
    }

    fn write_statement(buffer: &mut String, statement: &Statement) {
        match statement {
            Statement::Function(decl) => {
                write!(buffer, "(fn {} (", decl.name).expect(WRITE_FMT_MSG);
                for (index, parameter) in decl.parameters.iter().enumerate() {
                    if index > 0 {
                        buffer.push(' ');
                    }
                    buffer.push_str(&parameter.name);
                }
                buffer.push_str(") ");
                Self::write_block(buffer, &decl.body);
                buffer.push(')');
            }
            Statement::Let(decl) => {
                write!(buffer, "(let {} ", decl.name).expect(WRITE_FMT_MSG);
                Self::write_expression(buffer, &decl.value);
                buffer.push(')');
            }
            Statement::Print(stmt) => {
                buffer.push_str("(print ");
                Self::write_expression(buffer, &stmt.expr);
                buffer.push(')');
            }
            Statement::Expression(expr) => Self::write_expression(buffer, expr),
        }
    }

    fn write_block(buffer: &mut String, block: &Block) {
        buffer.push_str("(block");
        for statement in block.statements.iter() {
            buffer.push(' ');
            Self::write_statement(buffer, statement);
        }
        buffer.push(')');
    }

    fn write_conditional(buffer: &mut String, conditional: &Conditional) {
        buffer.push_str("(cond");
        for branch in conditional.branches.iter() {
            buffer.push_str(" (");
            Self::write_expression(buffer, &branch.condition);
            buffer.push(' ');
            Self::write_block(buffer, &branch.body);
            buffer.push(')');
        }
        if let Some(ref otherwise) = conditional.otherwise {
            buffer.push_str(" (else ");
            Self::write_block(buffer, otherwise);
            buffer.push(')');
        }
        buffer.push(')');
    }

    fn write_all(buffer: &mut String, head: &str, items: &[&Expression]) {
        write!(buffer, "({head}").expect(WRITE_FMT_MSG);
        for item in items {
            buffer.push(' ');
            Self::write_expression(buffer, item);
        }
        buffer.push(')');
    }

    fn write_expression(buffer: &mut String, expr: &Expression) {
        ensure_sufficient_stack(|| Self::write_expression_inner(buffer, expr));
    }

    fn write_expression_inner(buffer: &mut String, expr: &Expression) {
        match expr.kind {
            ExpressionKind::Integer(v) => write!(buffer, "{v}").expect(WRITE_FMT_MSG),
            ExpressionKind::Bool(v) => write!(buffer, "{v}").expect(WRITE_FMT_MSG),
            ExpressionKind::Identifier(ref name) => buffer.push_str(name),
            ExpressionKind::Group(ref inner) => Self::write_all(buffer, "group", &[inner.as_ref()]),
            ExpressionKind::Prefix { operator, ref rhs } => {
                Self::write_all(buffer, &operator.to_string(), &[rhs.as_ref()])
            }
            ExpressionKind::Infix {
                operator,
                ref lhs,
                ref rhs,
            } => Self::write_all(buffer, &operator.to_string(), &[lhs.as_ref(), rhs.as_ref()]),
            ExpressionKind::InfixShortCircuit {
                operator,
                ref lhs,
                ref rhs,
            } => Self::write_all(buffer, &operator.to_string(), &[lhs.as_ref(), rhs.as_ref()]),
            ExpressionKind::Call {
                ref callee,
                ref arguments,
            } => {
                let mut items: Vec<&Expression> = vec![callee.as_ref()];
                items.extend(arguments.iter());
                Self::write_all(buffer, "call", &items)
            }
            ExpressionKind::List(ref elements) => {
                let items: Vec<&Expression> = elements.iter().collect();
                Self::write_all(buffer, "list", &items)
            }
            ExpressionKind::Conditional(ref conditional) => {
                Self::write_conditional(buffer, conditional)
            }
            ExpressionKind::Block(ref block) => Self::write_block(buffer, block),
        }
    }
}

impl<'src> ParserFormatter for SExpressionFormatter<'src> {
    fn format(&self, program: &Program) -> String {
        let mut buffer = String::new();
        for (index, statement) in program.iter().enumerate() {
            if index > 0 {
                buffer.push('\n');
            }
            Self::write_statement(&mut buffer, statement);
        }
        buffer
    }

    fn format_error(&self, error: &ParserError) -> String {
        let (line, column) = self
            .line_breaks
            .get_line_and_column(error.span.start as usize);
        match error.kind {
            ParserErrorKind::UnexpectedEof => {
                format!("[line {line}:{column}] Error at end: {}", error.kind)
            }
            _ => {
                let lexeme = self.text.get(error.span.range()).unwrap_or_default();
                let lexeme = if lexeme == "\n" { "\\n" } else { lexeme };
                format!("[line {line}:{column}] Error at '{lexeme}': {}", error.kind)
            }
        }
    }
}
