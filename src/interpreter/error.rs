use compact_str::CompactString;
use thiserror::Error;

use super::stack::CallFrame;
use super::value::ValueKind;
use crate::lexer::Span;
use crate::parser::expression::{InfixOperator, InfixShortCircuitOperator, PrefixOperator};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Unbound name `{0}`")]
    UnboundName(CompactString),
    #[error("Operator `{operator}` cannot be applied to {operand}")]
    UnaryTypeMismatch {
        operator: PrefixOperator,
        operand: ValueKind,
    },
    #[error("Operator `{operator}` cannot be applied to {lhs} and {rhs}")]
    BinaryTypeMismatch {
        operator: InfixOperator,
        lhs: ValueKind,
        rhs: ValueKind,
    },
    #[error("Operator `{operator}` expects boolean operands but got {operand}")]
    LogicalTypeMismatch {
        operator: InfixShortCircuitOperator,
        operand: ValueKind,
    },
    #[error("Condition must be a boolean but got {0}")]
    NonBooleanCondition(ValueKind),
    #[error("Cannot call a value of kind {0}")]
    NonCallable(ValueKind),
    #[error("`{name}` expects a {expected} but got {actual}")]
    InvalidNativeArgument {
        name: &'static str,
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("Invalid argument count: expected {expected} but got {actual}")]
    InvalidArgumentCount { actual: usize, expected: usize },
    #[error("Division by zero")]
    DivideByZero,
    #[error("Stack overflow: call depth exceeded {limit}")]
    StackOverflow { limit: usize },
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("`{0}` of an empty list")]
    EmptyList(&'static str),
    #[error("Expression produced no value")]
    MissingValue,
    #[error("`{0}` is already defined in this scope")]
    Redefinition(CompactString),
}

impl RuntimeErrorKind {
    /// Operator or operand kind mismatches.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            RuntimeErrorKind::UnaryTypeMismatch { .. }
                | RuntimeErrorKind::BinaryTypeMismatch { .. }
                | RuntimeErrorKind::LogicalTypeMismatch { .. }
                | RuntimeErrorKind::NonBooleanCondition(_)
                | RuntimeErrorKind::NonCallable(_)
                | RuntimeErrorKind::InvalidNativeArgument { .. }
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
    /// Calls that were active when the error was raised, innermost first.
    pub backtrace: Vec<CallFrame>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            backtrace: Vec::new(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::UnboundName(_) => "RT001",
            RuntimeErrorKind::UnaryTypeMismatch { .. } => "RT002",
            RuntimeErrorKind::BinaryTypeMismatch { .. } => "RT003",
            RuntimeErrorKind::LogicalTypeMismatch { .. } => "RT004",
            RuntimeErrorKind::NonBooleanCondition(_) => "RT005",
            RuntimeErrorKind::NonCallable(_) => "RT006",
            RuntimeErrorKind::InvalidNativeArgument { .. } => "RT007",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "RT008",
            RuntimeErrorKind::DivideByZero => "RT009",
            RuntimeErrorKind::StackOverflow { .. } => "RT010",
            RuntimeErrorKind::IntegerOverflow => "RT011",
            RuntimeErrorKind::EmptyList(_) => "RT012",
            RuntimeErrorKind::MissingValue => "RT013",
            RuntimeErrorKind::Redefinition(_) => "RT014",
        }
    }
}
