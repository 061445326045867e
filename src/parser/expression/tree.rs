use compact_str::CompactString;

use super::{InfixOperator, InfixShortCircuitOperator, PrefixOperator};
use crate::lexer::Span;
use crate::parser::statement::Block;
use crate::stack::ensure_sufficient_stack;

/// A name together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: CompactString,
    pub span: Span,
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ConditionalBranch {
    pub condition: Expression,
    pub body: Block,
}

/// `if`/`elif` branches in written order plus an optional `else` body.
#[derive(Debug, Clone)]
pub struct Conditional {
    pub branches: Vec<ConditionalBranch>,
    pub otherwise: Option<Block>,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Integer(i64),
    Bool(bool),
    Identifier(CompactString),
    Group(Box<Expression>),
    Prefix {
        operator: PrefixOperator,
        rhs: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    InfixShortCircuit {
        operator: InfixShortCircuitOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    List(Vec<Expression>),
    Conditional(Conditional),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// Dropping recurses once per nesting level.
impl Drop for Expression {
    fn drop(&mut self) {
        let kind = std::mem::replace(&mut self.kind, ExpressionKind::Bool(false));
        ensure_sufficient_stack(move || drop(kind));
    }
}
