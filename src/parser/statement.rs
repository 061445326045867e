use std::rc::Rc;

use super::expression::{Expression, Ident};
use crate::lexer::Span;

/// A brace-delimited statement sequence. The top level of a program is one too.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Ident,
    pub parameters: Vec<Ident>,
    /// Shared with every function value created from this declaration.
    pub body: Rc<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LetDecl {
    pub name: Ident,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PrintStatement {
    pub expr: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Function(FunctionDecl),
    Let(LetDecl),
    Print(PrintStatement),
    Expression(Expression),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Function(decl) => decl.span,
            Statement::Let(decl) => decl.span,
            Statement::Print(stmt) => stmt.span,
            Statement::Expression(expr) => expr.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    pub body: Block,
}

impl Program {
    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.body.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.body.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.statements.is_empty()
    }
}
