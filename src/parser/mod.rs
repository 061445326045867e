mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

use std::collections::VecDeque;
use std::rc::Rc;

pub use error::{ParserError, ParserErrorKind};
use expression::{
    Conditional, ConditionalBranch, Expression, ExpressionKind, Ident, InfixOperator,
    InfixShortCircuitOperator, PostfixOperator, PrefixOperator,
};
use statement::{Block, FunctionDecl, LetDecl, PrintStatement, Program, Statement};
use tracing::{debug, trace};

use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;

enum Infix {
    Strict(InfixOperator),
    ShortCircuit(InfixShortCircuitOperator),
}

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: VecDeque<Token>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: VecDeque::new(),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.lexer.get_source()
    }

    /// Makes sure at least `count` tokens are buffered.
    fn fill(&mut self, count: usize) -> Result<(), ParserError> {
        while self.lookahead.len() < count {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Token, ParserError> {
        self.fill(1)?;
        Ok(self.lookahead[0])
    }

    /// Peeks at the first token that is not a newline without consuming anything.
    fn peek_past_newlines(&mut self) -> Result<Token, ParserError> {
        let mut index = 0;
        loop {
            self.fill(index + 1)?;
            let token = self.lookahead[index];
            if token.kind != TokenKind::Newline {
                return Ok(token);
            }
            index += 1;
        }
    }

    fn next_token(&mut self) -> Result<Token, ParserError> {
        self.fill(1)?;
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => unreachable!("Lookahead was just filled."),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParserError> {
        let next_token = self.next_token()?;
        if next_token.kind != expected {
            let kind = match next_token.kind {
                TokenKind::Eof => ParserErrorKind::UnexpectedEof,
                actual => ParserErrorKind::UnexpectedToken { actual, expected },
            };
            Err(ParserError {
                kind,
                span: next_token.span,
            })
        } else {
            Ok(next_token)
        }
    }

    fn eat_if(&mut self, next: TokenKind) -> Result<Option<Token>, ParserError> {
        let next_token = self.peek()?;
        if next_token.kind != next {
            Ok(None)
        } else {
            self.next_token().map(Some)
        }
    }

    fn skip_newlines(&mut self) -> Result<(), ParserError> {
        while self.eat_if(TokenKind::Newline)?.is_some() {}
        Ok(())
    }

    fn skip_separators(&mut self) -> Result<(), ParserError> {
        while self.peek()?.kind.is_separator() {
            self.next_token()?;
        }
        Ok(())
    }

    fn expect_ident(&mut self) -> Result<Ident, ParserError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(self.make_ident(&token))
    }

    fn make_ident(&self, token: &Token) -> Ident {
        let name = self.lexer.get_lexeme(&token.span).unwrap_or_default();
        Ident {
            name: name.into(),
            span: token.span,
        }
    }
}

// Parse program/statements
impl<'src> Parser<'src> {
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let statements = self.parse_statement_list(TokenKind::Eof)?;
        let eof = self.expect(TokenKind::Eof)?;
        debug!(statements = statements.len(), "parsed program");
        Ok(Program {
            body: Block {
                statements,
                span: Span::new(0, eof.span.end as usize),
            },
        })
    }

    /// Parses separated statements up to (but not including) `terminator`.
    fn parse_statement_list(
        &mut self,
        terminator: TokenKind,
    ) -> Result<Vec<Statement>, ParserError> {
        let mut statements = Vec::new();
        self.skip_separators()?;
        loop {
            let token = self.peek()?;
            if token.kind == terminator {
                break;
            }
            if token.kind == TokenKind::Eof {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedEof,
                    span: token.span,
                });
            }

            statements.push(self.parse_statement()?);

            let next = self.peek()?;
            if next.kind.is_separator() {
                self.skip_separators()?;
            } else if next.kind == TokenKind::Eof && terminator != TokenKind::Eof {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedEof,
                    span: next.span,
                });
            } else if next.kind != terminator {
                return Err(ParserError {
                    kind: ParserErrorKind::MissingSeparator(next.kind),
                    span: next.span,
                });
            }
        }
        Ok(statements)
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        let first = self.peek()?;
        trace!(token = %first.kind, "parsing statement");
        match first.kind {
            TokenKind::KeywordFn => self.parse_function_declaration().map(Statement::Function),
            TokenKind::KeywordLet => {
                let keyword = self.next_token()?;
                let name = self.expect_ident()?;
                self.expect(TokenKind::Equal)?;
                self.skip_newlines()?;
                let value = self.parse_expression()?;
                let span = keyword.span.merge(&value.span);
                Ok(Statement::Let(LetDecl { name, value, span }))
            }
            TokenKind::KeywordPrint => {
                let keyword = self.next_token()?;
                let expr = self.parse_expression()?;
                let span = keyword.span.merge(&expr.span);
                Ok(Statement::Print(PrintStatement { expr, span }))
            }
            _ => self.parse_expression().map(Statement::Expression),
        }
    }

    fn parse_function_declaration(&mut self) -> Result<FunctionDecl, ParserError> {
        let keyword = self.expect(TokenKind::KeywordFn)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LeftParenthesis)?;

        let mut parameters: Vec<Ident> = Vec::new();
        loop {
            self.skip_newlines()?;
            if self.eat_if(TokenKind::RightParenthesis)?.is_some() {
                break;
            }
            let parameter = self.expect_ident()?;
            if parameters.iter().any(|p| p.name == parameter.name) {
                return Err(ParserError {
                    kind: ParserErrorKind::DuplicateParameter(parameter.name),
                    span: parameter.span,
                });
            }
            parameters.push(parameter);
            self.skip_newlines()?;
            if self.eat_if(TokenKind::RightParenthesis)?.is_some() {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }

        let body = self.parse_block()?;
        let span = keyword.span.merge(&body.span);
        Ok(FunctionDecl {
            name,
            parameters,
            body: Rc::new(body),
            span,
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParserError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        self.parse_block_body(open)
    }

    fn parse_block_body(&mut self, open: Token) -> Result<Block, ParserError> {
        let statements = self.parse_statement_list(TokenKind::RightBrace)?;
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(Block {
            statements,
            span: open.span.merge(&close.span),
        })
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        self.parse_expression_pratt(0)
    }

    fn peek_infix_operator(&mut self) -> Result<Option<Infix>, ParserError> {
        let token = self.peek()?;

        let operator = match token.kind {
            TokenKind::Plus => Infix::Strict(InfixOperator::Add),
            TokenKind::Minus => Infix::Strict(InfixOperator::Subtract),
            TokenKind::Star => Infix::Strict(InfixOperator::Multiply),
            TokenKind::Slash => Infix::Strict(InfixOperator::Divide),
            TokenKind::Percent => Infix::Strict(InfixOperator::Modulo),
            TokenKind::LessThan => Infix::Strict(InfixOperator::LessThan),
            TokenKind::LessThanEqual => Infix::Strict(InfixOperator::LessThanEqual),
            TokenKind::GreaterThan => Infix::Strict(InfixOperator::GreaterThan),
            TokenKind::GreaterThanEqual => Infix::Strict(InfixOperator::GreaterThanEqual),
            TokenKind::EqualEqual => Infix::Strict(InfixOperator::EqualEqual),
            TokenKind::BangEqual => Infix::Strict(InfixOperator::BangEqual),
            TokenKind::KeywordAnd => Infix::ShortCircuit(InfixShortCircuitOperator::And),
            TokenKind::KeywordOr => Infix::ShortCircuit(InfixShortCircuitOperator::Or),
            _ => return Ok(None),
        };
        Ok(Some(operator))
    }

    fn expect_left_expression(&mut self) -> Result<Expression, ParserError> {
        let token = self.next_token()?;

        let expr = match token.kind {
            TokenKind::Integer(value) => {
                Expression::new(ExpressionKind::Integer(value), token.span)
            }
            TokenKind::KeywordTrue => Expression::new(ExpressionKind::Bool(true), token.span),
            TokenKind::KeywordFalse => Expression::new(ExpressionKind::Bool(false), token.span),
            TokenKind::Ident => {
                let ident = self.make_ident(&token);
                Expression::new(ExpressionKind::Identifier(ident.name), token.span)
            }
            // Prefix operators
            TokenKind::Minus => self.parse_prefix(PrefixOperator::Minus, token)?,
            TokenKind::KeywordNot => self.parse_prefix(PrefixOperator::Not, token)?,
            // Bracketed expression
            TokenKind::LeftParenthesis => {
                self.skip_newlines()?;
                let inner = self.parse_expression_pratt(0)?;
                self.skip_newlines()?;
                let close = self.expect(TokenKind::RightParenthesis)?;
                Expression::new(
                    ExpressionKind::Group(Box::new(inner)),
                    token.span.merge(&close.span),
                )
            }
            TokenKind::LeftBracket => {
                let (elements, close) = self.parse_comma_separated(TokenKind::RightBracket)?;
                Expression::new(ExpressionKind::List(elements), token.span.merge(&close.span))
            }
            TokenKind::LeftBrace => {
                let block = self.parse_block_body(token)?;
                let span = block.span;
                Expression::new(ExpressionKind::Block(block), span)
            }
            TokenKind::KeywordIf => self.parse_conditional(token)?,
            TokenKind::Eof => {
                return Err(ParserError {
                    kind: ParserErrorKind::UnexpectedEof,
                    span: token.span,
                })
            }
            kind => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonExpression(kind),
                    span: token.span,
                })
            }
        };
        Ok(expr)
    }

    fn parse_prefix(
        &mut self,
        operator: PrefixOperator,
        token: Token,
    ) -> Result<Expression, ParserError> {
        let rbp = operator.get_binding_power();
        let rhs = self.parse_expression_pratt(rbp)?;
        let span = token.span.merge(&rhs.span);
        Ok(Expression::new(
            ExpressionKind::Prefix {
                operator,
                rhs: Box::new(rhs),
            },
            span,
        ))
    }

    /// Parses `expr (',' expr)* ','?` followed by `closing`, newlines allowed anywhere.
    fn parse_comma_separated(
        &mut self,
        closing: TokenKind,
    ) -> Result<(Vec<Expression>, Token), ParserError> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines()?;
            if let Some(close) = self.eat_if(closing)? {
                return Ok((items, close));
            }
            items.push(self.parse_expression()?);
            self.skip_newlines()?;
            if let Some(close) = self.eat_if(closing)? {
                return Ok((items, close));
            }
            self.expect(TokenKind::Comma)?;
        }
    }

    fn parse_conditional(&mut self, keyword: Token) -> Result<Expression, ParserError> {
        let mut branches = Vec::new();
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let mut span = keyword.span.merge(&body.span);
        branches.push(ConditionalBranch { condition, body });

        let mut otherwise = None;
        loop {
            let next = self.peek_past_newlines()?;
            match next.kind {
                TokenKind::KeywordElif => {
                    self.skip_newlines()?;
                    self.next_token()?;
                    let condition = self.parse_expression()?;
                    let body = self.parse_block()?;
                    span = span.merge(&body.span);
                    branches.push(ConditionalBranch { condition, body });
                }
                TokenKind::KeywordElse => {
                    self.skip_newlines()?;
                    self.next_token()?;
                    let body = self.parse_block()?;
                    span = span.merge(&body.span);
                    otherwise = Some(body);
                    break;
                }
                _ => break,
            }
        }

        Ok(Expression::new(
            ExpressionKind::Conditional(Conditional {
                branches,
                otherwise,
            }),
            span,
        ))
    }

    /// Every nested expression passes through here, so this is where the native
    /// stack is topped up.
    fn parse_expression_pratt(&mut self, min_bp: u8) -> Result<Expression, ParserError> {
        ensure_sufficient_stack(|| self.parse_expression_pratt_inner(min_bp))
    }

    fn parse_expression_pratt_inner(&mut self, min_bp: u8) -> Result<Expression, ParserError> {
        let mut lhs = self.expect_left_expression()?;

        loop {
            if self.peek()?.kind == TokenKind::LeftParenthesis {
                if PostfixOperator::Call.get_binding_power() < min_bp {
                    break;
                }
                self.next_token()?;
                let (arguments, close) = self.parse_comma_separated(TokenKind::RightParenthesis)?;
                let span = lhs.span.merge(&close.span);
                lhs = Expression::new(
                    ExpressionKind::Call {
                        callee: Box::new(lhs),
                        arguments,
                    },
                    span,
                );
                continue;
            }

            let Some(operator) = self.peek_infix_operator()? else {
                break;
            };
            let (lbp, rbp) = match operator {
                Infix::Strict(ref op) => op.get_binding_power(),
                Infix::ShortCircuit(ref op) => op.get_binding_power(),
            };
            if lbp < min_bp {
                break;
            }
            self.next_token()?;
            self.skip_newlines()?;

            let rhs = self.parse_expression_pratt(rbp)?;
            let span = lhs.span.merge(&rhs.span);
            let (lhs_box, rhs_box) = (Box::new(lhs), Box::new(rhs));
            lhs = match operator {
                Infix::Strict(operator) => Expression::new(
                    ExpressionKind::Infix {
                        operator,
                        lhs: lhs_box,
                        rhs: rhs_box,
                    },
                    span,
                ),
                Infix::ShortCircuit(operator) => Expression::new(
                    ExpressionKind::InfixShortCircuit {
                        operator,
                        lhs: lhs_box,
                        rhs: rhs_box,
                    },
                    span,
                ),
            };
        }
        Ok(lhs)
    }
}
