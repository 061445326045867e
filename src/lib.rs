pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod stack;

use interpreter::{
    BufferedContext, InterpreterConfig, RuntimeError, SystemContext, TreeWalkInterpreter, Value,
};
use parser::{statement::Program, Parser, ParserError};
use thiserror::Error;

/// Any failure of the source-to-value pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParserError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Parse(error) => error.code(),
            Error::Runtime(error) => error.code(),
        }
    }
}

pub fn parse(source: &str) -> Result<Program, ParserError> {
    Parser::new(source).parse()
}

/// Runs `source` against `context` and returns the value of its final statement.
pub fn run_with_context<C: SystemContext>(
    source: &str,
    context: C,
    config: InterpreterConfig,
) -> Result<(Option<Value>, C), Error> {
    let program = parse(source)?;
    let mut interpreter = TreeWalkInterpreter::with_config(context, config);
    let value = interpreter.run(&program)?;
    Ok((value, interpreter.into_context()))
}

/// Runs `source` and returns the lines it printed.
pub fn run(source: &str) -> Result<Vec<String>, Error> {
    let (_, context) =
        run_with_context(source, BufferedContext::new(), InterpreterConfig::default())?;
    Ok(context.lines().to_vec())
}

/// Runs `source` and returns the value of its final statement, discarding output.
pub fn evaluate(source: &str) -> Result<Option<Value>, Error> {
    let (value, _) =
        run_with_context(source, BufferedContext::new(), InterpreterConfig::default())?;
    Ok(value)
}
