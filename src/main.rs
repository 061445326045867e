use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use pilang::interpreter::{
    formatter::{BasicFormatter as BasicValueFormatter, ValueFormatter},
    InterpreterConfig, StdioContext, TreeWalkInterpreter, DEFAULT_MAX_CALL_DEPTH,
};
use pilang::report::PrettyFormatter;
use std::io::Read;
use std::path::PathBuf;
use std::{fs::read_to_string, process::ExitCode};

const EXIT_DATA_ERROR: u8 = 65;
const EXIT_SOFTWARE_ERROR: u8 = 70;

#[derive(Debug, Parser)]
#[clap(name = "pilang", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: PilangCommand,
}

#[derive(Debug, Subcommand)]
pub enum PilangCommand {
    /// Print the token stream.
    Tokenize {
        /// Source file; standard input when omitted.
        path: Option<PathBuf>,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Print the syntax tree.
    Parse {
        path: Option<PathBuf>,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ProgramFormat,
    },
    /// Run the program and print the value of its final statement.
    Evaluate {
        path: Option<PathBuf>,
        #[clap(long = "max-call-depth", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_call_depth: usize,
    },
    /// Run the program.
    Run {
        path: Option<PathBuf>,
        /// Dump the global bindings once the program finishes.
        #[clap(long = "globals")]
        globals: bool,
        #[clap(long = "max-call-depth", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_call_depth: usize,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();
    let args = CLArgs::parse();
    let succeeded = match args.routine {
        PilangCommand::Tokenize { path, format } => {
            let (src, name) = read_source(path.as_ref())?;
            tokenize(&src, &name, &format).then_some(()).ok_or(EXIT_DATA_ERROR)
        }
        PilangCommand::Parse { path, format } => {
            let (src, name) = read_source(path.as_ref())?;
            parse(&src, &name, &format).then_some(()).ok_or(EXIT_DATA_ERROR)
        }
        PilangCommand::Evaluate {
            path,
            max_call_depth,
        } => {
            let (src, name) = read_source(path.as_ref())?;
            run(&src, &name, InterpreterConfig { max_call_depth }, true, false)
        }
        PilangCommand::Run {
            path,
            globals,
            max_call_depth,
        } => {
            let (src, name) = read_source(path.as_ref())?;
            run(&src, &name, InterpreterConfig { max_call_depth }, false, globals)
        }
    };
    Ok(match succeeded {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    })
}

/// Logging is off unless `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_source(path: Option<&PathBuf>) -> Result<(String, String)> {
    match path {
        Some(path) => {
            let src = read_to_string(path)?;
            Ok((src, path.to_string_lossy().into_owned()))
        }
        None => {
            let mut src = String::new();
            std::io::stdin().read_to_string(&mut src)?;
            Ok((src, "<stdin>".into()))
        }
    }
}

fn tokenize(src: &str, name: &str, format: &TokenFormat) -> bool {
    use pilang::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use pilang::lexer::{Lexer, TokenKind};

    let mut lexer = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter + '_> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&lexer)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&lexer)),
    };
    let reporter = PrettyFormatter::new(src, name);
    let mut succeeded = true;
    loop {
        match lexer.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    return succeeded;
                }
            }
            Err(error) => {
                eprintln!("{}", reporter.format_lexical_error(&error));
                succeeded = false;
            }
        };
    }
}

fn parse(src: &str, name: &str, format: &ProgramFormat) -> bool {
    use pilang::parser::formatter::{DebugParserFormatter, ParserFormatter, SExpressionFormatter};

    let formatter: Box<dyn ParserFormatter + '_> = match format {
        ProgramFormat::Debug => Box::new(DebugParserFormatter),
        ProgramFormat::SExpr => Box::new(SExpressionFormatter::new(src)),
    };
    match pilang::parse(src) {
        Ok(program) => {
            println!("{}", formatter.format(&program));
            true
        }
        Err(error) => {
            eprintln!("{}", PrettyFormatter::new(src, name).format_parser_error(&error));
            false
        }
    }
}

fn run(
    src: &str,
    name: &str,
    config: InterpreterConfig,
    print_result: bool,
    dump_globals: bool,
) -> Result<(), u8> {
    let reporter = PrettyFormatter::new(src, name);
    let program = pilang::parse(src).map_err(|error| {
        eprintln!("{}", reporter.format_parser_error(&error));
        EXIT_DATA_ERROR
    })?;

    let mut interpreter = TreeWalkInterpreter::with_config(StdioContext, config);
    let result = interpreter.run(&program);
    if dump_globals {
        interpreter.dump_globals();
    }
    match result {
        Ok(value) => {
            if print_result {
                if let Some(value) = value {
                    println!("{}", BasicValueFormatter::new(src).format(&value));
                }
            }
            Ok(())
        }
        Err(error) => {
            eprintln!("{}", reporter.format_error(&error));
            Err(EXIT_SOFTWARE_ERROR)
        }
    }
}
