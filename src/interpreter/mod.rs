pub mod context;
pub mod environment;
pub mod error;
pub mod formatter;
mod native;
pub mod stack;
mod tree;
pub mod value;

pub use context::{BufferedContext, StdioContext, SystemContext};
pub use environment::Environment;
pub use error::{RuntimeError, RuntimeErrorKind};
pub use tree::{InterpreterConfig, TreeWalkInterpreter, DEFAULT_MAX_CALL_DEPTH, GLOBALS_RULE};
pub use value::{Value, ValueKind};
