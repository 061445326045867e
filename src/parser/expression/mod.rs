mod operator;
mod tree;

pub use operator::{InfixOperator, InfixShortCircuitOperator, PostfixOperator, PrefixOperator};
pub use tree::{Conditional, ConditionalBranch, Expression, ExpressionKind, Ident};
