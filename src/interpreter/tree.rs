use std::rc::Rc;

use tracing::{debug, trace};

use super::context::SystemContext;
use super::environment::{Environment, WeakEnvironment};
use super::error::{RuntimeError, RuntimeErrorKind};
use super::stack::{CallFrame, CallStack};
use super::value::{Function, Value};
use crate::lexer::Span;
use crate::parser::{
    expression::{
        Conditional, Expression, ExpressionKind, InfixOperator, InfixShortCircuitOperator,
        PrefixOperator,
    },
    statement::{Block, FunctionDecl, LetDecl, PrintStatement, Program, Statement},
};
use crate::stack::ensure_sufficient_stack;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 2048;

/// Frames kept on a runtime error's backtrace.
const BACKTRACE_LIMIT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Number of user function calls that may be active at once.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Printed above and below the global bindings by [`TreeWalkInterpreter::dump_globals`].
pub const GLOBALS_RULE: &str = "=-=-=-=-=-=-=-=-=-=";

/// Frames that had a function defined into them. Such a function captures the
/// frame it is stored in, so neither is freed by reference counting alone.
/// Every one still alive is emptied on drop.
#[derive(Default)]
struct CapturedFrames {
    frames: Vec<WeakEnvironment>,
}

impl CapturedFrames {
    fn register(&mut self, environment: &Environment) {
        if !environment.mark_captured() {
            return;
        }
        if self.frames.len() == self.frames.capacity() {
            self.frames.retain(WeakEnvironment::is_alive);
        }
        self.frames.push(environment.downgrade());
    }
}

impl Drop for CapturedFrames {
    fn drop(&mut self) {
        for frame in self.frames.drain(..) {
            if let Some(environment) = frame.upgrade() {
                environment.clear();
            }
        }
    }
}

pub struct TreeWalkInterpreter<C: SystemContext> {
    globals: Environment,
    captured: CapturedFrames,
    context: C,
    call_stack: CallStack,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self::with_config(context, InterpreterConfig::default())
    }

    pub fn with_config(context: C, config: InterpreterConfig) -> Self {
        Self {
            globals: Environment::new(),
            captured: CapturedFrames::default(),
            context,
            call_stack: CallStack::new(config.max_call_depth),
        }
    }

    /// Runs every top level statement in order and returns the value of the last
    /// one, if it produced any. Globals persist across calls.
    #[tracing::instrument(skip_all, fields(statements = program.len()))]
    pub fn run(&mut self, program: &Program) -> Result<Option<Value>, RuntimeError> {
        let environment = self.globals.clone();
        let mut result = None;
        for statement in program.iter() {
            result = self.interpret_statement(&environment, statement)?;
        }
        Ok(result)
    }

    /// The global frame. It is emptied once the interpreter is dropped.
    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Writes the user bindings of the global frame to the context as
    /// `name : value` lines between two rules. Native functions are left out.
    pub fn dump_globals(&mut self) {
        self.context.writeln(GLOBALS_RULE);
        for (name, value) in self.globals.bindings() {
            if matches!(value, Value::NativeFunction(_)) {
                continue;
            }
            self.context.writeln(&format!("{name} : {value}"));
        }
        self.context.writeln(GLOBALS_RULE);
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        let Self {
            captured, context, ..
        } = self;
        drop(captured);
        context
    }
}

// Statements
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn interpret_statement(
        &mut self,
        environment: &Environment,
        statement: &Statement,
    ) -> Result<Option<Value>, RuntimeError> {
        trace!(span = ?statement.span(), "interpret statement");
        match statement {
            Statement::Function(decl) => {
                self.interpret_function_declaration(environment, decl)?;
                Ok(None)
            }
            Statement::Let(decl) => {
                self.interpret_let_declaration(environment, decl)?;
                Ok(None)
            }
            Statement::Print(stmt) => {
                self.interpret_print_statement(environment, stmt)?;
                Ok(None)
            }
            Statement::Expression(expr) => self.evaluate(environment, expr),
        }
    }

    fn interpret_function_declaration(
        &mut self,
        environment: &Environment,
        decl: &FunctionDecl,
    ) -> Result<(), RuntimeError> {
        let function = Function {
            name: decl.name.name.clone(),
            parameters: decl
                .parameters
                .iter()
                .map(|parameter| parameter.name.clone())
                .collect(),
            body: Rc::clone(&decl.body),
            closure: environment.clone(),
        };
        self.captured.register(environment);
        environment
            .define(&decl.name.name, Value::Function(Rc::new(function)))
            .map_err(|kind| RuntimeError::new(kind, decl.name.span))
    }

    fn interpret_let_declaration(
        &mut self,
        environment: &Environment,
        decl: &LetDecl,
    ) -> Result<(), RuntimeError> {
        let value = self.evaluate_value(environment, &decl.value)?;
        environment
            .define(&decl.name.name, value)
            .map_err(|kind| RuntimeError::new(kind, decl.name.span))
    }

    fn interpret_print_statement(
        &mut self,
        environment: &Environment,
        stmt: &PrintStatement,
    ) -> Result<(), RuntimeError> {
        let value = self.evaluate_value(environment, &stmt.expr)?;
        self.context.writeln(&format!("{value}"));
        Ok(())
    }

    /// Runs the statements of `block` directly in `environment`.
    fn interpret_statements(
        &mut self,
        environment: &Environment,
        block: &Block,
    ) -> Result<Option<Value>, RuntimeError> {
        let mut result = None;
        for statement in block.statements.iter() {
            result = self.interpret_statement(environment, statement)?;
        }
        Ok(result)
    }
}

// Expressions
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    /// Evaluates an expression. Blocks and conditionals may produce no value.
    fn evaluate(
        &mut self,
        environment: &Environment,
        expr: &Expression,
    ) -> Result<Option<Value>, RuntimeError> {
        ensure_sufficient_stack(|| self.evaluate_inner(environment, expr))
    }

    fn evaluate_inner(
        &mut self,
        environment: &Environment,
        expr: &Expression,
    ) -> Result<Option<Value>, RuntimeError> {
        let span = expr.span;
        let value = match expr.kind {
            ExpressionKind::Integer(v) => Value::Integer(v),
            ExpressionKind::Bool(v) => Value::Boolean(v),
            ExpressionKind::Identifier(ref name) => environment.lookup(name).ok_or_else(|| {
                RuntimeError::new(RuntimeErrorKind::UnboundName(name.clone()), span)
            })?,
            ExpressionKind::Group(ref inner) => return self.evaluate(environment, inner),
            ExpressionKind::Prefix { operator, ref rhs } => {
                let rhs = self.evaluate_value(environment, rhs)?;
                Self::evaluate_prefix(operator, &rhs)
                    .map_err(|kind| RuntimeError::new(kind, span))?
            }
            ExpressionKind::Infix {
                operator,
                ref lhs,
                ref rhs,
            } => {
                let lhs = self.evaluate_value(environment, lhs)?;
                let rhs = self.evaluate_value(environment, rhs)?;
                Self::evaluate_infix(operator, &lhs, &rhs)
                    .map_err(|kind| RuntimeError::new(kind, span))?
            }
            ExpressionKind::InfixShortCircuit {
                operator,
                ref lhs,
                ref rhs,
            } => self.evaluate_infix_short_circuit(environment, operator, lhs, rhs)?,
            ExpressionKind::Call {
                ref callee,
                ref arguments,
            } => return self.evaluate_call(environment, span, callee, arguments),
            ExpressionKind::List(ref elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    values.push(self.evaluate_value(environment, element)?);
                }
                Value::list(values)
            }
            ExpressionKind::Conditional(ref conditional) => {
                return self.evaluate_conditional(environment, conditional)
            }
            ExpressionKind::Block(ref block) => return self.evaluate_block(environment, block),
        };
        Ok(Some(value))
    }

    /// Evaluates an expression whose value is required.
    fn evaluate_value(
        &mut self,
        environment: &Environment,
        expr: &Expression,
    ) -> Result<Value, RuntimeError> {
        self.evaluate(environment, expr)?
            .ok_or_else(|| RuntimeError::new(RuntimeErrorKind::MissingValue, expr.span))
    }

    /// Runs `block` in a fresh child scope of `environment`.
    fn evaluate_block(
        &mut self,
        environment: &Environment,
        block: &Block,
    ) -> Result<Option<Value>, RuntimeError> {
        let scope = environment.new_scope();
        self.interpret_statements(&scope, block)
    }

    fn evaluate_prefix(operator: PrefixOperator, rhs: &Value) -> Result<Value, RuntimeErrorKind> {
        type Operator = PrefixOperator;
        match operator {
            Operator::Minus => rhs.numeric_negate(),
            Operator::Not => rhs.logical_not(),
        }
    }

    fn evaluate_infix(
        operator: InfixOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, RuntimeErrorKind> {
        type Operator = InfixOperator;
        match operator {
            Operator::Add => lhs.add(rhs),
            Operator::Subtract => lhs.subtract(rhs),
            Operator::Multiply => lhs.multiply(rhs),
            Operator::Divide => lhs.divide(rhs),
            Operator::Modulo => lhs.modulo(rhs),
            Operator::LessThan => lhs.less_than(rhs),
            Operator::LessThanEqual => lhs.less_than_or_equal(rhs),
            Operator::GreaterThan => lhs.greater_than(rhs),
            Operator::GreaterThanEqual => lhs.greater_than_or_equal(rhs),
            Operator::EqualEqual => lhs.equal(rhs),
            Operator::BangEqual => lhs.not_equal(rhs),
        }
    }

    fn evaluate_infix_short_circuit(
        &mut self,
        environment: &Environment,
        operator: InfixShortCircuitOperator,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Value, RuntimeError> {
        type Operator = InfixShortCircuitOperator;
        let lhs_value = self.evaluate_value(environment, lhs)?;
        let lhs_flag = lhs_value
            .expect_logical(operator)
            .map_err(|kind| RuntimeError::new(kind, lhs.span))?;

        let short_circuits = match operator {
            Operator::And => !lhs_flag,
            Operator::Or => lhs_flag,
        };
        if short_circuits {
            return Ok(Value::Boolean(lhs_flag));
        }

        let rhs_value = self.evaluate_value(environment, rhs)?;
        let rhs_flag = rhs_value
            .expect_logical(operator)
            .map_err(|kind| RuntimeError::new(kind, rhs.span))?;
        Ok(Value::Boolean(rhs_flag))
    }

    /// First branch whose condition holds wins; falls back to `else`.
    fn evaluate_conditional(
        &mut self,
        environment: &Environment,
        conditional: &Conditional,
    ) -> Result<Option<Value>, RuntimeError> {
        for branch in conditional.branches.iter() {
            let condition = self.evaluate_value(environment, &branch.condition)?;
            let Value::Boolean(flag) = condition else {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::NonBooleanCondition(condition.kind()),
                    branch.condition.span,
                ));
            };
            if flag {
                return self.evaluate_block(environment, &branch.body);
            }
        }
        match conditional.otherwise {
            Some(ref otherwise) => self.evaluate_block(environment, otherwise),
            None => Ok(None),
        }
    }

    fn evaluate_call(
        &mut self,
        environment: &Environment,
        span: Span,
        callee: &Expression,
        arguments: &[Expression],
    ) -> Result<Option<Value>, RuntimeError> {
        let callee_value = self.evaluate_value(environment, callee)?;
        if !callee_value.is_callable() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::NonCallable(callee_value.kind()),
                callee.span,
            ));
        }

        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments.iter() {
            values.push(self.evaluate_value(environment, argument)?);
        }

        match callee_value {
            Value::NativeFunction(fun) => {
                let expected = fun.get_parameters().len();
                if values.len() != expected {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::InvalidArgumentCount {
                            actual: values.len(),
                            expected,
                        },
                        span,
                    ));
                }
                trace!(name = fun.get_name(), "call native function");
                fun.call(&values)
                    .map(Some)
                    .map_err(|kind| self.attach_backtrace(RuntimeError::new(kind, span)))
            }
            Value::Function(function) => self.evaluate_function(&function, values, span),
            v => Err(RuntimeError::new(
                RuntimeErrorKind::NonCallable(v.kind()),
                callee.span,
            )),
        }
    }

    fn evaluate_function(
        &mut self,
        function: &Function,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Option<Value>, RuntimeError> {
        if arguments.len() != function.parameters.len() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidArgumentCount {
                    actual: arguments.len(),
                    expected: function.parameters.len(),
                },
                span,
            ));
        }

        // One frame per call, child of the captured frame.
        let frame = function.closure.new_scope();
        for (name, argument) in function.parameters.iter().zip(arguments) {
            frame
                .define(name, argument)
                .map_err(|kind| RuntimeError::new(kind, span))?;
        }

        self.call_stack
            .push(CallFrame {
                name: function.name.clone(),
                call_span: span,
            })
            .map_err(|kind| self.attach_backtrace(RuntimeError::new(kind, span)))?;
        debug!(
            name = %function.name,
            depth = self.call_stack.depth(),
            "call function"
        );

        let result = self
            .interpret_statements(&frame, &function.body)
            .map_err(|error| self.attach_backtrace(error));
        self.call_stack.pop();
        result
    }

    /// Records the active calls on an error that does not have them yet.
    fn attach_backtrace(&self, mut error: RuntimeError) -> RuntimeError {
        if error.backtrace.is_empty() {
            let mut backtrace = self.call_stack.capture();
            backtrace.truncate(BACKTRACE_LIMIT);
            error.backtrace = backtrace;
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::context::BufferedContext;
    use crate::parser::Parser;

    fn run(source: &str) -> (Result<Option<Value>, RuntimeError>, Vec<String>) {
        let program = Parser::new(source).parse().unwrap();
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        let result = interpreter.run(&program);
        let lines = interpreter.into_context().lines().to_vec();
        (result, lines)
    }

    #[test]
    fn call_frames_are_popped_after_errors() {
        let program = Parser::new("fn f(x) { 1 / x }\nf(0)").parse().unwrap();
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        let error = interpreter.run(&program).unwrap_err();
        assert_eq!(error.kind, RuntimeErrorKind::DivideByZero);
        assert_eq!(interpreter.call_stack.depth(), 0);
        assert_eq!(error.backtrace.len(), 1);
        assert_eq!(error.backtrace[0].name, "f");
    }

    #[test]
    fn non_callable_is_reported_before_arguments_run() {
        let (result, lines) = run("let x = 3\nx(print_me)");
        assert_eq!(
            result.unwrap_err().kind,
            RuntimeErrorKind::NonCallable(crate::interpreter::value::ValueKind::Integer)
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn short_circuit_skips_right_operand() {
        let (result, _) = run("false and missing");
        assert!(matches!(result, Ok(Some(Value::Boolean(false)))));
        let (result, _) = run("true or missing");
        assert!(matches!(result, Ok(Some(Value::Boolean(true)))));
    }

    #[test]
    fn globals_are_released_on_drop() {
        let program = Parser::new("fn f() { 1 }").parse().unwrap();
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        interpreter.run(&program).unwrap();
        let globals = interpreter.globals().clone();
        assert!(globals.contains_local("f"));
        drop(interpreter);
        assert!(!globals.contains_local("f"));
    }

    #[test]
    fn frames_captured_by_nested_functions_are_freed_on_drop() {
        let source = "fn mk(n) { fn add(x) { x + n }; add }\nmk(1)";
        let program = Parser::new(source).parse().unwrap();
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        let Some(Value::Function(add)) = interpreter.run(&program).unwrap() else {
            panic!("Expected `mk(1)` to produce a function");
        };
        let frame = add.closure.downgrade();
        drop(add);
        // `add` is still bound in the frame it captured.
        assert!(frame.is_alive());
        drop(interpreter);
        assert!(!frame.is_alive());
    }

    #[test]
    fn frames_without_definitions_are_not_tracked() {
        let program = Parser::new("fn f(x) { { x } }\nf(1)\nf(2)").parse().unwrap();
        let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
        interpreter.run(&program).unwrap();
        assert_eq!(interpreter.captured.frames.len(), 1);
    }

    #[test]
    fn deeply_nested_expressions_evaluate() {
        let source = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let (result, _) = run(&source);
        assert!(matches!(result, Ok(Some(Value::Integer(1)))));
    }
}
