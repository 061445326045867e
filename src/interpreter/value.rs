use std::fmt::{Debug, Display};
use std::rc::Rc;

use compact_str::CompactString;

use super::environment::Environment;
use super::error::RuntimeErrorKind;
use crate::parser::expression::{InfixOperator, InfixShortCircuitOperator, PrefixOperator};
use crate::parser::statement::Block;

pub trait NativeFunction {
    fn get_name(&self) -> &'static str;
    fn get_parameters(&self) -> &'static [&'static str];
    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeErrorKind>;
}

/// A user defined function together with the frame it was defined in.
pub struct Function {
    pub name: CompactString,
    pub parameters: Vec<CompactString>,
    pub body: Rc<Block>,
    pub closure: Environment,
}

// The closure is left out: it usually contains the function itself.
impl Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Boolean,
    List,
    Function,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::List => write!(f, "list"),
            ValueKind::Function => write!(f, "function"),
        }
    }
}

#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    List(Rc<[Value]>),
    Function(Rc<Function>),
    NativeFunction(Rc<dyn NativeFunction>),
}

impl Value {
    pub fn list(values: Vec<Value>) -> Self {
        Value::List(values.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::List(_) => ValueKind::List,
            Value::Function(_) | Value::NativeFunction(_) => ValueKind::Function,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::NativeFunction(_))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "Integer({v})"),
            Self::Boolean(v) => write!(f, "Boolean({v})"),
            Self::List(values) => f.debug_tuple("List").field(values).finish(),
            Self::Function(fun) => write!(f, "Function({})", fun.name),
            Self::NativeFunction(fun) => write!(f, "NativeFunction({})", fun.get_name()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::List(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Self::Function(fun) => write!(f, "<fn {}>", fun.name),
            Self::NativeFunction(fun) => write!(f, "<native fn {}>", fun.get_name()),
        }
    }
}

// Prefix operators
impl Value {
    pub fn numeric_negate(&self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::Integer(v) => v
                .checked_neg()
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::IntegerOverflow),
            v => Err(RuntimeErrorKind::UnaryTypeMismatch {
                operator: PrefixOperator::Minus,
                operand: v.kind(),
            }),
        }
    }

    pub fn logical_not(&self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::Boolean(v) => Ok(Value::Boolean(!v)),
            v => Err(RuntimeErrorKind::UnaryTypeMismatch {
                operator: PrefixOperator::Not,
                operand: v.kind(),
            }),
        }
    }

    /// Operands of `and`/`or` have to be booleans.
    pub fn expect_logical(
        &self,
        operator: InfixShortCircuitOperator,
    ) -> Result<bool, RuntimeErrorKind> {
        match self {
            Value::Boolean(v) => Ok(*v),
            v => Err(RuntimeErrorKind::LogicalTypeMismatch {
                operator,
                operand: v.kind(),
            }),
        }
    }
}

fn mismatch(operator: InfixOperator, lhs: &Value, rhs: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::BinaryTypeMismatch {
        operator,
        lhs: lhs.kind(),
        rhs: rhs.kind(),
    }
}

// Arithmetic
impl Value {
    fn integer_operands(
        &self,
        other: &Value,
        operator: InfixOperator,
    ) -> Result<(i64, i64), RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => Ok((*lhs, *rhs)),
            (lhs, rhs) => Err(mismatch(operator, lhs, rhs)),
        }
    }

    /// Integer addition or list concatenation.
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs
                .checked_add(*rhs)
                .map(Value::Integer)
                .ok_or(RuntimeErrorKind::IntegerOverflow),
            (Value::List(lhs), Value::List(rhs)) => {
                Ok(Value::List(lhs.iter().chain(rhs.iter()).cloned().collect()))
            }
            (lhs, rhs) => Err(mismatch(InfixOperator::Add, lhs, rhs)),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::Subtract)?;
        lhs.checked_sub(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::Multiply)?;
        lhs.checked_mul(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }

    /// Truncates toward zero.
    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::Divide)?;
        if rhs == 0 {
            return Err(RuntimeErrorKind::DivideByZero);
        }
        lhs.checked_div(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }

    /// The remainder takes the sign of the dividend.
    pub fn modulo(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::Modulo)?;
        if rhs == 0 {
            return Err(RuntimeErrorKind::DivideByZero);
        }
        lhs.checked_rem(rhs)
            .map(Value::Integer)
            .ok_or(RuntimeErrorKind::IntegerOverflow)
    }
}

// Comparison
impl Value {
    pub fn less_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::LessThan)?;
        Ok(Value::Boolean(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::LessThanEqual)?;
        Ok(Value::Boolean(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::GreaterThan)?;
        Ok(Value::Boolean(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.integer_operands(other, InfixOperator::GreaterThanEqual)?;
        Ok(Value::Boolean(lhs >= rhs))
    }
}

// Equality
impl Value {
    /// Structural equality between values of the same kind. Functions are not comparable.
    pub fn is_equal(&self, other: &Value) -> Result<bool, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => Ok(lhs == rhs),
            (Value::Boolean(lhs), Value::Boolean(rhs)) => Ok(lhs == rhs),
            (Value::List(lhs), Value::List(rhs)) => {
                if lhs.len() != rhs.len() {
                    return Ok(false);
                }
                for (l, r) in lhs.iter().zip(rhs.iter()) {
                    if !l.is_equal(r)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (lhs, rhs) => Err(mismatch(InfixOperator::EqualEqual, lhs, rhs)),
        }
    }

    pub fn equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        self.is_equal(other).map(Value::Boolean)
    }

    pub fn not_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        self.is_equal(other)
            .map(|v| Value::Boolean(!v))
            .map_err(|kind| match kind {
                RuntimeErrorKind::BinaryTypeMismatch { lhs, rhs, .. } => {
                    RuntimeErrorKind::BinaryTypeMismatch {
                        operator: InfixOperator::BangEqual,
                        lhs,
                        rhs,
                    }
                }
                kind => kind,
            })
    }
}
