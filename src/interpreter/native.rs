use std::rc::Rc;

use super::error::RuntimeErrorKind;
use super::value::{NativeFunction, Value, ValueKind};

/// Every native function, in the order they are bound into the global frame.
pub fn natives() -> Vec<Rc<dyn NativeFunction>> {
    vec![Rc::new(NativeLen), Rc::new(NativeHead), Rc::new(NativeTail)]
}

fn expect_list<'a>(
    name: &'static str,
    arguments: &'a [Value],
) -> Result<&'a [Value], RuntimeErrorKind> {
    let argument = arguments
        .first()
        .ok_or(RuntimeErrorKind::InvalidArgumentCount {
            actual: arguments.len(),
            expected: 1,
        })?;
    argument
        .as_list()
        .ok_or(RuntimeErrorKind::InvalidNativeArgument {
            name,
            expected: ValueKind::List,
            actual: argument.kind(),
        })
}

#[derive(Debug)]
pub struct NativeLen;

impl NativeFunction for NativeLen {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn get_parameters(&self) -> &'static [&'static str] {
        &["list"]
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
        let values = expect_list(self.get_name(), arguments)?;
        i64::try_from(values.len())
            .map(Value::Integer)
            .map_err(|_| RuntimeErrorKind::IntegerOverflow)
    }
}

#[derive(Debug)]
pub struct NativeHead;

impl NativeFunction for NativeHead {
    fn get_name(&self) -> &'static str {
        "head"
    }

    fn get_parameters(&self) -> &'static [&'static str] {
        &["list"]
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
        let values = expect_list(self.get_name(), arguments)?;
        values
            .first()
            .cloned()
            .ok_or(RuntimeErrorKind::EmptyList(self.get_name()))
    }
}

/// Everything but the first element, as a new list.
#[derive(Debug)]
pub struct NativeTail;

impl NativeFunction for NativeTail {
    fn get_name(&self) -> &'static str {
        "tail"
    }

    fn get_parameters(&self) -> &'static [&'static str] {
        &["list"]
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeErrorKind> {
        let values = expect_list(self.get_name(), arguments)?;
        match values.split_first() {
            Some((_, rest)) => Ok(Value::List(rest.into())),
            None => Err(RuntimeErrorKind::EmptyList(self.get_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[i64]) -> Value {
        Value::list(values.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn len_counts_elements() {
        let result = NativeLen.call(&[list(&[1, 2, 3])]).unwrap();
        assert_eq!(result.as_integer(), Some(3));
    }

    #[test]
    fn head_and_tail_split_a_list() {
        let values = list(&[4, 5, 6]);
        let head = NativeHead.call(&[values.clone()]).unwrap();
        let tail = NativeTail.call(&[values]).unwrap();
        assert_eq!(head.as_integer(), Some(4));
        assert_eq!(format!("{tail}"), "[5, 6]");
    }

    #[test]
    fn head_of_empty_list_fails() {
        let result = NativeHead.call(&[list(&[])]);
        assert_eq!(result.unwrap_err(), RuntimeErrorKind::EmptyList("head"));
    }

    #[test]
    fn len_rejects_integers() {
        let result = NativeLen.call(&[Value::Integer(3)]);
        assert_eq!(
            result.unwrap_err(),
            RuntimeErrorKind::InvalidNativeArgument {
                name: "len",
                expected: ValueKind::List,
                actual: ValueKind::Integer,
            }
        );
    }
}
