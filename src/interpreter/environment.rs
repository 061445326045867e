use super::{error::RuntimeErrorKind, native, value::Value};
use compact_str::CompactString;
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::Debug,
    rc::{Rc, Weak},
};

/// One scope frame. Cloning shares the frame.
#[derive(Clone)]
pub struct Environment {
    inner: Rc<RefCell<EnvironmentImpl>>,
}

/// A frame that does not keep its bindings alive.
#[derive(Clone)]
pub struct WeakEnvironment {
    inner: Weak<RefCell<EnvironmentImpl>>,
}

struct EnvironmentImpl {
    values: HashMap<CompactString, Value>,
    parent: Option<Environment>,
    captured: bool,
}

impl Environment {
    /// The global frame, with the native functions installed.
    pub fn new() -> Self {
        let environment = Self::empty();
        for function in native::natives() {
            let name = CompactString::from(function.get_name());
            environment
                .inner
                .borrow_mut()
                .values
                .insert(name, Value::NativeFunction(function));
        }
        environment
    }

    /// A frame with no bindings and no parent.
    pub fn empty() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentImpl {
                values: HashMap::new(),
                parent: None,
                captured: false,
            })),
        }
    }

    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentImpl {
                values: HashMap::new(),
                parent: Some(self.clone()),
                captured: false,
            })),
        }
    }

    /// Finds the nearest binding of `name`, walking outward to the global frame.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let parent = {
                let frame = current.inner.borrow();
                if let Some(value) = frame.values.get(name) {
                    return Some(value.clone());
                }
                frame.parent.clone()
            };
            current = parent?;
        }
    }

    /// Binds `name` in this frame only. Bindings are immutable, so a name already
    /// bound in this frame is rejected; outer bindings are shadowed.
    pub fn define(&self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        let mut frame = self.inner.borrow_mut();
        if frame.values.contains_key(name) {
            return Err(RuntimeErrorKind::Redefinition(name.into()));
        }
        frame.values.insert(name.into(), value);
        Ok(())
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.inner.borrow().values.contains_key(name)
    }

    /// Bindings of this frame only, sorted by name.
    pub fn bindings(&self) -> Vec<(CompactString, Value)> {
        let frame = self.inner.borrow();
        let mut bindings: Vec<_> = frame
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        bindings.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        bindings
    }

    /// Number of frames from this one out to the global frame, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.inner.borrow().parent.clone();
        while let Some(environment) = current {
            depth += 1;
            current = environment.inner.borrow().parent.clone();
        }
        depth
    }

    pub fn downgrade(&self) -> WeakEnvironment {
        WeakEnvironment {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Flags the frame as captured by a function defined in it. Returns `true`
    /// only the first time.
    pub fn mark_captured(&self) -> bool {
        let mut frame = self.inner.borrow_mut();
        !std::mem::replace(&mut frame.captured, true)
    }

    /// Drops every binding of this frame. Functions defined in a frame keep that
    /// frame alive, so this is how the global frame gets torn down.
    pub fn clear(&self) {
        let values = std::mem::take(&mut self.inner.borrow_mut().values);
        drop(values);
    }
}

impl WeakEnvironment {
    pub fn upgrade(&self) -> Option<Environment> {
        self.inner.upgrade().map(|inner| Environment { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame = self.inner.borrow();
        let mut names: Vec<&CompactString> = frame.values.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_hold_the_natives() {
        let globals = Environment::new();
        let names: Vec<_> = globals.bindings().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["head", "len", "tail"]);
        assert!(Environment::empty().bindings().is_empty());
    }

    #[test]
    fn lookup_walks_outward() {
        let globals = Environment::empty();
        globals.define("x", Value::Integer(1)).unwrap();
        let inner = globals.new_scope().new_scope();
        assert!(matches!(inner.lookup("x"), Some(Value::Integer(1))));
        assert!(inner.lookup("y").is_none());
        assert_eq!(inner.depth(), 3);
    }

    #[test]
    fn redefinition_is_rejected_but_shadowing_is_not() {
        let globals = Environment::empty();
        globals.define("x", Value::Integer(1)).unwrap();
        assert_eq!(
            globals.define("x", Value::Integer(2)),
            Err(RuntimeErrorKind::Redefinition("x".into()))
        );

        let scope = globals.new_scope();
        scope.define("x", Value::Integer(3)).unwrap();
        assert!(matches!(scope.lookup("x"), Some(Value::Integer(3))));
        assert!(matches!(globals.lookup("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn weak_frames_follow_the_last_strong_handle() {
        let frame = Environment::empty();
        let weak = frame.downgrade();
        assert!(weak.upgrade().is_some());
        drop(frame);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn frames_are_marked_captured_once() {
        let frame = Environment::empty();
        assert!(frame.mark_captured());
        assert!(!frame.mark_captured());
    }
}
