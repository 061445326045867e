//! Call depth tracking for the tree walker.
//!
//! Every call to a user defined function pushes a [`CallFrame`]; the push is
//! refused once the configured depth is reached, which turns runaway recursion
//! into a `StackOverflow` runtime error instead of a crash of the host process.
//! Native stack growth is handled separately by [`crate::stack`].

use compact_str::CompactString;

use super::error::RuntimeErrorKind;
use crate::lexer::Span;

/// A single active call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Name of the called function.
    pub name: CompactString,
    /// Where the call was made, not where the function was defined.
    pub call_span: Span,
}

#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Pushes a frame, or fails without pushing once `max_depth` frames are active.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), RuntimeErrorKind> {
        if self.frames.len() >= self.max_depth {
            return Err(RuntimeErrorKind::StackOverflow {
                limit: self.max_depth,
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Snapshot of the active frames, most recent call first.
    pub fn capture(&self) -> Vec<CallFrame> {
        self.frames.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str, start: usize) -> CallFrame {
        CallFrame {
            name: name.into(),
            call_span: Span::new(start, start + 1),
        }
    }

    #[test]
    fn push_is_refused_at_the_limit() {
        let mut stack = CallStack::new(2);
        stack.push(frame("a", 0)).unwrap();
        stack.push(frame("b", 1)).unwrap();
        assert_eq!(
            stack.push(frame("c", 2)),
            Err(RuntimeErrorKind::StackOverflow { limit: 2 })
        );
        assert_eq!(stack.depth(), 2);

        stack.pop();
        assert!(stack.push(frame("c", 2)).is_ok());
    }

    #[test]
    fn capture_lists_innermost_first() {
        let mut stack = CallStack::new(8);
        stack.push(frame("outer", 0)).unwrap();
        stack.push(frame("inner", 4)).unwrap();
        let names: Vec<_> = stack.capture().into_iter().map(|f| f.name).collect();
        assert_eq!(names, ["inner", "outer"]);
    }

    #[test]
    fn zero_depth_refuses_every_call() {
        let mut stack = CallStack::new(0);
        assert!(stack.push(frame("f", 0)).is_err());
        assert_eq!(stack.depth(), 0);
    }
}
