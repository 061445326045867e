//! Stack safety for the recursive parts of the pipeline.
//!
//! Parsing, evaluating, formatting and dropping a syntax tree all recurse once
//! per nesting level, so deeply nested input grows the native stack on demand
//! instead of overflowing it.

/// Minimum stack space to keep available.
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, growing the native stack first when it is close to exhausted.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
