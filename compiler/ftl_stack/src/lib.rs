//! Stack safety for deeply nested templates.
//!
//! Both the parser and the interpreter recurse once per nesting level of the
//! template source (parenthesised expressions, nested `#if`/`#list` blocks,
//! macro calls). A template generated by a tool can nest far deeper than a
//! human would write, so every recursive entry point goes through
//! [`ensure_sufficient_stack`].
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: passthrough.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// ```text
/// fn visit(&mut self, range: ElementRange) -> Result<Flow, TemplateError> {
///     ensure_sufficient_stack(|| self.visit_children(range))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version, calls `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_block_depth() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        // Far deeper than the default main-thread stack allows.
        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn passes_result_through() {
        let result: Result<u32, &str> = ensure_sufficient_stack(|| Err("stop"));
        assert_eq!(result, Err("stop"));
    }
}
