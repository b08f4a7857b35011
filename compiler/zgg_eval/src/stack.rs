//! Native stack protection for the tree walker.
//!
//! Scripts can nest expressions and calls deeply; every statement and
//! expression evaluation goes through [`ensure_sufficient_stack`] so the
//! walker grows its stack on demand instead of overflowing. The call depth
//! limit in `RuntimeConfig` bounds how far it may grow.

/// Run `f`, growing the native stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Remaining stack below which a new segment is allocated (128KB).
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each newly allocated segment (2MB).
    const SEGMENT: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// wasm manages its own stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
