//! Logging-backed diagnostics for the pass's best-effort error taxonomy
//! (`spec.md` §7): silent abandonment for routine cases, a warning and
//! whole-list abandonment for a pair that loses its insertion point between
//! the pre-check and rewrite, and an internal-compiler-error abort for
//! invariant violations that indicate a bug in the seed or growth logic
//! rather than an unsupported program.

use std::fmt;

/// A bug in the pass itself, as opposed to an unvectorizable program.
///
/// Carried as a panic payload so it shows up readably in logs and
/// backtraces; this crate never returns it as a `Result` to a caller,
/// since an optimization pass must not fail a compilation (`spec.md` §7).
#[derive(Debug, Clone, thiserror::Error)]
#[error("internal compiler error in slp: {message}")]
pub struct SlpIce {
    pub message: String,
}

impl SlpIce {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Logs an internal invariant violation and aborts the process.
///
/// Call this only when the seed/growth/schedule logic has reached a state
/// that should be structurally impossible (e.g. a cross-block pair that
/// slipped past `ShouldVectorize`'s same-block check). Never call it for an
/// unsupported or unschedulable *program* — those are silently abandoned or
/// logged as warnings instead, per `spec.md` §7.
#[track_caller]
pub fn ice(message: impl fmt::Display) -> ! {
    let err = SlpIce::new(message.to_string());
    log::error!("{err}");
    panic!("{err}");
}

/// Logs that a pair passed its pre-check but `IsTransformable` failed again
/// at rewrite time; the whole list is abandoned, `block` left untouched.
pub fn warn_no_insertion_point(function: &str, block: u32) {
    log::warn!(
        "slp: no valid insertion point for a pair in {function} block {block} at rewrite time, abandoning whole list"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "internal compiler error in slp: broken invariant")]
    fn ice_panics_with_message() {
        ice("broken invariant");
    }

    #[test]
    fn slp_ice_display() {
        let e = SlpIce::new("x");
        assert_eq!(e.to_string(), "internal compiler error in slp: x");
    }
}
