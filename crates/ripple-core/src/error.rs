//! Error types shared across the Ripple workspace.
//!
//! Elaboration errors come from building the [`NetModel`](crate::NetModel);
//! action errors are raised by user update logic at tick time and are
//! carried to the caller unmodified.

use thiserror::Error;

use crate::id::{NetId, SignalId};

/// Errors from freezing signals and connections into a net model.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ElaborationError {
    /// A connection or footprint referenced a signal that was never added.
    #[error("unknown signal {signal}")]
    UnknownSignal {
        /// The missing signal.
        signal: SignalId,
    },
    /// Two connected signals declare different widths.
    #[error("signal '{signal}' ({found} bits) connected to net '{net}' ({expected} bits)")]
    WidthMismatch {
        /// Name of the net being joined.
        net: String,
        /// Width of the net.
        expected: u32,
        /// Name of the offending signal.
        signal: String,
        /// Width of the offending signal.
        found: u32,
    },
    /// A signal width is zero or wider than 64 bits.
    #[error("signal '{signal}' has unsupported width {width} (must be 1..=64)")]
    InvalidWidth {
        /// Name of the signal.
        signal: String,
        /// The declared width.
        width: u32,
    },
    /// Two signals share a name.
    #[error("signal name '{name}' declared twice")]
    DuplicateSignal {
        /// The duplicated name.
        name: String,
    },
}

/// Errors raised by an action while it runs.
///
/// These are user-level runtime failures. The tick executor never
/// produces scheduling errors at tick time; it only forwards these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The action read a net outside its declared read set.
    #[error("read of undeclared net {net}")]
    UndeclaredRead {
        /// The net that was read.
        net: NetId,
    },
    /// The action wrote a net outside its declared write set.
    #[error("write to undeclared net {net}")]
    UndeclaredWrite {
        /// The net that was written.
        net: NetId,
    },
    /// The action's own logic failed.
    #[error("execution failed: {reason}")]
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A method-call guard could not be evaluated.
    #[error("guard evaluation failed: {reason}")]
    GuardFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A user-level runtime assertion did not hold.
    #[error("assertion failed: {message}")]
    AssertionFailed {
        /// Description of the violated assertion.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_entity() {
        let e = ActionError::UndeclaredWrite { net: NetId(4) };
        assert_eq!(e.to_string(), "write to undeclared net n4");

        let e = ElaborationError::WidthMismatch {
            net: "bus".into(),
            expected: 8,
            signal: "tap".into(),
            found: 4,
        };
        assert_eq!(
            e.to_string(),
            "signal 'tap' (4 bits) connected to net 'bus' (8 bits)"
        );
    }
}
