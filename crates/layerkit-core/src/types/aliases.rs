//! Type aliases for sinks and shared flags.
//!
//! Generation streams its output through caller-supplied closures. The
//! aliases here give those closure types names, so generator signatures stay
//! readable and every crate spells them the same way.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use layerkit_core::types::*;
//!
//! let mut seen = Vec::new();
//! let sink: Sink<'_, String> = observe(|line: &String| seen.push(line.clone()));
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// =============================================================================
// SINK CONTROL
// =============================================================================

/// Returned by every sink to continue or stop the operation feeding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkControl {
    /// Keep going
    #[default]
    Continue,
    /// Abort as soon as possible
    Stop,
}

impl SinkControl {
    /// True when the sink asked to stop
    pub fn is_stop(self) -> bool {
        self == SinkControl::Stop
    }
}

// =============================================================================
// CALLBACK TYPES
// =============================================================================

/// A single-threaded sink receiving borrowed items in emission order.
///
/// Not `Send`: sinks are always invoked on the calling thread.
pub type Sink<'a, T> = Box<dyn FnMut(&T) -> SinkControl + 'a>;

/// A sink receiving human-readable progress messages.
pub type ProgressSink<'a> = Box<dyn FnMut(&str) -> SinkControl + 'a>;

/// A thread-safe cancellation flag polled between units of work.
pub type CancelFlag = Arc<AtomicBool>;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Wrap a closure that never stops into a [`Sink`].
pub fn observe<'a, T: ?Sized + 'a>(mut f: impl FnMut(&T) + 'a) -> Box<dyn FnMut(&T) -> SinkControl + 'a> {
    Box::new(move |item: &T| {
        f(item);
        SinkControl::Continue
    })
}
