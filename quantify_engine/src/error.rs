//! Instrumentation failure types.

use quantify_bytecode::DescriptorError;
use thiserror::Error;

/// Why a method could not be instrumented.
///
/// A failure means the method was left untouched; the injector never commits
/// a partial rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    /// The method carries no instruction sequence to rewrite.
    #[error("method {class}.{method} has no instruction sequence")]
    NoCode {
        /// Owning class internal name.
        class: String,
        /// Method name.
        method: String,
    },

    /// The method descriptor could not be parsed, so no signature label
    /// could be produced.
    #[error("method {class}.{method} has a malformed descriptor")]
    BadDescriptor {
        /// Owning class internal name.
        class: String,
        /// Method name.
        method: String,
        /// Underlying parse failure.
        #[source]
        source: DescriptorError,
    },

    /// Allocating probe slots would push the local-slot count past the
    /// representable range.
    #[error("local slot allocation overflowed in {class}.{method}")]
    SlotOverflow {
        /// Owning class internal name.
        class: String,
        /// Method name.
        method: String,
    },
}
