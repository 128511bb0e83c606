//! Execution environment for instrumented method units.
//!
//! A small stack interpreter plus the intrinsics instrumented code calls:
//! the monotonic clock, the current-thread-name query, and the notification
//! sink, each resolved by well-known reference at execution time. Exists so
//! probes injected by `quantify_engine` actually fire.

#![warn(missing_docs)]

pub mod clock;
pub mod interp;
pub mod value;

pub use interp::{VmEnv, VmError, run_method};
pub use value::Value;
