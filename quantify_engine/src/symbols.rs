//! Well-known references injected probes call through.
//!
//! Probe call sites are symbolic: the rewritten bytecode names these owners
//! and descriptors, and the executing environment resolves them on every
//! execution. Nothing about the live sink is captured at rewrite time, so
//! the sink only has to be initialized before instrumented code first runs.

use quantify_bytecode::MethodRef;

/// Owner of the monotonic high-resolution clock intrinsic.
pub const CLOCK_OWNER: &str = "quantify/Clock";
/// Clock method name.
pub const CLOCK_METHOD: &str = "nanos";
/// Clock descriptor: no arguments, returns a long.
pub const CLOCK_DESCRIPTOR: &str = "()J";

/// Owner of the current-thread-name intrinsic.
pub const THREAD_OWNER: &str = "quantify/Thread";
/// Thread-name method name.
pub const THREAD_METHOD: &str = "currentName";
/// Thread-name descriptor: no arguments, returns a string.
pub const THREAD_DESCRIPTOR: &str = "()Ljava/lang/String;";

/// Owner of the notification sink.
pub const NOTIFIER_OWNER: &str = "quantify/Notifier";
/// Notify method name.
pub const NOTIFIER_METHOD: &str = "notify";
/// Notify descriptor: run id, class name, signature, thread name (strings),
/// then start and end timestamps (longs).
pub const NOTIFIER_DESCRIPTOR: &str =
    "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;JJ)V";

/// Reference to the clock intrinsic.
pub fn clock_ref() -> MethodRef {
    MethodRef::new(CLOCK_OWNER, CLOCK_METHOD, CLOCK_DESCRIPTOR)
}

/// Reference to the thread-name intrinsic.
pub fn thread_name_ref() -> MethodRef {
    MethodRef::new(THREAD_OWNER, THREAD_METHOD, THREAD_DESCRIPTOR)
}

/// Reference to the notification sink's notify operation.
pub fn notify_ref() -> MethodRef {
    MethodRef::new(NOTIFIER_OWNER, NOTIFIER_METHOD, NOTIFIER_DESCRIPTOR)
}
