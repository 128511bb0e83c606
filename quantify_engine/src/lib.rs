//! Load-time method timing instrumentation engine.
//!
//! Rewrites compiled methods so that each invocation measures its own
//! wall-clock duration and reports it to a notification sink, without
//! changing observable behavior.
//!
//! # Components
//!
//! - [`EligibilityFilter`] - pure predicate deciding which methods get probes
//! - [`resolve_signature`] - stable human-readable method label
//! - [`ProbeInjector`] - the rewrite: entry timestamp capture plus an exit
//!   block before every normal return
//! - [`Notifier`] - the sink contract probes report through
//! - [`instrument_class`] - loader-boundary helper gluing the above together
//!
//! # Flow
//!
//! ```ignore
//! let filter = EligibilityFilter::default();
//! let injector = ProbeInjector::new(RunId::new());
//!
//! // Per loaded class, from the load-time hook:
//! let rewritten = instrument_class(&filter, &injector, &class);
//! ```
//!
//! The rewritten methods call the sink through the well-known references in
//! [`symbols`]; the executing environment resolves those against a live
//! [`Notifier`] on every execution. Transformation is single-threaded per
//! method at load time; instrumented execution is fully concurrent, with all
//! probe state in per-invocation local slots.

#![warn(missing_docs)]

pub mod error;
pub mod filter;
pub mod injector;
pub mod loader;
pub mod run;
pub mod signature;
pub mod sink;
pub mod slots;
pub mod symbols;

pub use error::InstrumentError;
pub use filter::{DEFAULT_DENIED_PREFIXES, EligibilityFilter};
pub use injector::{ProbeInjector, SAFETY_MARGIN};
pub use loader::instrument_class;
pub use run::RunId;
pub use signature::resolve_signature;
pub use sink::{LogSink, Notifier, ProbeEvent, RecordingSink};
pub use slots::SlotAllocator;
