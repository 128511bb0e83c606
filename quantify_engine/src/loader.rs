//! Loader boundary.
//!
//! The class-loading hook hands the engine one class at a time; the engine
//! hands back a class whose eligible methods carry probes. A method that
//! cannot be instrumented stays original — the failure is visible only as
//! "this method was not instrumented", never as corrupted code.

use crate::filter::EligibilityFilter;
use crate::injector::ProbeInjector;
use quantify_bytecode::ClassUnit;

/// Instrument every eligible method of `class`, leaving the rest untouched.
///
/// Transformation runs once per method at load time, serialized by the host
/// loading mechanism; nothing here needs locking.
pub fn instrument_class(
    filter: &EligibilityFilter,
    injector: &ProbeInjector,
    class: &ClassUnit,
) -> ClassUnit {
    let mut out = ClassUnit::new(class.name.clone(), class.flags);
    out.methods.reserve(class.methods.len());

    for method in &class.methods {
        if !filter.is_eligible(class, method) {
            log::trace!("skipping ineligible {}.{}", class.name, method.name);
            out.methods.push(method.clone());
            continue;
        }
        match injector.instrument(class, method) {
            Ok(instrumented) => {
                log::debug!("instrumented {}.{}{}", class.name, method.name, method.descriptor);
                out.methods.push(instrumented);
            }
            Err(err) => {
                log::warn!("leaving {}.{} uninstrumented: {err}", class.name, method.name);
                out.methods.push(method.clone());
            }
        }
    }

    out
}
