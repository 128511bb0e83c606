//! Per-method eligibility policy.

use quantify_bytecode::{AccessFlags, ClassUnit, MethodUnit};
use std::sync::Arc;

/// Namespace prefixes excluded by default.
///
/// Runtime and management internals are skipped because instrumenting them
/// can recurse through the notification path or destabilize the host; the
/// engine's own namespace is excluded so the sink is never instrumented.
pub const DEFAULT_DENIED_PREFIXES: &[&str] = &[
    "com/intellij",
    "javax/management/remote",
    "com/sun",
    "org/omg",
    "sun/rmi",
    "sun/reflect",
    "quantify",
];

/// Decides which methods receive probes.
///
/// Pure, total predicate: `false` means "skip", never "error".
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    denied_prefixes: Vec<Arc<str>>,
}

impl EligibilityFilter {
    /// Method flags that rule out instrumentation: no rewritable body, or
    /// compiler-generated plumbing.
    const DENIED_METHOD_FLAGS: AccessFlags = AccessFlags::from_bits(
        AccessFlags::NATIVE.bits()
            | AccessFlags::BRIDGE.bits()
            | AccessFlags::SYNTHETIC.bits()
            | AccessFlags::ABSTRACT.bits(),
    );

    /// Build a filter with an ordered list of denied namespace prefixes.
    pub fn new(denied_prefixes: impl IntoIterator<Item = impl Into<Arc<str>>>) -> Self {
        Self {
            denied_prefixes: denied_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `method` of `class` should be instrumented.
    pub fn is_eligible(&self, class: &ClassUnit, method: &MethodUnit) -> bool {
        if method.flags.intersects(Self::DENIED_METHOD_FLAGS) {
            return false;
        }
        if class.flags.contains(AccessFlags::INTERFACE) {
            return false;
        }
        if !method.has_code() {
            return false;
        }
        !self
            .denied_prefixes
            .iter()
            .any(|prefix| class.name.starts_with(&**prefix))
    }
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_PREFIXES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantify_bytecode::Instruction;

    fn class(name: &str) -> ClassUnit {
        ClassUnit::new(name, AccessFlags::PUBLIC)
    }

    fn method_with_body(flags: AccessFlags) -> MethodUnit {
        let mut m = MethodUnit::new("work", "()V", flags);
        m.instructions = vec![Instruction::Return];
        m
    }

    #[test]
    fn test_plain_method_is_eligible() {
        let filter = EligibilityFilter::default();
        assert!(filter.is_eligible(&class("com/example/Foo"), &method_with_body(AccessFlags::PUBLIC)));
    }

    #[test]
    fn test_denied_method_flags() {
        let filter = EligibilityFilter::default();
        let c = class("com/example/Foo");
        for flags in [
            AccessFlags::NATIVE,
            AccessFlags::BRIDGE,
            AccessFlags::SYNTHETIC,
            AccessFlags::ABSTRACT,
        ] {
            assert!(
                !filter.is_eligible(&c, &method_with_body(AccessFlags::PUBLIC | flags)),
                "flags {:#06x} must be rejected",
                flags.bits()
            );
        }
    }

    #[test]
    fn test_interface_class_rejected() {
        let filter = EligibilityFilter::default();
        let c = ClassUnit::new("com/example/Api", AccessFlags::PUBLIC | AccessFlags::INTERFACE);
        assert!(!filter.is_eligible(&c, &method_with_body(AccessFlags::PUBLIC)));
    }

    #[test]
    fn test_bodyless_method_rejected() {
        let filter = EligibilityFilter::default();
        let m = MethodUnit::new("work", "()V", AccessFlags::PUBLIC);
        assert!(!filter.is_eligible(&class("com/example/Foo"), &m));
    }

    #[test]
    fn test_default_denylist_prefixes() {
        let filter = EligibilityFilter::default();
        let m = method_with_body(AccessFlags::PUBLIC);
        for name in [
            "com/intellij/openapi/Editor",
            "javax/management/remote/Connector",
            "com/sun/proxy/Proxy7",
            "org/omg/CORBA/ORB",
            "sun/rmi/transport/Transport",
            "sun/reflect/Reflection",
        ] {
            assert!(!filter.is_eligible(&class(name), &m), "{name} must be denied");
        }
    }

    #[test]
    fn test_denylist_overrides_flags() {
        // A perfectly ordinary method is still skipped inside a denied namespace.
        let filter = EligibilityFilter::default();
        let m = method_with_body(AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL);
        assert!(!filter.is_eligible(&class("com/sun/management/Agent"), &m));
    }

    #[test]
    fn test_self_exclusion() {
        let filter = EligibilityFilter::default();
        let m = method_with_body(AccessFlags::PUBLIC);
        assert!(!filter.is_eligible(&class("quantify/Notifier"), &m));
        assert!(!filter.is_eligible(&class("quantify/Clock"), &m));
    }

    #[test]
    fn test_injected_denylist() {
        let filter = EligibilityFilter::new(["acme/internal"]);
        let m = method_with_body(AccessFlags::PUBLIC);
        assert!(!filter.is_eligible(&class("acme/internal/Secrets"), &m));
        // Prefixes from the default list are not implied.
        assert!(filter.is_eligible(&class("com/sun/Anything"), &m));
    }
}
