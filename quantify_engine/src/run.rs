//! Run identity.

use std::fmt;
use uuid::Uuid;

/// Identifier for one profiling session.
///
/// Generated once per injector instance and embedded as a literal constant
/// into every notify call that instance emits, correlating all events from
/// a single attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh run identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        RunId::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
