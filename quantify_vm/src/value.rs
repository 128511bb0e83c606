//! Runtime values.

use std::fmt;
use std::sync::Arc;

/// A tagged operand-stack or local-slot value, one variant per JVM value
/// category the instruction set touches.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer-category value.
    Int(i32),
    /// Long value (two slots wide in local storage).
    Long(i64),
    /// Float value.
    Float(f32),
    /// Double value (two slots wide in local storage).
    Double(f64),
    /// String reference.
    Str(Arc<str>),
    /// Null reference.
    Null,
}

impl Value {
    /// Short name of the value's category, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Null => "null",
        }
    }

    /// Whether the value occupies two local slots.
    #[inline]
    pub fn is_wide(&self) -> bool {
        matches!(self, Value::Long(_) | Value::Double(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}L"),
            Value::Float(v) => write!(f, "{v}F"),
            Value::Double(v) => write!(f, "{v}D"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_categories() {
        assert!(Value::Long(0).is_wide());
        assert!(Value::Double(0.0).is_wide());
        assert!(!Value::Int(0).is_wide());
        assert!(!Value::Str("x".into()).is_wide());
    }
}
