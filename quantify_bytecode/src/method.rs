//! Compiled method representation.
//!
//! A `MethodUnit` is the unit of instrumentation: an ordered, mutable
//! instruction sequence plus the metadata a rewrite has to keep consistent
//! (descriptor, access flags, local-slot and operand-stack budgets).

use crate::descriptor::{self, DescriptorError, MethodDescriptor};
use crate::flags::AccessFlags;
use crate::instruction::Instruction;
use std::sync::Arc;

/// A compiled method body and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodUnit {
    /// Method name.
    pub name: Arc<str>,
    /// Method descriptor, e.g. `(II)I`.
    pub descriptor: Arc<str>,
    /// Access flags.
    pub flags: AccessFlags,
    /// Ordered instruction sequence. Empty for methods without bodies.
    pub instructions: Vec<Instruction>,
    /// Number of local slots the method uses.
    pub max_locals: u16,
    /// Maximum operand-stack depth the method reaches.
    pub max_stack: u16,
}

impl MethodUnit {
    /// Create a method with an empty body.
    pub fn new(
        name: impl Into<Arc<str>>,
        descriptor: impl Into<Arc<str>>,
        flags: AccessFlags,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            flags,
            instructions: Vec::new(),
            max_locals: 0,
            max_stack: 0,
        }
    }

    /// Whether the method carries an instruction sequence to rewrite.
    #[inline]
    pub fn has_code(&self) -> bool {
        !self.instructions.is_empty()
    }

    /// Parse this method's descriptor.
    pub fn parsed_descriptor(&self) -> Result<MethodDescriptor, DescriptorError> {
        descriptor::parse_method_descriptor(&self.descriptor)
    }

    /// Indices of every return-family instruction, in sequence order.
    pub fn return_sites(&self) -> Vec<usize> {
        self.instructions
            .iter()
            .enumerate()
            .filter(|(_, insn)| insn.is_return())
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;

    #[test]
    fn test_has_code() {
        let mut m = MethodUnit::new("f", "()V", AccessFlags::PUBLIC);
        assert!(!m.has_code());
        m.instructions.push(Instruction::Return);
        assert!(m.has_code());
    }

    #[test]
    fn test_return_sites_in_order() {
        let mut m = MethodUnit::new("f", "(I)I", AccessFlags::PUBLIC);
        m.instructions = vec![
            Instruction::ILoad(0),
            Instruction::IReturn,
            Instruction::ILoad(0),
            Instruction::IReturn,
        ];
        assert_eq!(m.return_sites(), vec![1, 3]);
    }

    #[test]
    fn test_parsed_descriptor() {
        let m = MethodUnit::new("add", "(II)I", AccessFlags::PUBLIC | AccessFlags::STATIC);
        let d = m.parsed_descriptor().unwrap();
        assert_eq!(d.params, vec!["I", "I"]);
        assert_eq!(d.ret, "I");
    }
}
