//! Class representation and disassembly.

use crate::flags::AccessFlags;
use crate::method::MethodUnit;
use std::fmt::Write;
use std::sync::Arc;

/// A loaded class: fully-qualified internal name plus its methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassUnit {
    /// Internal (slash-separated) name, e.g. `com/example/Calculator`.
    pub name: Arc<str>,
    /// Class-level access flags.
    pub flags: AccessFlags,
    /// Methods in declaration order.
    pub methods: Vec<MethodUnit>,
}

impl ClassUnit {
    /// Create a class with no methods.
    pub fn new(name: impl Into<Arc<str>>, flags: AccessFlags) -> Self {
        Self {
            name: name.into(),
            flags,
            methods: Vec::new(),
        }
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodUnit> {
        self.methods.iter().find(|m| &*m.name == name)
    }
}

/// Disassemble a method to a string, one instruction per line.
pub fn disassemble(class: &ClassUnit, method: &MethodUnit) -> String {
    let mut output = String::new();

    writeln!(output, "{}.{}{}", class.name, method.name, method.descriptor).unwrap();
    writeln!(
        output,
        "  locals: {}, stack: {}, flags: {:#06x}",
        method.max_locals,
        method.max_stack,
        method.flags.bits()
    )
    .unwrap();

    for (i, insn) in method.instructions.iter().enumerate() {
        writeln!(output, "  {i:4}: {insn}").unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;

    #[test]
    fn test_method_lookup() {
        let mut class = ClassUnit::new("com/example/Foo", AccessFlags::PUBLIC);
        class
            .methods
            .push(MethodUnit::new("bar", "()V", AccessFlags::PUBLIC));
        assert!(class.method("bar").is_some());
        assert!(class.method("baz").is_none());
    }

    #[test]
    fn test_disassemble_lists_instructions() {
        let mut class = ClassUnit::new("com/example/Foo", AccessFlags::PUBLIC);
        let mut m = MethodUnit::new("id", "(I)I", AccessFlags::PUBLIC);
        m.instructions = vec![Instruction::ILoad(0), Instruction::IReturn];
        m.max_locals = 1;
        m.max_stack = 1;
        class.methods.push(m);

        let text = disassemble(&class, class.method("id").unwrap());
        assert!(text.contains("com/example/Foo.id(I)I"));
        assert!(text.contains("iload 0"));
        assert!(text.contains("ireturn"));
    }
}
