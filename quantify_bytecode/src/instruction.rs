//! Stack-machine instruction representation.
//!
//! Instructions carry their operands directly. Branch targets are symbolic:
//! a branch names a [`LabelId`] and the matching [`Instruction::Label`]
//! marker sits in the instruction sequence itself, so inserting or removing
//! instructions never invalidates control flow. Call sites are symbolic too,
//! via [`MethodRef`], and are resolved by the executing environment, not at
//! rewrite time.

use std::fmt;
use std::sync::Arc;

/// Symbolic label for branch targets.
///
/// Labels are positional markers: the label *is* an instruction in the
/// sequence, and branches refer to it by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub u32);

/// Symbolic reference to a method: owner class, name, and descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Internal (slash-separated) name of the owning class.
    pub owner: Arc<str>,
    /// Method name.
    pub name: Arc<str>,
    /// Method descriptor, e.g. `(ILjava/lang/String;)J`.
    pub descriptor: Arc<str>,
}

impl MethodRef {
    /// Build a reference from borrowed parts.
    pub fn new(owner: &str, name: &str, descriptor: &str) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.descriptor)
    }
}

/// A constant operand for [`Instruction::Ldc`].
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Integer constant.
    Int(i32),
    /// Long constant (two stack words).
    Long(i64),
    /// Float constant.
    Float(f32),
    /// Double constant (two stack words).
    Double(f64),
    /// String constant.
    Str(Arc<str>),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Long(v) => write!(f, "{v}L"),
            Constant::Float(v) => write!(f, "{v}F"),
            Constant::Double(v) => write!(f, "{v}D"),
            Constant::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A single instruction: opcode plus operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// No operation.
    Nop,
    /// Positional marker for branch targets. Executes as a no-op.
    Label(LabelId),

    /// Push a constant onto the operand stack.
    Ldc(Constant),

    /// Load an int from a local slot.
    ILoad(u16),
    /// Load a long from a local slot (occupies two slots).
    LLoad(u16),
    /// Load a float from a local slot.
    FLoad(u16),
    /// Load a double from a local slot (occupies two slots).
    DLoad(u16),
    /// Load a reference from a local slot.
    ALoad(u16),

    /// Store an int into a local slot.
    IStore(u16),
    /// Store a long into a local slot (occupies two slots).
    LStore(u16),
    /// Store a float into a local slot.
    FStore(u16),
    /// Store a double into a local slot (occupies two slots).
    DStore(u16),
    /// Store a reference into a local slot.
    AStore(u16),

    /// Integer add: pops two ints, pushes their sum.
    IAdd,
    /// Long add: pops two longs, pushes their sum.
    LAdd,

    /// Unconditional branch.
    Goto(LabelId),
    /// Pop two ints, branch when the first pushed is >= the second.
    IfICmpGe(LabelId),

    /// Invoke a static method.
    InvokeStatic(MethodRef),
    /// Invoke a virtual method (receiver under the arguments).
    InvokeVirtual(MethodRef),

    /// Return void.
    Return,
    /// Return an int-category value.
    IReturn,
    /// Return a long.
    LReturn,
    /// Return a float.
    FReturn,
    /// Return a double.
    DReturn,
    /// Return a reference.
    AReturn,

    /// Pop a reference and raise it as an exception.
    Athrow,
}

impl Instruction {
    /// Whether this instruction is any member of the return family.
    #[inline]
    pub fn is_return(&self) -> bool {
        matches!(
            self,
            Instruction::Return
                | Instruction::IReturn
                | Instruction::LReturn
                | Instruction::FReturn
                | Instruction::DReturn
                | Instruction::AReturn
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Nop => write!(f, "nop"),
            Instruction::Label(l) => write!(f, "L{}:", l.0),
            Instruction::Ldc(c) => write!(f, "ldc {c}"),
            Instruction::ILoad(s) => write!(f, "iload {s}"),
            Instruction::LLoad(s) => write!(f, "lload {s}"),
            Instruction::FLoad(s) => write!(f, "fload {s}"),
            Instruction::DLoad(s) => write!(f, "dload {s}"),
            Instruction::ALoad(s) => write!(f, "aload {s}"),
            Instruction::IStore(s) => write!(f, "istore {s}"),
            Instruction::LStore(s) => write!(f, "lstore {s}"),
            Instruction::FStore(s) => write!(f, "fstore {s}"),
            Instruction::DStore(s) => write!(f, "dstore {s}"),
            Instruction::AStore(s) => write!(f, "astore {s}"),
            Instruction::IAdd => write!(f, "iadd"),
            Instruction::LAdd => write!(f, "ladd"),
            Instruction::Goto(l) => write!(f, "goto L{}", l.0),
            Instruction::IfICmpGe(l) => write!(f, "if_icmpge L{}", l.0),
            Instruction::InvokeStatic(m) => write!(f, "invokestatic {m}"),
            Instruction::InvokeVirtual(m) => write!(f, "invokevirtual {m}"),
            Instruction::Return => write!(f, "return"),
            Instruction::IReturn => write!(f, "ireturn"),
            Instruction::LReturn => write!(f, "lreturn"),
            Instruction::FReturn => write!(f, "freturn"),
            Instruction::DReturn => write!(f, "dreturn"),
            Instruction::AReturn => write!(f, "areturn"),
            Instruction::Athrow => write!(f, "athrow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_family() {
        assert!(Instruction::Return.is_return());
        assert!(Instruction::IReturn.is_return());
        assert!(Instruction::LReturn.is_return());
        assert!(Instruction::FReturn.is_return());
        assert!(Instruction::DReturn.is_return());
        assert!(Instruction::AReturn.is_return());
        assert!(!Instruction::Athrow.is_return());
        assert!(!Instruction::Goto(LabelId(0)).is_return());
    }

    #[test]
    fn test_display() {
        let call = Instruction::InvokeStatic(MethodRef::new("quantify/Clock", "nanos", "()J"));
        assert_eq!(call.to_string(), "invokestatic quantify/Clock.nanos()J");
        assert_eq!(Instruction::LStore(4).to_string(), "lstore 4");
    }
}
