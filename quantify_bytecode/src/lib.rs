//! Bytecode data model for the quantify instrumentation engine.
//!
//! This crate defines the representations the engine rewrites:
//!
//! - [`Instruction`] - opcode-plus-operand instruction variants
//! - [`MethodUnit`] - an ordered, mutable instruction sequence with metadata
//! - [`ClassUnit`] - a loaded class and its methods
//! - [`AccessFlags`] - JVM-convention access flag bit set
//! - [`descriptor`] - method-descriptor parsing
//!
//! Branch targets and call sites are symbolic ([`LabelId`], [`MethodRef`]),
//! so instruction sequences stay valid under insertion — the property the
//! probe injector depends on.

#![warn(missing_docs)]

pub mod class;
pub mod descriptor;
pub mod flags;
pub mod instruction;
pub mod method;

pub use class::{ClassUnit, disassemble};
pub use descriptor::{DescriptorError, MethodDescriptor, parse_method_descriptor};
pub use flags::AccessFlags;
pub use instruction::{Constant, Instruction, LabelId, MethodRef};
pub use method::MethodUnit;
