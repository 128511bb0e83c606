//! Stack interpreter for method units.
//!
//! Executes one method at a time over an operand stack and a local-slot
//! file sized from the method's `max_locals`. Calls to the well-known
//! quantify owners (clock, thread name, notifier) are intrinsics resolved
//! against the environment on every execution; other static calls resolve
//! through the environment's class registry.

use crate::clock;
use crate::value::Value;
use quantify_bytecode::{
    ClassUnit, Constant, Instruction, LabelId, MethodUnit, parse_method_descriptor,
};
use quantify_engine::symbols;
use quantify_engine::{Notifier, ProbeEvent};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;

/// Execution failure.
#[derive(Debug, Clone, Error)]
pub enum VmError {
    /// An instruction popped more values than the stack held.
    #[error("operand stack underflow at pc {pc} in {method}")]
    StackUnderflow {
        /// Instruction index.
        pc: usize,
        /// Method label.
        method: String,
    },
    /// A popped value had the wrong category.
    #[error("expected {expected} but found {found} at pc {pc} in {method}")]
    TypeMismatch {
        /// Category the instruction needed.
        expected: &'static str,
        /// Category that was on the stack.
        found: &'static str,
        /// Instruction index.
        pc: usize,
        /// Method label.
        method: String,
    },
    /// A load touched a slot that holds nothing.
    #[error("local slot {slot} is unset at pc {pc} in {method}")]
    UnsetSlot {
        /// Slot index.
        slot: u16,
        /// Instruction index.
        pc: usize,
        /// Method label.
        method: String,
    },
    /// A branch named a label with no marker in the sequence.
    #[error("unbound label L{0}")]
    UnboundLabel(u32),
    /// A call named a class the environment does not know.
    #[error("unknown class {0}")]
    UnknownClass(String),
    /// A call named a method its owner does not define.
    #[error("unknown method {owner}.{name}")]
    UnknownMethod {
        /// Owner class internal name.
        owner: String,
        /// Method name.
        name: String,
    },
    /// The method descriptor at a call site could not be parsed.
    #[error("malformed descriptor at call site: {0}")]
    BadCallDescriptor(#[from] quantify_bytecode::DescriptorError),
    /// Execution raised an exception; it propagates out of the VM.
    #[error("exception raised: {0}")]
    Thrown(String),
    /// Execution ran off the end of the instruction sequence.
    #[error("fell off the end of {0} without returning")]
    MissingReturn(String),
}

/// Execution environment: the live notifier plus a registry of loaded
/// classes.
pub struct VmEnv {
    notifier: Arc<dyn Notifier>,
    classes: FxHashMap<Arc<str>, ClassUnit>,
}

impl VmEnv {
    /// Create an environment reporting to `notifier`.
    ///
    /// The notifier must be supplied up front: instrumented code resolves it
    /// by well-known reference the moment a probe fires.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            classes: FxHashMap::default(),
        }
    }

    /// Register a loaded class so its methods are callable.
    pub fn register_class(&mut self, class: ClassUnit) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Invoke a static method by owner and name.
    pub fn invoke_static(
        &self,
        owner: &str,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Option<Value>, VmError> {
        let class = self
            .classes
            .get(owner)
            .ok_or_else(|| VmError::UnknownClass(owner.to_string()))?;
        let method = class.method(name).ok_or_else(|| VmError::UnknownMethod {
            owner: owner.to_string(),
            name: name.to_string(),
        })?;
        run_method(self, class, method, args)
    }
}

/// Execute `method` with `args` bound to its leading local slots.
pub fn run_method(
    env: &VmEnv,
    class: &ClassUnit,
    method: &MethodUnit,
    args: Vec<Value>,
) -> Result<Option<Value>, VmError> {
    let label = format!("{}.{}", class.name, method.name);

    // Parameters fill the leading slots; wide values take two.
    let arg_slots: usize = args.iter().map(|v| if v.is_wide() { 2 } else { 1 }).sum();
    let mut locals: Vec<Option<Value>> =
        vec![None; usize::from(method.max_locals).max(arg_slots)];
    let mut slot = 0usize;
    for arg in args {
        let wide = arg.is_wide();
        locals[slot] = Some(arg);
        slot += if wide { 2 } else { 1 };
    }

    let labels = bind_labels(&method.instructions);
    let mut stack: Vec<Value> = Vec::with_capacity(usize::from(method.max_stack));
    let mut pc = 0usize;

    macro_rules! pop {
        () => {
            stack.pop().ok_or_else(|| VmError::StackUnderflow {
                pc,
                method: label.clone(),
            })?
        };
    }

    macro_rules! pop_as {
        ($variant:ident, $expected:literal) => {{
            match pop!() {
                Value::$variant(v) => v,
                other => {
                    return Err(VmError::TypeMismatch {
                        expected: $expected,
                        found: other.kind(),
                        pc,
                        method: label.clone(),
                    });
                }
            }
        }};
    }

    macro_rules! load {
        ($slot:expr) => {{
            let s = $slot;
            locals
                .get(usize::from(s))
                .cloned()
                .flatten()
                .ok_or_else(|| VmError::UnsetSlot {
                    slot: s,
                    pc,
                    method: label.clone(),
                })?
        }};
    }

    macro_rules! store {
        ($slot:expr, $value:expr) => {{
            let s = usize::from($slot);
            let value = $value;
            let wide = value.is_wide();
            if locals.len() <= s + usize::from(wide) {
                locals.resize(s + 1 + usize::from(wide), None);
            }
            locals[s] = Some(value);
            // The second half of a wide value is unusable on its own.
            if wide {
                locals[s + 1] = None;
            }
        }};
    }

    loop {
        let Some(insn) = method.instructions.get(pc) else {
            return Err(VmError::MissingReturn(label.clone()));
        };

        match insn {
            Instruction::Nop | Instruction::Label(_) => {}

            Instruction::Ldc(constant) => stack.push(match constant {
                Constant::Int(v) => Value::Int(*v),
                Constant::Long(v) => Value::Long(*v),
                Constant::Float(v) => Value::Float(*v),
                Constant::Double(v) => Value::Double(*v),
                Constant::Str(s) => Value::Str(Arc::clone(s)),
            }),

            Instruction::ILoad(s)
            | Instruction::LLoad(s)
            | Instruction::FLoad(s)
            | Instruction::DLoad(s)
            | Instruction::ALoad(s) => {
                let value = load!(*s);
                stack.push(value);
            }

            Instruction::IStore(s)
            | Instruction::LStore(s)
            | Instruction::FStore(s)
            | Instruction::DStore(s)
            | Instruction::AStore(s) => {
                let value = pop!();
                store!(*s, value);
            }

            Instruction::IAdd => {
                let b = pop_as!(Int, "int");
                let a = pop_as!(Int, "int");
                stack.push(Value::Int(a.wrapping_add(b)));
            }
            Instruction::LAdd => {
                let b = pop_as!(Long, "long");
                let a = pop_as!(Long, "long");
                stack.push(Value::Long(a.wrapping_add(b)));
            }

            Instruction::Goto(target) => {
                pc = branch(&labels, *target)?;
                continue;
            }
            Instruction::IfICmpGe(target) => {
                let b = pop_as!(Int, "int");
                let a = pop_as!(Int, "int");
                if a >= b {
                    pc = branch(&labels, *target)?;
                    continue;
                }
            }

            Instruction::InvokeStatic(callee) => {
                if let Some(result) = invoke_intrinsic(env, callee, &mut stack, pc, &label)? {
                    if let Some(value) = result {
                        stack.push(value);
                    }
                } else {
                    let descriptor = parse_method_descriptor(&callee.descriptor)?;
                    let args = pop_args(descriptor.params.len(), &mut stack, pc, &label)?;
                    if let Some(value) = env.invoke_static(&callee.owner, &callee.name, args)? {
                        stack.push(value);
                    }
                }
            }
            Instruction::InvokeVirtual(callee) => {
                // Receiver sits under the arguments and becomes slot 0.
                let descriptor = parse_method_descriptor(&callee.descriptor)?;
                let mut args = pop_args(descriptor.params.len(), &mut stack, pc, &label)?;
                let receiver = pop!();
                args.insert(0, receiver);
                if let Some(value) = env.invoke_static(&callee.owner, &callee.name, args)? {
                    stack.push(value);
                }
            }

            Instruction::Return => return Ok(None),
            Instruction::IReturn => return Ok(Some(Value::Int(pop_as!(Int, "int")))),
            Instruction::LReturn => return Ok(Some(Value::Long(pop_as!(Long, "long")))),
            Instruction::FReturn => return Ok(Some(Value::Float(pop_as!(Float, "float")))),
            Instruction::DReturn => return Ok(Some(Value::Double(pop_as!(Double, "double")))),
            Instruction::AReturn => {
                let value = pop!();
                return Ok(Some(value));
            }

            Instruction::Athrow => {
                let message = match pop!() {
                    Value::Str(s) => s.to_string(),
                    other => other.to_string(),
                };
                return Err(VmError::Thrown(message));
            }
        }

        pc += 1;
    }
}

/// Map every label marker to its instruction index.
fn bind_labels(instructions: &[Instruction]) -> FxHashMap<LabelId, usize> {
    instructions
        .iter()
        .enumerate()
        .filter_map(|(i, insn)| match insn {
            Instruction::Label(id) => Some((*id, i)),
            _ => None,
        })
        .collect()
}

fn branch(labels: &FxHashMap<LabelId, usize>, target: LabelId) -> Result<usize, VmError> {
    labels
        .get(&target)
        .copied()
        .ok_or(VmError::UnboundLabel(target.0))
}

/// Pop `count` call arguments, restoring push order.
fn pop_args(
    count: usize,
    stack: &mut Vec<Value>,
    pc: usize,
    method: &str,
) -> Result<Vec<Value>, VmError> {
    if stack.len() < count {
        return Err(VmError::StackUnderflow {
            pc,
            method: method.to_string(),
        });
    }
    Ok(stack.split_off(stack.len() - count))
}

/// Handle calls to the well-known quantify owners.
///
/// Returns `None` when the callee is not an intrinsic, `Some(result)` when
/// it was handled. The notifier is resolved from the environment here, at
/// execution time, on every call.
fn invoke_intrinsic(
    env: &VmEnv,
    callee: &quantify_bytecode::MethodRef,
    stack: &mut Vec<Value>,
    pc: usize,
    method: &str,
) -> Result<Option<Option<Value>>, VmError> {
    match &*callee.owner {
        symbols::CLOCK_OWNER => Ok(Some(Some(Value::Long(clock::nanos())))),

        symbols::THREAD_OWNER => {
            let name: Arc<str> = std::thread::current().name().unwrap_or("unnamed").into();
            Ok(Some(Some(Value::Str(name))))
        }

        symbols::NOTIFIER_OWNER => {
            let mut args = pop_args(6, stack, pc, method)?;
            // Popped as pushed: run id, class, signature, thread, start, end.
            let end = expect_long(args.pop(), pc, method)?;
            let start = expect_long(args.pop(), pc, method)?;
            let thread_name = expect_str(args.pop(), pc, method)?;
            let method_signature = expect_str(args.pop(), pc, method)?;
            let class_name = expect_str(args.pop(), pc, method)?;
            let run_id = expect_str(args.pop(), pc, method)?;

            env.notifier.notify(&ProbeEvent {
                run_id,
                class_name,
                method_signature,
                thread_name,
                start_nanos: start,
                end_nanos: end,
            });
            Ok(Some(None))
        }

        _ => Ok(None),
    }
}

fn expect_long(value: Option<Value>, pc: usize, method: &str) -> Result<i64, VmError> {
    match value {
        Some(Value::Long(v)) => Ok(v),
        Some(other) => Err(VmError::TypeMismatch {
            expected: "long",
            found: other.kind(),
            pc,
            method: method.to_string(),
        }),
        None => Err(VmError::StackUnderflow {
            pc,
            method: method.to_string(),
        }),
    }
}

fn expect_str(value: Option<Value>, pc: usize, method: &str) -> Result<Arc<str>, VmError> {
    match value {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(VmError::TypeMismatch {
            expected: "string",
            found: other.kind(),
            pc,
            method: method.to_string(),
        }),
        None => Err(VmError::StackUnderflow {
            pc,
            method: method.to_string(),
        }),
    }
}
