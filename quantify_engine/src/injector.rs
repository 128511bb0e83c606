//! Probe injection.
//!
//! The injector rewrites a method's instruction sequence so that every
//! invocation captures an entry timestamp and, at every normal exit, an exit
//! timestamp plus the executing thread's name, then reports the measurement
//! through the well-known notifier reference.
//!
//! The exit sequence is duplicated at every return site instead of routing
//! all returns through one shared epilogue: no control flow is restructured
//! and no handler ranges move, at the cost of code size proportional to the
//! number of returns.
//!
//! Exception-propagating exits are not instrumented: a throwing invocation
//! records its entry timestamp but never emits an event. Timing data for
//! that invocation is silently absent, never corrupted.

use crate::error::InstrumentError;
use crate::run::RunId;
use crate::signature::resolve_signature;
use crate::slots::SlotAllocator;
use crate::symbols;
use quantify_bytecode::{ClassUnit, Constant, Instruction, MethodUnit};
use smallvec::SmallVec;
use std::sync::Arc;

/// Headroom added to both `max_locals` and `max_stack`, covering the probe
/// temporaries and the operand stack needed to stage the notify arguments.
pub const SAFETY_MARGIN: u16 = 20;

/// Instructions in one exit block.
const EXIT_BLOCK_LEN: usize = 11;

/// Rewrites eligible methods with entry/exit timing probes.
///
/// One injector corresponds to one profiling session: its [`RunId`] is
/// embedded as a literal constant in every notify call it emits.
///
/// `instrument` is a pure transformation; running it twice over its own
/// output is out of contract (slot allocation would double-count) and is
/// not detected.
#[derive(Debug)]
pub struct ProbeInjector {
    run_id: Arc<str>,
}

impl ProbeInjector {
    /// Create an injector for one profiling session.
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id: run_id.to_string().into(),
        }
    }

    /// The session identifier this injector embeds.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Produce an instrumented copy of `method`.
    ///
    /// On success every invariant holds: the sequence starts with the entry
    /// block, each original return is immediately preceded by its own exit
    /// block and is otherwise unmoved relative to its neighbors, and the
    /// slot and stack budgets grew by [`SAFETY_MARGIN`]. On failure the
    /// input is untouched and no partial rewrite escapes.
    ///
    /// A method with zero return sites gets an entry probe and no exit
    /// probe; that asymmetry is accepted, not an error.
    pub fn instrument(
        &self,
        class: &ClassUnit,
        method: &MethodUnit,
    ) -> Result<MethodUnit, InstrumentError> {
        if !method.has_code() {
            return Err(InstrumentError::NoCode {
                class: class.name.to_string(),
                method: method.name.to_string(),
            });
        }

        let signature: Arc<str> = resolve_signature(method)
            .map_err(|source| InstrumentError::BadDescriptor {
                class: class.name.to_string(),
                method: method.name.to_string(),
                source,
            })?
            .into();

        let slot_overflow = || InstrumentError::SlotOverflow {
            class: class.name.to_string(),
            method: method.name.to_string(),
        };

        // Timestamps are longs and need wide slots; the thread-name scratch
        // slot is a single-width reference, reused per site because each
        // exit block is an independent instance of the sequence.
        let mut slots = SlotAllocator::new(method.max_locals);
        let start_slot = slots.alloc_wide().ok_or_else(slot_overflow)?;
        let end_slot = slots.alloc_wide().ok_or_else(slot_overflow)?;
        let scratch_slot = slots.alloc().ok_or_else(slot_overflow)?;

        let max_locals = method
            .max_locals
            .checked_add(SAFETY_MARGIN)
            .ok_or_else(slot_overflow)?;
        let max_stack = method
            .max_stack
            .checked_add(SAFETY_MARGIN)
            .ok_or_else(slot_overflow)?;
        debug_assert!(slots.high_water() <= max_locals);

        let return_count = method.return_sites().len();
        let mut instructions =
            Vec::with_capacity(method.instructions.len() + 2 + return_count * EXIT_BLOCK_LEN);

        // Entry block: capture the start timestamp before the first
        // original instruction.
        instructions.push(Instruction::InvokeStatic(symbols::clock_ref()));
        instructions.push(Instruction::LStore(start_slot));

        for insn in &method.instructions {
            if insn.is_return() {
                instructions.extend(self.exit_block(
                    &class.name,
                    &signature,
                    start_slot,
                    end_slot,
                    scratch_slot,
                ));
            }
            instructions.push(insn.clone());
        }

        Ok(MethodUnit {
            name: Arc::clone(&method.name),
            descriptor: Arc::clone(&method.descriptor),
            flags: method.flags,
            instructions,
            max_locals,
            max_stack,
        })
    }

    /// The exit sequence inserted immediately before one return site:
    /// capture the end timestamp and thread name, then stage the notify
    /// arguments (run id, class, signature, thread, start, end) and invoke
    /// the sink through its well-known reference.
    fn exit_block(
        &self,
        class_name: &Arc<str>,
        signature: &Arc<str>,
        start_slot: u16,
        end_slot: u16,
        scratch_slot: u16,
    ) -> SmallVec<[Instruction; EXIT_BLOCK_LEN]> {
        let mut block = SmallVec::new();
        block.push(Instruction::InvokeStatic(symbols::clock_ref()));
        block.push(Instruction::LStore(end_slot));
        block.push(Instruction::InvokeStatic(symbols::thread_name_ref()));
        block.push(Instruction::AStore(scratch_slot));
        block.push(Instruction::Ldc(Constant::Str(Arc::clone(&self.run_id))));
        block.push(Instruction::Ldc(Constant::Str(Arc::clone(class_name))));
        block.push(Instruction::Ldc(Constant::Str(Arc::clone(signature))));
        block.push(Instruction::ALoad(scratch_slot));
        block.push(Instruction::LLoad(start_slot));
        block.push(Instruction::LLoad(end_slot));
        block.push(Instruction::InvokeStatic(symbols::notify_ref()));
        block
    }
}
