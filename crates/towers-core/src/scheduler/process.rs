//! # Process Contract
//!
//! A process is a resumable, single-step state machine with a declared
//! RAM cost. The scheduler calls [`Process::tick`] once per pulse while the
//! process is active; returning `true` retires it.
//!
//! There is no explicit yield: a process that returns `false` simply waits
//! for its next pulse. A tick must never block.

use crate::types::ProcessId;

/// The execution contract every schedulable unit of work implements.
///
/// `C` is the state the process reads and mutates (the puzzle, in
/// practice). It is lent to the process only for the duration of a tick.
pub trait Process<C> {
    /// Result handed to the completion callback on retirement.
    type Output;

    /// Unique identity; two processes with the same id cannot be
    /// registered at the same time.
    fn process_id(&self) -> &ProcessId;

    /// Static RAM cost, reserved for the whole active lifetime.
    fn ram_requirement(&self) -> u64;

    /// Advance by one observable step. Returns `true` when done.
    fn tick(&mut self, ctx: &mut C) -> bool;

    /// Current result. Read once, after the final tick.
    fn return_value(&self) -> Self::Output;
}

/// Alternating inspect/apply micro-cycle shared by most processes.
///
/// Inspect beats read state only; apply beats perform at most one
/// mutation and advance the process cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Beat {
    #[default]
    Inspect,
    Apply,
}

impl Beat {
    /// The beat that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Beat::Inspect => Beat::Apply,
            Beat::Apply => Beat::Inspect,
        }
    }

    /// Flip in place and return the beat that was current.
    pub fn advance(&mut self) -> Self {
        let current = *self;
        *self = current.next();
        current
    }
}
