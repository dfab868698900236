// The MIT License (MIT)

// Copyright (c) 2015 Rustcc Developers

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The atomic actions a coroutine may request of the scheduler.

use std::fmt;

use crate::coroutine::Coroutine;
use crate::identity::{CoroutineId, MutexId};
use crate::mutex::Mutex;

/// One atomic action popped off a coroutine's instruction stream.
///
/// `Spawn` owns the child [`Coroutine`] outright: the instant it is popped
/// by the driver, ownership of the child transfers into the scheduler's live
/// set. Every other variant only needs ids.
pub enum Instruction {
    /// Pure CPU work for `n` nanoseconds.
    CpuBurn(u64),
    /// Blocking I/O for `n` nanoseconds; the CPU is released while it waits.
    Io(u64),
    /// Attempt to acquire `mutex`. Constant 1ns cost.
    Lock(MutexId),
    /// Release `mutex`. Constant 1ns cost; the actual release is deferred by 1ns.
    Unlock(MutexId),
    /// Spawn `child`, which enters the live set immediately. Constant 1ns cost.
    Spawn(Box<Coroutine>),
    /// Synthetic instruction emitted as the last one of every coroutine's stream.
    Terminate(CoroutineId),
}

/// A description of an [`Instruction`] that doesn't own a child coroutine,
/// safe to log, record in a monitor trace, or compare in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    CpuBurn(u64),
    Io(u64),
    Lock(MutexId),
    Unlock(MutexId),
    Spawn(CoroutineId),
    Terminate(CoroutineId),
}

impl Instruction {
    pub fn cpu_burn(ns: u64) -> Instruction {
        Instruction::CpuBurn(ns)
    }

    pub fn io(ns: u64) -> Instruction {
        Instruction::Io(ns)
    }

    pub fn lock(mutex: Mutex) -> Instruction {
        Instruction::Lock(mutex.id())
    }

    pub fn unlock(mutex: Mutex) -> Instruction {
        Instruction::Unlock(mutex.id())
    }

    pub fn spawn(child: Coroutine) -> Instruction {
        Instruction::Spawn(Box::new(child))
    }

    pub(crate) fn terminate(coro: CoroutineId) -> Instruction {
        Instruction::Terminate(coro)
    }

    /// Simulated-nanosecond cost of this instruction.
    pub fn duration(&self) -> u64 {
        match self {
            Instruction::CpuBurn(n) | Instruction::Io(n) => *n,
            Instruction::Lock(_) | Instruction::Unlock(_) | Instruction::Terminate(_) => 1,
            Instruction::Spawn(_) => 1,
        }
    }

    /// A copyable description of this instruction, for logging and tracing.
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::CpuBurn(n) => InstructionKind::CpuBurn(*n),
            Instruction::Io(n) => InstructionKind::Io(*n),
            Instruction::Lock(m) => InstructionKind::Lock(*m),
            Instruction::Unlock(m) => InstructionKind::Unlock(*m),
            Instruction::Spawn(child) => InstructionKind::Spawn(child.id()),
            Instruction::Terminate(coro) => InstructionKind::Terminate(*coro),
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::CpuBurn(n) => write!(f, "CpuBurn({})", n),
            InstructionKind::Io(n) => write!(f, "Io({})", n),
            InstructionKind::Lock(m) => write!(f, "Lock({})", m),
            InstructionKind::Unlock(m) => write!(f, "Unlock({})", m),
            InstructionKind::Spawn(c) => write!(f, "Spawn({})", c),
            InstructionKind::Terminate(c) => write!(f, "Terminate({})", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(Instruction::cpu_burn(5).duration(), 5);
        assert_eq!(Instruction::io(7).duration(), 7);
        assert_eq!(Instruction::Terminate(CoroutineId::next()).duration(), 1);
    }
}
