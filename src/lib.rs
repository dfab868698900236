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

//! A discrete-event simulator for cooperative coroutine scheduling.
//!
//! A [`Coroutine`] is a lazy stream of [`Instruction`]s — CPU bursts, I/O
//! waits, mutex locks, spawns. A [`Scheduler`] drives simulated time forward
//! tick by tick, asking a pluggable [`Policy`] which idle CPU should run
//! which ready coroutine next, and reports aggregate [`Stats`] once every
//! coroutine has terminated. Nothing here touches a real thread or a real
//! clock: the whole point is to answer "what would this workload's
//! scheduling look like" without running it.

mod coroutine;
mod cpu;
mod error;
mod identity;
mod mutex;
mod op;
mod scheduler;

#[cfg(test)]
mod tests;

pub use crate::coroutine::Coroutine;
pub use crate::cpu::{Cpu, CpuState};
pub use crate::error::Error;
pub use crate::identity::{CoroutineId, CpuId, MutexId};
pub use crate::mutex::Mutex;
pub use crate::op::{Instruction, InstructionKind};
pub use crate::scheduler::{DumbPolicy, DumbScheduler, Monitor, Policy, Scheduler, Stats};
