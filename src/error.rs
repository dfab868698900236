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

//! Hard failures that abort a simulation run.
//!
//! None of these are retried: the simulator has no partial-failure recovery
//! policy, so every error here is meant to propagate straight out of
//! [`crate::scheduler::Scheduler::run_program`].

use thiserror::Error;

use crate::identity::{CoroutineId, CpuId, MutexId};

#[derive(Debug, Error)]
pub enum Error {
    /// `pop` was attempted on a coroutine that is currently suspended
    /// (blocked on a contended `Lock`).
    #[error("pop attempted on suspended coroutine {coroutine}")]
    SuspendedCoroutine { coroutine: CoroutineId },

    /// A policy's `map` result named a CPU that is not idle at `now`.
    #[error("policy mapped {coroutine} onto burning CPU {cpu}")]
    MappedBurningCpu { cpu: CpuId, coroutine: CoroutineId },

    /// A coroutine tried to unlock a mutex it does not own.
    #[error("coroutine {coroutine} attempted to unlock mutex {mutex} it does not own")]
    UnlockNotOwned {
        mutex: MutexId,
        coroutine: CoroutineId,
    },

    /// A policy's `map` result named the same CPU or coroutine more than once.
    #[error("policy returned {name} {id} more than once in a single map() call")]
    PolicyContractViolation { name: &'static str, id: String },

    /// The CLI was asked for a scheduling policy that doesn't exist yet.
    #[error("scheduling policy `{0}` is not implemented")]
    UnimplementedPolicy(String),
}
