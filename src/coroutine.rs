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

//! Coroutines wrap a user-supplied, lazily-evaluated stream of [`Instruction`]s.

use std::fmt;
use std::iter;

use crate::error::Error;
use crate::identity::{CoroutineId, CpuId};
use crate::op::Instruction;

/// A cooperatively scheduled producer of a finite instruction sequence.
///
/// The body is single-consumer: once popped (or peeked), an instruction is
/// gone from the stream. Exactly one `Terminate` is synthesised after the
/// user-supplied body is exhausted, so every coroutine, even an empty one,
/// yields at least that one instruction.
pub struct Coroutine {
    id: CoroutineId,
    body: Box<dyn Iterator<Item = Instruction> + Send>,
    lookahead: Option<Instruction>,
    suspended: bool,
    cpu: Option<CpuId>,
}

impl Coroutine {
    /// Wrap `body` into a coroutine. `body` is drained lazily: nothing in it
    /// runs until the first `peek` or `pop`.
    pub fn new<I>(body: I) -> Coroutine
    where
        I: IntoIterator<Item = Instruction>,
        I::IntoIter: Send + 'static,
    {
        let id = CoroutineId::next();
        let stream = body.into_iter().chain(iter::once(Instruction::terminate(id)));
        Coroutine {
            id,
            body: Box::new(stream),
            lookahead: None,
            suspended: false,
            cpu: None,
        }
    }

    pub fn id(&self) -> CoroutineId {
        self.id
    }

    /// The next instruction, without consuming it. Calling `peek` twice in a
    /// row returns references to the same instruction.
    pub fn peek(&mut self) -> &Instruction {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.advance());
        }
        self.lookahead.as_ref().expect("just filled")
    }

    /// Consume and return the next instruction.
    ///
    /// Fails with [`Error::SuspendedCoroutine`] if the coroutine is currently
    /// suspended: a suspended coroutine must be `resume`d by the driver
    /// before it can be popped again.
    pub fn pop(&mut self) -> Result<Instruction, Error> {
        if self.suspended {
            return Err(Error::SuspendedCoroutine { coroutine: self.id });
        }
        Ok(match self.lookahead.take() {
            Some(instruction) => instruction,
            None => self.advance(),
        })
    }

    fn advance(&mut self) -> Instruction {
        self.body.next().expect("coroutine driven past its Terminate instruction")
    }

    /// Stash `instruction` back into the look-ahead slot and mark this
    /// coroutine suspended. Only ever called by the driver immediately after
    /// popping that same instruction, so the slot is always empty here.
    pub(crate) fn suspend(&mut self, instruction: Instruction) {
        debug_assert!(self.lookahead.is_none(), "suspend with a full look-ahead slot");
        self.lookahead = Some(instruction);
        self.suspended = true;
    }

    /// Clear the suspended flag. Does not touch the look-ahead slot: the
    /// stashed instruction is re-popped and re-interpreted on the next turn.
    pub(crate) fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Ready means: not suspended, and not currently bound to a CPU.
    pub fn is_ready(&self) -> bool {
        !self.suspended && self.cpu.is_none()
    }

    pub(crate) fn cpu(&self) -> Option<CpuId> {
        self.cpu
    }

    pub(crate) fn set_cpu(&mut self, cpu: Option<CpuId>) {
        self.cpu = cpu;
    }
}

impl fmt::Display for Coroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

impl fmt::Debug for Coroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coroutine({})", self.id)
    }
}
