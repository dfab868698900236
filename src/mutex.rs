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

//! A simulated mutex: a shared, copyable handle plus a driver-owned record
//! of ownership and a strict FIFO wait-queue.
//!
//! A [`Mutex`] itself is nothing more than an id: it is cheap to `Copy` into
//! every coroutine closure that needs to reference the same lock, the way
//! `Rc`/`Arc` handles are cheap to clone. The actual owner and wait-queue
//! bookkeeping lives in [`MutexState`], which only the scheduler driver in
//! [`crate::scheduler`] ever touches — lock/unlock here is about simulated
//! time, not memory safety, so there is no real synchronization to perform.

use std::collections::VecDeque;
use std::fmt;

use crate::identity::{CoroutineId, MutexId};

/// A handle to a simulated mutex. Cheap to copy; pass it into as many
/// coroutine bodies as need to contend on the same lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mutex {
    id: MutexId,
}

impl Mutex {
    pub fn new() -> Mutex {
        Mutex { id: MutexId::next() }
    }

    pub fn id(&self) -> MutexId {
        self.id
    }
}

impl Default for Mutex {
    fn default() -> Mutex {
        Mutex::new()
    }
}

impl fmt::Display for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

/// Driver-owned ownership and wait-queue record for one [`Mutex`] id.
/// Created lazily the first time a `Lock`/`Unlock` instruction references
/// a given [`MutexId`].
#[derive(Debug, Default)]
pub(crate) struct MutexState {
    owner: Option<CoroutineId>,
    wait_queue: VecDeque<CoroutineId>,
}

impl MutexState {
    pub(crate) fn owner(&self) -> Option<CoroutineId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<CoroutineId>) {
        self.owner = owner;
    }

    pub(crate) fn enqueue_waiter(&mut self, coro: CoroutineId) {
        self.wait_queue.push_back(coro);
    }

    /// Pop the head of the FIFO wait-queue, if any.
    pub(crate) fn dequeue_waiter(&mut self) -> Option<CoroutineId> {
        self.wait_queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_wait_queue() {
        let mut state = MutexState::default();
        let a = CoroutineId::next();
        let b = CoroutineId::next();
        state.enqueue_waiter(a);
        state.enqueue_waiter(b);
        assert_eq!(state.dequeue_waiter(), Some(a));
        assert_eq!(state.dequeue_waiter(), Some(b));
        assert_eq!(state.dequeue_waiter(), None);
    }

    #[test]
    fn owner_tracks_lock_state() {
        let mut state = MutexState::default();
        assert_eq!(state.owner(), None);
        let owner = CoroutineId::next();
        state.set_owner(Some(owner));
        assert_eq!(state.owner(), Some(owner));
    }

    #[test]
    fn handle_is_cheap_to_copy() {
        let m = Mutex::new();
        let m2 = m;
        assert_eq!(m.id(), m2.id());
    }
}
