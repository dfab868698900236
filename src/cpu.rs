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

//! A single simulated execution unit.

use std::fmt;

use crate::identity::{CoroutineId, CpuId};

/// Coarse-grained state of a [`Cpu`], mirroring what a real scheduler would
/// report for a hardware thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Idle,
    Running,
    Syscall,
}

/// One simulated CPU: a current coroutine (if any), the absolute time its
/// current instruction is due to complete, and a "last coroutine" slot used
/// to detect cache hits across re-binding.
pub struct Cpu {
    id: CpuId,
    state: CpuState,
    due: u64,
    coro: Option<CoroutineId>,
    last_coro: Option<CoroutineId>,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            id: CpuId::next(),
            state: CpuState::Idle,
            due: 0,
            coro: None,
            last_coro: None,
        }
    }

    pub fn id(&self) -> CpuId {
        self.id
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn due(&self) -> u64 {
        self.due
    }

    pub fn current_coroutine(&self) -> Option<CoroutineId> {
        self.coro
    }

    /// True iff this CPU will not be running any coroutine at `now`.
    pub fn is_idle_at(&self, now: u64) -> bool {
        self.coro.is_none() || self.due <= now
    }

    /// True iff this CPU will be running a coroutine at `now`.
    pub fn is_running_at(&self, now: u64) -> bool {
        !self.is_idle_at(now)
    }

    /// Unbind the current coroutine, returning it, and remember it as the
    /// last-run coroutine for future cache-hit accounting.
    pub(crate) fn retire(&mut self) -> Option<CoroutineId> {
        let coro = self.coro.take();
        self.due = 0;
        self.state = CpuState::Idle;
        if coro.is_some() {
            self.last_coro = coro;
        }
        coro
    }

    /// Bind `coro` to this (currently unbound) CPU. Returns `true` iff this
    /// is a cache hit: the same coroutine that last ran here is being
    /// re-bound.
    pub(crate) fn wakeup(&mut self, coro: CoroutineId, state: CpuState, due: u64) -> bool {
        debug_assert!(self.coro.is_none(), "wakeup called on a bound CPU");
        self.state = state;
        self.due = due;
        self.coro = Some(coro);
        self.last_coro == Some(coro)
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

impl fmt::Debug for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cpu({}, state={:?}, due={}, coro={:?})",
            self.id, self.state, self.due, self.coro
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_bound() {
        let cpu = Cpu::new();
        assert!(cpu.is_idle_at(0));
        assert!(!cpu.is_running_at(0));
    }

    #[test]
    fn wakeup_binds_and_sets_due() {
        let mut cpu = Cpu::new();
        let coro = CoroutineId::next();
        let hit = cpu.wakeup(coro, CpuState::Running, 10);
        assert!(!hit, "first binding is never a cache hit");
        assert!(cpu.is_running_at(5));
        assert!(cpu.is_idle_at(10));
        assert_eq!(cpu.current_coroutine(), Some(coro));
    }

    #[test]
    fn retire_then_rewakeup_same_coro_is_cache_hit() {
        let mut cpu = Cpu::new();
        let coro = CoroutineId::next();
        cpu.wakeup(coro, CpuState::Running, 1);
        cpu.retire();
        assert!(cpu.is_idle_at(0));
        let hit = cpu.wakeup(coro, CpuState::Running, 2);
        assert!(hit);
    }

    #[test]
    fn retire_then_wakeup_other_coro_is_not_cache_hit() {
        let mut cpu = Cpu::new();
        let a = CoroutineId::next();
        let b = CoroutineId::next();
        cpu.wakeup(a, CpuState::Running, 1);
        cpu.retire();
        let hit = cpu.wakeup(b, CpuState::Running, 2);
        assert!(!hit);
    }
}
